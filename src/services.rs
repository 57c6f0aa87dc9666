// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0
//! # Services
//!
//! Collaborators shared by the operation handlers, and the composition point
//! wiring the concrete providers together.
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::cognito::{CognitoApi, CognitoProvider};
use crate::config::Config;
use crate::data_store::FileDataStoreFactory;
use crate::error::CognitoError;
use crate::lambda::{HttpFunctionInvoker, LambdaProvider};
use crate::messages::{MessagesApi, MessagesProvider};
use crate::otp::{CodeGenerator, RandomCodeGenerator};
use crate::triggers::{TriggersApi, TriggersProvider};
use crate::user_pool::UserPoolProviderFactory;

#[derive(Clone)]
pub struct Services {
    pub cognito: Arc<dyn CognitoApi>,
    pub triggers: Arc<dyn TriggersApi>,
    pub messages: Arc<dyn MessagesApi>,
    pub otp: Arc<dyn CodeGenerator>,
    pub clock: Arc<dyn Clock>,
}

impl Services {
    /// Wire the file backed providers described by the configuration.
    #[tracing::instrument(level = "debug", skip(config))]
    pub async fn from_config(config: &Config) -> Result<Self, CognitoError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let store_factory = FileDataStoreFactory::new(&config.storage.data_directory).await?;
        let cognito: Arc<dyn CognitoApi> = Arc::new(
            CognitoProvider::new(
                Arc::new(store_factory),
                config.user_pool_defaults.to_record(),
                clock.clone(),
                Arc::new(UserPoolProviderFactory),
            )
            .await?,
        );
        let lambda = Arc::new(LambdaProvider::new(
            config.trigger_functions.clone(),
            config.lambda_client.region.clone(),
            Arc::new(HttpFunctionInvoker::new(config.lambda_client.endpoint.clone())),
        ));
        let triggers: Arc<dyn TriggersApi> =
            Arc::new(TriggersProvider::new(lambda, cognito.clone(), clock.clone()));

        Ok(Self {
            messages: Arc::new(MessagesProvider::new(triggers.clone())),
            cognito,
            triggers,
            otp: Arc::new(RandomCodeGenerator),
            clock,
        })
    }
}
