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
//! # Triggers
//!
//! Lifecycle hooks of the user pools. Each trigger turns an operation level
//! call into a trigger event, invokes it and folds the reply back. Whether a
//! failing function aborts the operation is decided by the trigger's
//! [`FailurePolicy`](crate::lambda::FailurePolicy).
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::error;

pub mod custom_message;
pub mod post_authentication;
pub mod post_confirmation;
pub mod pre_sign_up;
pub mod user_migration;

use crate::clock::Clock;
use crate::cognito::CognitoApi;
use crate::error::CognitoError;
use crate::lambda::{CLIENT_ID_NOT_APPLICABLE, LambdaApi, LambdaError, TriggerEvent, TriggerName};
use crate::user_pool::User;
pub use custom_message::{CustomMessageParams, CustomMessageResponse};
pub use post_authentication::PostAuthenticationParams;
pub use post_confirmation::PostConfirmationParams;
pub use pre_sign_up::{PreSignUpParams, PreSignUpResponse};
pub use user_migration::UserMigrationParams;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TriggersApi: Send + Sync {
    /// Whether a function is bound to the trigger.
    fn enabled(&self, trigger: TriggerName) -> bool;

    /// Compose a message through the custom message function. `None` when
    /// the function failed.
    async fn custom_message(
        &self,
        params: CustomMessageParams,
    ) -> Result<Option<CustomMessageResponse>, CognitoError>;

    async fn post_authentication(
        &self,
        params: PostAuthenticationParams,
    ) -> Result<(), CognitoError>;

    async fn post_confirmation(&self, params: PostConfirmationParams)
    -> Result<(), CognitoError>;

    async fn pre_sign_up(&self, params: PreSignUpParams)
    -> Result<PreSignUpResponse, CognitoError>;

    /// Import a user unknown to the pool. The migrated user is saved.
    async fn user_migration(&self, params: UserMigrationParams) -> Result<User, CognitoError>;
}

#[derive(Clone)]
pub struct TriggersProvider {
    lambda: Arc<dyn LambdaApi>,
    cognito: Arc<dyn CognitoApi>,
    clock: Arc<dyn Clock>,
}

impl TriggersProvider {
    pub fn new(
        lambda: Arc<dyn LambdaApi>,
        cognito: Arc<dyn CognitoApi>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            lambda,
            cognito,
            clock,
        }
    }
}

/// Client id put into events of operations made without a client.
pub(crate) fn event_client_id(client_id: Option<String>) -> String {
    client_id.unwrap_or_else(|| CLIENT_ID_NOT_APPLICABLE.to_string())
}

/// Invoke the event and decode its response, then apply the failure policy
/// of the trigger. `None` means a best-effort trigger failed.
pub(crate) async fn invoke_trigger<T: DeserializeOwned>(
    lambda: &dyn LambdaApi,
    event: TriggerEvent,
) -> Result<Option<T>, LambdaError> {
    let trigger = event.trigger();
    let result = match lambda.invoke(event).await {
        Ok(response) => serde_json::from_value(response).map_err(|err| {
            error!("unexpected {trigger} response: {err}");
            LambdaError::InvalidResponse
        }),
        Err(err) => Err(err),
    };
    trigger.failure_policy().apply(trigger, result)
}

#[async_trait]
impl TriggersApi for TriggersProvider {
    fn enabled(&self, trigger: TriggerName) -> bool {
        self.lambda.enabled(trigger)
    }

    async fn custom_message(
        &self,
        params: CustomMessageParams,
    ) -> Result<Option<CustomMessageResponse>, CognitoError> {
        custom_message::invoke(self.lambda.as_ref(), self.cognito.as_ref(), params).await
    }

    async fn post_authentication(
        &self,
        params: PostAuthenticationParams,
    ) -> Result<(), CognitoError> {
        post_authentication::invoke(self.lambda.as_ref(), params).await
    }

    async fn post_confirmation(
        &self,
        params: PostConfirmationParams,
    ) -> Result<(), CognitoError> {
        post_confirmation::invoke(self.lambda.as_ref(), params).await
    }

    async fn pre_sign_up(&self, params: PreSignUpParams) -> Result<PreSignUpResponse, CognitoError> {
        pre_sign_up::invoke(self.lambda.as_ref(), params).await
    }

    async fn user_migration(&self, params: UserMigrationParams) -> Result<User, CognitoError> {
        user_migration::invoke(
            self.lambda.as_ref(),
            self.cognito.as_ref(),
            self.clock.as_ref(),
            params,
        )
        .await
    }
}
