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
//! Post confirmation trigger. Notification only.
use serde::de::IgnoredAny;

use crate::error::CognitoError;
use crate::lambda::{
    LambdaApi, Metadata, PostConfirmationEvent, PostConfirmationSource, TriggerEvent,
};
use crate::triggers::{event_client_id, invoke_trigger};
use crate::user_pool::{AttributeType, attributes_to_record};

#[derive(Clone, Debug, PartialEq)]
pub struct PostConfirmationParams {
    pub source: PostConfirmationSource,
    pub user_pool_id: String,
    pub client_id: Option<String>,
    pub username: String,
    pub user_attributes: Vec<AttributeType>,
    pub client_metadata: Option<Metadata>,
}

pub(crate) async fn invoke(
    lambda: &dyn LambdaApi,
    params: PostConfirmationParams,
) -> Result<(), CognitoError> {
    let event = TriggerEvent::PostConfirmation(PostConfirmationEvent {
        source: params.source,
        client_id: event_client_id(params.client_id),
        user_pool_id: params.user_pool_id,
        username: params.username,
        user_attributes: attributes_to_record(&params.user_attributes),
        client_metadata: params.client_metadata,
    });
    invoke_trigger::<IgnoredAny>(lambda, event).await?;
    Ok(())
}
