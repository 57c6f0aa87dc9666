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
//! Custom message trigger.
use serde::{Deserialize, Serialize};

use crate::cognito::CognitoApi;
use crate::error::CognitoError;
use crate::lambda::{CustomMessageEvent, CustomMessageSource, LambdaApi, Metadata, TriggerEvent};
use crate::triggers::{event_client_id, invoke_trigger};
use crate::user_pool::{AttributeType, attributes_to_record};

/// Placeholder the function puts where the user name goes.
pub const USERNAME_PARAMETER: &str = "{username}";
/// Placeholder the function puts where the code goes.
pub const CODE_PARAMETER: &str = "{####}";

#[derive(Clone, Debug, PartialEq)]
pub struct CustomMessageParams {
    pub source: CustomMessageSource,
    pub user_pool_id: String,
    /// Client the operation was made with, if any.
    pub client_id: Option<String>,
    pub username: String,
    pub code: String,
    pub user_attributes: Vec<AttributeType>,
    pub client_metadata: Option<Metadata>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomMessageResponse {
    #[serde(default)]
    pub email_message: Option<String>,
    #[serde(default)]
    pub email_subject: Option<String>,
    #[serde(default)]
    pub sms_message: Option<String>,
}

impl CustomMessageResponse {
    fn substitute(self, code: &str, username: &str) -> Self {
        let fill = |message: String| {
            message
                .replace(CODE_PARAMETER, code)
                .replace(USERNAME_PARAMETER, username)
        };
        Self {
            email_message: self.email_message.map(fill),
            email_subject: self.email_subject,
            sms_message: self.sms_message.map(fill),
        }
    }
}

#[tracing::instrument(level = "debug", skip(lambda, cognito, params), fields(source = params.source.as_str()))]
pub(crate) async fn invoke(
    lambda: &dyn LambdaApi,
    cognito: &dyn CognitoApi,
    params: CustomMessageParams,
) -> Result<Option<CustomMessageResponse>, CognitoError> {
    if let Some(client_id) = &params.client_id {
        if cognito
            .get_user_pool_for_client_id(client_id)
            .await?
            .is_none()
        {
            return Err(CognitoError::ResourceNotFound);
        }
    }

    let event = TriggerEvent::CustomMessage(CustomMessageEvent {
        source: params.source,
        client_id: event_client_id(params.client_id),
        user_pool_id: params.user_pool_id,
        username: params.username.clone(),
        user_attributes: attributes_to_record(&params.user_attributes),
        client_metadata: params.client_metadata,
        code_parameter: CODE_PARAMETER.to_string(),
        username_parameter: USERNAME_PARAMETER.to_string(),
    });

    let response: Option<CustomMessageResponse> = invoke_trigger(lambda, event).await?;
    Ok(response.map(|response| response.substitute(&params.code, &params.username)))
}
