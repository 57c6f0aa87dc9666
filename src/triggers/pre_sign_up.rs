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
//! Pre sign up trigger. A failing function rejects the sign up.
use serde::{Deserialize, Serialize};

use crate::error::CognitoError;
use crate::lambda::{LambdaApi, Metadata, PreSignUpEvent, PreSignUpSource, TriggerEvent};
use crate::triggers::{event_client_id, invoke_trigger};
use crate::user_pool::{AttributeType, attributes_to_record};

#[derive(Clone, Debug, PartialEq)]
pub struct PreSignUpParams {
    pub source: PreSignUpSource,
    pub user_pool_id: String,
    pub client_id: Option<String>,
    pub username: String,
    pub user_attributes: Vec<AttributeType>,
    pub client_metadata: Option<Metadata>,
    pub validation_data: Option<Metadata>,
}

/// Decision of the function.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreSignUpResponse {
    #[serde(default)]
    pub auto_confirm_user: bool,
    #[serde(default)]
    pub auto_verify_email: bool,
    #[serde(default)]
    pub auto_verify_phone: bool,
}

pub(crate) async fn invoke(
    lambda: &dyn LambdaApi,
    params: PreSignUpParams,
) -> Result<PreSignUpResponse, CognitoError> {
    let event = TriggerEvent::PreSignUp(PreSignUpEvent {
        source: params.source,
        client_id: event_client_id(params.client_id),
        user_pool_id: params.user_pool_id,
        username: params.username,
        user_attributes: attributes_to_record(&params.user_attributes),
        client_metadata: params.client_metadata,
        validation_data: params.validation_data,
    });
    Ok(invoke_trigger(lambda, event).await?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use std::collections::HashMap;
    use tracing_test::traced_test;

    use super::*;
    use crate::lambda::{LambdaError, MockLambdaApi};

    fn params(source: PreSignUpSource) -> PreSignUpParams {
        PreSignUpParams {
            source,
            user_pool_id: "userPoolId".into(),
            client_id: Some("clientId".into()),
            username: "username".into(),
            user_attributes: vec![AttributeType::new("email", "example@example.com")],
            client_metadata: None,
            validation_data: Some(HashMap::from([("captcha".into(), "ok".into())])),
        }
    }

    #[tokio::test]
    async fn test_response() {
        for source in [
            PreSignUpSource::AdminCreateUser,
            PreSignUpSource::ExternalProvider,
            PreSignUpSource::SignUp,
        ] {
            let mut lambda = MockLambdaApi::new();
            lambda
                .expect_invoke()
                .withf(move |event| match event {
                    TriggerEvent::PreSignUp(e) => {
                        e.source == source
                            && e.validation_data
                                == Some(HashMap::from([("captcha".into(), "ok".into())]))
                    }
                    _ => false,
                })
                .returning(|_| Ok(json!({"autoConfirmUser": true, "autoVerifyEmail": true})));

            let response = invoke(&lambda, params(source)).await.unwrap();
            assert_eq!(
                response,
                PreSignUpResponse {
                    auto_confirm_user: true,
                    auto_verify_email: true,
                    auto_verify_phone: false,
                }
            );
        }
    }

    #[tokio::test]
    async fn test_empty_response() {
        let mut lambda = MockLambdaApi::new();
        lambda.expect_invoke().returning(|_| Ok(json!({})));

        let response = invoke(&lambda, params(PreSignUpSource::SignUp)).await.unwrap();
        assert_eq!(response, PreSignUpResponse::default());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_rejection() {
        let mut lambda = MockLambdaApi::new();
        lambda
            .expect_invoke()
            .returning(|_| Err(LambdaError::UserValidation("domain not allowed".into())));

        let err = invoke(&lambda, params(PreSignUpSource::SignUp))
            .await
            .unwrap_err();
        assert_eq!(err.aws_error_type(), "UserLambdaValidationException");
        assert_eq!(err.to_string(), "domain not allowed");
    }
}
