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
//! `AdminCreateUser`: create a user that must change its temporary password.
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use super::common::with_sub;
use crate::cognito::generate_id;
use crate::error::CognitoError;
use crate::lambda::{CustomMessageSource, Metadata, PreSignUpSource, TriggerName};
use crate::messages::{CodeMessage, delivery_details};
use crate::services::Services;
use crate::targets::UserType;
use crate::triggers::PreSignUpParams;
use crate::user_pool::{AttributeType, UserBuilder, UserStatus};

/// `MessageAction` value that skips the invitation message.
const SUPPRESS: &str = "SUPPRESS";

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct AdminCreateUserRequest {
    #[validate(length(min = 1))]
    pub user_pool_id: String,
    #[validate(length(min = 1, max = 128))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 6))]
    pub temporary_password: Option<String>,
    #[serde(default)]
    pub user_attributes: Vec<AttributeType>,
    #[serde(default)]
    pub message_action: Option<String>,
    #[serde(default)]
    pub desired_delivery_mediums: Option<Vec<String>>,
    #[serde(default)]
    pub client_metadata: Option<Metadata>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdminCreateUserResponse {
    pub user: UserType,
}

/// Attributes an invitation may be sent to, in preference order.
fn invitation_channels(mediums: Option<&[String]>) -> Vec<String> {
    let mediums = mediums.unwrap_or(&[]);
    let mut channels = Vec::new();
    if mediums.is_empty() || mediums.iter().any(|m| m == "SMS") {
        channels.push("phone_number".to_string());
    }
    if mediums.iter().any(|m| m == "EMAIL") {
        channels.push("email".to_string());
    }
    channels
}

#[tracing::instrument(level = "debug", skip(services, req), fields(user_pool_id = %req.user_pool_id))]
pub(super) async fn handle(
    services: Arc<Services>,
    req: AdminCreateUserRequest,
) -> Result<AdminCreateUserResponse, CognitoError> {
    let pool = services.cognito.get_user_pool(&req.user_pool_id).await?;
    if pool.get_user_by_username(&req.username).await?.is_some() {
        return Err(CognitoError::UsernameExists);
    }

    if services.triggers.enabled(TriggerName::PreSignUp) {
        services
            .triggers
            .pre_sign_up(PreSignUpParams {
                source: PreSignUpSource::AdminCreateUser,
                user_pool_id: req.user_pool_id.clone(),
                client_id: None,
                username: req.username.clone(),
                user_attributes: req.user_attributes.clone(),
                client_metadata: req.client_metadata.clone(),
                validation_data: None,
            })
            .await?;
    }

    let now = services.clock.now();
    let password = req
        .temporary_password
        .clone()
        .unwrap_or_else(|| generate_id(12));
    let user = UserBuilder::default()
        .username(req.username.clone())
        .password(password.clone())
        .attributes(with_sub(req.user_attributes))
        .user_status(UserStatus::ForceChangePassword)
        .user_create_date(now)
        .user_last_modified_date(now)
        .build()?;
    pool.save_user(&user).await?;
    debug!(username = %user.username, "created user");

    if req.message_action.as_deref() != Some(SUPPRESS) {
        let channels = invitation_channels(req.desired_delivery_mediums.as_deref());
        let delivery = delivery_details(&user, &channels).ok_or_else(|| {
            CognitoError::InvalidParameter(
                "User has no attribute matching desired delivery mediums".into(),
            )
        })?;
        services
            .messages
            .deliver(CodeMessage {
                source: CustomMessageSource::AdminCreateUser,
                client_id: None,
                user_pool_id: req.user_pool_id,
                user: user.clone(),
                code: password,
                client_metadata: req.client_metadata,
                delivery,
            })
            .await?;
    }

    Ok(AdminCreateUserResponse { user: user.into() })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::targets::tests::{TestServices, now, user};
    use crate::triggers::PreSignUpResponse;
    use crate::user_pool::{MockUserPoolApi, User, UserPoolApi};

    fn request() -> AdminCreateUserRequest {
        AdminCreateUserRequest {
            user_pool_id: "test".into(),
            username: "janice".into(),
            temporary_password: Some("Temp0rary!".into()),
            user_attributes: vec![AttributeType::new("phone_number", "0400000000")],
            message_action: None,
            desired_delivery_mediums: None,
            client_metadata: None,
        }
    }

    fn services_with(pool: MockUserPoolApi, pre_sign_up: bool) -> TestServices {
        let pool: Arc<dyn UserPoolApi> = Arc::new(pool);
        let mut services = TestServices::new();
        services
            .cognito
            .expect_get_user_pool()
            .returning(move |_| Ok(pool.clone()));
        services
            .triggers
            .expect_enabled()
            .returning(move |trigger| pre_sign_up && trigger == TriggerName::PreSignUp);
        services
    }

    #[test]
    fn test_invitation_channels() {
        assert_eq!(invitation_channels(None), vec!["phone_number"]);
        assert_eq!(
            invitation_channels(Some(&["EMAIL".to_string()][..])),
            vec!["email"]
        );
        assert_eq!(
            invitation_channels(Some(&["EMAIL".to_string(), "SMS".to_string()][..])),
            vec!["phone_number", "email"]
        );
    }

    #[tokio::test]
    async fn test_creates_user_and_sends_invitation() {
        let mut pool = MockUserPoolApi::new();
        pool.expect_get_user_by_username().returning(|_| Ok(None));
        pool.expect_save_user()
            .withf(|saved: &User| {
                saved.username == "janice"
                    && saved.password == "Temp0rary!"
                    && saved.user_status == UserStatus::ForceChangePassword
                    && saved.user_create_date == now()
                    && saved.attribute("sub").is_some()
            })
            .times(1)
            .returning(|_| Ok(()));
        let mut services = services_with(pool, false);
        services.triggers.expect_pre_sign_up().never();
        services
            .messages
            .expect_deliver()
            .withf(|message| {
                message.source == CustomMessageSource::AdminCreateUser
                    && message.client_id.is_none()
                    && message.code == "Temp0rary!"
                    && message.delivery.delivery_medium == "SMS"
            })
            .times(1)
            .returning(|message| Ok(message.delivery));

        let response = handle(services.build(), request()).await.unwrap();
        assert_eq!(response.user.username, "janice");
        assert_eq!(response.user.user_status, UserStatus::ForceChangePassword);
        assert!(response.user.enabled);
    }

    #[tokio::test]
    async fn test_suppressed_invitation() {
        let mut pool = MockUserPoolApi::new();
        pool.expect_get_user_by_username().returning(|_| Ok(None));
        pool.expect_save_user().returning(|_| Ok(()));
        let mut services = services_with(pool, false);
        services.messages.expect_deliver().never();

        let response = handle(
            services.build(),
            AdminCreateUserRequest {
                message_action: Some("SUPPRESS".into()),
                temporary_password: None,
                ..request()
            },
        )
        .await
        .unwrap();
        assert_eq!(response.user.username, "janice");
    }

    #[tokio::test]
    async fn test_pre_sign_up_is_invoked() {
        let mut pool = MockUserPoolApi::new();
        pool.expect_get_user_by_username().returning(|_| Ok(None));
        pool.expect_save_user().returning(|_| Ok(()));
        let mut services = services_with(pool, true);
        services
            .triggers
            .expect_pre_sign_up()
            .withf(|params| {
                params.source == PreSignUpSource::AdminCreateUser && params.client_id.is_none()
            })
            .times(1)
            .returning(|_| Ok(PreSignUpResponse::default()));
        services
            .messages
            .expect_deliver()
            .returning(|message| Ok(message.delivery));

        handle(services.build(), request()).await.unwrap();
    }

    #[tokio::test]
    async fn test_existing_user() {
        let mut pool = MockUserPoolApi::new();
        pool.expect_get_user_by_username()
            .returning(|_| Ok(Some(user("janice", UserStatus::Confirmed, vec![]))));
        pool.expect_save_user().never();

        let err = handle(services_with(pool, false).build(), request())
            .await
            .unwrap_err();
        assert!(matches!(err, CognitoError::UsernameExists));
    }

    #[tokio::test]
    async fn test_no_delivery_channel() {
        let mut pool = MockUserPoolApi::new();
        pool.expect_get_user_by_username().returning(|_| Ok(None));
        pool.expect_save_user().returning(|_| Ok(()));

        let err = handle(
            services_with(pool, false).build(),
            AdminCreateUserRequest {
                desired_delivery_mediums: Some(vec!["EMAIL".into()]),
                ..request()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.aws_error_type(), "InvalidParameterException");
    }
}
