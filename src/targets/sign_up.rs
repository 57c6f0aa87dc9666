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
//! `SignUp`: self-service registration through an application client.
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use super::common::{check_password, code_channels, pool_for_client, with_sub};
use crate::error::CognitoError;
use crate::lambda::{
    CustomMessageSource, Metadata, PostConfirmationSource, PreSignUpSource, TriggerName,
};
use crate::messages::{CodeDeliveryDetails, CodeMessage, delivery_details};
use crate::services::Services;
use crate::triggers::{PostConfirmationParams, PreSignUpParams, PreSignUpResponse};
use crate::user_pool::{AttributeType, UserBuilder, UserStatus};

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct SignUpRequest {
    #[validate(length(min = 1))]
    pub client_id: String,
    #[validate(length(min = 1, max = 128))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(default)]
    pub user_attributes: Vec<AttributeType>,
    #[serde(default)]
    pub validation_data: Option<Vec<AttributeType>>,
    #[serde(default)]
    pub client_metadata: Option<Metadata>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignUpResponse {
    pub user_confirmed: bool,
    pub user_sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_delivery_details: Option<CodeDeliveryDetails>,
}

/// Mark the attributes the function asked to verify.
fn verified_attributes(
    mut attributes: Vec<AttributeType>,
    decision: PreSignUpResponse,
) -> Vec<AttributeType> {
    let mut verified = Vec::new();
    if decision.auto_verify_email && attributes.iter().any(|attr| attr.name == "email") {
        verified.push(AttributeType::new("email_verified", "true"));
    }
    if decision.auto_verify_phone && attributes.iter().any(|attr| attr.name == "phone_number") {
        verified.push(AttributeType::new("phone_number_verified", "true"));
    }
    for attribute in verified {
        match attributes.iter_mut().find(|a| a.name == attribute.name) {
            Some(existing) => existing.value = attribute.value,
            None => attributes.push(attribute),
        }
    }
    attributes
}

#[tracing::instrument(level = "debug", skip(services, req), fields(client_id = %req.client_id))]
pub(super) async fn handle(
    services: Arc<Services>,
    req: SignUpRequest,
) -> Result<SignUpResponse, CognitoError> {
    let pool = pool_for_client(&services, &req.client_id).await?;
    let config = pool.get_config().await?;
    if pool.get_user_by_username(&req.username).await?.is_some() {
        return Err(CognitoError::UsernameExists);
    }
    check_password(&config, &req.password)?;

    let decision = if services.triggers.enabled(TriggerName::PreSignUp) {
        services
            .triggers
            .pre_sign_up(PreSignUpParams {
                source: PreSignUpSource::SignUp,
                user_pool_id: config.id.clone(),
                client_id: Some(req.client_id.clone()),
                username: req.username.clone(),
                user_attributes: req.user_attributes.clone(),
                client_metadata: req.client_metadata.clone(),
                validation_data: req.validation_data.as_deref().map(|data| {
                    data.iter()
                        .map(|attr| (attr.name.clone(), attr.value.clone()))
                        .collect()
                }),
            })
            .await?
    } else {
        PreSignUpResponse::default()
    };

    let now = services.clock.now();
    let attributes = verified_attributes(with_sub(req.user_attributes), decision);
    let mut builder = UserBuilder::default();
    builder
        .username(req.username)
        .password(req.password)
        .attributes(attributes)
        .user_create_date(now)
        .user_last_modified_date(now);
    let code = if decision.auto_confirm_user {
        builder.user_status(UserStatus::Confirmed);
        None
    } else {
        let code = services.otp.generate();
        builder
            .user_status(UserStatus::Unconfirmed)
            .confirmation_code(code.clone());
        Some(code)
    };
    let user = builder.build()?;
    pool.save_user(&user).await?;
    info!(username = %user.username, status = ?user.user_status, "user signed up");

    let user_sub = user.attribute("sub").unwrap_or_default().to_string();
    let mut code_delivery_details = None;
    match code {
        Some(code) => {
            if let Some(delivery) = delivery_details(&user, &code_channels(&config)) {
                code_delivery_details = Some(
                    services
                        .messages
                        .deliver(CodeMessage {
                            source: CustomMessageSource::SignUp,
                            client_id: Some(req.client_id),
                            user_pool_id: config.id,
                            user,
                            code,
                            client_metadata: req.client_metadata,
                            delivery,
                        })
                        .await?,
                );
            }
        }
        None => {
            if services.triggers.enabled(TriggerName::PostConfirmation) {
                services
                    .triggers
                    .post_confirmation(PostConfirmationParams {
                        source: PostConfirmationSource::ConfirmSignUp,
                        user_pool_id: config.id,
                        client_id: Some(req.client_id),
                        username: user.username,
                        user_attributes: user.attributes,
                        client_metadata: req.client_metadata,
                    })
                    .await?;
            }
        }
    }

    Ok(SignUpResponse {
        user_confirmed: decision.auto_confirm_user,
        user_sub,
        code_delivery_details,
    })
}
