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
//! `ResendConfirmationCode`: issue a new sign up code.
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use super::common::{code_channels, pool_for_client};
use crate::error::CognitoError;
use crate::lambda::{CustomMessageSource, Metadata};
use crate::messages::{CodeDeliveryDetails, CodeMessage, delivery_details};
use crate::services::Services;

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct ResendConfirmationCodeRequest {
    #[validate(length(min = 1))]
    pub client_id: String,
    #[validate(length(min = 1))]
    pub username: String,
    #[serde(default)]
    pub client_metadata: Option<Metadata>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResendConfirmationCodeResponse {
    pub code_delivery_details: CodeDeliveryDetails,
}

#[tracing::instrument(level = "debug", skip(services, req), fields(client_id = %req.client_id))]
pub(super) async fn handle(
    services: Arc<Services>,
    req: ResendConfirmationCodeRequest,
) -> Result<ResendConfirmationCodeResponse, CognitoError> {
    let pool = pool_for_client(&services, &req.client_id).await?;
    let config = pool.get_config().await?;
    let mut user = pool
        .get_user_by_username(&req.username)
        .await?
        .ok_or(CognitoError::UserNotFound)?;

    let delivery = delivery_details(&user, &code_channels(&config)).ok_or_else(|| {
        CognitoError::InvalidParameter(
            "User has no registered/verified email or phone_number".into(),
        )
    })?;

    let code = services.otp.generate();
    user.confirmation_code = Some(code.clone());
    user.user_last_modified_date = services.clock.now();
    pool.save_user(&user).await?;

    let code_delivery_details = services
        .messages
        .deliver(CodeMessage {
            source: CustomMessageSource::ResendCode,
            client_id: Some(req.client_id),
            user_pool_id: config.id,
            user,
            code,
            client_metadata: req.client_metadata,
            delivery,
        })
        .await?;
    Ok(ResendConfirmationCodeResponse {
        code_delivery_details,
    })
}
