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
//! `ConfirmForgotPassword`: set a new password with a reset code.
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use super::common::pool_for_client;
use crate::error::CognitoError;
use crate::lambda::{Metadata, PostConfirmationSource, TriggerName};
use crate::services::Services;
use crate::triggers::PostConfirmationParams;
use crate::user_pool::UserStatus;

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct ConfirmForgotPasswordRequest {
    #[validate(length(min = 1))]
    pub client_id: String,
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub confirmation_code: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(default)]
    pub client_metadata: Option<Metadata>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ConfirmForgotPasswordResponse {}

#[tracing::instrument(level = "debug", skip(services, req), fields(client_id = %req.client_id))]
pub(super) async fn handle(
    services: Arc<Services>,
    req: ConfirmForgotPasswordRequest,
) -> Result<ConfirmForgotPasswordResponse, CognitoError> {
    let pool = pool_for_client(&services, &req.client_id).await?;
    let mut user = pool
        .get_user_by_username(&req.username)
        .await?
        .ok_or(CognitoError::UserNotFound)?;

    if user.confirmation_code.as_deref() != Some(req.confirmation_code.as_str()) {
        return Err(CognitoError::CodeMismatch);
    }

    user.password = req.password;
    user.user_status = UserStatus::Confirmed;
    user.confirmation_code = None;
    user.user_last_modified_date = services.clock.now();
    pool.save_user(&user).await?;

    if services.triggers.enabled(TriggerName::PostConfirmation) {
        let config = pool.get_config().await?;
        services
            .triggers
            .post_confirmation(PostConfirmationParams {
                source: PostConfirmationSource::ConfirmForgotPassword,
                user_pool_id: config.id,
                client_id: Some(req.client_id),
                username: user.username,
                user_attributes: user.attributes,
                client_metadata: req.client_metadata,
            })
            .await?;
    }

    Ok(ConfirmForgotPasswordResponse {})
}
