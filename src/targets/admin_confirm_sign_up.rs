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
//! `AdminConfirmSignUp`: confirm a user without a code.
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::CognitoError;
use crate::lambda::{Metadata, PostConfirmationSource, TriggerName};
use crate::services::Services;
use crate::triggers::PostConfirmationParams;
use crate::user_pool::UserStatus;

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct AdminConfirmSignUpRequest {
    #[validate(length(min = 1))]
    pub user_pool_id: String,
    #[validate(length(min = 1))]
    pub username: String,
    #[serde(default)]
    pub client_metadata: Option<Metadata>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AdminConfirmSignUpResponse {}

#[tracing::instrument(level = "debug", skip(services, req), fields(user_pool_id = %req.user_pool_id))]
pub(super) async fn handle(
    services: Arc<Services>,
    req: AdminConfirmSignUpRequest,
) -> Result<AdminConfirmSignUpResponse, CognitoError> {
    let pool = services.cognito.get_user_pool(&req.user_pool_id).await?;
    let mut user = pool
        .get_user_by_username(&req.username)
        .await?
        .ok_or(CognitoError::UserNotFound)?;

    if user.user_status != UserStatus::Unconfirmed {
        return Err(CognitoError::NotAuthorized);
    }

    user.user_status = UserStatus::Confirmed;
    user.confirmation_code = None;
    user.user_last_modified_date = services.clock.now();
    pool.save_user(&user).await?;

    if services.triggers.enabled(TriggerName::PostConfirmation) {
        services
            .triggers
            .post_confirmation(PostConfirmationParams {
                source: PostConfirmationSource::ConfirmSignUp,
                user_pool_id: req.user_pool_id,
                client_id: None,
                username: user.username,
                user_attributes: user.attributes,
                client_metadata: req.client_metadata,
            })
            .await?;
    }

    Ok(AdminConfirmSignUpResponse {})
}
