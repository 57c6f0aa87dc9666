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
//! `AdminGetUser`.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::CognitoError;
use crate::services::Services;
use crate::user_pool::{AttributeType, User, UserStatus};

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct AdminGetUserRequest {
    #[validate(length(min = 1))]
    pub user_pool_id: String,
    #[validate(length(min = 1))]
    pub username: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdminGetUserResponse {
    pub username: String,
    pub user_attributes: Vec<AttributeType>,
    pub enabled: bool,
    pub user_status: UserStatus,
    pub user_create_date: DateTime<Utc>,
    pub user_last_modified_date: DateTime<Utc>,
}

impl From<User> for AdminGetUserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            user_attributes: user.attributes,
            enabled: user.enabled,
            user_status: user.user_status,
            user_create_date: user.user_create_date,
            user_last_modified_date: user.user_last_modified_date,
        }
    }
}

pub(super) async fn handle(
    services: Arc<Services>,
    req: AdminGetUserRequest,
) -> Result<AdminGetUserResponse, CognitoError> {
    let pool = services.cognito.get_user_pool(&req.user_pool_id).await?;
    let user = pool
        .get_user_by_username(&req.username)
        .await?
        .ok_or(CognitoError::UserNotFound)?;
    Ok(user.into())
}
