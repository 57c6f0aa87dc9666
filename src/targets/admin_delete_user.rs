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
//! `AdminDeleteUser`.
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::CognitoError;
use crate::services::Services;

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct AdminDeleteUserRequest {
    #[validate(length(min = 1))]
    pub user_pool_id: String,
    #[validate(length(min = 1))]
    pub username: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AdminDeleteUserResponse {}

pub(super) async fn handle(
    services: Arc<Services>,
    req: AdminDeleteUserRequest,
) -> Result<AdminDeleteUserResponse, CognitoError> {
    let pool = services.cognito.get_user_pool(&req.user_pool_id).await?;
    let user = pool
        .get_user_by_username(&req.username)
        .await?
        .ok_or(CognitoError::UserNotFound)?;
    pool.delete_user(&user).await?;
    Ok(AdminDeleteUserResponse {})
}
