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
//! `ListUsers`.
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::CognitoError;
use crate::services::Services;
use crate::targets::UserType;

/// `Filter` and `PaginationToken` are accepted and ignored.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct ListUsersRequest {
    #[validate(length(min = 1))]
    pub user_pool_id: String,
    #[serde(default)]
    #[validate(range(min = 1, max = 60))]
    pub limit: Option<usize>,
    #[serde(default)]
    pub attributes_to_get: Option<Vec<String>>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListUsersResponse {
    pub users: Vec<UserType>,
}

pub(super) async fn handle(
    services: Arc<Services>,
    req: ListUsersRequest,
) -> Result<ListUsersResponse, CognitoError> {
    let pool = services.cognito.get_user_pool(&req.user_pool_id).await?;
    let mut users: Vec<UserType> = pool.list_users().await?.into_iter().map(Into::into).collect();

    if let Some(limit) = req.limit {
        users.truncate(limit);
    }
    if let Some(names) = &req.attributes_to_get {
        for user in &mut users {
            user.attributes.retain(|attr| names.contains(&attr.name));
        }
    }
    Ok(ListUsersResponse { users })
}
