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
//! `ListUserPools`.
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::CognitoError;
use crate::services::Services;
use crate::user_pool::UserPool;

/// `NextToken` is accepted and ignored: every pool fits one page.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct ListUserPoolsRequest {
    #[validate(range(min = 1, max = 60))]
    pub max_results: usize,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListUserPoolsResponse {
    pub user_pools: Vec<UserPool>,
}

pub(super) async fn handle(
    services: Arc<Services>,
    req: ListUserPoolsRequest,
) -> Result<ListUserPoolsResponse, CognitoError> {
    let mut user_pools = services.cognito.list_user_pools().await?;
    user_pools.truncate(req.max_results);
    Ok(ListUserPoolsResponse { user_pools })
}
