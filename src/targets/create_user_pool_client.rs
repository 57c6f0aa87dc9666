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
//! `CreateUserPoolClient`.
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::CognitoError;
use crate::services::Services;
use crate::user_pool::AppClient;

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct CreateUserPoolClientRequest {
    #[validate(length(min = 1))]
    pub user_pool_id: String,
    #[validate(length(min = 1, max = 128))]
    pub client_name: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateUserPoolClientResponse {
    pub user_pool_client: AppClient,
}

pub(super) async fn handle(
    services: Arc<Services>,
    req: CreateUserPoolClientRequest,
) -> Result<CreateUserPoolClientResponse, CognitoError> {
    services.cognito.describe_user_pool(&req.user_pool_id).await?;
    let user_pool_client = services
        .cognito
        .create_app_client(&req.user_pool_id, &req.client_name)
        .await?;
    Ok(CreateUserPoolClientResponse { user_pool_client })
}
