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
//! `CreateUserPool`.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use validator::Validate;

use crate::cognito::generate_id;
use crate::error::CognitoError;
use crate::services::Services;
use crate::user_pool::{UserPool, UserPoolBuilder};

const POOL_ID_PREFIX: &str = "local_";
/// Pool settings assigned by the service.
const RESERVED_KEYS: [&str; 6] = [
    "Arn",
    "CreationDate",
    "Id",
    "LastModifiedDate",
    "Name",
    "Users",
];

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct CreateUserPoolRequest {
    #[validate(length(min = 1, max = 128))]
    pub pool_name: String,
    #[serde(default)]
    pub mfa_configuration: Option<String>,
    #[serde(default)]
    pub username_attributes: Option<Vec<String>>,
    #[serde(default)]
    pub auto_verified_attributes: Option<Vec<String>>,
    /// Other pool settings, stored as given.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateUserPoolResponse {
    pub user_pool: UserPool,
}

#[tracing::instrument(level = "debug", skip(services, req), fields(name = %req.pool_name))]
pub(super) async fn handle(
    services: Arc<Services>,
    req: CreateUserPoolRequest,
) -> Result<CreateUserPoolResponse, CognitoError> {
    if let Some(key) = RESERVED_KEYS.iter().find(|key| req.extra.contains_key(**key)) {
        return Err(CognitoError::InvalidParameter(format!(
            "{key} cannot be set on a new user pool"
        )));
    }

    let mut builder = UserPoolBuilder::default();
    builder
        .id(format!("{POOL_ID_PREFIX}{}", generate_id(8)))
        .name(req.pool_name)
        .extra(req.extra);
    if let Some(mfa) = req.mfa_configuration {
        builder.mfa_configuration(mfa);
    }
    if let Some(attributes) = req.username_attributes {
        builder.username_attributes(attributes);
    }
    if let Some(attributes) = req.auto_verified_attributes {
        builder.auto_verified_attributes(attributes);
    }

    let user_pool = services.cognito.create_user_pool(builder.build()?).await?;
    Ok(CreateUserPoolResponse { user_pool })
}
