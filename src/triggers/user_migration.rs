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
//! User migration trigger. Imports a user from a legacy directory when it
//! signs in with credentials the pool does not know.
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::clock::Clock;
use crate::cognito::CognitoApi;
use crate::error::CognitoError;
use crate::lambda::{LambdaApi, LambdaError, Metadata, TriggerEvent, UserMigrationEvent};
use crate::triggers::invoke_trigger;
use crate::user_pool::{AttributeType, User, UserBuilder, UserStatus, attributes_to_record};

#[derive(Clone, Debug, PartialEq)]
pub struct UserMigrationParams {
    pub user_pool_id: String,
    pub client_id: String,
    pub username: String,
    pub password: String,
    pub user_attributes: Vec<AttributeType>,
    pub client_metadata: Option<Metadata>,
    pub validation_data: Option<Metadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserMigrationResponse {
    #[serde(default)]
    user_attributes: Option<HashMap<String, String>>,
    #[serde(default)]
    final_user_status: Option<String>,
}

#[tracing::instrument(level = "debug", skip(lambda, cognito, clock, params), fields(username = %params.username))]
pub(crate) async fn invoke(
    lambda: &dyn LambdaApi,
    cognito: &dyn CognitoApi,
    clock: &dyn Clock,
    params: UserMigrationParams,
) -> Result<User, CognitoError> {
    let pool = cognito
        .get_user_pool_for_client_id(&params.client_id)
        .await?
        .ok_or(CognitoError::ResourceNotFound)?;

    let event = TriggerEvent::UserMigration(UserMigrationEvent {
        client_id: params.client_id,
        user_pool_id: params.user_pool_id,
        username: params.username.clone(),
        user_attributes: attributes_to_record(&params.user_attributes),
        client_metadata: params.client_metadata,
        validation_data: params.validation_data,
        password: params.password.clone(),
    });
    let response: UserMigrationResponse = invoke_trigger(lambda, event)
        .await?
        .ok_or(LambdaError::InvalidResponse)?;

    let mut attributes: Vec<AttributeType> = response
        .user_attributes
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| AttributeType::new(name, value))
        .collect();
    attributes.sort_by(|a, b| a.name.cmp(&b.name));
    if !attributes.iter().any(|attr| attr.name == "sub") {
        attributes.push(AttributeType::new("sub", Uuid::new_v4().to_string()));
    }

    let status = match response.final_user_status.as_deref() {
        Some("CONFIRMED") => UserStatus::Confirmed,
        _ => UserStatus::ResetRequired,
    };
    let now = clock.now();
    let user = UserBuilder::default()
        .username(params.username)
        .password(params.password)
        .attributes(attributes)
        .user_status(status)
        .user_create_date(now)
        .user_last_modified_date(now)
        .build()?;

    pool.save_user(&user).await?;
    info!("migrated user {}", user.username);
    Ok(user)
}
