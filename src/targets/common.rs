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
//! Pieces shared by several operations.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::CognitoError;
use crate::services::Services;
use crate::user_pool::{AttributeType, User, UserPool, UserPoolApi, UserStatus};

/// User as returned by the user listing operations.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserType {
    pub username: String,
    pub attributes: Vec<AttributeType>,
    pub enabled: bool,
    pub user_status: UserStatus,
    pub user_create_date: DateTime<Utc>,
    pub user_last_modified_date: DateTime<Utc>,
}

impl From<User> for UserType {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            attributes: user.attributes,
            enabled: user.enabled,
            user_status: user.user_status,
            user_create_date: user.user_create_date,
            user_last_modified_date: user.user_last_modified_date,
        }
    }
}

/// Pool the client belongs to.
pub(super) async fn pool_for_client(
    services: &Services,
    client_id: &str,
) -> Result<Arc<dyn UserPoolApi>, CognitoError> {
    services
        .cognito
        .get_user_pool_for_client_id(client_id)
        .await?
        .ok_or(CognitoError::ResourceNotFound)
}

/// Attributes a code may be sent to. Pools without auto verified attributes
/// send codes by e-mail.
pub(super) fn code_channels(config: &UserPool) -> Vec<String> {
    config
        .auto_verified_attributes
        .clone()
        .filter(|attributes| !attributes.is_empty())
        .unwrap_or_else(|| vec!["email".to_string()])
}

/// Add a generated `sub` unless the attributes carry one.
pub(super) fn with_sub(mut attributes: Vec<AttributeType>) -> Vec<AttributeType> {
    if !attributes.iter().any(|attr| attr.name == "sub") {
        attributes.insert(0, AttributeType::new("sub", Uuid::new_v4().to_string()));
    }
    attributes
}

/// Reject passwords shorter than the pool's minimum length.
pub(super) fn check_password(config: &UserPool, password: &str) -> Result<(), CognitoError> {
    let minimum = config
        .extra
        .get("Policies")
        .and_then(|policies| policies.pointer("/PasswordPolicy/MinimumLength"))
        .and_then(|length| length.as_u64())
        .unwrap_or(0);
    if (password.chars().count() as u64) < minimum {
        return Err(CognitoError::InvalidPassword(
            "Password did not conform with policy: Password not long enough".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_code_channels() {
        let mut config = UserPool::default();
        assert_eq!(code_channels(&config), vec!["email"]);
        config.auto_verified_attributes = Some(vec!["phone_number".into()]);
        assert_eq!(code_channels(&config), vec!["phone_number"]);
    }

    #[test]
    fn test_with_sub() {
        let attributes = with_sub(vec![AttributeType::new("email", "a@example.com")]);
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].name, "sub");

        let attributes = with_sub(vec![AttributeType::new("sub", "fixed")]);
        assert_eq!(attributes, vec![AttributeType::new("sub", "fixed")]);
    }

    #[test]
    fn test_check_password() {
        let config: UserPool = serde_json::from_value(json!({
            "Id": "p1",
            "Policies": {"PasswordPolicy": {"MinimumLength": 8}},
        }))
        .unwrap();
        assert!(check_password(&config, "Password1!").is_ok());
        assert!(matches!(
            check_password(&config, "short"),
            Err(CognitoError::InvalidPassword(_))
        ));
        assert!(check_password(&UserPool::default(), "x").is_ok());
    }
}
