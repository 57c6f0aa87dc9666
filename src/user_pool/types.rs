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
//! Records persisted in the user pool and clients stores. Field names follow
//! the emulated API.
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// User pool configuration.
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[builder(setter(strip_option, into))]
#[serde(rename_all = "PascalCase")]
pub struct UserPool {
    /// The ID of the user pool.
    pub id: String,

    /// The name of the user pool.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The ARN of the user pool.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,

    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,

    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<DateTime<Utc>>,

    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mfa_configuration: Option<String>,

    /// Attributes that may be used as the user name at sign up (`email`,
    /// `phone_number`).
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_attributes: Option<Vec<String>>,

    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_verified_attributes: Option<Vec<String>>,

    /// Remaining configuration, kept verbatim.
    #[builder(default)]
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// User account status.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    #[default]
    Unconfirmed,
    Confirmed,
    Archived,
    Compromised,
    Unknown,
    ResetRequired,
    ForceChangePassword,
}

/// Name/value pair of a user attribute.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeType {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl AttributeType {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// User record.
#[derive(Builder, Clone, Debug, Deserialize, PartialEq, Serialize)]
#[builder(setter(into))]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub username: String,

    #[builder(default)]
    #[serde(default)]
    pub password: String,

    #[builder(default)]
    #[serde(default)]
    pub attributes: Vec<AttributeType>,

    #[builder(default = "true")]
    pub enabled: bool,

    #[builder(default)]
    pub user_status: UserStatus,

    pub user_create_date: DateTime<Utc>,

    pub user_last_modified_date: DateTime<Utc>,

    /// Pending sign up or password reset code.
    #[builder(default, setter(strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_code: Option<String>,
}

impl User {
    /// Value of the attribute `name`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        attribute_value(name, &self.attributes)
    }

    /// Set or replace the given attributes, keeping the others.
    pub fn merge_attributes(&mut self, updates: &[AttributeType]) {
        for update in updates {
            match self.attributes.iter_mut().find(|a| a.name == update.name) {
                Some(existing) => existing.value = update.value.clone(),
                None => self.attributes.push(update.clone()),
            }
        }
    }
}

/// Application client registered against a pool.
#[derive(Builder, Clone, Debug, Deserialize, PartialEq, Serialize)]
#[builder(setter(into))]
#[serde(rename_all = "PascalCase")]
pub struct AppClient {
    pub client_id: String,

    pub client_name: String,

    pub user_pool_id: String,

    #[builder(default, setter(strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    #[builder(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub explicit_auth_flows: Vec<String>,

    pub creation_date: DateTime<Utc>,

    pub last_modified_date: DateTime<Utc>,
}

pub fn attribute_value<'a>(name: &str, attributes: &'a [AttributeType]) -> Option<&'a str> {
    attributes
        .iter()
        .find(|attr| attr.name == name)
        .map(|attr| attr.value.as_str())
}

/// Attribute list as the map shape used by trigger events.
pub fn attributes_to_record(attributes: &[AttributeType]) -> HashMap<String, String> {
    attributes
        .iter()
        .map(|attr| (attr.name.clone(), attr.value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_user_serialization() {
        let ts = DateTime::parse_from_rfc3339("2021-05-01T10:00:00.000Z")
            .unwrap()
            .with_timezone(&Utc);
        let user = UserBuilder::default()
            .username("alice")
            .password("Secret123!")
            .attributes(vec![AttributeType::new("email", "alice@example.com")])
            .user_status(UserStatus::ForceChangePassword)
            .user_create_date(ts)
            .user_last_modified_date(ts)
            .build()
            .unwrap();

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["Username"], json!("alice"));
        assert_eq!(value["UserStatus"], json!("FORCE_CHANGE_PASSWORD"));
        assert_eq!(value["Enabled"], json!(true));
        assert_eq!(
            value["Attributes"],
            json!([{"Name": "email", "Value": "alice@example.com"}])
        );
        assert!(value.get("ConfirmationCode").is_none());
        assert_eq!(serde_json::from_value::<User>(value).unwrap(), user);
    }

    #[test]
    fn test_merge_attributes() {
        let ts = Utc::now();
        let mut user = UserBuilder::default()
            .username("bob")
            .attributes(vec![
                AttributeType::new("email", "old@example.com"),
                AttributeType::new("sub", "1"),
            ])
            .user_create_date(ts)
            .user_last_modified_date(ts)
            .build()
            .unwrap();

        user.merge_attributes(&[
            AttributeType::new("email", "new@example.com"),
            AttributeType::new("name", "Bob"),
        ]);

        assert_eq!(user.attribute("email"), Some("new@example.com"));
        assert_eq!(user.attribute("sub"), Some("1"));
        assert_eq!(user.attribute("name"), Some("Bob"));
    }

    #[test]
    fn test_user_pool_keeps_extra() {
        let pool: UserPool = serde_json::from_value(json!({
            "Id": "local_1",
            "MfaConfiguration": "OFF",
            "Policies": {"PasswordPolicy": {"MinimumLength": 8}},
        }))
        .unwrap();
        assert_eq!(pool.mfa_configuration.as_deref(), Some("OFF"));
        assert_eq!(
            pool.extra["Policies"],
            json!({"PasswordPolicy": {"MinimumLength": 8}})
        );
    }
}
