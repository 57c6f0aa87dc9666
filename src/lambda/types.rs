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
//! Trigger events and the envelope sent to the functions.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Version tag sent as `callerContext.awsSdkVersion`.
pub const CALLER_SDK_VERSION: &str = concat!("cognito-local/", env!("CARGO_PKG_VERSION"));

/// Envelope version.
pub const EVENT_VERSION: u32 = 0;

/// Client id sent for operations not made on behalf of a client.
pub const CLIENT_ID_NOT_APPLICABLE: &str = "CLIENT_ID_NOT_APPLICABLE";

/// Trigger a function can be bound to.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum TriggerName {
    CustomMessage,
    PostAuthentication,
    PostConfirmation,
    PreSignUp,
    UserMigration,
}

impl TriggerName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomMessage => "CustomMessage",
            Self::PostAuthentication => "PostAuthentication",
            Self::PostConfirmation => "PostConfirmation",
            Self::PreSignUp => "PreSignUp",
            Self::UserMigration => "UserMigration",
        }
    }
}

impl fmt::Display for TriggerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CustomMessageSource {
    AdminCreateUser,
    Authentication,
    ForgotPassword,
    ResendCode,
    SignUp,
    UpdateUserAttribute,
    VerifyUserAttribute,
}

impl CustomMessageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdminCreateUser => "CustomMessage_AdminCreateUser",
            Self::Authentication => "CustomMessage_Authentication",
            Self::ForgotPassword => "CustomMessage_ForgotPassword",
            Self::ResendCode => "CustomMessage_ResendCode",
            Self::SignUp => "CustomMessage_SignUp",
            Self::UpdateUserAttribute => "CustomMessage_UpdateUserAttribute",
            Self::VerifyUserAttribute => "CustomMessage_VerifyUserAttribute",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PostConfirmationSource {
    ConfirmSignUp,
    ConfirmForgotPassword,
}

impl PostConfirmationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfirmSignUp => "PostConfirmation_ConfirmSignUp",
            Self::ConfirmForgotPassword => "PostConfirmation_ConfirmForgotPassword",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PreSignUpSource {
    AdminCreateUser,
    ExternalProvider,
    SignUp,
}

impl PreSignUpSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdminCreateUser => "PreSignUp_AdminCreateUser",
            Self::ExternalProvider => "PreSignUp_ExternalProvider",
            Self::SignUp => "PreSignUp_SignUp",
        }
    }
}

pub const POST_AUTHENTICATION_SOURCE: &str = "PostAuthentication_Authentication";
pub const USER_MIGRATION_SOURCE: &str = "UserMigration_Authentication";

pub type Metadata = HashMap<String, String>;

#[derive(Clone, Debug, PartialEq)]
pub struct CustomMessageEvent {
    pub source: CustomMessageSource,
    pub client_id: String,
    pub user_pool_id: String,
    pub username: String,
    pub user_attributes: HashMap<String, String>,
    pub client_metadata: Option<Metadata>,
    pub code_parameter: String,
    pub username_parameter: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PostAuthenticationEvent {
    pub client_id: String,
    pub user_pool_id: String,
    pub username: String,
    pub user_attributes: HashMap<String, String>,
    pub client_metadata: Option<Metadata>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PostConfirmationEvent {
    pub source: PostConfirmationSource,
    pub client_id: String,
    pub user_pool_id: String,
    pub username: String,
    pub user_attributes: HashMap<String, String>,
    pub client_metadata: Option<Metadata>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PreSignUpEvent {
    pub source: PreSignUpSource,
    pub client_id: String,
    pub user_pool_id: String,
    pub username: String,
    pub user_attributes: HashMap<String, String>,
    pub client_metadata: Option<Metadata>,
    pub validation_data: Option<Metadata>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UserMigrationEvent {
    pub client_id: String,
    pub user_pool_id: String,
    pub username: String,
    pub user_attributes: HashMap<String, String>,
    pub client_metadata: Option<Metadata>,
    pub validation_data: Option<Metadata>,
    pub password: String,
}

/// One invocation of a trigger. Every variant carries exactly the fields its
/// trigger sources send.
#[derive(Clone, Debug, PartialEq)]
pub enum TriggerEvent {
    CustomMessage(CustomMessageEvent),
    PostAuthentication(PostAuthenticationEvent),
    PostConfirmation(PostConfirmationEvent),
    PreSignUp(PreSignUpEvent),
    UserMigration(UserMigrationEvent),
}

impl TriggerEvent {
    pub fn trigger(&self) -> TriggerName {
        match self {
            Self::CustomMessage(_) => TriggerName::CustomMessage,
            Self::PostAuthentication(_) => TriggerName::PostAuthentication,
            Self::PostConfirmation(_) => TriggerName::PostConfirmation,
            Self::PreSignUp(_) => TriggerName::PreSignUp,
            Self::UserMigration(_) => TriggerName::UserMigration,
        }
    }

    pub fn trigger_source(&self) -> &'static str {
        match self {
            Self::CustomMessage(event) => event.source.as_str(),
            Self::PostAuthentication(_) => POST_AUTHENTICATION_SOURCE,
            Self::PostConfirmation(event) => event.source.as_str(),
            Self::PreSignUp(event) => event.source.as_str(),
            Self::UserMigration(_) => USER_MIGRATION_SOURCE,
        }
    }

    /// Build the envelope sent to the function.
    pub fn into_envelope(self, region: &str) -> TriggerEnvelope {
        let trigger_source = self.trigger_source().to_string();
        let (client_id, user_pool_id, user_name, request) = match self {
            Self::CustomMessage(event) => (
                event.client_id,
                event.user_pool_id,
                event.username,
                TriggerRequest {
                    user_attributes: event.user_attributes,
                    client_metadata: event.client_metadata,
                    code_parameter: Some(event.code_parameter),
                    username_parameter: Some(event.username_parameter),
                    ..Default::default()
                },
            ),
            Self::PostAuthentication(event) => (
                event.client_id,
                event.user_pool_id,
                event.username,
                TriggerRequest {
                    user_attributes: event.user_attributes,
                    client_metadata: event.client_metadata,
                    ..Default::default()
                },
            ),
            Self::PostConfirmation(event) => (
                event.client_id,
                event.user_pool_id,
                event.username,
                TriggerRequest {
                    user_attributes: event.user_attributes,
                    client_metadata: event.client_metadata,
                    ..Default::default()
                },
            ),
            Self::PreSignUp(event) => (
                event.client_id,
                event.user_pool_id,
                event.username,
                TriggerRequest {
                    user_attributes: event.user_attributes,
                    client_metadata: event.client_metadata,
                    validation_data: event.validation_data,
                    ..Default::default()
                },
            ),
            Self::UserMigration(event) => (
                event.client_id,
                event.user_pool_id,
                event.username,
                TriggerRequest {
                    user_attributes: event.user_attributes,
                    client_metadata: event.client_metadata,
                    validation_data: event.validation_data,
                    password: Some(event.password),
                    ..Default::default()
                },
            ),
        };

        TriggerEnvelope {
            version: EVENT_VERSION,
            caller_context: CallerContext {
                aws_sdk_version: CALLER_SDK_VERSION.to_string(),
                client_id,
            },
            region: region.to_string(),
            user_pool_id,
            trigger_source,
            user_name,
            request,
            response: Map::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerContext {
    pub aws_sdk_version: String,
    pub client_id: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerRequest {
    #[serde(default)]
    pub user_attributes: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_data: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_parameter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_parameter: Option<String>,
}

/// Event object exchanged with the function.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerEnvelope {
    pub version: u32,
    pub caller_context: CallerContext,
    pub region: String,
    pub user_pool_id: String,
    pub trigger_source: String,
    pub user_name: String,
    pub request: TriggerRequest,
    pub response: Map<String, Value>,
}

/// The part of the returned envelope that is consumed.
#[derive(Debug, Deserialize)]
pub(crate) struct TriggerReply {
    #[serde(default)]
    pub response: Value,
}
