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
//! # Messages
//!
//! Composes the messages carrying one time codes and "delivers" them. There
//! is no e-mail or SMS gateway: delivered messages are written to the log.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::error::CognitoError;
use crate::lambda::{CustomMessageSource, Metadata, TriggerName};
use crate::triggers::{CustomMessageParams, TriggersApi};
use crate::user_pool::User;

/// Where a code was sent.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CodeDeliveryDetails {
    pub destination: String,
    pub delivery_medium: String,
    pub attribute_name: String,
}

impl CodeDeliveryDetails {
    fn email(address: &str) -> Self {
        Self {
            destination: address.to_string(),
            delivery_medium: "EMAIL".into(),
            attribute_name: "email".into(),
        }
    }

    fn sms(number: &str) -> Self {
        Self {
            destination: number.to_string(),
            delivery_medium: "SMS".into(),
            attribute_name: "phone_number".into(),
        }
    }
}

/// Pick the channel for a code among `attributes` (the pool's auto verified
/// attributes). A phone number wins over an e-mail address.
pub fn delivery_details(user: &User, attributes: &[String]) -> Option<CodeDeliveryDetails> {
    let wanted = |name: &str| attributes.iter().any(|attr| attr == name);
    if wanted("phone_number") {
        if let Some(number) = user.attribute("phone_number") {
            return Some(CodeDeliveryDetails::sms(number));
        }
    }
    if wanted("email") {
        if let Some(address) = user.attribute("email") {
            return Some(CodeDeliveryDetails::email(address));
        }
    }
    None
}

/// Composed message.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Message {
    pub email_subject: Option<String>,
    pub email_message: Option<String>,
    pub sms_message: Option<String>,
}

impl Message {
    fn default_for(code: &str) -> Self {
        Self {
            email_subject: Some("Your verification code".into()),
            email_message: Some(format!("Your verification code is {code}")),
            sms_message: Some(format!("Your verification code is {code}")),
        }
    }
}

/// A code to send to a user.
#[derive(Clone, Debug, PartialEq)]
pub struct CodeMessage {
    pub source: CustomMessageSource,
    pub client_id: Option<String>,
    pub user_pool_id: String,
    pub user: User,
    pub code: String,
    pub client_metadata: Option<Metadata>,
    pub delivery: CodeDeliveryDetails,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagesApi: Send + Sync {
    /// Compose the message and send it over the delivery channel.
    async fn deliver(&self, message: CodeMessage) -> Result<CodeDeliveryDetails, CognitoError>;
}

#[derive(Clone)]
pub struct MessagesProvider {
    triggers: Arc<dyn TriggersApi>,
}

impl MessagesProvider {
    pub fn new(triggers: Arc<dyn TriggersApi>) -> Self {
        Self { triggers }
    }

    async fn compose(&self, message: &CodeMessage) -> Result<Message, CognitoError> {
        if !self.triggers.enabled(TriggerName::CustomMessage) {
            return Ok(Message::default_for(&message.code));
        }

        let custom = self
            .triggers
            .custom_message(CustomMessageParams {
                source: message.source,
                user_pool_id: message.user_pool_id.clone(),
                client_id: message.client_id.clone(),
                username: message.user.username.clone(),
                code: message.code.clone(),
                user_attributes: message.user.attributes.clone(),
                client_metadata: message.client_metadata.clone(),
            })
            .await?;

        Ok(match custom {
            Some(custom) => {
                let fallback = Message::default_for(&message.code);
                Message {
                    email_subject: custom.email_subject.or(fallback.email_subject),
                    email_message: custom.email_message.or(fallback.email_message),
                    sms_message: custom.sms_message.or(fallback.sms_message),
                }
            }
            None => Message::default_for(&message.code),
        })
    }
}

#[async_trait]
impl MessagesApi for MessagesProvider {
    #[tracing::instrument(level = "debug", skip(self, message), fields(username = %message.user.username))]
    async fn deliver(&self, message: CodeMessage) -> Result<CodeDeliveryDetails, CognitoError> {
        let composed = self.compose(&message).await?;
        let body = match message.delivery.delivery_medium.as_str() {
            "SMS" => composed.sms_message.as_deref(),
            _ => composed.email_message.as_deref(),
        };
        info!(
            username = %message.user.username,
            medium = %message.delivery.delivery_medium,
            destination = %message.delivery.destination,
            code = %message.code,
            subject = composed.email_subject.as_deref().unwrap_or_default(),
            "delivering message: {}",
            body.unwrap_or_default()
        );
        Ok(message.delivery)
    }
}
