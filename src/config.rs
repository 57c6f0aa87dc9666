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
//! # Configuration
//!
//! Optional JSON file read through the `config` crate. Every option has a
//! default so that the emulator starts without any file.
use config::{File, FileFormat};
use eyre::{Report, WrapErr};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use url::Url;

use crate::lambda::TriggerName;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Listener.
    pub server: ServerSection,

    /// Where the stores are persisted.
    pub storage: StorageSection,

    /// Function invocation transport.
    pub lambda_client: LambdaClientSection,

    /// Functions bound to triggers.
    #[serde(default)]
    pub trigger_functions: TriggerFunctions,

    /// Overrides applied to every newly created pool.
    #[serde(default)]
    pub user_pool_defaults: UserPoolDefaults,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSection {
    pub hostname: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSection {
    pub data_directory: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LambdaClientSection {
    /// Base URL of the Lambda compatible endpoint.
    pub endpoint: Url,
    /// Region tag placed into the trigger events.
    pub region: String,
}

/// Function names per trigger. A trigger without a function is disabled.
#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
pub struct TriggerFunctions {
    pub custom_message: Option<String>,
    pub post_authentication: Option<String>,
    pub post_confirmation: Option<String>,
    pub pre_sign_up: Option<String>,
    pub user_migration: Option<String>,
}

impl TriggerFunctions {
    pub fn function_name(&self, trigger: TriggerName) -> Option<&str> {
        match trigger {
            TriggerName::CustomMessage => self.custom_message.as_deref(),
            TriggerName::PostAuthentication => self.post_authentication.as_deref(),
            TriggerName::PostConfirmation => self.post_confirmation.as_deref(),
            TriggerName::PreSignUp => self.pre_sign_up.as_deref(),
            TriggerName::UserMigration => self.user_migration.as_deref(),
        }
        .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
pub struct UserPoolDefaults {
    pub username_attributes: Option<Vec<String>>,
    pub auto_verified_attributes: Option<Vec<String>>,
    pub mfa_configuration: Option<String>,
}

impl UserPoolDefaults {
    /// The overrides as pool record fields.
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        if let Some(attributes) = &self.username_attributes {
            record.insert("UsernameAttributes".into(), attributes.clone().into());
        }
        if let Some(attributes) = &self.auto_verified_attributes {
            record.insert("AutoVerifiedAttributes".into(), attributes.clone().into());
        }
        if let Some(mfa) = &self.mfa_configuration {
            record.insert("MfaConfiguration".into(), mfa.clone().into());
        }
        record
    }
}

impl Config {
    pub fn new(path: Option<PathBuf>) -> Result<Self, Report> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !Path::new(&path).is_file() {
                return Err(eyre::eyre!(
                    "configuration file {} does not exist",
                    path.display()
                ));
            }
            builder = builder.add_source(File::from(path).format(FileFormat::Json));
        }

        builder.try_into()
    }
}

impl TryFrom<config::ConfigBuilder<config::builder::DefaultState>> for Config {
    type Error = Report;
    fn try_from(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, Self::Error> {
        let mut builder = builder;
        builder = builder
            .set_default("server.hostname", "localhost")?
            .set_default("server.port", 9229)?
            .set_default("storage.data_directory", ".cognito/db")?
            .set_default("lambda_client.endpoint", "http://localhost:3002")?
            .set_default("lambda_client.region", "local")?;

        builder
            .build()
            .wrap_err("Failed to read configuration file")?
            .try_deserialize()
            .wrap_err("Failed to parse configuration file")
    }
}
