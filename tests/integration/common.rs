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
//! Helpers shared by the integration tests.

use eyre::Report;
use std::sync::Arc;
use tempfile::TempDir;

use cognito_local::clock::SystemClock;
use cognito_local::cognito::CognitoProvider;
use cognito_local::config::Config;
use cognito_local::data_store::FileDataStoreFactory;
use cognito_local::services::Services;
use cognito_local::user_pool::UserPoolProviderFactory;

/// Registry over the files in `dir`.
pub async fn get_cognito(dir: &TempDir) -> Result<CognitoProvider, Report> {
    let factory = FileDataStoreFactory::new(dir.path()).await?;
    Ok(CognitoProvider::new(
        Arc::new(factory),
        Default::default(),
        Arc::new(SystemClock),
        Arc::new(UserPoolProviderFactory),
    )
    .await?)
}

/// Services configured the way the binary configures them, storing in `dir`.
pub async fn get_services(dir: &TempDir) -> Result<Arc<Services>, Report> {
    let config_path = dir.path().join("config.json");
    std::fs::write(
        &config_path,
        serde_json::to_vec(&serde_json::json!({
            "storage": {"data_directory": dir.path().join("db")},
        }))?,
    )?;
    let config = Config::new(Some(config_path))?;
    Ok(Arc::new(Services::from_config(&config).await?))
}
