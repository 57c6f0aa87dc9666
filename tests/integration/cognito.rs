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
//! Test the user pool registry on disk.

use eyre::Report;
use serde_json::{Map, Value};
use tempfile::TempDir;
use tracing_test::traced_test;

use super::common::get_cognito;
use cognito_local::cognito::{CognitoApi, USER_POOL_AWS_DEFAULTS};
use cognito_local::user_pool::UserPoolBuilder;

fn pool_record(id: &str) -> Value {
    let mut record: Map<String, Value> = USER_POOL_AWS_DEFAULTS.clone();
    record.insert("Id".into(), id.into());
    Value::Object(record)
}

#[tokio::test]
#[traced_test]
async fn test_creates_clients_store() -> Result<(), Report> {
    let dir = TempDir::new()?;
    get_cognito(&dir).await?;

    assert!(dir.path().join("clients.json").is_file());
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_creates_user_pool_store() -> Result<(), Report> {
    let dir = TempDir::new()?;
    let cognito = get_cognito(&dir).await?;

    cognito.get_user_pool("test-pool").await?;

    assert!(dir.path().join("test-pool.json").is_file());
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_lists_user_pools() -> Result<(), Report> {
    let dir = TempDir::new()?;
    let cognito = get_cognito(&dir).await?;

    for id in ["test-pool-2", "test-pool-1", "test-pool-3"] {
        cognito.get_user_pool(id).await?;
        assert!(dir.path().join(format!("{id}.json")).is_file());
    }

    let pools = cognito
        .list_user_pools()
        .await?
        .into_iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(
        pools,
        vec![
            pool_record("test-pool-1"),
            pool_record("test-pool-2"),
            pool_record("test-pool-3"),
        ]
    );
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_state_survives_reopen() -> Result<(), Report> {
    let dir = TempDir::new()?;
    let client = {
        let cognito = get_cognito(&dir).await?;
        cognito
            .create_user_pool(UserPoolBuilder::default().id("local_pool").name("pool").build()?)
            .await?;
        cognito.create_app_client("local_pool", "web").await?
    };

    let cognito = get_cognito(&dir).await?;
    let pool = cognito.describe_user_pool("local_pool").await?;
    assert_eq!(pool.name.as_deref(), Some("pool"));
    assert!(pool.creation_date.is_some());
    assert_eq!(
        cognito.get_app_client(&client.client_id).await?,
        Some(client.clone())
    );
    assert!(
        cognito
            .get_user_pool_for_client_id(&client.client_id)
            .await?
            .is_some()
    );
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_describe_does_not_create() -> Result<(), Report> {
    let dir = TempDir::new()?;
    let cognito = get_cognito(&dir).await?;

    assert!(cognito.describe_user_pool("missing").await.is_err());
    assert!(!dir.path().join("missing.json").exists());
    Ok(())
}
