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
//! Test the file backed stores through the factory.

use chrono::{DateTime, TimeZone, Utc};
use eyre::Report;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tracing_test::traced_test;

use cognito_local::data_store::{DataStore, DataStoreExt, DataStoreFactory, FileDataStoreFactory};

fn defaults(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[tokio::test]
#[traced_test]
async fn test_factory_creates_directory() -> Result<(), Report> {
    let dir = TempDir::new()?;
    let nested = dir.path().join("a").join("b");
    let factory = FileDataStoreFactory::new(&nested).await?;

    assert!(!factory.exists("example").await?);
    factory.create("example", Map::new()).await?;
    assert!(factory.exists("example").await?);
    assert!(nested.join("example.json").is_file());
    assert_eq!(factory.list().await?, vec!["example".to_string()]);
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_values_survive_reopen() -> Result<(), Report> {
    let dir = TempDir::new()?;
    let factory = FileDataStoreFactory::new(dir.path()).await?;
    let created: DateTime<Utc> = Utc.with_ymd_and_hms(2021, 5, 1, 10, 0, 0).unwrap();

    let store = factory
        .create("example", defaults(json!({"DefaultValue": true})))
        .await?;
    store
        .set_as(["Users", "janice", "UserCreateDate"], &created)
        .await?;
    store.set("a.b".into(), json!("flat")).await?;
    drop(store);

    let store = factory.create("example", Map::new()).await?;
    assert_eq!(
        store
            .get_as::<DateTime<Utc>, _>(["Users", "janice", "UserCreateDate"])
            .await?,
        Some(created)
    );
    assert_eq!(
        store.get_root().await?,
        defaults(json!({
            "DefaultValue": true,
            "Users": {"janice": {"UserCreateDate": "2021-05-01T10:00:00Z"}},
            "a.b": "flat",
        }))
    );
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_rejects_non_date_timestamp() -> Result<(), Report> {
    let dir = TempDir::new()?;
    let factory = FileDataStoreFactory::new(dir.path()).await?;
    let store = factory.create("example", Map::new()).await?;

    let err = store
        .set(["CreationDate"].into(), json!(1))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Serialize: Expected CreationDate field to contain a Date, received a number"
    );
    assert_eq!(store.get("CreationDate".into()).await?, None);
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_concurrent_writes_are_all_kept() -> Result<(), Report> {
    let dir = TempDir::new()?;
    let factory = FileDataStoreFactory::new(dir.path()).await?;
    let store: Arc<dyn DataStore> = factory.create("example", Map::new()).await?;

    let writes = (0..20).map(|i| {
        let store = store.clone();
        async move { store.set(["Keys", &i.to_string()].into(), json!(i)).await }
    });
    for result in futures::future::join_all(writes).await {
        result?;
    }

    let store = factory.create("example", Map::new()).await?;
    let keys = store.get("Keys".into()).await?.unwrap_or_default();
    assert_eq!(keys.as_object().map(Map::len), Some(20));
    Ok(())
}
