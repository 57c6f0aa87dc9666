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
//! # User pool provider
//!
//! Access to one pool's configuration and users. The pool configuration is
//! the root of the pool store; users live under `Users.<username>`.
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

pub mod types;

use crate::data_store::{DataStore, DataStoreError, DataStoreExt, StorePath};
pub use types::*;

const USERS_KEY: &str = "Users";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserPoolApi: Send + Sync {
    /// Pool configuration.
    async fn get_config(&self) -> Result<UserPool, DataStoreError>;

    /// Replace the pool configuration. Users are left untouched.
    async fn update_config(&self, config: &UserPool) -> Result<(), DataStoreError>;

    /// Find a user by user name. Falls back to the pool's alias attributes
    /// (`UsernameAttributes`) and to the `sub` attribute.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DataStoreError>;

    /// All users of the pool.
    async fn list_users(&self) -> Result<Vec<User>, DataStoreError>;

    /// Create or replace a user.
    async fn save_user(&self, user: &User) -> Result<(), DataStoreError>;

    /// Remove a user.
    async fn delete_user(&self, user: &User) -> Result<(), DataStoreError>;
}

/// Builds pool services on top of pool stores.
#[cfg_attr(test, mockall::automock)]
pub trait UserPoolFactory: Send + Sync {
    fn build(&self, store: Arc<dyn DataStore>) -> Arc<dyn UserPoolApi>;
}

/// Factory of [`UserPoolProvider`].
#[derive(Clone, Debug, Default)]
pub struct UserPoolProviderFactory;

impl UserPoolFactory for UserPoolProviderFactory {
    fn build(&self, store: Arc<dyn DataStore>) -> Arc<dyn UserPoolApi> {
        Arc::new(UserPoolProvider::new(store))
    }
}

/// Top level store fields of the pool configuration, without the users.
pub fn config_record(config: &UserPool) -> Result<Map<String, Value>, DataStoreError> {
    let mut record = match serde_json::to_value(config)? {
        Value::Object(record) => record,
        _ => Map::new(),
    };
    record.shift_remove(USERS_KEY);
    Ok(record)
}

#[derive(Clone)]
pub struct UserPoolProvider {
    store: Arc<dyn DataStore>,
}

impl UserPoolProvider {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    fn user_path(username: &str) -> StorePath {
        [USERS_KEY, username].into()
    }
}

#[async_trait]
impl UserPoolApi for UserPoolProvider {
    async fn get_config(&self) -> Result<UserPool, DataStoreError> {
        let mut root = self.store.get_root().await?;
        root.shift_remove(USERS_KEY);
        Ok(serde_json::from_value(root.into())?)
    }

    #[tracing::instrument(level = "debug", skip(self, config), fields(id = %config.id))]
    async fn update_config(&self, config: &UserPool) -> Result<(), DataStoreError> {
        self.store.set_fields(config_record(config)?).await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DataStoreError> {
        if let Some(user) = self.store.get_as(Self::user_path(username)).await? {
            return Ok(Some(user));
        }

        let aliases = self
            .get_config()
            .await?
            .username_attributes
            .unwrap_or_default();
        Ok(self.list_users().await?.into_iter().find(|user| {
            user.attribute("sub") == Some(username)
                || aliases
                    .iter()
                    .any(|alias| user.attribute(alias) == Some(username))
        }))
    }

    async fn list_users(&self) -> Result<Vec<User>, DataStoreError> {
        let users: Option<Map<String, Value>> =
            self.store.get_as(USERS_KEY).await?;
        users
            .unwrap_or_default()
            .into_iter()
            .map(|(_, user)| serde_json::from_value(user).map_err(Into::into))
            .collect()
    }

    #[tracing::instrument(level = "debug", skip(self, user), fields(username = %user.username))]
    async fn save_user(&self, user: &User) -> Result<(), DataStoreError> {
        self.store
            .set_as(Self::user_path(&user.username), user)
            .await
    }

    #[tracing::instrument(level = "debug", skip(self, user), fields(username = %user.username))]
    async fn delete_user(&self, user: &User) -> Result<(), DataStoreError> {
        self.store.delete(Self::user_path(&user.username)).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;
    use tempfile::TempDir;
    use tracing_test::traced_test;

    use super::*;
    use crate::data_store::FileDataStore;

    async fn provider(dir: &TempDir, defaults: serde_json::Value) -> UserPoolProvider {
        let store = FileDataStore::open(dir.path(), "local_pool", defaults.as_object().cloned().unwrap())
            .await
            .unwrap();
        UserPoolProvider::new(Arc::new(store))
    }

    fn user(username: &str, attributes: Vec<AttributeType>) -> User {
        let now = Utc::now();
        UserBuilder::default()
            .username(username)
            .password("Password1!")
            .attributes(attributes)
            .user_create_date(now)
            .user_last_modified_date(now)
            .build()
            .unwrap()
    }

    #[tokio::test]
    #[traced_test]
    async fn test_save_and_get_user() {
        let dir = TempDir::new().unwrap();
        let pool = provider(&dir, json!({"Id": "local_pool"})).await;
        let alice = user("alice", vec![AttributeType::new("sub", "uuid-1")]);

        pool.save_user(&alice).await.unwrap();

        assert_eq!(pool.get_user_by_username("alice").await.unwrap(), Some(alice.clone()));
        assert_eq!(pool.get_user_by_username("uuid-1").await.unwrap(), Some(alice));
        assert_eq!(pool.get_user_by_username("bob").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_user_by_alias() {
        let dir = TempDir::new().unwrap();
        let pool = provider(
            &dir,
            json!({"Id": "local_pool", "UsernameAttributes": ["email"]}),
        )
        .await;
        let alice = user("alice", vec![AttributeType::new("email", "alice@example.com")]);
        pool.save_user(&alice).await.unwrap();

        assert_eq!(
            pool.get_user_by_username("alice@example.com").await.unwrap(),
            Some(alice)
        );
    }

    #[tokio::test]
    async fn test_config_excludes_users() {
        let dir = TempDir::new().unwrap();
        let pool = provider(&dir, json!({"Id": "local_pool", "MfaConfiguration": "OFF"})).await;
        pool.save_user(&user("alice", vec![])).await.unwrap();

        let config = pool.get_config().await.unwrap();
        assert_eq!(config.id, "local_pool");
        assert_eq!(config.extra, Map::new());
    }

    #[tokio::test]
    async fn test_update_config_keeps_users() {
        let dir = TempDir::new().unwrap();
        let pool = provider(&dir, json!({"Id": "local_pool"})).await;
        let alice = user("alice", vec![]);
        pool.save_user(&alice).await.unwrap();

        let mut config = pool.get_config().await.unwrap();
        config.name = Some("renamed".into());
        pool.update_config(&config).await.unwrap();

        assert_eq!(pool.get_config().await.unwrap().name.as_deref(), Some("renamed"));
        assert_eq!(pool.list_users().await.unwrap(), vec![alice]);
    }

    #[tokio::test]
    async fn test_update_config_single_write() {
        let mut store = crate::data_store::MockDataStore::new();
        store
            .expect_set_fields()
            .withf(|fields| {
                fields["Id"] == "local_pool"
                    && fields["Name"] == "renamed"
                    && !fields.contains_key("Users")
            })
            .times(1)
            .returning(|_| Ok(()));
        let pool = UserPoolProvider::new(Arc::new(store));

        pool.update_config(&UserPool {
            id: "local_pool".into(),
            name: Some("renamed".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_rejected_update_config_leaves_pool_unchanged() {
        let dir = TempDir::new().unwrap();
        let pool = provider(&dir, json!({"Id": "local_pool", "Name": "old"})).await;

        let mut config = pool.get_config().await.unwrap();
        config.name = Some("new".into());
        config.extra.insert("ExpiryDate".into(), json!(5));
        assert!(pool.update_config(&config).await.is_err());

        let config = pool.get_config().await.unwrap();
        assert_eq!(config.name.as_deref(), Some("old"));
        assert!(!config.extra.contains_key("ExpiryDate"));
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let dir = TempDir::new().unwrap();
        let pool = provider(&dir, json!({"Id": "local_pool"})).await;
        let alice = user("alice", vec![]);
        let bob = user("bob", vec![]);
        pool.save_user(&alice).await.unwrap();
        pool.save_user(&bob).await.unwrap();

        pool.delete_user(&alice).await.unwrap();

        assert_eq!(pool.list_users().await.unwrap(), vec![bob]);
    }
}
