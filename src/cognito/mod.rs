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
//! # User pool registry
//!
//! Maps pool ids onto pool stores. A pool store is created on first access,
//! seeded with the service defaults and the pool `Id`. Application clients of
//! all pools live in the shared `clients` store.
use async_trait::async_trait;
use rand::Rng;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::clock::Clock;
use crate::data_store::{DataStore, DataStoreExt, DataStoreFactory};
use crate::error::CognitoError;
use crate::user_pool::{
    AppClient, AppClientBuilder, UserPool, UserPoolApi, UserPoolFactory, config_record,
};

/// Name of the store holding the application clients.
pub const CLIENTS_STORE: &str = "clients";

const CLIENTS_KEY: &str = "Clients";
const CLIENT_ID_LENGTH: usize = 26;
const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Configuration every pool starts with.
pub static USER_POOL_AWS_DEFAULTS: LazyLock<Map<String, Value>> = LazyLock::new(|| {
    let defaults = json!({
        "Policies": {
            "PasswordPolicy": {
                "MinimumLength": 8,
                "RequireUppercase": true,
                "RequireLowercase": true,
                "RequireNumbers": true,
                "RequireSymbols": true,
                "TemporaryPasswordValidityDays": 7,
            },
        },
        "LambdaConfig": {},
        "MfaConfiguration": "OFF",
        "EstimatedNumberOfUsers": 0,
        "EmailConfiguration": {"EmailSendingAccount": "COGNITO_DEFAULT"},
        "AdminCreateUserConfig": {
            "AllowAdminCreateUserOnly": false,
            "UnusedAccountValidityDays": 7,
        },
        "UsernameConfiguration": {"CaseSensitive": false},
        "AccountRecoverySetting": {
            "RecoveryMechanisms": [
                {"Priority": 1, "Name": "verified_email"},
                {"Priority": 2, "Name": "verified_phone_number"},
            ],
        },
    });
    match defaults {
        Value::Object(defaults) => defaults,
        _ => Map::new(),
    }
});

/// Random identifier made of lowercase letters and digits.
pub(crate) fn generate_id(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CognitoApi: Send + Sync {
    /// Pool service of `user_pool_id`, creating the pool when it does not
    /// exist yet.
    async fn get_user_pool(&self, user_pool_id: &str)
    -> Result<Arc<dyn UserPoolApi>, CognitoError>;

    /// Configuration of an existing pool.
    async fn describe_user_pool(&self, user_pool_id: &str) -> Result<UserPool, CognitoError>;

    /// Configuration of every pool, ordered by id.
    async fn list_user_pools(&self) -> Result<Vec<UserPool>, CognitoError>;

    /// Pool service of the pool the client belongs to.
    async fn get_user_pool_for_client_id(
        &self,
        client_id: &str,
    ) -> Result<Option<Arc<dyn UserPoolApi>>, CognitoError>;

    async fn get_app_client(&self, client_id: &str) -> Result<Option<AppClient>, CognitoError>;

    /// Register a new client against a pool.
    async fn create_app_client(
        &self,
        user_pool_id: &str,
        client_name: &str,
    ) -> Result<AppClient, CognitoError>;

    /// Create a pool from the given configuration.
    async fn create_user_pool(&self, user_pool: UserPool) -> Result<UserPool, CognitoError>;
}

type PoolCell = Arc<OnceCell<Arc<dyn UserPoolApi>>>;

pub struct CognitoProvider {
    store_factory: Arc<dyn DataStoreFactory>,
    clients: Arc<dyn DataStore>,
    pool_defaults: Map<String, Value>,
    clock: Arc<dyn Clock>,
    pool_factory: Arc<dyn UserPoolFactory>,
    pools: Mutex<HashMap<String, PoolCell>>,
}

impl CognitoProvider {
    /// Create the registry. The `clients` store is opened immediately.
    /// `pool_overrides` are merged over [`USER_POOL_AWS_DEFAULTS`].
    pub async fn new(
        store_factory: Arc<dyn DataStoreFactory>,
        pool_overrides: Map<String, Value>,
        clock: Arc<dyn Clock>,
        pool_factory: Arc<dyn UserPoolFactory>,
    ) -> Result<Self, CognitoError> {
        let clients = store_factory.create(CLIENTS_STORE, Map::new()).await?;
        let mut pool_defaults = USER_POOL_AWS_DEFAULTS.clone();
        pool_defaults.extend(pool_overrides);

        Ok(Self {
            store_factory,
            clients,
            pool_defaults,
            clock,
            pool_factory,
            pools: Mutex::new(HashMap::new()),
        })
    }

    fn pool_seed(&self, user_pool_id: &str) -> Map<String, Value> {
        let mut seed = self.pool_defaults.clone();
        seed.insert("Id".into(), user_pool_id.into());
        seed
    }

    /// Cached pool service. A missing pool store is created from `seed`.
    async fn load_user_pool(
        &self,
        user_pool_id: &str,
        seed: Map<String, Value>,
    ) -> Result<Arc<dyn UserPoolApi>, CognitoError> {
        if user_pool_id == CLIENTS_STORE {
            return Err(CognitoError::ResourceNotFound);
        }
        let cell = self
            .pools
            .lock()
            .await
            .entry(user_pool_id.to_string())
            .or_default()
            .clone();

        let pool = cell
            .get_or_try_init(|| async {
                debug!("loading user pool {user_pool_id}");
                let store = self.store_factory.create(user_pool_id, seed).await?;
                Ok::<_, CognitoError>(self.pool_factory.build(store))
            })
            .await?;
        Ok(pool.clone())
    }
}

#[async_trait]
impl CognitoApi for CognitoProvider {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_user_pool(
        &self,
        user_pool_id: &str,
    ) -> Result<Arc<dyn UserPoolApi>, CognitoError> {
        self.load_user_pool(user_pool_id, self.pool_seed(user_pool_id))
            .await
    }

    async fn describe_user_pool(&self, user_pool_id: &str) -> Result<UserPool, CognitoError> {
        if user_pool_id == CLIENTS_STORE || !self.store_factory.exists(user_pool_id).await? {
            return Err(CognitoError::ResourceNotFound);
        }
        Ok(self.get_user_pool(user_pool_id).await?.get_config().await?)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn list_user_pools(&self) -> Result<Vec<UserPool>, CognitoError> {
        let mut pools = Vec::new();
        for name in self.store_factory.list().await? {
            if name == CLIENTS_STORE {
                continue;
            }
            pools.push(self.get_user_pool(&name).await?.get_config().await?);
        }
        Ok(pools)
    }

    async fn get_user_pool_for_client_id(
        &self,
        client_id: &str,
    ) -> Result<Option<Arc<dyn UserPoolApi>>, CognitoError> {
        match self.get_app_client(client_id).await? {
            Some(client) => Ok(Some(self.get_user_pool(&client.user_pool_id).await?)),
            None => Ok(None),
        }
    }

    async fn get_app_client(&self, client_id: &str) -> Result<Option<AppClient>, CognitoError> {
        Ok(self.clients.get_as([CLIENTS_KEY, client_id]).await?)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn create_app_client(
        &self,
        user_pool_id: &str,
        client_name: &str,
    ) -> Result<AppClient, CognitoError> {
        let now = self.clock.now();
        let client = AppClientBuilder::default()
            .client_id(generate_id(CLIENT_ID_LENGTH))
            .client_name(client_name)
            .user_pool_id(user_pool_id)
            .creation_date(now)
            .last_modified_date(now)
            .build()?;

        self.clients
            .set_as([CLIENTS_KEY, client.client_id.as_str()], &client)
            .await?;
        Ok(client)
    }

    #[tracing::instrument(level = "debug", skip(self, user_pool), fields(id = %user_pool.id))]
    async fn create_user_pool(&self, mut user_pool: UserPool) -> Result<UserPool, CognitoError> {
        let now = self.clock.now();
        user_pool.creation_date = Some(now);
        user_pool.last_modified_date = Some(now);

        let mut seed = self.pool_seed(&user_pool.id);
        seed.extend(config_record(&user_pool)?);
        let existed = self.store_factory.exists(&user_pool.id).await?;
        let pool = self.load_user_pool(&user_pool.id, seed).await?;
        if existed {
            pool.update_config(&user_pool).await?;
        }
        Ok(pool.get_config().await?)
    }
}
