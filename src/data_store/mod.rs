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
//! # Data store
//!
//! A data store is a single named tree of JSON values persisted as
//! `<directory>/<name>.json`. Values are addressed either by a flat key (dots
//! are part of the key) or by a list of segments walking nested objects.
//!
//! Every mutation rewrites the whole file. There is no locking between two
//! store instances opened on the same name: the last write wins. Callers that
//! need several fields to change together must write them with a single
//! [`DataStore::set`] or [`DataStore::set_fields`].
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::sync::Arc;

pub mod codec;
pub mod error;
pub mod file;

pub use error::DataStoreError;
pub use file::{FileDataStore, FileDataStoreFactory};

/// Address of a value inside a store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorePath {
    /// Single top level key, taken literally.
    Key(String),
    /// Nested path, one object level per segment.
    Segments(Vec<String>),
}

impl StorePath {
    /// Segments of the path.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::Key(key) => vec![key.as_str()],
            Self::Segments(segments) => segments.iter().map(String::as_str).collect(),
        }
    }

    /// Name of the addressed field, i.e. the last segment.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Key(key) => Some(key.as_str()),
            Self::Segments(segments) => segments.last().map(String::as_str),
        }
    }
}

impl From<&str> for StorePath {
    fn from(value: &str) -> Self {
        Self::Key(value.to_string())
    }
}

impl From<String> for StorePath {
    fn from(value: String) -> Self {
        Self::Key(value)
    }
}

impl From<Vec<String>> for StorePath {
    fn from(value: Vec<String>) -> Self {
        Self::Segments(value)
    }
}

impl<const N: usize> From<[&str; N]> for StorePath {
    fn from(value: [&str; N]) -> Self {
        Self::Segments(value.iter().map(|s| s.to_string()).collect())
    }
}

/// Path addressed access to a persisted JSON tree.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Get the value under the path. Missing values (and explicit `null`)
    /// are returned as `None`.
    async fn get(&self, path: StorePath) -> Result<Option<Value>, DataStoreError>;

    /// Set the value under the path, creating intermediate objects, and
    /// persist the store.
    async fn set(&self, path: StorePath, value: Value) -> Result<(), DataStoreError>;

    /// Set several top level keys and persist the store once. Nothing is
    /// written when any of the values is rejected.
    async fn set_fields(&self, fields: Map<String, Value>) -> Result<(), DataStoreError>;

    /// Remove the value under the path and persist the store. Missing
    /// intermediate segments make this a no-op.
    async fn delete(&self, path: StorePath) -> Result<(), DataStoreError>;

    /// The whole tree.
    async fn get_root(&self) -> Result<Map<String, Value>, DataStoreError>;
}

/// Typed helpers on top of [`DataStore`].
#[async_trait]
pub trait DataStoreExt: DataStore {
    /// Get the value under the path deserialized into `T`.
    async fn get_as<T, P>(&self, path: P) -> Result<Option<T>, DataStoreError>
    where
        T: DeserializeOwned,
        P: Into<StorePath> + Send,
    {
        self.get(path.into())
            .await?
            .map(serde_json::from_value)
            .transpose()
            .map_err(Into::into)
    }

    /// Serialize `value` and store it under the path.
    async fn set_as<T, P>(&self, path: P, value: &T) -> Result<(), DataStoreError>
    where
        T: Serialize + Sync,
        P: Into<StorePath> + Send,
    {
        self.set(path.into(), serde_json::to_value(value)?).await
    }
}

impl<S: DataStore + ?Sized> DataStoreExt for S {}

/// Opens named stores.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataStoreFactory: Send + Sync {
    /// Open the store `name`. When it does not exist yet it is created and
    /// seeded with `defaults`, otherwise `defaults` are ignored.
    async fn create(
        &self,
        name: &str,
        defaults: Map<String, Value>,
    ) -> Result<Arc<dyn DataStore>, DataStoreError>;

    /// Whether the store `name` has been created.
    async fn exists(&self, name: &str) -> Result<bool, DataStoreError>;

    /// Names of all the existing stores, sorted lexicographically.
    async fn list(&self) -> Result<Vec<String>, DataStoreError>;
}
