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
//! File backed data store.
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::data_store::codec::TimestampFields;
use crate::data_store::{DataStore, DataStoreError, DataStoreFactory, StorePath};

const STORE_EXTENSION: &str = "json";

/// Store persisted as a single JSON document.
#[derive(Debug)]
pub struct FileDataStore {
    path: PathBuf,
    timestamps: TimestampFields,
    root: Mutex<Map<String, Value>>,
}

impl FileDataStore {
    /// Open the store `name` in `directory`, creating the file from
    /// `defaults` when it does not exist.
    #[tracing::instrument(level = "debug", skip(defaults))]
    pub async fn open(
        directory: &Path,
        name: &str,
        defaults: Map<String, Value>,
    ) -> Result<Self, DataStoreError> {
        let path = store_path(directory, name)?;
        let timestamps = TimestampFields::from_defaults(&defaults);

        let root = match fs::read(&path).await {
            Ok(content) => {
                let value: Value = serde_json::from_slice(&content)
                    .map_err(|source| DataStoreError::Corrupt {
                        path: path.clone(),
                        source,
                    })?;
                let Value::Object(mut root) = value else {
                    return Err(DataStoreError::NotAnObject { path });
                };
                timestamps.coerce_legacy(&mut root);
                root
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                timestamps.validate_object(&defaults)?;
                debug!("creating store {}", path.display());
                persist(&path, &defaults).await?;
                defaults
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            timestamps,
            root: Mutex::new(root),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DataStore for FileDataStore {
    async fn get(&self, path: StorePath) -> Result<Option<Value>, DataStoreError> {
        let root = self.root.lock().await;
        Ok(lookup(&root, &path.segments())
            .filter(|value| !value.is_null())
            .cloned())
    }

    async fn set(&self, path: StorePath, value: Value) -> Result<(), DataStoreError> {
        let segments = path.segments();
        let Some((field, parents)) = segments.split_last() else {
            return Err(DataStoreError::EmptyPath);
        };
        self.timestamps.validate(field, &value)?;

        let mut root = self.root.lock().await;
        let mut updated = root.clone();
        insert_at(&mut updated, parents, field, value);

        persist(&self.path, &updated).await?;
        *root = updated;
        Ok(())
    }

    async fn set_fields(&self, fields: Map<String, Value>) -> Result<(), DataStoreError> {
        self.timestamps.validate_object(&fields)?;

        let mut root = self.root.lock().await;
        let mut updated = root.clone();
        updated.extend(fields);

        persist(&self.path, &updated).await?;
        *root = updated;
        Ok(())
    }

    async fn delete(&self, path: StorePath) -> Result<(), DataStoreError> {
        let segments = path.segments();
        let Some((field, parents)) = segments.split_last() else {
            return Err(DataStoreError::EmptyPath);
        };

        let mut root = self.root.lock().await;
        let mut updated = root.clone();
        if !remove_at(&mut updated, parents, field) {
            return Ok(());
        }

        persist(&self.path, &updated).await?;
        *root = updated;
        Ok(())
    }

    async fn get_root(&self) -> Result<Map<String, Value>, DataStoreError> {
        Ok(self.root.lock().await.clone())
    }
}

fn lookup<'a>(root: &'a Map<String, Value>, segments: &[&str]) -> Option<&'a Value> {
    let (first, rest) = segments.split_first()?;
    rest.iter()
        .try_fold(root.get(*first)?, |value, segment| value.get(*segment))
}

/// Insert `value` under `parents` + `field`, replacing any non object
/// intermediate value.
fn insert_at(map: &mut Map<String, Value>, parents: &[&str], field: &str, value: Value) {
    let Some((segment, rest)) = parents.split_first() else {
        map.insert(field.to_string(), value);
        return;
    };
    let entry = map
        .entry(segment.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(nested) = entry {
        insert_at(nested, rest, field, value);
    } else {
        let mut nested = Map::new();
        insert_at(&mut nested, rest, field, value);
        *entry = Value::Object(nested);
    }
}

/// Remove `field` under `parents`. Returns whether anything was removed.
fn remove_at(map: &mut Map<String, Value>, parents: &[&str], field: &str) -> bool {
    match parents.split_first() {
        None => map.shift_remove(field).is_some(),
        Some((segment, rest)) => match map.get_mut(*segment) {
            Some(Value::Object(nested)) => remove_at(nested, rest, field),
            _ => false,
        },
    }
}

/// Write the whole tree next to the store file and move it into place.
async fn persist(path: &Path, root: &Map<String, Value>) -> Result<(), DataStoreError> {
    let content = serde_json::to_vec_pretty(root)?;
    let tmp = path.with_extension(format!(
        "{STORE_EXTENSION}.{}.tmp",
        Uuid::new_v4().simple()
    ));
    fs::write(&tmp, content).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        fs::remove_file(&tmp).await.ok();
        return Err(e.into());
    }
    Ok(())
}

fn store_path(directory: &Path, name: &str) -> Result<PathBuf, DataStoreError> {
    if name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.contains("..")
    {
        return Err(DataStoreError::InvalidName(name.to_string()));
    }
    Ok(directory.join(format!("{name}.{STORE_EXTENSION}")))
}

/// Opens [`FileDataStore`]s in one directory.
#[derive(Clone, Debug)]
pub struct FileDataStoreFactory {
    directory: PathBuf,
}

impl FileDataStoreFactory {
    /// Create the factory, creating the directory when missing.
    pub async fn new<P: Into<PathBuf>>(directory: P) -> Result<Self, DataStoreError> {
        let directory = directory.into();
        fs::create_dir_all(&directory).await?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[async_trait]
impl DataStoreFactory for FileDataStoreFactory {
    async fn create(
        &self,
        name: &str,
        defaults: Map<String, Value>,
    ) -> Result<Arc<dyn DataStore>, DataStoreError> {
        Ok(Arc::new(
            FileDataStore::open(&self.directory, name, defaults).await?,
        ))
    }

    async fn exists(&self, name: &str) -> Result<bool, DataStoreError> {
        Ok(fs::try_exists(store_path(&self.directory, name)?).await?)
    }

    async fn list(&self) -> Result<Vec<String>, DataStoreError> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.directory).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(STORE_EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(name) if !name.starts_with('.') => names.push(name.to_string()),
                _ => {}
            }
        }
        names.sort();
        Ok(names)
    }
}
