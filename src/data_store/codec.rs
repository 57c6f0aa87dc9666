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
//! # Timestamp coercion
//!
//! JSON has no timestamp type, so timestamps live on disk as ISO-8601
//! strings. A field is timestamp typed when its key ends with `Date` (the
//! naming convention of the emulated API: `CreationDate`, `UserCreateDate`,
//! ...) or when the store defaults seed it with an ISO-8601 string.
//!
//! Writes into such fields must carry a timestamp (or `null`). Reads accept
//! the legacy representation as well: a raw number of milliseconds since the
//! epoch is converted back into the string form when the file is loaded.
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::data_store::error::DataStoreError;

const TIMESTAMP_KEY_SUFFIX: &str = "Date";

/// Set of keys declared as timestamps by the store defaults.
#[derive(Clone, Debug, Default)]
pub(crate) struct TimestampFields {
    declared: HashSet<String>,
}

impl TimestampFields {
    /// Collect the keys whose default value is an ISO-8601 string.
    pub(crate) fn from_defaults(defaults: &Map<String, Value>) -> Self {
        let mut declared = HashSet::new();
        collect_declared(defaults, &mut declared);
        Self { declared }
    }

    pub(crate) fn is_timestamp(&self, key: &str) -> bool {
        key.ends_with(TIMESTAMP_KEY_SUFFIX) || self.declared.contains(key)
    }

    /// Check the value about to be written under `field`.
    pub(crate) fn validate(&self, field: &str, value: &Value) -> Result<(), DataStoreError> {
        if self.is_timestamp(field) {
            return match value {
                Value::Null => Ok(()),
                Value::String(s) if parse_timestamp(s).is_some() => Ok(()),
                other => Err(DataStoreError::TypeMismatch {
                    field: field.to_string(),
                    received: json_type(other),
                }),
            };
        }
        match value {
            Value::Object(map) => self.validate_object(map),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_object)
                .try_for_each(|map| self.validate_object(map)),
            _ => Ok(()),
        }
    }

    pub(crate) fn validate_object(&self, map: &Map<String, Value>) -> Result<(), DataStoreError> {
        map.iter().try_for_each(|(key, value)| self.validate(key, value))
    }

    /// Rewrite legacy numeric epoch values into the string form.
    pub(crate) fn coerce_legacy(&self, map: &mut Map<String, Value>) {
        for (key, value) in map.iter_mut() {
            if self.is_timestamp(key) {
                if let Some(ts) = value.as_f64().and_then(|ms| {
                    DateTime::<Utc>::from_timestamp_millis(ms as i64)
                }) {
                    *value = Value::String(format_timestamp(&ts));
                }
                continue;
            }
            match value {
                Value::Object(nested) => self.coerce_legacy(nested),
                Value::Array(items) => items
                    .iter_mut()
                    .filter_map(Value::as_object_mut)
                    .for_each(|nested| self.coerce_legacy(nested)),
                _ => {}
            }
        }
    }
}

fn collect_declared(map: &Map<String, Value>, declared: &mut HashSet<String>) {
    for (key, value) in map {
        match value {
            Value::String(s) if parse_timestamp(s).is_some() => {
                declared.insert(key.clone());
            }
            Value::Object(nested) => collect_declared(nested, declared),
            _ => {}
        }
    }
}

/// Canonical on-disk representation of a timestamp.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
