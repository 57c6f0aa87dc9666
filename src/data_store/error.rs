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

use std::path::PathBuf;
use thiserror::Error;

/// Data store errors.
#[derive(Error, Debug)]
pub enum DataStoreError {
    /// A value written into a timestamp field is not a timestamp.
    #[error("Serialize: Expected {field} field to contain a Date, received a {received}")]
    TypeMismatch {
        /// Name of the offending field.
        field: String,
        /// JSON type of the rejected value.
        received: &'static str,
    },

    /// Empty segment list.
    #[error("store path must contain at least one segment")]
    EmptyPath,

    /// Store name that can not be mapped onto a file in the data directory.
    #[error("invalid store name {0:?}")]
    InvalidName(String),

    /// The store file does not contain a JSON object.
    #[error("store file {} does not contain a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    /// The store file could not be parsed.
    #[error("store file {} is not valid JSON: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Json serialization error.
    #[error("json serde error: {}", source)]
    Serde {
        #[from]
        source: serde_json::Error,
    },
}
