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
//! # cognito-local
//!
//! Offline emulator of the Cognito user pool control plane. It keeps pools,
//! users and application clients in JSON files on disk, answers the JSON
//! API the AWS SDKs speak, and calls out to locally hosted functions for
//! the pool triggers.
//!
//! The crate is layered:
//!
//! - [`data_store`]: named JSON documents with path addressed access.
//!
//! - [`user_pool`] and [`cognito`]: one store per pool, plus the registry
//!   mapping pool and client ids onto those stores.
//!
//! - [`lambda`] and [`triggers`]: the trigger event protocol and the
//!   per trigger failure policies.
//!
//! - [`targets`] and [`server`]: the operations and the HTTP transport
//!   dispatching to them.
//!
//! [`services::Services`] is the composition point wiring the concrete
//! providers together from a [`config::Config`].

pub mod clock;
pub mod cognito;
pub mod config;
pub mod data_store;
pub mod error;
pub mod lambda;
pub mod messages;
pub mod otp;
pub mod server;
pub mod services;
pub mod targets;
pub mod triggers;
pub mod user_pool;
