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
//! # Operations
//!
//! One module per emulated API operation. The [`Router`] binds every
//! operation to the [`Services`] once and resolves handlers by operation
//! name.
use futures::future::{BoxFuture, FutureExt};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use validator::Validate;

mod admin_confirm_sign_up;
mod admin_create_user;
mod admin_delete_user;
mod admin_get_user;
mod admin_update_user_attributes;
mod common;
mod confirm_forgot_password;
mod confirm_sign_up;
mod create_user_pool;
mod create_user_pool_client;
mod describe_user_pool;
mod describe_user_pool_client;
mod forgot_password;
mod list_user_pools;
mod list_users;
mod resend_confirmation_code;
mod sign_up;

use crate::error::CognitoError;
use crate::services::Services;
pub use common::UserType;

/// Bound operation: takes the JSON request, returns the JSON response.
pub type Handler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, CognitoError>> + Send + Sync>;

/// Names of the routed operations.
pub const TARGETS: [&str; 16] = [
    "AdminConfirmSignUp",
    "AdminCreateUser",
    "AdminDeleteUser",
    "AdminGetUser",
    "AdminUpdateUserAttributes",
    "ConfirmForgotPassword",
    "ConfirmSignUp",
    "CreateUserPool",
    "CreateUserPoolClient",
    "DescribeUserPool",
    "DescribeUserPoolClient",
    "ForgotPassword",
    "ListUserPools",
    "ListUsers",
    "ResendConfirmationCode",
    "SignUp",
];

/// Adapt a typed operation into a [`Handler`]. The request is decoded and
/// validated before the operation runs.
fn bind<Req, Res, F, Fut>(services: &Arc<Services>, operation: F) -> Handler
where
    Req: DeserializeOwned + Validate + Send + 'static,
    Res: Serialize,
    F: Fn(Arc<Services>, Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Res, CognitoError>> + Send + 'static,
{
    let services = services.clone();
    Arc::new(move |body: Value| {
        let call = decode::<Req>(body).map(|request| operation(services.clone(), request));
        async move {
            let response = call?.await?;
            serde_json::to_value(response).map_err(|err| CognitoError::Internal(err.to_string()))
        }
        .boxed()
    })
}

fn decode<Req: DeserializeOwned + Validate>(body: Value) -> Result<Req, CognitoError> {
    let request: Req = serde_json::from_value(body)
        .map_err(|err| CognitoError::InvalidParameter(err.to_string()))?;
    request.validate()?;
    Ok(request)
}

fn unsupported(name: &str) -> Handler {
    let name = name.to_string();
    Arc::new(move |_| {
        let err = CognitoError::UnsupportedOperation(name.clone());
        async move { Err(err) }.boxed()
    })
}

/// Dispatch table of the operations.
pub struct Router {
    handlers: HashMap<&'static str, Handler>,
}

impl Router {
    pub fn new(services: Arc<Services>) -> Self {
        let s = &services;
        let handlers: HashMap<&'static str, Handler> = HashMap::from([
            ("AdminConfirmSignUp", bind(s, admin_confirm_sign_up::handle)),
            ("AdminCreateUser", bind(s, admin_create_user::handle)),
            ("AdminDeleteUser", bind(s, admin_delete_user::handle)),
            ("AdminGetUser", bind(s, admin_get_user::handle)),
            (
                "AdminUpdateUserAttributes",
                bind(s, admin_update_user_attributes::handle),
            ),
            ("ConfirmForgotPassword", bind(s, confirm_forgot_password::handle)),
            ("ConfirmSignUp", bind(s, confirm_sign_up::handle)),
            ("CreateUserPool", bind(s, create_user_pool::handle)),
            ("CreateUserPoolClient", bind(s, create_user_pool_client::handle)),
            ("DescribeUserPool", bind(s, describe_user_pool::handle)),
            ("DescribeUserPoolClient", bind(s, describe_user_pool_client::handle)),
            ("ForgotPassword", bind(s, forgot_password::handle)),
            ("ListUserPools", bind(s, list_user_pools::handle)),
            ("ListUsers", bind(s, list_users::handle)),
            ("ResendConfirmationCode", bind(s, resend_confirmation_code::handle)),
            ("SignUp", bind(s, sign_up::handle)),
        ]);
        Self { handlers }
    }

    /// Handler of the operation. Unknown operations resolve to a handler
    /// failing with [`CognitoError::UnsupportedOperation`].
    pub fn route(&self, name: &str) -> Handler {
        self.handlers
            .get(name)
            .cloned()
            .unwrap_or_else(|| unsupported(name))
    }

    /// Whether the operation is routed.
    pub fn supports(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }
}
