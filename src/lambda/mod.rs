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
//! # Trigger invocation
//!
//! Builds the event envelope for a trigger source, calls the function bound
//! to the trigger and returns the `response` part of its reply.
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

pub mod error;
pub mod invoker;
pub mod policy;
pub mod types;

use crate::config::TriggerFunctions;
pub use error::{InvokerError, LambdaError};
pub use invoker::{FunctionInvoker, HttpFunctionInvoker, InvocationOutput};
pub use policy::FailurePolicy;
pub use types::*;
use types::TriggerReply;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LambdaApi: Send + Sync {
    /// Whether a function is bound to the trigger.
    fn enabled(&self, trigger: TriggerName) -> bool;

    /// Invoke the function bound to the event's trigger and return the
    /// `response` object of its reply.
    async fn invoke(&self, event: TriggerEvent) -> Result<Value, LambdaError>;
}

#[derive(Clone)]
pub struct LambdaProvider {
    functions: TriggerFunctions,
    region: String,
    invoker: Arc<dyn FunctionInvoker>,
}

impl LambdaProvider {
    pub fn new<R: Into<String>>(
        functions: TriggerFunctions,
        region: R,
        invoker: Arc<dyn FunctionInvoker>,
    ) -> Self {
        Self {
            functions,
            region: region.into(),
            invoker,
        }
    }
}

/// Message of a failed invocation: the function's `errorMessage` when the
/// payload carries one, the runtime error otherwise.
fn failure_message(output: &InvocationOutput) -> String {
    serde_json::from_slice::<Value>(&output.payload)
        .ok()
        .and_then(|payload| {
            payload
                .get("errorMessage")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .or_else(|| output.function_error.clone())
        .unwrap_or_else(|| format!("lambda returned status {}", output.status_code))
}

#[async_trait]
impl LambdaApi for LambdaProvider {
    fn enabled(&self, trigger: TriggerName) -> bool {
        self.functions.function_name(trigger).is_some()
    }

    #[tracing::instrument(level = "debug", skip(self, event), fields(trigger = %event.trigger()))]
    async fn invoke(&self, event: TriggerEvent) -> Result<Value, LambdaError> {
        let trigger = event.trigger();
        let function_name = self
            .functions
            .function_name(trigger)
            .ok_or(LambdaError::NotConfigured(trigger))?;

        let envelope = event.into_envelope(&self.region);
        let payload = serde_json::to_vec(&envelope).map_err(|err| {
            error!("failed to serialize trigger event: {err}");
            LambdaError::UnexpectedInvocation
        })?;
        debug!(
            "invoking {function_name:?} with event {}",
            String::from_utf8_lossy(&payload)
        );

        let output = self
            .invoker
            .invoke(function_name, payload)
            .await
            .map_err(|err| {
                error!("lambda invocation failed: {err}");
                LambdaError::UnexpectedInvocation
            })?;
        debug!(
            "lambda completed with status_code={} function_error={:?}",
            output.status_code, output.function_error
        );

        if output.status_code == 200 && output.function_error.is_none() {
            let reply: TriggerReply = serde_json::from_slice(&output.payload).map_err(|err| {
                error!("failed to parse lambda response: {err}");
                LambdaError::InvalidResponse
            })?;
            Ok(reply.response)
        } else {
            let message = failure_message(&output);
            error!("lambda reported an error: {message}");
            Err(LambdaError::UserValidation(message))
        }
    }
}
