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

use thiserror::Error;

use crate::lambda::types::TriggerName;

/// Trigger invocation errors.
#[derive(Error, Debug)]
pub enum LambdaError {
    /// No function is bound to the trigger.
    #[error("{0} trigger not configured")]
    NotConfigured(TriggerName),

    /// The function could not be called. The cause is only logged.
    #[error("unexpected error when invoking lambda")]
    UnexpectedInvocation,

    /// The function returned a payload that is not a trigger envelope.
    #[error("invalid lambda response")]
    InvalidResponse,

    /// The function reported a failure.
    #[error("{0}")]
    UserValidation(String),
}

/// Transport level failure of a [`FunctionInvoker`](crate::lambda::FunctionInvoker).
#[derive(Error, Debug)]
pub enum InvokerError {
    #[error(transparent)]
    Http {
        #[from]
        source: reqwest::Error,
    },

    /// The endpoint can not carry a path.
    #[error("endpoint {0} can not be used as a base url")]
    InvalidEndpoint(String),
}
