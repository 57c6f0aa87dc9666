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
//! What happens to the enclosing operation when a trigger fails.
use tracing::error;

use crate::lambda::error::LambdaError;
use crate::lambda::types::TriggerName;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailurePolicy {
    /// Failures are logged and the operation carries on without a result.
    BestEffort,
    /// Failures abort the operation.
    Blocking,
}

impl FailurePolicy {
    /// Fold an invocation result according to the policy.
    pub fn apply<T>(
        self,
        trigger: TriggerName,
        result: Result<T, LambdaError>,
    ) -> Result<Option<T>, LambdaError> {
        match (self, result) {
            (_, Ok(value)) => Ok(Some(value)),
            (Self::BestEffort, Err(err)) => {
                error!(%trigger, "trigger failed, continuing without it: {err}");
                Ok(None)
            }
            (Self::Blocking, Err(err)) => Err(err),
        }
    }
}

impl TriggerName {
    pub fn failure_policy(&self) -> FailurePolicy {
        match self {
            Self::CustomMessage | Self::PostConfirmation => FailurePolicy::BestEffort,
            Self::PostAuthentication | Self::PreSignUp | Self::UserMigration => {
                FailurePolicy::Blocking
            }
        }
    }
}
