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
//! One time codes sent for confirmation and password recovery.
use rand::Rng;

#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Six digit numeric codes.
#[derive(Clone, Debug, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        format!("{:06}", rand::rng().random_range(0..1_000_000u32))
    }
}
