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
//! Transport used to call the configured functions.
use async_trait::async_trait;
use url::Url;

use crate::lambda::error::InvokerError;

const INVOCATION_TYPE_HEADER: &str = "x-amz-invocation-type";
const FUNCTION_ERROR_HEADER: &str = "x-amz-function-error";

/// Raw result of a synchronous invocation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InvocationOutput {
    /// Transport status, 200 on success.
    pub status_code: u16,
    /// Error reported by the function runtime.
    pub function_error: Option<String>,
    pub payload: Vec<u8>,
}

/// Calls a function by name and waits for its result.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    async fn invoke(
        &self,
        function_name: &str,
        payload: Vec<u8>,
    ) -> Result<InvocationOutput, InvokerError>;
}

/// Invoker speaking the Lambda `Invoke` REST protocol, usable against a local
/// Lambda emulator.
#[derive(Clone, Debug)]
pub struct HttpFunctionInvoker {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpFunctionInvoker {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    fn invocation_url(&self, function_name: &str) -> Result<Url, InvokerError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| InvokerError::InvalidEndpoint(self.endpoint.to_string()))?
            .pop_if_empty()
            .extend(["2015-03-31", "functions", function_name, "invocations"]);
        Ok(url)
    }
}

#[async_trait]
impl FunctionInvoker for HttpFunctionInvoker {
    #[tracing::instrument(level = "debug", skip(self, payload))]
    async fn invoke(
        &self,
        function_name: &str,
        payload: Vec<u8>,
    ) -> Result<InvocationOutput, InvokerError> {
        let response = self
            .client
            .post(self.invocation_url(function_name)?)
            .header(INVOCATION_TYPE_HEADER, "RequestResponse")
            .body(payload)
            .send()
            .await?;

        let status_code = response.status().as_u16();
        let function_error = response
            .headers()
            .get(FUNCTION_ERROR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let payload = response.bytes().await?.to_vec();

        Ok(InvocationOutput {
            status_code,
            function_error,
            payload,
        })
    }
}
