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
//! # HTTP transport
//!
//! The emulated API is JSON over `POST /`. The operation is named by the
//! `x-amz-target` header, e.g. `AWSCognitoIdentityProviderService.SignUp`.
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{self, HeaderMap, HeaderName, Request, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    LatencyUnit,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info_span};
use uuid::Uuid;

use crate::error::CognitoError;
use crate::services::Services;
use crate::targets::Router as TargetRouter;

/// Header naming the operation.
pub const TARGET_HEADER: &str = "x-amz-target";
/// Header carrying the generated request id.
pub const REQUEST_ID_HEADER: &str = "x-amzn-requestid";
/// Content type of the emulated API.
pub const AMZ_JSON: &str = "application/x-amz-json-1.1";

#[derive(Clone, Default)]
struct AmznRequestId {}

impl MakeRequestId for AmznRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        http::HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Build the application serving the operations.
pub fn app(services: Arc<Services>) -> axum::Router {
    let targets = Arc::new(TargetRouter::new(services));
    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let middleware = ServiceBuilder::new()
        // ids must be set before the request reaches `TraceLayer`
        .layer(SetRequestIdLayer::new(
            x_request_id.clone(),
            AmznRequestId::default(),
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    info_span!(
                        "request",
                        method = ?request.method(),
                        target = ?request.headers().get(TARGET_HEADER),
                        x_request_id = ?request.headers().get(REQUEST_ID_HEADER)
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Micros),
                ),
        )
        .layer(PropagateRequestIdLayer::new(x_request_id));

    axum::Router::new()
        .route("/", post(dispatch))
        .layer(middleware)
        .with_state(targets)
}

/// Operation name from the target header value: the part after the last `.`.
fn operation_name(target: &str) -> &str {
    target.rsplit('.').next().unwrap_or(target)
}

async fn dispatch(
    State(targets): State<Arc<TargetRouter>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, CognitoError> {
    let target = headers
        .get(TARGET_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| CognitoError::UnsupportedOperation(String::new()))?;
    let operation = operation_name(target);

    let request: Value = if body.is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_slice(&body)
            .map_err(|err| CognitoError::InvalidParameter(err.to_string()))?
    };
    debug!(operation, "dispatching");

    let response = targets.route(operation)(request).await?;
    Ok(([(header::CONTENT_TYPE, AMZ_JSON)], Json(response)).into_response())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::targets::tests::TestServices;
    use crate::user_pool::UserPool;

    async fn call(app: axum::Router, target: Option<&str>, body: &str) -> (StatusCode, HeaderMap, Value) {
        let mut request = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, AMZ_JSON);
        if let Some(target) = target {
            request = request.header(TARGET_HEADER, target);
        }
        let response = app
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_operation_name() {
        assert_eq!(
            operation_name("AWSCognitoIdentityProviderService.SignUp"),
            "SignUp"
        );
        assert_eq!(operation_name("SignUp"), "SignUp");
    }

    #[tokio::test]
    async fn test_dispatch() {
        let mut services = TestServices::new();
        services
            .cognito
            .expect_describe_user_pool()
            .withf(|id| id == "test")
            .returning(|id| {
                Ok(UserPool {
                    id: id.to_string(),
                    ..Default::default()
                })
            });

        let (status, headers, body) = call(
            app(services.build()),
            Some("AWSCognitoIdentityProviderService.DescribeUserPool"),
            r#"{"UserPoolId": "test"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"UserPool": {"Id": "test"}}));
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), AMZ_JSON);
        assert!(headers.contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_error_response() {
        let mut services = TestServices::new();
        services
            .cognito
            .expect_describe_user_pool()
            .returning(|_| Err(CognitoError::ResourceNotFound));

        let (status, _, body) = call(
            app(services.build()),
            Some("AWSCognitoIdentityProviderService.DescribeUserPool"),
            r#"{"UserPoolId": "missing"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["__type"], "ResourceNotFoundException");
    }

    #[tokio::test]
    async fn test_unsupported_target() {
        let (status, _, body) = call(
            app(TestServices::new().build()),
            Some("AWSCognitoIdentityProviderService.InitiateAuth"),
            "{}",
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["__type"], "CognitoLocal#Unsupported");

        let (status, _, body) = call(app(TestServices::new().build()), None, "{}").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["__type"], "CognitoLocal#Unsupported");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (status, _, body) = call(
            app(TestServices::new().build()),
            Some("AWSCognitoIdentityProviderService.DescribeUserPool"),
            "{not json",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["__type"], "InvalidParameterException");
    }
}
