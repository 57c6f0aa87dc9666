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
//! Test the operations through the HTTP transport.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use eyre::{OptionExt, Report};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use tracing_test::traced_test;

use super::common::get_services;
use cognito_local::server::{AMZ_JSON, TARGET_HEADER, app};

async fn call(
    app: &axum::Router,
    operation: &str,
    body: Value,
) -> Result<(StatusCode, Value), Report> {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", AMZ_JSON)
        .header(
            TARGET_HEADER,
            format!("AWSCognitoIdentityProviderService.{operation}"),
        )
        .body(Body::from(serde_json::to_vec(&body)?))?;
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let body = response.into_body().collect().await?.to_bytes();
    Ok((status, serde_json::from_slice(&body)?))
}

fn stored_code(dir: &TempDir, pool_id: &str, username: &str) -> Result<String, Report> {
    let content = std::fs::read(dir.path().join("db").join(format!("{pool_id}.json")))?;
    let store: Value = serde_json::from_slice(&content)?;
    store["Users"][username]["ConfirmationCode"]
        .as_str()
        .map(str::to_string)
        .ok_or_eyre("no confirmation code stored")
}

#[tokio::test]
#[traced_test]
async fn test_sign_up_flow() -> Result<(), Report> {
    let dir = TempDir::new()?;
    let app = app(get_services(&dir).await?);

    let (status, body) = call(&app, "CreateUserPool", json!({"PoolName": "test"})).await?;
    assert_eq!(status, StatusCode::OK);
    let pool_id = body["UserPool"]["Id"]
        .as_str()
        .ok_or_eyre("pool id")?
        .to_string();
    assert_eq!(body["UserPool"]["Name"], "test");
    assert_eq!(body["UserPool"]["MfaConfiguration"], "OFF");

    let (status, body) = call(
        &app,
        "CreateUserPoolClient",
        json!({"UserPoolId": pool_id, "ClientName": "web"}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let client_id = body["UserPoolClient"]["ClientId"]
        .as_str()
        .ok_or_eyre("client id")?
        .to_string();

    let (status, body) = call(
        &app,
        "SignUp",
        json!({
            "ClientId": client_id,
            "Username": "janice",
            "Password": "Password1!",
            "UserAttributes": [{"Name": "email", "Value": "janice@example.com"}],
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["UserConfirmed"], false);
    assert_eq!(
        body["CodeDeliveryDetails"],
        json!({
            "Destination": "janice@example.com",
            "DeliveryMedium": "EMAIL",
            "AttributeName": "email",
        })
    );

    let (status, body) = call(
        &app,
        "SignUp",
        json!({"ClientId": client_id, "Username": "janice", "Password": "Password1!"}),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["__type"], "UsernameExistsException");

    let (status, body) = call(
        &app,
        "ConfirmSignUp",
        json!({"ClientId": client_id, "Username": "janice", "ConfirmationCode": "wrong"}),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["__type"], "CodeMismatchException");

    let code = stored_code(&dir, &pool_id, "janice")?;
    let (status, _) = call(
        &app,
        "ConfirmSignUp",
        json!({"ClientId": client_id, "Username": "janice", "ConfirmationCode": code}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &app,
        "AdminGetUser",
        json!({"UserPoolId": pool_id, "Username": "janice"}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["UserStatus"], "CONFIRMED");

    let (status, body) = call(&app, "ListUsers", json!({"UserPoolId": pool_id})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Users"].as_array().map(Vec::len), Some(1));

    let (status, body) = call(&app, "ListUserPools", json!({"MaxResults": 10})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["UserPools"][0]["Id"], pool_id.as_str());
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_forgot_password_flow() -> Result<(), Report> {
    let dir = TempDir::new()?;
    let app = app(get_services(&dir).await?);

    let (_, body) = call(&app, "CreateUserPool", json!({"PoolName": "test"})).await?;
    let pool_id = body["UserPool"]["Id"].as_str().ok_or_eyre("pool id")?.to_string();
    let (_, body) = call(
        &app,
        "CreateUserPoolClient",
        json!({"UserPoolId": pool_id, "ClientName": "web"}),
    )
    .await?;
    let client_id = body["UserPoolClient"]["ClientId"]
        .as_str()
        .ok_or_eyre("client id")?
        .to_string();

    let (status, body) = call(
        &app,
        "AdminCreateUser",
        json!({
            "UserPoolId": pool_id,
            "Username": "janice",
            "TemporaryPassword": "Temp0rary!",
            "UserAttributes": [{"Name": "email", "Value": "janice@example.com"}],
            "DesiredDeliveryMediums": ["EMAIL"],
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["User"]["UserStatus"], "FORCE_CHANGE_PASSWORD");

    let (status, body) = call(
        &app,
        "ForgotPassword",
        json!({"ClientId": client_id, "Username": "janice"}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["CodeDeliveryDetails"]["DeliveryMedium"], "EMAIL");

    let code = stored_code(&dir, &pool_id, "janice")?;
    let (status, _) = call(
        &app,
        "ConfirmForgotPassword",
        json!({
            "ClientId": client_id,
            "Username": "janice",
            "ConfirmationCode": code,
            "Password": "NewPassw0rd!",
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(
        &app,
        "AdminGetUser",
        json!({"UserPoolId": pool_id, "Username": "janice"}),
    )
    .await?;
    assert_eq!(body["UserStatus"], "CONFIRMED");

    let (status, _) = call(
        &app,
        "AdminDeleteUser",
        json!({"UserPoolId": pool_id, "Username": "janice"}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call(
        &app,
        "AdminGetUser",
        json!({"UserPoolId": pool_id, "Username": "janice"}),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["__type"], "UserNotFoundException");
    Ok(())
}
