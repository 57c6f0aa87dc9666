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
//! # API errors
//!
//! Errors returned by the operations, rendered the way the emulated service
//! renders them: a `__type` code plus a message.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::data_store::DataStoreError;
use crate::lambda::LambdaError;
use crate::user_pool::{AppClientBuilderError, UserBuilderError, UserPoolBuilderError};

#[derive(Debug, Error)]
pub enum CognitoError {
    #[error("User not authorized")]
    NotAuthorized,

    #[error("Resource not found")]
    ResourceNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UsernameExists,

    #[error("Incorrect confirmation code")]
    CodeMismatch,

    #[error("{0}")]
    InvalidParameter(String),

    #[error("{0}")]
    InvalidPassword(String),

    /// The operation is not routed.
    #[error("Unsupported x-amz-target header \"{0}\"")]
    UnsupportedOperation(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Lambda {
        #[from]
        source: LambdaError,
    },

    #[error(transparent)]
    DataStore {
        #[from]
        source: DataStoreError,
    },

    /// Request validation error.
    #[error("request validation failed: {source}")]
    Validator {
        #[from]
        source: validator::ValidationErrors,
    },

    #[error(transparent)]
    UserBuilder {
        #[from]
        source: UserBuilderError,
    },

    #[error(transparent)]
    UserPoolBuilder {
        #[from]
        source: UserPoolBuilderError,
    },

    #[error(transparent)]
    AppClientBuilder {
        #[from]
        source: AppClientBuilderError,
    },
}

impl CognitoError {
    /// Error code reported in the `__type` field.
    pub fn aws_error_type(&self) -> &'static str {
        match self {
            Self::NotAuthorized => "NotAuthorizedException",
            Self::ResourceNotFound => "ResourceNotFoundException",
            Self::UserNotFound => "UserNotFoundException",
            Self::UsernameExists => "UsernameExistsException",
            Self::CodeMismatch => "CodeMismatchException",
            Self::InvalidParameter(_) | Self::Validator { .. } => "InvalidParameterException",
            Self::InvalidPassword(_) => "InvalidPasswordException",
            Self::UnsupportedOperation(_) => "CognitoLocal#Unsupported",
            Self::Lambda { source } => match source {
                LambdaError::UnexpectedInvocation => "UnexpectedLambdaException",
                LambdaError::InvalidResponse => "InvalidLambdaResponseException",
                LambdaError::UserValidation(_) => "UserLambdaValidationException",
                LambdaError::NotConfigured(_) => "InternalErrorException",
            },
            Self::Internal(_)
            | Self::DataStore { .. }
            | Self::UserBuilder { .. }
            | Self::UserPoolBuilder { .. }
            | Self::AppClientBuilder { .. } => "InternalErrorException",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.aws_error_type() {
            "InternalErrorException" | "CognitoLocal#Unsupported" => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for CognitoError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            error!("Error happened during request processing: {:#?}", self);
        }

        (
            status_code,
            Json(json!({"__type": self.aws_error_type(), "message": self.to_string()})),
        )
            .into_response()
    }
}
