// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Client errors and their mapping onto service errors.

use canopy_session::ServiceError;
use reqwest::StatusCode;
use thiserror::Error;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be sent or its body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("{status}: {body}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Response body, possibly empty.
        body: String,
    },

    /// The backend answered but reported a failure in the body.
    #[error("{0}")]
    Api(String),
}

impl From<ClientError> for ServiceError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) if e.is_decode() => Self::Malformed(e.to_string()),
            ClientError::Http(e) => Self::Transport(e.to_string()),
            ClientError::Status { status, body } => Self::Status {
                status: status.as_u16(),
                body,
            },
            ClientError::Api(msg) => Self::Declined(msg),
        }
    }
}
