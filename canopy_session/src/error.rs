// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session and collaborator errors.

use thiserror::Error;

/// Failure to set up a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The config file exists but could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The config file is not valid JSON for [`SessionConfig`](crate::SessionConfig).
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure reported by a content collaborator.
///
/// These never touch the tree; content is additive decoration.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The request did not complete.
    #[error("request failed: {0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status {
        /// HTTP-like status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },
    /// The response could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// The service decoded the request but declined it.
    #[error("{0}")]
    Declined(String),
}
