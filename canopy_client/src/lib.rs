// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Client: the HTTP content collaborator.
//!
//! [`HttpContentService`] implements [`canopy_session::ContentService`]
//! against the content backend's JSON endpoints:
//!
//! | Operation | Endpoint |
//! |---|---|
//! | initial topics | `POST /api/search` `{query}` |
//! | topic expansion | `POST /api/web-search` `{query, count, negative_prompts}` |
//! | flashcards | `POST /api/create-flashcards` `{search_result, count, node_position?}` |
//! | quiz | `POST /api/generate-quiz` `{flashcards}` |
//!
//! The base URL comes from `CANOPY_API_URL` (see
//! [`HttpContentService::from_env`]) and defaults to `http://localhost:8001`.
//! Failures surface as [`ClientError`], which converts into the session's
//! [`ServiceError`](canopy_session::ServiceError).
//!
//! ```no_run
//! use canopy_client::HttpContentService;
//! use canopy_session::{Session, SessionConfig};
//!
//! # async fn run() {
//! let config = SessionConfig::default().with_env_overrides();
//! let service = HttpContentService::from_config(&config);
//! let mut session = Session::new(config, service);
//! session.start("marine biology").await;
//! # }
//! ```

mod client;
mod error;
mod wire;

pub use client::HttpContentService;
pub use error::ClientError;
