// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! HTTP implementation of the content service.

use canopy_session::{
    API_URL_VAR, CardDraft, ContentService, DEFAULT_API_URL, QuizQuestion, ServiceError,
    SessionConfig,
};
use canopy_tree::ContentRecord;
use kurbo::Point;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ClientError;
use crate::wire::{
    FlashcardsBody, FlashcardsReply, QuizBody, QuizReply, SearchBody, SearchReply, WebSearchBody,
};

/// [`ContentService`] backed by the content backend's JSON API.
#[derive(Debug, Clone)]
pub struct HttpContentService {
    base_url: String,
    client: Client,
}

impl HttpContentService {
    /// Client for the URL in `CANOPY_API_URL`, or the local default.
    pub fn from_env() -> Self {
        let base_url = std::env::var(API_URL_VAR).unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        Self::new(base_url)
    }

    /// Client for the URL a session was configured with.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    /// Client for an explicit base URL, e.g. `http://localhost:8001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: Client::new(),
        }
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        debug!(path, "POST");
        let response = self.request(Method::POST, path).json(body).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::Status { status, body })
        }
    }

    /// Topics for a new session.
    pub async fn search(&self, query: &str) -> Result<Vec<ContentRecord>, ClientError> {
        let reply: SearchReply = self.post("/api/search", &SearchBody { query }).await?;
        results(reply)
    }

    /// Up to `count` results for `query`, steering away from `negative_prompts`.
    pub async fn web_search(
        &self,
        query: &str,
        count: usize,
        negative_prompts: &[String],
    ) -> Result<Vec<ContentRecord>, ClientError> {
        let body = WebSearchBody {
            query,
            count,
            negative_prompts,
        };
        let reply: SearchReply = self.post("/api/web-search", &body).await?;
        results(reply)
    }

    /// Flashcards for `record`. `at` is the node the cards will hang from.
    pub async fn create_flashcards(
        &self,
        record: &ContentRecord,
        count: usize,
        at: Option<Point>,
    ) -> Result<Vec<CardDraft>, ClientError> {
        let body = FlashcardsBody {
            search_result: record,
            count,
            node_position: at.map(Into::into),
        };
        let reply: FlashcardsReply = self.post("/api/create-flashcards", &body).await?;
        if !reply.success {
            return Err(ClientError::Api(
                reply
                    .error
                    .unwrap_or_else(|| "flashcard generation failed".into()),
            ));
        }
        debug!(cards = reply.flashcards.len(), title = %record.title, "flashcards created");
        Ok(reply.flashcards)
    }

    /// Multiple-choice questions over `flashcards`.
    pub async fn create_quiz(
        &self,
        flashcards: &[CardDraft],
    ) -> Result<Vec<QuizQuestion>, ClientError> {
        let reply: QuizReply = self
            .post("/api/generate-quiz", &QuizBody { flashcards })
            .await?;
        Ok(reply.questions)
    }
}

fn results(reply: SearchReply) -> Result<Vec<ContentRecord>, ClientError> {
    match reply {
        SearchReply {
            results: Some(results),
            ..
        } => Ok(results),
        SearchReply {
            error: Some(error), ..
        } => Err(ClientError::Api(error)),
        SearchReply { .. } => Err(ClientError::Api("no results in response".into())),
    }
}

impl ContentService for HttpContentService {
    async fn fetch_initial_topics(&self, query: &str) -> Result<Vec<ContentRecord>, ServiceError> {
        Ok(self.search(query).await?)
    }

    async fn expand_topic(
        &self,
        query: &str,
        count: usize,
        exclude: &[String],
    ) -> Result<Vec<ContentRecord>, ServiceError> {
        Ok(self.web_search(query, count, exclude).await?)
    }

    async fn generate_flashcards(
        &self,
        record: &ContentRecord,
        count: usize,
    ) -> Result<Vec<CardDraft>, ServiceError> {
        Ok(self.create_flashcards(record, count, None).await?)
    }

    async fn generate_quiz(&self, cards: &[CardDraft]) -> Result<Vec<QuizQuestion>, ServiceError> {
        Ok(self.create_quiz(cards).await?)
    }
}
