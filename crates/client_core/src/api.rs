use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use shared::{
    domain::{CourseCategory, CourseId, TeacherInitial},
    error::ApiError,
    protocol::{
        PayloadShape, PreferenceFormResponse, SubmitPreferencesRequest, SubmitPreferencesResponse,
    },
};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid api base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server rejected request with status {status}: {}", describe(.error))]
    Server {
        status: StatusCode,
        error: Option<ApiError>,
    },
    #[error("server rejected submission: {0}")]
    Rejected(String),
    #[error("unreadable response body: {0}")]
    Decode(#[source] serde_json::Error),
}

fn describe(error: &Option<ApiError>) -> &str {
    error
        .as_ref()
        .map(|e| e.message.as_str())
        .unwrap_or("no error body")
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    base_url: Url,
    auth_token: Option<String>,
}

impl RequestContext {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "url cannot be used as a base".to_string(),
            });
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            auth_token: None,
        })
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn preferences_url(
        &self,
        initial: &TeacherInitial,
        category: CourseCategory,
    ) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "url cannot be used as a base".to_string(),
            })?
            .pop_if_empty()
            .push("teachers")
            .push(initial.as_str())
            .push(&format!("{}-preferences", category.path_segment()));
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
pub trait PreferenceApi: Send + Sync {
    async fn load_form(
        &self,
        initial: &TeacherInitial,
        category: CourseCategory,
    ) -> Result<PreferenceFormResponse, ClientError>;

    async fn submit_preferences(
        &self,
        initial: &TeacherInitial,
        category: CourseCategory,
        preferences: &[CourseId],
    ) -> Result<SubmitPreferencesResponse, ClientError>;
}

pub struct HttpPreferenceApi {
    http: Client,
    context: RequestContext,
    payload_shape: PayloadShape,
}

impl HttpPreferenceApi {
    pub fn new(context: RequestContext) -> Self {
        Self {
            http: Client::new(),
            context,
            payload_shape: PayloadShape::default(),
        }
    }

    pub fn with_timeout(context: RequestContext, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            context,
            payload_shape: PayloadShape::default(),
        })
    }

    pub fn with_payload_shape(mut self, payload_shape: PayloadShape) -> Self {
        self.payload_shape = payload_shape;
        self
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    async fn send(&self, request: RequestBuilder, request_id: Uuid) -> Result<Response, ClientError> {
        let response = self
            .context
            .authorize(request)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .send()
            .await?;
        check_status(response).await
    }
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let error = serde_json::from_str::<ApiError>(&body).ok();
    Err(ClientError::Server { status, error })
}

#[async_trait]
impl PreferenceApi for HttpPreferenceApi {
    async fn load_form(
        &self,
        initial: &TeacherInitial,
        category: CourseCategory,
    ) -> Result<PreferenceFormResponse, ClientError> {
        let url = self.context.preferences_url(initial, category)?;
        let request_id = Uuid::new_v4();
        info!(%initial, %category, %request_id, "preferences: loading form");

        let form: PreferenceFormResponse = self
            .send(self.http.get(url), request_id)
            .await?
            .json()
            .await?;

        info!(
            %initial,
            %category,
            courses = form.courses.len(),
            "preferences: form loaded"
        );
        Ok(form)
    }

    async fn submit_preferences(
        &self,
        initial: &TeacherInitial,
        category: CourseCategory,
        preferences: &[CourseId],
    ) -> Result<SubmitPreferencesResponse, ClientError> {
        let url = self.context.preferences_url(initial, category)?;
        let request_id = Uuid::new_v4();
        let body = SubmitPreferencesRequest::new(self.payload_shape, preferences.to_vec());
        info!(
            %initial,
            %category,
            %request_id,
            ranked = preferences.len(),
            shape = ?self.payload_shape,
            "preferences: submitting"
        );

        let response = self.send(self.http.put(url).json(&body), request_id).await?;
        let text = response.text().await?;
        let parsed = if text.trim().is_empty() {
            SubmitPreferencesResponse::default()
        } else {
            serde_json::from_str::<SubmitPreferencesResponse>(&text).map_err(|e| {
                warn!(%request_id, "preferences: unreadable submit response: {e}");
                ClientError::Decode(e)
            })?
        };

        if !parsed.success {
            return Err(ClientError::Rejected(
                parsed
                    .message
                    .unwrap_or_else(|| "no reason given".to_string()),
            ));
        }
        info!(%initial, %category, %request_id, "preferences: submitted");
        Ok(parsed)
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
