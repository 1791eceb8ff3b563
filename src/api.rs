use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::VocquizError;

/// One multiple-choice question: the quizzed word plus four candidate
/// translations (one correct, already shuffled by the backend).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub word: String,
    pub options: Vec<String>,
}

/// Backend verdict for a submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerCheck {
    pub correct: bool,
    pub correct_translation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub session_token: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize)]
struct LevelsResponse {
    levels: Vec<String>,
}

#[derive(Deserialize)]
struct MeResponse {
    user: User,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Blocking client for the vocabulary-quiz backend.
///
/// All requests carry the stored bearer token when one is set; non-2xx
/// responses surface the backend's `{"error": ...}` message.
#[derive(Debug, Clone)]
pub struct QuizApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl QuizApi {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, VocquizError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Available difficulty levels, e.g. `["LEVEL1", "LEVEL2"]`.
    pub fn levels(&self) -> Result<Vec<String>, VocquizError> {
        let response = self.request(Method::GET, "/api/levels").send()?;
        let body: LevelsResponse = Self::parse(response, "Failed to fetch levels")?;
        Ok(body.levels)
    }

    /// A question drawn from the given level's word list.
    pub fn question(&self, level: &str) -> Result<Question, VocquizError> {
        let response = self
            .request(Method::GET, &format!("/api/question/{level}"))
            .send()?;
        Self::parse(response, "Failed to fetch question")
    }

    /// A question drawn from the logged-in user's personal vocabulary
    /// library. Requires a token.
    pub fn library_question(&self) -> Result<Question, VocquizError> {
        if self.token.is_none() {
            return Err(VocquizError::NotLoggedIn);
        }
        let response = self.request(Method::GET, "/api/vocabulary-question").send()?;
        Self::parse(response, "Failed to fetch vocabulary question")
    }

    /// Ask the backend whether `selected` is the correct translation of
    /// `word`. `level` is passed along when known so the backend can track
    /// server-side progress for logged-in users.
    pub fn check_answer(
        &self,
        word: &str,
        selected: &str,
        level: Option<&str>,
    ) -> Result<AnswerCheck, VocquizError> {
        let mut body = serde_json::json!({ "word": word, "selected": selected });
        if let Some(level) = level {
            body["level"] = serde_json::Value::String(level.to_string());
        }
        let response = self
            .request(Method::POST, "/api/check-answer")
            .json(&body)
            .send()?;
        Self::parse(response, "Failed to check answer")
    }

    pub fn login(&self, username: &str, password: &str) -> Result<LoginResponse, VocquizError> {
        let body = serde_json::json!({ "username": username, "password": password });
        let response = self
            .request(Method::POST, "/api/auth/login")
            .json(&body)
            .send()?;
        Self::parse(response, "Login failed")
    }

    /// Validate the stored token and fetch the user it belongs to.
    pub fn me(&self) -> Result<User, VocquizError> {
        if self.token.is_none() {
            return Err(VocquizError::NotLoggedIn);
        }
        let response = self.request(Method::GET, "/api/auth/me").send()?;
        let body: MeResponse = Self::parse(response, "Session validation failed")?;
        Ok(body.user)
    }

    /// Invalidate the session server-side. The caller clears local state
    /// regardless of the outcome.
    pub fn logout(&self) -> Result<(), VocquizError> {
        if self.token.is_none() {
            return Err(VocquizError::NotLoggedIn);
        }
        let response = self.request(Method::POST, "/api/auth/logout").send()?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(response, "Logout failed"))
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    fn parse<T: DeserializeOwned>(
        response: Response,
        default_msg: &str,
    ) -> Result<T, VocquizError> {
        if response.status().is_success() {
            Ok(response.json()?)
        } else {
            Err(Self::error_from(response, default_msg))
        }
    }

    fn error_from(response: Response, default_msg: &str) -> VocquizError {
        let message = response
            .json::<ErrorBody>()
            .ok()
            .and_then(|b| b.error)
            .unwrap_or_else(|| default_msg.to_string());
        VocquizError::Api(message)
    }
}
