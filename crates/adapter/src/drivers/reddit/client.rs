use async_trait::async_trait;
use domain::{ChannelName, Comment, Post};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use super::listing::{Listing, RawComment, RawPost, KIND_COMMENT, KIND_POST};
use crate::error::ForumError;
use crate::traits::ForumClient;

pub const DEFAULT_AUTH_BASE: &str = "https://www.reddit.com";
pub const DEFAULT_API_BASE: &str = "https://oauth.reddit.com";
pub const DEFAULT_USER_AGENT: &str = "mt-reddit-bot";

// 提前刷新，避免请求途中过期
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub user_agent: String,
    pub auth_base: String,
    pub api_base: String,
    pub request_timeout: Duration,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct CommentResponse {
    json: CommentResponseBody,
}

#[derive(Deserialize)]
struct CommentResponseBody {
    #[serde(default)]
    errors: Vec<Value>,
}

/// Reddit OAuth client using the refresh-token grant of a script app.
pub struct RedditClient {
    http: reqwest::Client,
    config: RedditConfig,
    token: Mutex<Option<AccessToken>>,
}

impl RedditClient {
    pub fn new(config: RedditConfig) -> Result<Self, ForumError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            config: RedditConfig {
                auth_base: config.auth_base.trim_end_matches('/').to_string(),
                api_base: config.api_base.trim_end_matches('/').to_string(),
                ..config
            },
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String, ForumError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if Instant::now() + TOKEN_REFRESH_MARGIN < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        debug!("Refreshing Reddit access token");
        let resp = self
            .http
            .post(format!("{}/api/v1/access_token", self.config.auth_base))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.config.refresh_token.as_str()),
            ])
            .send()
            .await?;
        let resp = ensure_success(resp).await.map_err(|e| match e {
            ForumError::Status { status, body } => {
                ForumError::Auth(format!("token endpoint returned {}: {}", status, body))
            }
            other => other,
        })?;

        let body: TokenResponse = resp.json().await?;
        if let Some(err) = body.error {
            return Err(ForumError::Auth(err));
        }
        let value = body
            .access_token
            .ok_or_else(|| ForumError::Auth("token response without access_token".to_string()))?;
        let expires_at = Instant::now() + Duration::from_secs(body.expires_in.unwrap_or(3600));

        *guard = Some(AccessToken {
            value: value.clone(),
            expires_at,
        });
        info!("Reddit access token refreshed");
        Ok(value)
    }

    async fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder, ForumError> {
        let token = self.access_token().await?;
        Ok(req.bearer_auth(token))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ForumError> {
        let req = self
            .http
            .get(format!("{}{}", self.config.api_base, path))
            .query(query)
            .query(&[("raw_json", "1")]);
        let resp = self.authorized(req).await?.send().await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.json::<T>().await?)
    }
}

async fn ensure_success(resp: Response) -> Result<Response, ForumError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ForumError::Status {
        status: status.as_u16(),
        body,
    })
}

fn post_fullname(post_id: &str) -> String {
    if post_id.starts_with("t3_") {
        post_id.to_string()
    } else {
        format!("t3_{}", post_id)
    }
}

#[async_trait]
impl ForumClient for RedditClient {
    async fn new_comments(
        &self,
        channel: &ChannelName,
        limit: u32,
    ) -> Result<Vec<Comment>, ForumError> {
        let limit = limit.to_string();
        let listing: Listing<RawComment> = self
            .get_json(
                &format!("/r/{}/comments", channel.as_str()),
                &[("limit", limit.as_str())],
            )
            .await?;
        Ok(listing.into_kind(KIND_COMMENT).map(Comment::from).collect())
    }

    async fn fetch_post(&self, post_id: &str) -> Result<Post, ForumError> {
        let fullname = post_fullname(post_id);
        let listing: Listing<RawPost> = self
            .get_json("/api/info", &[("id", fullname.as_str())])
            .await?;
        listing
            .into_kind(KIND_POST)
            .next()
            .map(Post::from)
            .ok_or(ForumError::NotFound(fullname))
    }

    async fn reply(&self, comment: &Comment, text: &str) -> Result<(), ForumError> {
        let req = self
            .http
            .post(format!("{}/api/comment", self.config.api_base))
            .form(&[
                ("api_type", "json"),
                ("thing_id", comment.name.as_str()),
                ("text", text),
            ]);
        let resp = self.authorized(req).await?.send().await?;
        let resp = ensure_success(resp).await?;

        let body: CommentResponse = resp.json().await?;
        if !body.json.errors.is_empty() {
            let errors: Vec<String> = body.json.errors.iter().map(Value::to_string).collect();
            return Err(ForumError::Rejected(errors.join("; ")));
        }
        Ok(())
    }
}
