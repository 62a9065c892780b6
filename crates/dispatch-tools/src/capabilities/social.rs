//! X (Twitter) API v2 capabilities.
//!
//! Without a bearer token both capabilities answer with clearly marked mock
//! output so the rest of the workflow can still be exercised. A 401 from the
//! API is treated the same way, since free-tier tokens cannot read timelines.

use async_trait::async_trait;
use dispatch_core::{Capability, CapabilityFault, CapabilityInput, CapabilityKind};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::{truncate_chars, wrong_input};
use crate::config::SocialConfig;

const SUMMARY_LIMIT: usize = 200;
const POST_LIMIT: usize = 280;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Post {
    text: String,
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    id: String,
}

#[derive(Debug)]
enum ApiError {
    Unauthorized,
    Status(StatusCode, String),
    Transport(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Unauthorized => write!(f, "401 Unauthorized"),
            ApiError::Status(status, body) => write!(f, "HTTP {}: {}", status, body),
            ApiError::Transport(message) => f.write_str(message),
        }
    }
}

async fn read_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status(status, body));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))
}

fn mock_summary(username: &str) -> String {
    format!(
        "Summary of {}'s recent tweets: (Mock) Exciting updates coming soon! #Innovation",
        username
    )
}

/// Fetches the latest posts of an account and condenses the first three.
pub struct RecentPostsCapability {
    client: Client,
    config: SocialConfig,
}

impl RecentPostsCapability {
    pub fn new(client: Client, config: SocialConfig) -> Self {
        Self { client, config }
    }

    async fn fetch(&self, token: &str, username: &str) -> Result<String, ApiError> {
        let handle = username.trim_start_matches('@');

        let response = self
            .client
            .get(format!("{}/users/by/username/{}", self.config.api_base, handle))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let Some(user) = read_json::<Envelope<User>>(response).await?.data else {
            return Ok(format!("No user found with username {}", username));
        };

        let response = self
            .client
            .get(format!("{}/users/{}/tweets", self.config.api_base, user.id))
            .query(&[
                ("max_results", self.config.max_results.to_string()),
                ("tweet.fields", "text".to_string()),
            ])
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let posts = read_json::<Envelope<Vec<Post>>>(response)
            .await?
            .data
            .unwrap_or_default();
        if posts.is_empty() {
            return Ok(format!("No recent tweets found for {}", username));
        }

        let joined = posts
            .iter()
            .take(3)
            .map(|post| post.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(truncate_chars(
            &format!("Summary of {}'s recent tweets: {}", username, joined),
            SUMMARY_LIMIT,
        ))
    }
}

#[async_trait]
impl Capability for RecentPostsCapability {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::FetchRecentPosts
    }

    fn description(&self) -> &str {
        "Summarize recent posts from an X username"
    }

    async fn invoke(&self, input: CapabilityInput) -> Result<String, CapabilityFault> {
        let username = match input {
            CapabilityInput::FetchRecentPosts(request) => request.username,
            other => return Err(wrong_input(self.kind(), &other)),
        };

        let Some(token) = self.config.bearer_token.as_deref() else {
            log::warn!("X API token not configured, returning mock posts for {}", username);
            return Ok(mock_summary(&username));
        };

        match self.fetch(token, &username).await {
            Ok(summary) => Ok(summary),
            Err(ApiError::Unauthorized) => {
                log::warn!("X API rejected the token (401), returning mock posts for {}", username);
                Ok(mock_summary(&username))
            }
            Err(error) => {
                let message = format!("Error summarizing tweets for {}: {}", username, error);
                log::error!("{}", message);
                Ok(message)
            }
        }
    }
}

/// Publishes a post, truncated to the platform limit.
pub struct PostMessageCapability {
    client: Client,
    config: SocialConfig,
}

impl PostMessageCapability {
    pub fn new(client: Client, config: SocialConfig) -> Self {
        Self { client, config }
    }

    async fn publish(&self, token: &str, content: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .post(format!("{}/tweets", self.config.api_base))
            .bearer_auth(token)
            .json(&json!({ "text": content }))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let created = read_json::<Envelope<CreatedPost>>(response)
            .await?
            .data
            .ok_or_else(|| ApiError::Transport("response carried no post".to_string()))?;
        Ok(created.id)
    }
}

#[async_trait]
impl Capability for PostMessageCapability {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::PostMessage
    }

    fn description(&self) -> &str {
        "Post a message with the given content"
    }

    async fn invoke(&self, input: CapabilityInput) -> Result<String, CapabilityFault> {
        let content = match input {
            CapabilityInput::PostMessage(request) => truncate_chars(&request.content, POST_LIMIT),
            other => return Err(wrong_input(self.kind(), &other)),
        };

        let Some(token) = self.config.bearer_token.as_deref() else {
            log::warn!("X API token not configured, simulating post");
            return Ok(format!("Tweet posted (mock): {}", content));
        };

        match self.publish(token, &content).await {
            Ok(id) => Ok(format!("Tweet posted: {} (Tweet ID: {})", content, id)),
            Err(ApiError::Unauthorized) => {
                log::warn!("X API rejected the token (401) while posting, simulating post");
                Ok(format!("Tweet posted (mock): {}", content))
            }
            Err(error) => {
                let message = format!("Error posting tweet: {}", error);
                log::error!("{}", message);
                Ok(message)
            }
        }
    }
}
