use std::env;
use std::time::Duration;

const USER_AGENT: &str = concat!("prompt-dispatch/", env!("CARGO_PKG_VERSION"));

/// Credentials and endpoints for the built-in capabilities.
#[derive(Debug, Clone, Default)]
pub struct ToolsConfig {
    pub headlines: HeadlinesConfig,
    pub email: EmailConfig,
    pub social: SocialConfig,
    pub document: DocumentConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone)]
pub struct HeadlinesConfig {
    pub attempts: u32,
    pub retry_pause: Duration,
    pub timeout: Duration,
    pub limit: usize,
}

impl Default for HeadlinesConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            retry_pause: Duration::from_secs(2),
            timeout: Duration::from_secs(10),
            limit: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender: Option<String>,
    pub password: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            sender: None,
            password: None,
        }
    }
}

/// X (Twitter) API v2 access.
#[derive(Debug, Clone)]
pub struct SocialConfig {
    pub api_base: String,
    pub bearer_token: Option<String>,
    pub max_results: u32,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.twitter.com/2".to_string(),
            bearer_token: None,
            max_results: 10,
        }
    }
}

/// OpenAI-compatible chat endpoint used to summarize extracted text.
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub engine_id: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.googleapis.com/customsearch/v1".to_string(),
            api_key: None,
            engine_id: None,
        }
    }
}

impl ToolsConfig {
    /// Reads credentials from the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.email.sender = var("SMTP_EMAIL");
        config.email.password = var("SMTP_PASSWORD");
        if let Some(host) = var("SMTP_HOST") {
            config.email.smtp_host = host;
        }
        if let Some(port) = var("SMTP_PORT").and_then(|port| port.parse().ok()) {
            config.email.smtp_port = port;
        }

        config.social.bearer_token = var("TWITTER_BEARER_TOKEN");
        if let Some(base) = var("TWITTER_API_BASE") {
            config.social.api_base = base;
        }

        config.document.api_key = var("OPENAI_API_KEY");
        if let Some(base_url) = var("OPENAI_BASE_URL") {
            config.document.base_url = base_url;
        }
        if let Some(model) = var("OPENAI_MODEL") {
            config.document.model = model;
        }

        config.search.api_key = var("GOOGLE_API_KEY");
        config.search.engine_id = var("GOOGLE_CSE_ID");

        config.log_summary();
        config
    }

    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
    }

    fn log_summary(&self) {
        log::info!("Capability configuration:");
        log::info!(
            "  SMTP: {} (credentials: {})",
            self.email.smtp_host,
            self.email.sender.is_some() && self.email.password.is_some()
        );
        log::info!(
            "  X API: {} (token: {})",
            self.social.api_base,
            self.social.bearer_token.is_some()
        );
        log::info!(
            "  Summarizer: {} / {} (key: {})",
            self.document.base_url,
            self.document.model,
            self.document.api_key.is_some()
        );
        log::info!(
            "  Web search: {}",
            self.search.api_key.is_some() && self.search.engine_id.is_some()
        );
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
