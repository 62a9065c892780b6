use std::fmt;

use serde::{Deserialize, Serialize};

/// Every capability the orchestrator knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    FetchHeadlines,
    SendMessage,
    FetchRecentPosts,
    PostMessage,
    #[serde(rename = "summarize_document")]
    ExtractAndSummarizeDocument,
    WebSearch,
}

impl CapabilityKind {
    pub const ALL: [CapabilityKind; 6] = [
        CapabilityKind::FetchHeadlines,
        CapabilityKind::SendMessage,
        CapabilityKind::FetchRecentPosts,
        CapabilityKind::PostMessage,
        CapabilityKind::ExtractAndSummarizeDocument,
        CapabilityKind::WebSearch,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CapabilityKind::FetchHeadlines => "fetch_headlines",
            CapabilityKind::SendMessage => "send_message",
            CapabilityKind::FetchRecentPosts => "fetch_recent_posts",
            CapabilityKind::PostMessage => "post_message",
            CapabilityKind::ExtractAndSummarizeDocument => "summarize_document",
            CapabilityKind::WebSearch => "web_search",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlinesRequest {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRequest {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentPostsRequest {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRequest {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// The structured record handed to a capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "capability", rename_all = "snake_case")]
pub enum CapabilityInput {
    FetchHeadlines(HeadlinesRequest),
    SendMessage(MessageRequest),
    FetchRecentPosts(RecentPostsRequest),
    PostMessage(PostRequest),
    #[serde(rename = "summarize_document")]
    ExtractAndSummarizeDocument(DocumentRequest),
    WebSearch(SearchRequest),
}

impl CapabilityInput {
    pub fn kind(&self) -> CapabilityKind {
        match self {
            CapabilityInput::FetchHeadlines(_) => CapabilityKind::FetchHeadlines,
            CapabilityInput::SendMessage(_) => CapabilityKind::SendMessage,
            CapabilityInput::FetchRecentPosts(_) => CapabilityKind::FetchRecentPosts,
            CapabilityInput::PostMessage(_) => CapabilityKind::PostMessage,
            CapabilityInput::ExtractAndSummarizeDocument(_) => {
                CapabilityKind::ExtractAndSummarizeDocument
            }
            CapabilityInput::WebSearch(_) => CapabilityKind::WebSearch,
        }
    }
}

impl From<HeadlinesRequest> for CapabilityInput {
    fn from(request: HeadlinesRequest) -> Self {
        CapabilityInput::FetchHeadlines(request)
    }
}

impl From<MessageRequest> for CapabilityInput {
    fn from(request: MessageRequest) -> Self {
        CapabilityInput::SendMessage(request)
    }
}

impl From<RecentPostsRequest> for CapabilityInput {
    fn from(request: RecentPostsRequest) -> Self {
        CapabilityInput::FetchRecentPosts(request)
    }
}

impl From<PostRequest> for CapabilityInput {
    fn from(request: PostRequest) -> Self {
        CapabilityInput::PostMessage(request)
    }
}

impl From<DocumentRequest> for CapabilityInput {
    fn from(request: DocumentRequest) -> Self {
        CapabilityInput::ExtractAndSummarizeDocument(request)
    }
}

impl From<SearchRequest> for CapabilityInput {
    fn from(request: SearchRequest) -> Self {
        CapabilityInput::WebSearch(request)
    }
}
