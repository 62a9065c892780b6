use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::*;
use crate::capability::{Capability, CapabilityKind};

/// Returns a canned response and records every input it receives.
struct ScriptedCapability {
    kind: CapabilityKind,
    response: Result<String, CapabilityFault>,
    calls: AtomicUsize,
    inputs: Mutex<Vec<CapabilityInput>>,
}

impl ScriptedCapability {
    fn new(kind: CapabilityKind, response: &str) -> Arc<Self> {
        Arc::new(Self {
            kind,
            response: Ok(response.to_string()),
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        })
    }

    fn faulting(kind: CapabilityKind, message: &str) -> Arc<Self> {
        Arc::new(Self {
            kind,
            response: Err(CapabilityFault::Failed(message.to_string())),
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_input(&self) -> Option<CapabilityInput> {
        self.inputs.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Capability for ScriptedCapability {
    fn kind(&self) -> CapabilityKind {
        self.kind
    }

    async fn invoke(&self, input: CapabilityInput) -> Result<String, CapabilityFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().unwrap().push(input);
        self.response.clone()
    }
}

struct PanickingCapability;

#[async_trait]
impl Capability for PanickingCapability {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::FetchRecentPosts
    }

    async fn invoke(&self, _input: CapabilityInput) -> Result<String, CapabilityFault> {
        panic!("rate limiter poisoned");
    }
}

struct Fixture {
    headlines: Arc<ScriptedCapability>,
    send: Arc<ScriptedCapability>,
    posts: Arc<ScriptedCapability>,
    post: Arc<ScriptedCapability>,
    document: Arc<ScriptedCapability>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            headlines: ScriptedCapability::new(
                CapabilityKind::FetchHeadlines,
                "1. Rust 2.0 released\n2. Show HN: a tiny kernel",
            ),
            send: ScriptedCapability::new(
                CapabilityKind::SendMessage,
                "Email sent to a@b.com with subject 'Hacker News Top Headlines'",
            ),
            posts: ScriptedCapability::new(
                CapabilityKind::FetchRecentPosts,
                "Starship flight to Mars next year. Tesla FSD update.",
            ),
            post: ScriptedCapability::new(CapabilityKind::PostMessage, "Post published: summary"),
            document: ScriptedCapability::new(
                CapabilityKind::ExtractAndSummarizeDocument,
                "Summary of PDF at report.pdf: quarterly numbers",
            ),
        }
    }

    fn table(&self) -> CapabilityTable {
        CapabilityTable::builder()
            .register_shared(self.headlines.clone())
            .and_then(|b| b.register_shared(self.send.clone()))
            .and_then(|b| b.register_shared(self.posts.clone()))
            .and_then(|b| b.register_shared(self.post.clone()))
            .and_then(|b| b.register_shared(self.document.clone()))
            .and_then(|b| b.build(&[]))
            .unwrap()
    }

    fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(DispatchConfig::default(), self.table()).unwrap()
    }

    fn total_calls(&self) -> usize {
        self.headlines.calls()
            + self.send.calls()
            + self.posts.calls()
            + self.post.calls()
            + self.document.calls()
    }
}

#[test]
fn construction_requires_workflow_capabilities() {
    let table = CapabilityTable::builder()
        .register_shared(ScriptedCapability::new(CapabilityKind::FetchHeadlines, "ok"))
        .unwrap()
        .build(&[])
        .unwrap();

    let result = Dispatcher::new(DispatchConfig::default(), table);
    assert!(matches!(
        result,
        Err(TableError::Missing(CapabilityKind::SendMessage))
    ));
}

#[tokio::test]
async fn document_prompt_passes_token_through() {
    let fixture = Fixture::new();
    let dispatcher = fixture.dispatcher();
    let prompt = "summarize the pdf report.pdf";

    assert_eq!(dispatcher.classify(prompt), Intent::SummarizeDocument);
    let output = dispatcher.run(Intent::SummarizeDocument, prompt).await;

    assert_eq!(output, "Summary of PDF at report.pdf: quarterly numbers");
    assert_eq!(fixture.document.calls(), 1);
    assert_eq!(fixture.total_calls(), 1);
    assert_eq!(
        fixture.document.last_input(),
        Some(CapabilityInput::ExtractAndSummarizeDocument(DocumentRequest {
            file_path: "report.pdf".to_string()
        }))
    );
}

#[tokio::test]
async fn document_output_is_returned_even_when_it_reports_an_error() {
    let mut fixture = Fixture::new();
    fixture.document = ScriptedCapability::new(
        CapabilityKind::ExtractAndSummarizeDocument,
        "Error: File not found at missing.pdf",
    );

    let output = fixture
        .dispatcher()
        .run(Intent::SummarizeDocument, "Summarize the PDF missing.pdf")
        .await;

    assert_eq!(output, "Error: File not found at missing.pdf");
}

#[tokio::test]
async fn document_at_path_keeps_whitespace_and_ignores_triggers() {
    let fixture = Fixture::new();
    let mut config = DispatchConfig::default();
    config.classifier.document_triggers = vec!["digest pdf".to_string()];
    let dispatcher = Dispatcher::new(config, fixture.table()).unwrap();

    let outcome = dispatcher
        .summarize_document_at("/srv/my uploads/abc.pdf")
        .await;

    assert_eq!(outcome.intent, Intent::SummarizeDocument);
    assert_eq!(
        outcome.into_text(),
        "Summary of PDF at report.pdf: quarterly numbers"
    );
    assert_eq!(fixture.total_calls(), 1);
    assert_eq!(
        fixture.document.last_input(),
        Some(CapabilityInput::ExtractAndSummarizeDocument(DocumentRequest {
            file_path: "/srv/my uploads/abc.pdf".to_string()
        }))
    );
}

#[tokio::test]
async fn document_at_path_fault_names_capability() {
    let mut fixture = Fixture::new();
    fixture.document =
        ScriptedCapability::faulting(CapabilityKind::ExtractAndSummarizeDocument, "disk gone");

    let output = fixture
        .dispatcher()
        .summarize_document_at("a.pdf")
        .await
        .into_text();

    assert_eq!(
        output,
        "Error running summarize_document for prompt 'Summarize the PDF at a.pdf': disk gone"
    );
}

#[tokio::test]
async fn document_prompt_without_reference_calls_nothing() {
    let fixture = Fixture::new();
    let outcome = fixture
        .dispatcher()
        .dispatch("summarize the pdf my report")
        .await;

    assert_eq!(outcome.intent, Intent::SummarizeDocument);
    assert_eq!(
        outcome.result,
        Err(DispatchError::MissingReference {
            label: "PDF".to_string()
        })
    );
    assert_eq!(
        outcome.into_text(),
        "Error: PDF file path not found in prompt. Please upload a PDF and try again."
    );
    assert_eq!(fixture.total_calls(), 0);
}

#[tokio::test]
async fn headlines_are_sent_to_extracted_recipient() {
    let fixture = Fixture::new();
    let prompt = "Scrape top headlines and email them to a@b.com";

    let output = fixture
        .dispatcher()
        .run(Intent::FetchAndDistributeHeadlines, prompt)
        .await;

    let headlines = "1. Rust 2.0 released\n2. Show HN: a tiny kernel";
    let confirmation = "Email sent to a@b.com with subject 'Hacker News Top Headlines'";
    let headline_at = output.find(headlines).expect("headlines in output");
    let confirmation_at = output.find(confirmation).expect("confirmation in output");
    assert!(headline_at < confirmation_at);

    assert_eq!(
        fixture.send.last_input(),
        Some(CapabilityInput::SendMessage(MessageRequest {
            recipient: "a@b.com".to_string(),
            subject: "Hacker News Top Headlines".to_string(),
            body: format!("Top 5 headlines from Hacker News:\n{}", headlines),
        }))
    );
    assert_eq!(
        fixture.headlines.last_input(),
        Some(CapabilityInput::FetchHeadlines(HeadlinesRequest {
            url: "https://news.ycombinator.com/".to_string()
        }))
    );
}

#[tokio::test]
async fn headlines_use_default_recipient_without_phrase() {
    let fixture = Fixture::new();

    fixture
        .dispatcher()
        .dispatch("scrape top headlines")
        .await;

    match fixture.send.last_input() {
        Some(CapabilityInput::SendMessage(request)) => {
            assert_eq!(request.recipient, "user@example.com")
        }
        other => panic!("unexpected send input: {:?}", other),
    }
}

#[tokio::test]
async fn headline_fetch_error_skips_delivery() {
    let mut fixture = Fixture::new();
    fixture.headlines = ScriptedCapability::new(CapabilityKind::FetchHeadlines, "Error: timeout");

    let outcome = fixture
        .dispatcher()
        .dispatch("scrape top headlines and email them to a@b.com")
        .await;

    assert!(!outcome.is_success());
    let text = outcome.into_text();
    assert_eq!(text, "Failed to fetch headlines: Error: timeout");
    assert_eq!(fixture.send.calls(), 0);
}

#[tokio::test]
async fn delivery_failure_keeps_headlines() {
    let mut fixture = Fixture::new();
    fixture.send = ScriptedCapability::new(
        CapabilityKind::SendMessage,
        "Error sending email to a@b.com: SMTP_EMAIL or SMTP_PASSWORD not set correctly",
    );

    let outcome = fixture
        .dispatcher()
        .dispatch("scrape top headlines and email them to a@b.com")
        .await;

    let text = outcome.into_text();
    assert!(text.contains("1. Rust 2.0 released"));
    assert!(text.ends_with("SMTP_EMAIL or SMTP_PASSWORD not set correctly"));
}

#[tokio::test]
async fn delivery_fault_names_capability_and_prompt() {
    let mut fixture = Fixture::new();
    fixture.send = ScriptedCapability::faulting(CapabilityKind::SendMessage, "relay refused");
    let prompt = "scrape top headlines";

    let outcome = fixture.dispatcher().dispatch(prompt).await;

    assert_eq!(
        outcome.result,
        Err(DispatchError::CapabilityFault {
            capability: CapabilityKind::SendMessage,
            prompt: prompt.to_string(),
            message: "relay refused".to_string(),
        })
    );
}

#[tokio::test]
async fn activity_summary_is_posted() {
    let fixture = Fixture::new();

    let output = fixture
        .dispatcher()
        .dispatch("Summary of Elon Musk tweets")
        .await
        .into_text();

    let expected_summary = "Summary of Elon Musk's recent posts:\n- Discussed Tesla, Mars exploration.";
    assert_eq!(
        output,
        format!(
            "Elon Musk's recent posts:\nStarship flight to Mars next year. Tesla FSD update.\n{}\nPost published: summary",
            expected_summary
        )
    );
    assert_eq!(
        fixture.post.last_input(),
        Some(CapabilityInput::PostMessage(PostRequest {
            content: expected_summary.to_string()
        }))
    );
    assert_eq!(
        fixture.posts.last_input(),
        Some(CapabilityInput::FetchRecentPosts(RecentPostsRequest {
            username: "@elonmusk".to_string()
        }))
    );
}

#[tokio::test]
async fn activity_in_log_mode_does_not_post() {
    let fixture = Fixture::new();
    let mut config = DispatchConfig::default();
    config.activity.publishing = SummaryPublishing::Log;
    let dispatcher = Dispatcher::new(config, fixture.table()).unwrap();

    let output = dispatcher
        .dispatch("elon musk tweets")
        .await
        .into_text();

    assert!(output.ends_with("Posted summary to log."));
    assert_eq!(fixture.post.calls(), 0);
}

#[tokio::test]
async fn activity_fetch_error_stops_before_posting() {
    let mut fixture = Fixture::new();
    fixture.posts = ScriptedCapability::new(
        CapabilityKind::FetchRecentPosts,
        "Error summarizing tweets for @elonmusk: 503",
    );

    let output = fixture
        .dispatcher()
        .dispatch("elon musk summary")
        .await
        .into_text();

    assert_eq!(
        output,
        "Failed to fetch recent posts: Error summarizing tweets for @elonmusk: 503"
    );
    assert_eq!(fixture.post.calls(), 0);
}

#[tokio::test]
async fn post_failure_is_reported_after_summary() {
    let mut fixture = Fixture::new();
    fixture.post = ScriptedCapability::new(CapabilityKind::PostMessage, "Error posting tweet: 403");

    let output = fixture
        .dispatcher()
        .dispatch("elon musk tweets")
        .await
        .into_text();

    assert!(output.contains("- Discussed Tesla, Mars exploration."));
    assert!(output.ends_with("Failed to post summary: Error posting tweet: 403"));
}

#[tokio::test]
async fn panicking_capability_becomes_fault() {
    let fixture = Fixture::new();
    let table = CapabilityTable::builder()
        .register_shared(fixture.headlines.clone())
        .and_then(|b| b.register_shared(fixture.send.clone()))
        .and_then(|b| b.register(PanickingCapability))
        .and_then(|b| b.register_shared(fixture.post.clone()))
        .and_then(|b| b.register_shared(fixture.document.clone()))
        .and_then(|b| b.build(&[]))
        .unwrap();
    let dispatcher = Dispatcher::new(DispatchConfig::default(), table).unwrap();

    let output = dispatcher.dispatch("elon musk tweets").await.into_text();

    assert_eq!(
        output,
        "Error running fetch_recent_posts for prompt 'elon musk tweets': capability panicked: rate limiter poisoned"
    );
    assert_eq!(fixture.post.calls(), 0);
}

#[tokio::test]
async fn unrecognized_prompt_returns_guidance() {
    let fixture = Fixture::new();
    let dispatcher = fixture.dispatcher();

    let outcome = dispatcher.dispatch("what is the weather").await;

    assert_eq!(outcome.intent, Intent::Unrecognized);
    assert!(outcome.is_success());
    assert_eq!(
        outcome.into_text(),
        "Prompt not recognized. Try asking about Hacker News headlines, Elon Musk's recent posts, or PDF summarization."
    );
    assert_eq!(fixture.total_calls(), 0);
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let fixture = Fixture::new();
    let dispatcher = fixture.dispatcher();
    let prompt = "scrape top headlines and email them to a@b.com";

    let first = dispatcher.run(Intent::FetchAndDistributeHeadlines, prompt).await;
    let second = dispatcher.run(Intent::FetchAndDistributeHeadlines, prompt).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn free_run_reports_missing_capability_as_fault() {
    let table = CapabilityTable::default();

    let output = run(Intent::FetchAndDistributeHeadlines, "scrape top headlines", &table).await;

    assert_eq!(
        output,
        "Error running fetch_headlines for prompt 'scrape top headlines': capability 'fetch_headlines' is not registered"
    );
}

#[tokio::test]
async fn run_honours_explicit_intent_over_prompt_text() {
    let fixture = Fixture::new();

    let output = fixture
        .dispatcher()
        .run(Intent::Unrecognized, "scrape top headlines")
        .await;

    assert!(output.starts_with("Prompt not recognized."));
    assert_eq!(fixture.total_calls(), 0);
}
