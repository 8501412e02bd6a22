//! Integration tests for the triage workflow
//!
//! These tests drive the assembled workflow end to end through mock ports.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use triage_rs::error::{ModelError, TriageError};
use triage_rs::model::{Content, GenerationConfig, Model};
use triage_rs::triage::trigger::IssueEvent;
use triage_rs::triage::{
    build_workflow, process_issue, Classification, Classifier, IssueTracker, LlmClassifier,
    TriageOptions,
};
use triage_rs::workflow::graph::ExecutionMode;

// ============================================================================
// Mock Components
// ============================================================================

/// Mock model that always answers with the same text
struct MockModel {
    answer: String,
}

impl MockModel {
    fn new(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: answer.to_string(),
        })
    }
}

#[async_trait]
impl Model for MockModel {
    async fn generate_content(
        &self,
        _history: &[Content],
        _config: Option<&GenerationConfig>,
    ) -> Result<Content, ModelError> {
        Ok(Content::text("model", self.answer.clone()))
    }
}

/// Classifier whose provider is down
struct UnavailableClassifier;

#[async_trait]
impl Classifier for UnavailableClassifier {
    async fn classify(&self, _title: &str, _body: &str) -> Result<Classification, TriageError> {
        Err(TriageError::ClassifierUnavailable("connection refused".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Label(u64, String),
    Comment(u64, String),
}

/// Tracker that records every call and can be told to fail on one label
#[derive(Default)]
struct MockTracker {
    calls: Mutex<Vec<Call>>,
    fail_on_label: Option<String>,
}

impl MockTracker {
    fn failing_on(label: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on_label: Some(label.to_string()),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn labels(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Label(_, l) => Some(l),
                Call::Comment(..) => None,
            })
            .collect()
    }
}

#[async_trait]
impl IssueTracker for MockTracker {
    async fn add_label(&self, issue_id: u64, label: &str) -> Result<(), TriageError> {
        if self.fail_on_label.as_deref() == Some(label) {
            return Err(TriageError::action_failed("add_label", "502 Bad Gateway"));
        }
        self.calls
            .lock()
            .unwrap()
            .push(Call::Label(issue_id, label.to_string()));
        Ok(())
    }

    async fn post_comment(&self, issue_id: u64, body: &str) -> Result<(), TriageError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Comment(issue_id, body.to_string()));
        Ok(())
    }
}

fn answer(label: &str, confidence: f64) -> String {
    format!(
        r#"{{"classification": "{}", "confidence": {}}}"#,
        label, confidence
    )
}

async fn triage_with(
    model_answer: &str,
    options: &TriageOptions,
    tracker: Arc<MockTracker>,
) -> Result<triage_rs::workflow::state::IssueState, TriageError> {
    let classifier = Arc::new(LlmClassifier::new(
        MockModel::new(model_answer),
        options.labels.clone(),
    ));
    let workflow = build_workflow(classifier, tracker, options).expect("workflow should compile");
    process_issue(&workflow, 42, "NPE on null input", "Steps: ...").await
}

fn review_comment() -> String {
    TriageOptions::default().review_comment
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[tokio::test]
async fn test_high_confidence_applies_single_label() {
    let tracker = Arc::new(MockTracker::default());
    let state = triage_with(&answer("Bug", 0.95), &TriageOptions::default(), tracker.clone())
        .await
        .expect("triage failed");

    assert_eq!(tracker.calls(), vec![Call::Label(42, "bug".to_string())]);
    assert_eq!(state.classification(), Some(("bug", 0.95)));
}

#[tokio::test]
async fn test_low_confidence_labels_marks_and_requests_review() {
    let tracker = Arc::new(MockTracker::default());
    triage_with(&answer("enhancement", 0.4), &TriageOptions::default(), tracker.clone())
        .await
        .expect("triage failed");

    assert_eq!(
        tracker.calls(),
        vec![
            Call::Label(42, "enhancement".to_string()),
            Call::Label(42, "low_confidence".to_string()),
            Call::Comment(42, review_comment()),
        ]
    );
}

#[tokio::test]
async fn test_unparsable_answer_aborts_without_actions() {
    let tracker = Arc::new(MockTracker::default());
    let result = triage_with(
        "This looks like a bug to me.",
        &TriageOptions::default(),
        tracker.clone(),
    )
    .await;

    assert!(matches!(result, Err(TriageError::ClassificationParse(_))));
    assert!(tracker.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_label_aborts_without_actions() {
    let tracker = Arc::new(MockTracker::default());
    let result = triage_with(&answer("duplicate", 0.99), &TriageOptions::default(), tracker.clone()).await;

    assert!(matches!(result, Err(TriageError::ClassificationParse(_))));
    assert!(tracker.calls().is_empty());
}

#[tokio::test]
async fn test_confidence_equal_to_threshold_takes_single_label_path() {
    let tracker = Arc::new(MockTracker::default());
    triage_with(&answer("question", 0.8), &TriageOptions::default(), tracker.clone())
        .await
        .expect("triage failed");

    assert_eq!(tracker.calls(), vec![Call::Label(42, "question".to_string())]);
}

#[tokio::test]
async fn test_low_confidence_branch_never_drops_classification_label() {
    for confidence in [0.0, 0.1, 0.5, 0.79] {
        let tracker = Arc::new(MockTracker::default());
        triage_with(&answer("bug", confidence), &TriageOptions::default(), tracker.clone())
            .await
            .expect("triage failed");

        let labels = tracker.labels();
        assert!(labels.contains(&"bug".to_string()), "confidence {}", confidence);
        assert!(labels.contains(&"low_confidence".to_string()));
        assert_eq!(tracker.calls().len(), 3);
    }
}

#[tokio::test]
async fn test_custom_threshold_and_marker() {
    let options = TriageOptions {
        threshold: 0.5,
        low_confidence_label: "needs-triage".to_string(),
        ..TriageOptions::default()
    };

    let confident = Arc::new(MockTracker::default());
    triage_with(&answer("bug", 0.6), &options, confident.clone())
        .await
        .unwrap();
    assert_eq!(confident.calls().len(), 1);

    let unsure = Arc::new(MockTracker::default());
    triage_with(&answer("bug", 0.3), &options, unsure.clone())
        .await
        .unwrap();
    assert_eq!(unsure.labels(), vec!["bug", "needs-triage"]);
}

#[tokio::test]
async fn test_concurrent_mode_matches_sequential_outcome() {
    let options = TriageOptions {
        execution: ExecutionMode::Concurrent,
        ..TriageOptions::default()
    };
    let tracker = Arc::new(MockTracker::default());
    triage_with(&answer("enhancement", 0.4), &options, tracker.clone())
        .await
        .expect("triage failed");

    let mut calls = tracker.calls();
    calls.sort_by_key(|c| format!("{:?}", c));
    let mut expected = vec![
        Call::Label(42, "enhancement".to_string()),
        Call::Label(42, "low_confidence".to_string()),
        Call::Comment(42, review_comment()),
    ];
    expected.sort_by_key(|c| format!("{:?}", c));
    assert_eq!(calls, expected);
}

// ============================================================================
// Failure propagation
// ============================================================================

#[tokio::test]
async fn test_classifier_unavailable_surfaces_error() {
    let tracker = Arc::new(MockTracker::default());
    let workflow = build_workflow(
        Arc::new(UnavailableClassifier),
        tracker.clone(),
        &TriageOptions::default(),
    )
    .unwrap();

    let result = process_issue(&workflow, 7, "t", "b").await;

    assert!(matches!(result, Err(TriageError::ClassifierUnavailable(_))));
    assert!(tracker.calls().is_empty());
}

#[tokio::test]
async fn test_failed_action_keeps_completed_side_effects() {
    let tracker = Arc::new(MockTracker::failing_on("low_confidence"));
    let result = triage_with(&answer("bug", 0.2), &TriageOptions::default(), tracker.clone()).await;

    assert!(matches!(result, Err(TriageError::ActionFailed { .. })));
    // The classification label was applied before the failure and stays.
    assert_eq!(tracker.calls(), vec![Call::Label(42, "bug".to_string())]);
}

#[tokio::test]
async fn test_invalid_threshold_rejected_at_build() {
    let options = TriageOptions {
        threshold: 2.0,
        ..TriageOptions::default()
    };
    let result = build_workflow(
        Arc::new(UnavailableClassifier),
        Arc::new(MockTracker::default()),
        &options,
    );
    assert!(matches!(result, Err(TriageError::Config(_))));
}

// ============================================================================
// Trigger
// ============================================================================

#[tokio::test]
async fn test_event_payload_runs_triage() {
    let payload = r#"{
        "action": "opened",
        "issue": {
            "number": 101,
            "title": "Sample issue title",
            "body": "Steps to reproduce the problem...",
            "state": "open"
        }
    }"#;

    let initial = IssueEvent::from_json(payload)
        .unwrap()
        .into_initial_state()
        .expect("event should be eligible");

    let tracker = Arc::new(MockTracker::default());
    let classifier = Arc::new(LlmClassifier::new(
        MockModel::new(&answer("bug", 0.9)),
        TriageOptions::default().labels,
    ));
    let workflow = build_workflow(classifier, tracker.clone(), &TriageOptions::default()).unwrap();

    let state = workflow.run(initial).await.unwrap();

    assert_eq!(state.issue_id(), 101);
    assert_eq!(tracker.calls(), vec![Call::Label(101, "bug".to_string())]);
}

// ============================================================================
// Error Type Tests
// ============================================================================

#[test]
fn test_action_failed_message() {
    let err = TriageError::action_failed("add_label", "Rate limit exceeded");
    assert!(err.to_string().contains("add_label"));
    assert!(err.to_string().contains("Rate limit"));
}

#[test]
fn test_model_error_maps_to_classifier_unavailable() {
    let err: TriageError = ModelError::Api {
        status: 503,
        message: "overloaded".to_string(),
    }
    .into();
    assert!(matches!(err, TriageError::ClassifierUnavailable(ref m) if m.contains("503")));
}

#[test]
fn test_malformed_model_reply_maps_to_classification_parse() {
    let err: TriageError =
        ModelError::InvalidResponse("No choices in OpenAI response".to_string()).into();
    assert!(matches!(err, TriageError::ClassificationParse(ref m) if m.contains("No choices")));
}
