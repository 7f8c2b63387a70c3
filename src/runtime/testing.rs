//! Mock implementations for testing
//!
//! These mocks enable testing the session runtime without real I/O.

use super::{SessionController, SessionHandle, SessionSnapshot, SessionUpdate};
use crate::mode::OperationTarget;
use crate::transport::{Passage, ResponsePayload, Transport, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub const WAIT: Duration = Duration::from_secs(2);

pub fn passage(book: &str, chapter: &str, text: &str) -> Passage {
    Passage {
        book: book.to_string(),
        chapter: chapter.to_string(),
        text: text.to_string(),
    }
}

// ============================================================================
// Mock Transport
// ============================================================================

/// Mock transport that returns queued results
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<ResponsePayload, TransportError>>>,
    /// Record of all sends made
    pub calls: Mutex<Vec<(OperationTarget, String)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_reply(&self, text: &str) {
        self.queue(Ok(ResponsePayload::Reply(text.to_string())));
    }

    pub fn queue_passages(&self, passages: Vec<Passage>) {
        self.queue(Ok(ResponsePayload::Passages(passages)));
    }

    pub fn queue_error(&self, error: TransportError) {
        self.queue(Err(error));
    }

    fn queue(&self, result: Result<ResponsePayload, TransportError>) {
        self.responses.lock().unwrap().push_back(result);
    }

    pub fn recorded_calls(&self) -> Vec<(OperationTarget, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, target: &OperationTarget, message: &str) {
        self.calls
            .lock()
            .unwrap()
            .push((*target, message.to_string()));
    }

    fn next_result(&self) -> Result<ResponsePayload, TransportError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::network("No mock response queued")))
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        target: &OperationTarget,
        message: &str,
    ) -> Result<ResponsePayload, TransportError> {
        self.record(target, message);
        self.next_result()
    }
}

// ============================================================================
// Gated Mock Transport (holds the session in Awaiting)
// ============================================================================

/// Mock transport that blocks each send until the test releases it
pub struct GatedMockTransport {
    inner: MockTransport,
    gate: Notify,
    /// Notified when a send starts (for test synchronization)
    pub request_started: Notify,
}

impl GatedMockTransport {
    pub fn new() -> Self {
        Self {
            inner: MockTransport::new(),
            gate: Notify::new(),
            request_started: Notify::new(),
        }
    }

    pub fn queue_reply(&self, text: &str) {
        self.inner.queue_reply(text);
    }

    /// Let one blocked send complete
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn recorded_calls(&self) -> Vec<(OperationTarget, String)> {
        self.inner.recorded_calls()
    }

    pub async fn wait_started(&self) -> bool {
        tokio::time::timeout(WAIT, self.request_started.notified())
            .await
            .is_ok()
    }
}

#[async_trait]
impl Transport for GatedMockTransport {
    async fn send(
        &self,
        target: &OperationTarget,
        message: &str,
    ) -> Result<ResponsePayload, TransportError> {
        self.inner.record(target, message);
        self.request_started.notify_one();
        self.gate.notified().await;
        self.inner.next_result()
    }
}

// ============================================================================
// Test Session
// ============================================================================

pub struct TestSessionBuilder<T> {
    mode: String,
    seed: Option<String>,
    transport: T,
}

impl TestSessionBuilder<MockTransport> {
    pub fn new() -> Self {
        Self {
            mode: "qa".to_string(),
            seed: None,
            transport: MockTransport::new(),
        }
    }
}

impl<T: Transport + 'static> TestSessionBuilder<T> {
    pub fn mode(mut self, mode: &str) -> Self {
        self.mode = mode.to_string();
        self
    }

    pub fn seed(mut self, seed: &str) -> Self {
        self.seed = Some(seed.to_string());
        self
    }

    pub fn transport<U: Transport + 'static>(self, transport: U) -> TestSessionBuilder<U> {
        TestSessionBuilder {
            mode: self.mode,
            seed: self.seed,
            transport,
        }
    }

    pub fn build(self) -> TestSession<T> {
        let transport = Arc::new(self.transport);
        let handle = SessionController::spawn(&self.mode, self.seed, Arc::clone(&transport));
        TestSession { handle, transport }
    }
}

pub struct TestSession<T> {
    pub handle: SessionHandle,
    pub transport: Arc<T>,
}

impl<T> TestSession<T> {
    pub async fn submit(&self, text: &str) {
        self.handle.submit(text).await.expect("Failed to submit");
    }

    /// Wait for the first snapshot matching `pred`, skipping others
    pub async fn wait_for_snapshot(
        &mut self,
        pred: impl Fn(&SessionSnapshot) -> bool,
    ) -> Option<SessionSnapshot> {
        let deadline = tokio::time::Instant::now() + WAIT;
        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(50), self.handle.next_update()).await {
                Ok(Some(SessionUpdate::Snapshot(snapshot))) if pred(&snapshot) => {
                    return Some(snapshot);
                }
                Ok(None) => return None,
                _ => continue,
            }
        }
        None
    }

    /// Wait until the session is idle holding exactly `len` entries
    pub async fn wait_for_idle(&mut self, len: usize) -> Option<SessionSnapshot> {
        self.wait_for_snapshot(|s| !s.awaiting_response && s.transcript.len() == len)
            .await
    }

    pub async fn wait_for_rejection(&mut self) -> bool {
        let deadline = tokio::time::Instant::now() + WAIT;
        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(50), self.handle.next_update()).await {
                Ok(Some(SessionUpdate::Rejected { .. })) => return true,
                Ok(None) => return false,
                _ => continue,
            }
        }
        false
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;
    use crate::session::{Origin, TranscriptEntry, APOLOGY_TEXT};
    use tokio::sync::broadcast;

    #[tokio::test]
    async fn test_mock_transport() {
        let mock = MockTransport::new();
        mock.queue_reply("Hello");

        let result = mock.send(&Mode::Qa.target(), "hi").await.unwrap();
        assert_eq!(result, ResponsePayload::Reply("Hello".to_string()));

        // Second call should fail (no more responses)
        assert!(mock.send(&Mode::Qa.target(), "hi").await.is_err());
        assert_eq!(mock.recorded_calls().len(), 2);
    }

    /// Seed prompt is shown immediately and dispatched exactly once
    #[tokio::test]
    async fn test_seed_prompt_dispatched_once() {
        let transport = MockTransport::new();
        transport.queue_passages(vec![passage("Swann's Way", "Combray", "For a long time")]);
        transport.queue_reply("pong");

        let mut s = TestSessionBuilder::new()
            .mode("explore_lost_time")
            .seed("P")
            .transport(transport)
            .build();

        let first = s.wait_for_snapshot(|_| true).await.unwrap();
        assert_eq!(first.transcript[0], TranscriptEntry::user("P"));
        assert!(first.awaiting_response);
        assert_eq!(first.header.as_deref(), Some("P"));

        let done = s.wait_for_idle(2).await.unwrap();
        assert_eq!(done.transcript[1].origin, Origin::System);

        // Repeated construction signals are no-ops
        s.handle.start().await.unwrap();
        s.handle.start().await.unwrap();

        s.submit("ping").await;
        let done = s.wait_for_idle(4).await.unwrap();
        assert_eq!(done.transcript[3], TranscriptEntry::system("pong"));

        let calls = s.transport.recorded_calls();
        assert_eq!(
            calls,
            vec![
                (Mode::ExploreLostTime.target(), "P".to_string()),
                (Mode::ExploreLostTime.target(), "ping".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_blank_seed_is_not_sent() {
        let mut s = TestSessionBuilder::new().seed("   ").build();

        let first = s.wait_for_snapshot(|_| true).await.unwrap();
        assert!(first.transcript.is_empty());
        assert!(!first.awaiting_response);
        assert!(first.header.is_none());
        assert!(s.transport.recorded_calls().is_empty());
    }

    /// Failure surfaces as the apology entry and the session returns to idle
    #[tokio::test]
    async fn test_transport_failure_appends_apology() {
        let mut s = TestSessionBuilder::new().mode("qa").build();
        s.transport
            .queue_error(TransportError::network("connection refused"));

        let initial = s.wait_for_snapshot(|_| true).await.unwrap();
        assert!(initial.transcript.is_empty());
        assert_eq!(initial.label, "Q&A");

        s.submit("What is Combray?").await;
        let done = s.wait_for_idle(2).await.unwrap();
        assert_eq!(
            done.transcript,
            vec![
                TranscriptEntry::user("What is Combray?"),
                TranscriptEntry::system(APOLOGY_TEXT),
            ]
        );
        assert!(done.transcript[1].citation.is_none());
    }

    #[tokio::test]
    async fn test_submit_while_awaiting_is_rejected() {
        let gated = GatedMockTransport::new();
        gated.queue_reply("first answer");

        let mut s = TestSessionBuilder::new().transport(gated).build();
        s.submit("first").await;
        assert!(s.transport.wait_started().await);

        s.submit("second").await;
        assert!(s.wait_for_rejection().await);

        s.transport.release();
        let done = s.wait_for_idle(2).await.unwrap();
        assert_eq!(
            done.transcript,
            vec![
                TranscriptEntry::user("first"),
                TranscriptEntry::system("first answer"),
            ]
        );
        assert_eq!(s.transport.recorded_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_whitespace_submit_ignored() {
        let mut s = TestSessionBuilder::new().build();
        s.transport.queue_reply("answer");

        s.submit("  ").await;
        s.submit("real").await;

        let done = s.wait_for_idle(2).await.unwrap();
        assert_eq!(done.transcript[0], TranscriptEntry::user("real"));
        assert_eq!(
            s.transport.recorded_calls(),
            vec![(Mode::Qa.target(), "real".to_string())]
        );
    }

    #[tokio::test]
    async fn test_passages_append_cited_entries() {
        let mut s = TestSessionBuilder::new().mode("qa").build();
        s.transport.queue_passages(vec![
            passage("Swann's Way", "Combray", "one"),
            passage("Time Regained", "3", "two"),
        ]);
        s.transport.queue_passages(vec![]);

        s.submit("madeleine").await;
        let done = s.wait_for_idle(3).await.unwrap();
        let cited: Vec<_> = done.transcript[1..]
            .iter()
            .map(|e| {
                let c = e.citation.as_ref().unwrap();
                (c.source.as_str(), c.locator.as_str(), e.text.as_str())
            })
            .collect();
        assert_eq!(
            cited,
            vec![("Swann's Way", "Combray", "one"), ("Time Regained", "3", "two")]
        );

        // Empty result adds nothing but still clears the flag
        s.submit("nothing").await;
        let done = s.wait_for_idle(4).await.unwrap();
        assert_eq!(done.transcript[3], TranscriptEntry::user("nothing"));
    }

    #[tokio::test]
    async fn test_unknown_mode_routes_like_qa() {
        let transport = MockTransport::new();
        transport.queue_reply("ok");

        let mut s = TestSessionBuilder::new()
            .mode("garbage")
            .seed("hi")
            .transport(transport)
            .build();

        let done = s.wait_for_idle(2).await.unwrap();
        assert_eq!(done.mode, Mode::Qa);
        assert_eq!(done.label, "Q&A");
        assert_eq!(s.transport.recorded_calls()[0].0.path(), "/api/qa");
    }

    /// Every published transcript extends the previous one
    #[tokio::test]
    async fn test_transcript_grows_monotonically() {
        let mut s = TestSessionBuilder::new().build();
        s.transport.queue_reply("a");
        s.transport
            .queue_passages(vec![passage("Sodom and Gomorrah", "1", "b")]);
        s.transport.queue_error(TransportError::decode("bad body"));

        let mut rx = s.handle.subscribe();
        for (i, text) in ["one", "two", "three"].iter().enumerate() {
            s.submit(text).await;
            assert!(s.wait_for_idle(2 * (i + 1)).await.is_some());
        }

        let mut previous: Vec<TranscriptEntry> = Vec::new();
        while let Ok(update) = rx.try_recv() {
            if let SessionUpdate::Snapshot(snapshot) = update {
                assert!(snapshot.transcript.len() >= previous.len());
                assert_eq!(&snapshot.transcript[..previous.len()], previous.as_slice());
                previous = snapshot.transcript;
            }
        }
        assert_eq!(previous.len(), 6);
        assert_eq!(previous[5], TranscriptEntry::system(APOLOGY_TEXT));
    }

    /// A dispatch in flight still lands after the caller lets go
    #[tokio::test]
    async fn test_result_applied_after_handle_dropped() {
        let gated = GatedMockTransport::new();
        gated.queue_reply("late answer");

        let s = TestSessionBuilder::new().transport(gated).build();
        s.submit("question").await;
        assert!(s.transport.wait_started().await);

        let TestSession { handle, transport } = s;
        let mut rx = handle.subscribe();
        drop(handle);
        transport.release();

        let landed = tokio::time::timeout(WAIT, async {
            loop {
                match rx.recv().await {
                    Ok(SessionUpdate::Snapshot(snapshot)) if !snapshot.awaiting_response => {
                        return Some(snapshot);
                    }
                    Ok(_) => continue,
                    Err(_) => return None,
                }
            }
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(landed.transcript[1], TranscriptEntry::system("late answer"));

        // Nothing left to do, so the runtime shuts down
        let closed = tokio::time::timeout(WAIT, rx.recv()).await.unwrap();
        assert!(matches!(closed, Err(broadcast::error::RecvError::Closed)));
    }

    #[tokio::test]
    async fn test_snapshot_serializes_for_renderers() {
        let transport = MockTransport::new();
        transport.queue_reply("polished");
        let mut s = TestSessionBuilder::new()
            .mode("refine_prose")
            .seed("draft")
            .transport(transport)
            .build();

        let snapshot = s.wait_for_snapshot(|_| true).await.unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["mode"], "refine_prose");
        assert_eq!(json["label"], "Refine Prose");
        assert_eq!(json["header"], "draft");
        assert_eq!(json["awaiting_response"], true);
        assert_eq!(json["transcript"][0]["origin"], "user");
    }
}
