//! One-at-a-time background generation.
//!
//! A session owns at most one in-flight request. Slow backends run on a
//! worker thread and report back over an mpsc channel; a second request
//! while one is in flight gets its fallback text immediately instead of
//! queueing.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::error::NarrativeError;
use super::generator::{DialogueContext, NarrativeGenerator, NarrativeOutput, NarrativeRequest};
use crate::character::Disposition;
use crate::quest::QuestType;

/// Immediate answer to a submitted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Inline backend answered on the spot.
    Ready(NarrativeOutput),
    /// Worker spawned; poll `fetch_result` later.
    Pending,
    /// Another generation is in flight; here is the fallback.
    Fallback(NarrativeOutput),
}

/// A generation that finished after being submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedGeneration {
    pub request: NarrativeRequest,
    pub output: NarrativeOutput,
    /// True when the caller stopped waiting and already used the fallback.
    pub abandoned: bool,
}

struct PendingGeneration {
    request: NarrativeRequest,
    receiver: Receiver<Result<NarrativeOutput, NarrativeError>>,
    abandoned: bool,
}

pub struct GenerationSession {
    generator: Arc<dyn NarrativeGenerator>,
    pending: Option<PendingGeneration>,
    landed: VecDeque<CompletedGeneration>,
}

impl GenerationSession {
    pub fn new(generator: Arc<dyn NarrativeGenerator>) -> Self {
        Self {
            generator,
            pending: None,
            landed: VecDeque::new(),
        }
    }

    /// Non-blocking. Also moves a finished worker result into the landed queue.
    pub fn is_busy(&mut self) -> bool {
        self.poll();
        self.pending.is_some()
    }

    /// Non-blocking. Oldest finished generation first.
    pub fn fetch_result(&mut self) -> Option<CompletedGeneration> {
        self.poll();
        self.landed.pop_front()
    }

    pub fn submit(&mut self, request: NarrativeRequest) -> Submission {
        if self.is_busy() {
            tracing::warn!(
                "Generation already in progress; using fallback for {}",
                request.kind()
            );
            return Submission::Fallback(request.fallback());
        }

        if self.generator.runs_inline() {
            return Submission::Ready(resolve(&request, self.generator.generate(&request)));
        }

        let (tx, rx) = mpsc::channel();
        let generator = Arc::clone(&self.generator);
        let worker_request = request.clone();
        thread::spawn(move || {
            let result = generator.generate(&worker_request);
            let _ = tx.send(result);
        });
        tracing::debug!("Spawned generation worker for {}", request.kind());

        self.pending = Some(PendingGeneration {
            request,
            receiver: rx,
            abandoned: false,
        });
        Submission::Pending
    }

    /// Submit and wait up to `budget`.
    ///
    /// On timeout the fallback is returned and the worker keeps running; the
    /// session stays busy until it lands, and the late result shows up in
    /// `fetch_result` marked as abandoned.
    pub fn request_blocking(&mut self, request: NarrativeRequest, budget: Duration) -> NarrativeOutput {
        match self.submit(request) {
            Submission::Ready(output) | Submission::Fallback(output) => output,
            Submission::Pending => self.wait(budget),
        }
    }

    pub fn request_quest_description(
        &mut self,
        quest_type: QuestType,
        npc_name: &str,
        budget: Duration,
    ) -> String {
        let request = NarrativeRequest::QuestDescription {
            quest_type,
            npc_name: npc_name.to_string(),
        };
        self.request_blocking(request, budget).into_text()
    }

    pub fn request_npc_dialogue(
        &mut self,
        npc_name: &str,
        disposition: Disposition,
        context: DialogueContext,
        budget: Duration,
    ) -> Vec<String> {
        let request = NarrativeRequest::NpcDialogue {
            npc_name: npc_name.to_string(),
            disposition,
            context,
        };
        self.request_blocking(request, budget).into_lines()
    }

    pub fn request_quest_completion(
        &mut self,
        quest_type: QuestType,
        npc_name: &str,
        budget: Duration,
    ) -> String {
        let request = NarrativeRequest::QuestCompletion {
            npc_name: npc_name.to_string(),
            quest_type,
        };
        self.request_blocking(request, budget).into_text()
    }

    fn wait(&mut self, budget: Duration) -> NarrativeOutput {
        let Some(pending) = self.pending.as_mut() else {
            return NarrativeOutput::Lines(Vec::new());
        };

        match pending.receiver.recv_timeout(budget) {
            Ok(result) => {
                let request = pending.request.clone();
                self.pending = None;
                resolve(&request, result)
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    "Generation of {} exceeded {:?}; using fallback",
                    pending.request.kind(),
                    budget
                );
                pending.abandoned = true;
                pending.request.fallback()
            }
            Err(RecvTimeoutError::Disconnected) => {
                let request = pending.request.clone();
                self.pending = None;
                resolve(&request, Err(NarrativeError::Disconnected))
            }
        }
    }

    fn poll(&mut self) {
        let Some(pending) = self.pending.as_ref() else {
            return;
        };
        let result = match pending.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(NarrativeError::Disconnected),
        };
        if let Some(pending) = self.pending.take() {
            let output = resolve(&pending.request, result);
            self.landed.push_back(CompletedGeneration {
                request: pending.request,
                output,
                abandoned: pending.abandoned,
            });
        }
    }
}

/// Backend result or the request's fallback, with failures logged.
fn resolve(request: &NarrativeRequest, result: Result<NarrativeOutput, NarrativeError>) -> NarrativeOutput {
    match result {
        Ok(output) if !output.is_empty() => output,
        Ok(_) => {
            tracing::warn!("Empty {} from generator; using fallback", request.kind());
            request.fallback()
        }
        Err(err) => {
            tracing::warn!("Failed to generate {}: {}", request.kind(), err);
            request.fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrative::TemplateGenerator;
    use std::sync::Mutex;

    /// Blocks until released through the returned sender.
    struct GatedGenerator {
        gate: Mutex<Receiver<()>>,
    }

    impl NarrativeGenerator for GatedGenerator {
        fn generate(&self, request: &NarrativeRequest) -> Result<NarrativeOutput, NarrativeError> {
            let gate = self.gate.lock().unwrap();
            let _ = gate.recv();
            Ok(NarrativeOutput::Text(format!("Gated {}", request.npc_name())))
        }
    }

    struct FailingGenerator;

    impl NarrativeGenerator for FailingGenerator {
        fn generate(&self, _request: &NarrativeRequest) -> Result<NarrativeOutput, NarrativeError> {
            Err(NarrativeError::Request("offline".to_string()))
        }

        fn runs_inline(&self) -> bool {
            true
        }
    }

    fn gated() -> (GenerationSession, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let generator = GatedGenerator { gate: Mutex::new(rx) };
        (GenerationSession::new(Arc::new(generator)), tx)
    }

    fn completion(name: &str) -> NarrativeRequest {
        NarrativeRequest::QuestCompletion {
            npc_name: name.to_string(),
            quest_type: QuestType::Defeat,
        }
    }

    #[test]
    fn test_inline_backend_is_ready() {
        let mut session = GenerationSession::new(Arc::new(TemplateGenerator::seeded(1)));
        assert!(matches!(session.submit(completion("Goblin")), Submission::Ready(_)));
        assert!(!session.is_busy());
        assert!(session.fetch_result().is_none());
    }

    #[test]
    fn test_backend_error_uses_fallback() {
        let mut session = GenerationSession::new(Arc::new(FailingGenerator));
        let text = session.request_quest_completion(QuestType::Defeat, "Goblin", Duration::from_millis(10));
        assert_eq!(text, "Quest complete! Goblin has been dealt with.");
    }

    #[test]
    fn test_busy_session_returns_fallback_immediately() {
        let (mut session, release) = gated();
        assert_eq!(session.submit(completion("Goblin")), Submission::Pending);
        assert!(session.is_busy());

        match session.submit(completion("Troll")) {
            Submission::Fallback(output) => {
                assert_eq!(output.into_text(), "Quest complete! Troll has been dealt with.")
            }
            other => panic!("expected fallback, got {:?}", other),
        }

        release.send(()).unwrap();
        let mut landed = None;
        for _ in 0..200 {
            if let Some(done) = session.fetch_result() {
                landed = Some(done);
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        let landed = landed.expect("generation never landed");
        assert_eq!(landed.output.into_text(), "Gated Goblin");
        assert!(!landed.abandoned);
        assert!(!session.is_busy());
    }

    #[test]
    fn test_timeout_marks_abandoned_and_stays_busy() {
        let (mut session, release) = gated();
        let output = session.request_blocking(completion("Goblin"), Duration::from_millis(20));
        assert_eq!(output.into_text(), "Quest complete! Goblin has been dealt with.");
        assert!(session.is_busy());

        release.send(()).unwrap();
        let mut landed = None;
        for _ in 0..200 {
            if let Some(done) = session.fetch_result() {
                landed = Some(done);
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        let landed = landed.expect("generation never landed");
        assert!(landed.abandoned);
        assert_eq!(landed.request, completion("Goblin"));
        assert!(!session.is_busy());
    }

    #[test]
    fn test_blocking_request_within_budget() {
        let (mut session, release) = gated();
        release.send(()).unwrap();
        let output = session.request_blocking(completion("Goblin"), Duration::from_secs(5));
        assert_eq!(output.into_text(), "Gated Goblin");
        assert!(!session.is_busy());
    }
}
