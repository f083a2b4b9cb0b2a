//! Integration test: background generation
//!
//! A slow backend must never stall a turn past its budget, a busy session
//! answers with fallbacks, and a late quest description is applied to the
//! quest it was generated for.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use encounter::character::{Npc, Player};
use encounter::encounter::EncounterState;
use encounter::narrative::{
    GenerationSession, NarrativeError, NarrativeGenerator, NarrativeOutput, NarrativeRequest,
    Submission,
};
use encounter::quest::QuestPolicy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Holds every request until the test lets it through.
struct SlowGenerator {
    gate: Mutex<Receiver<()>>,
}

impl NarrativeGenerator for SlowGenerator {
    fn generate(&self, request: &NarrativeRequest) -> Result<NarrativeOutput, NarrativeError> {
        let gate = self.gate.lock().unwrap();
        gate.recv().map_err(|_| NarrativeError::Disconnected)?;
        Ok(NarrativeOutput::Text(format!(
            "The bards sing of {}.",
            request.npc_name()
        )))
    }
}

fn slow() -> (Arc<SlowGenerator>, Sender<()>) {
    let (tx, rx) = mpsc::channel();
    (Arc::new(SlowGenerator { gate: Mutex::new(rx) }), tx)
}

fn wait_until_idle(policy: &mut QuestPolicy) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while policy.is_generating() {
        assert!(Instant::now() < deadline, "generation never finished");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_busy_session_falls_back_without_waiting() {
    let (generator, release) = slow();
    let mut session = GenerationSession::new(generator);

    let request = NarrativeRequest::QuestDescription {
        quest_type: encounter::quest::QuestType::Talk,
        npc_name: "Merchant".to_string(),
    };
    assert_eq!(session.submit(request.clone()), Submission::Pending);

    let started = Instant::now();
    let text = session.request_quest_completion(
        encounter::quest::QuestType::Talk,
        "Merchant",
        Duration::from_secs(30),
    );
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(text, "Quest complete! Merchant has been dealt with.");

    release.send(()).unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    let done = loop {
        if let Some(done) = session.fetch_result() {
            break done;
        }
        assert!(Instant::now() < deadline, "generation never landed");
        thread::sleep(Duration::from_millis(5));
    };
    assert_eq!(done.request, request);
    assert_eq!(done.output.into_text(), "The bards sing of Merchant.");
}

#[test]
fn test_late_description_reconciled_onto_current_quest() {
    let (generator, release) = slow();
    let mut policy = QuestPolicy::new(generator, Duration::from_millis(20));
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut state = EncounterState::new(Player::default(), vec![Npc::enemy("Goblin", 50, 7)]);

    policy.refresh_quest(&mut state, &mut rng);
    let quest = state.current_quest.clone().expect("quest");
    assert_eq!(quest.description, "Quest: Help Goblin with an important task.");
    assert!(policy.is_generating());

    release.send(()).unwrap();
    wait_until_idle(&mut policy);

    assert_eq!(policy.reconcile_late_results(&mut state), 1);
    let updated = state.current_quest.as_ref().expect("quest");
    assert_eq!(updated.id, quest.id);
    assert_eq!(updated.description, "The bards sing of Goblin.");
    assert_eq!(
        state.player.quest_log.active[0].description,
        "The bards sing of Goblin."
    );
}

#[test]
fn test_late_description_dropped_when_quest_moved_on() {
    let (generator, release) = slow();
    let mut policy = QuestPolicy::new(generator, Duration::from_millis(20));
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let mut state = EncounterState::new(Player::default(), vec![Npc::enemy("Goblin", 50, 7)]);

    policy.refresh_quest(&mut state, &mut rng);
    state.npcs[0].stats.current_hp = 0;
    policy.refresh_quest(&mut state, &mut rng);
    assert!(state.current_quest.is_none());

    release.send(()).unwrap();
    wait_until_idle(&mut policy);
    assert_eq!(policy.reconcile_late_results(&mut state), 0);
    assert!(state.current_quest.is_none());
}
