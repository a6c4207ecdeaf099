//! End-to-end conversation tests through `ChatService`.

use std::sync::Arc;
use std::thread;

use symptom_dx_core::dialogue::FallbackResult;
use symptom_dx_core::{
    Catalog, ChatService, DiagnosisEngine, FallbackError, LlmFallback, Stage, Turn, TurnOutcome,
};

const CATALOG_JSON: &str = include_str!("../data/diseases.json");

fn service() -> ChatService {
    let catalog = Catalog::from_json_str(CATALOG_JSON).unwrap();
    ChatService::new(Arc::new(DiagnosisEngine::new(catalog)))
}

#[test]
fn test_full_remedy_conversation() {
    let service = service();

    let reply = service.respond("10.0.0.1", "I have a fever and a cough");
    assert_eq!(reply.outcome, TurnOutcome::Diagnosed { disease: "Flu".into() });
    assert_eq!(reply.stage, Stage::AskRemedies);
    assert!(reply.text.contains("you may have Flu"));
    assert!(reply.text.ends_with("Would you like some home remedies for it?"));

    let reply = service.respond("10.0.0.1", "yes");
    assert_eq!(reply.outcome, TurnOutcome::RemediesDisclosed { disease: "Flu".into() });
    assert_eq!(reply.stage, Stage::AskPrevention);
    for remedy in ["Drink warm fluids", "Get plenty of rest", "Gargle with salt water"] {
        assert!(reply.text.contains(remedy), "missing remedy {remedy}");
    }

    let reply = service.respond("10.0.0.1", "Yeah!");
    assert_eq!(reply.outcome, TurnOutcome::PreventionDisclosed { disease: "Flu".into() });
    assert_eq!(reply.stage, Stage::Done);
    assert!(reply.text.contains("yearly flu vaccine"));

    let state = service.conversation("10.0.0.1").unwrap();
    assert_eq!(state.turn_history.len(), 6);
    assert_eq!(state.diagnosis_log.len(), 1);
    assert_eq!(state.diagnosis_log[0].input, "I have a fever and a cough");
    assert_eq!(state.diagnosis_log[0].symptoms, vec!["cough", "fever"]);
    assert_eq!(state.diagnosis_log[0].predictions[0].disease, "Flu");
}

#[test]
fn test_declining_remedies_reenters_diagnosis() {
    let service = service();

    service.respond("user", "fever, cough");
    let reply = service.respond("user", "no thanks");

    assert_eq!(reply.stage, Stage::Diagnosis);
    assert!(matches!(reply.outcome, TurnOutcome::NeedMoreDetail { found: 1, required: 2 }));

    // A fresh description diagnoses again from the declined state
    let reply = service.respond("user", "sneezing, itchy eyes, itchy throat");
    assert_eq!(
        reply.outcome,
        TurnOutcome::Diagnosed { disease: "Seasonal Allergies".into() }
    );
}

#[test]
fn test_disease_name_then_remedies() {
    let service = service();

    let reply = service.respond("user", "What helps with a migraine?");
    assert_eq!(
        reply.outcome,
        TurnOutcome::DiseaseRecognized { disease: "Migraine".into() }
    );

    let reply = service.respond("user", "ok");
    assert!(reply.text.contains("Rest in a dark, quiet room"));
    assert!(service.conversation("user").unwrap().diagnosis_log.is_empty());
}

#[test]
fn test_longest_disease_name_wins() {
    let service = service();

    let reply = service.respond("user", "is this the flu or the common cold?");

    assert_eq!(
        reply.outcome,
        TurnOutcome::DiseaseRecognized { disease: "Common Cold".into() }
    );
}

#[test]
fn test_empty_input() {
    let service = service();

    let reply = service.respond("user", "");

    assert_eq!(reply.outcome, TurnOutcome::NeedMoreDetail { found: 0, required: 2 });
    assert_eq!(reply.stage, Stage::Diagnosis);
}

#[test]
fn test_unknown_symptoms_ask_for_detail() {
    let service = service();

    let reply = service.respond("user", "qqqq, jjjj");

    assert_eq!(reply.outcome, TurnOutcome::NeedMoreDetail { found: 2, required: 2 });
    assert_eq!(reply.stage, Stage::Diagnosis);
    assert!(service.conversation("user").unwrap().diagnosis_log.is_empty());

    // Engine-level ranking is unchanged; only the conversation declines it
    let direct = service.diagnose("qqqq, jjjj").unwrap();
    assert_eq!(direct.top().unwrap().good_matches, 0);
}

#[test]
fn test_after_done_next_turn_diagnoses() {
    let service = service();
    service.respond("user", "fever, cough");
    service.respond("user", "yes");
    service.respond("user", "yes");

    let reply = service.respond("user", "headache, nausea, sensitivity to light");

    assert_eq!(reply.outcome, TurnOutcome::Diagnosed { disease: "Migraine".into() });
    assert_eq!(service.conversation("user").unwrap().diagnosis_log.len(), 2);
}

#[test]
fn test_clear_log_and_reset() {
    let service = service();
    service.respond("user", "fever, cough");

    assert!(service.clear_diagnosis_log("user"));
    let state = service.conversation("user").unwrap();
    assert!(state.diagnosis_log.is_empty());
    assert_eq!(state.stage, Stage::AskRemedies);

    assert!(service.reset("user"));
    assert!(service.conversation("user").is_none());
    assert!(!service.clear_diagnosis_log("user"));
}

#[test]
fn test_stateless_operations_leave_conversations_alone() {
    let service = service();

    let ranked = service.diagnose("fever, cough").unwrap();
    assert_eq!(ranked.top().unwrap().disease, "Flu");
    assert_eq!(service.remedies("FLU").unwrap().name, "Flu");

    assert!(service.store().is_empty());
}

struct ScriptedFallback;

impl LlmFallback for ScriptedFallback {
    fn reply(&self, history: &[Turn]) -> FallbackResult<String> {
        Ok(format!("I saw {} turns so far.", history.len()))
    }
}

struct OfflineFallback;

impl LlmFallback for OfflineFallback {
    fn reply(&self, _history: &[Turn]) -> FallbackResult<String> {
        Err(FallbackError::Unavailable("timeout".into()))
    }
}

#[test]
fn test_fallback_sees_history() {
    let service = service().with_fallback(Arc::new(ScriptedFallback));

    service.respond("user", "fever, cough");
    let reply = service.respond("user", "hmm");

    assert_eq!(reply.outcome, TurnOutcome::FallbackReply);
    // Two full turns plus the current user turn
    assert_eq!(reply.text, "I saw 3 turns so far.");
}

#[test]
fn test_fallback_outage() {
    let service = service().with_fallback(Arc::new(OfflineFallback));

    let reply = service.respond("user", "hello");

    assert_eq!(reply.outcome, TurnOutcome::FallbackUnavailable);
    assert_eq!(reply.stage, Stage::Diagnosis);
    assert!(reply.text.contains("at least 2 symptoms"));
}

#[test]
fn test_concurrent_users_are_independent() {
    let service = Arc::new(service());
    let inputs = [
        ("alice", "fever, cough, fatigue", "Flu"),
        ("bob", "runny nose, sneezing, nasal congestion", "Common Cold"),
        ("carol", "wheezing, chest tightness", "Asthma"),
        ("dave", "diarrhea, abdominal pain", "Gastroenteritis"),
    ];

    let threads: Vec<_> = inputs
        .iter()
        .map(|&(user, text, expected)| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for _ in 0..25 {
                    let reply = service.respond(user, text);
                    assert_eq!(reply.outcome, TurnOutcome::Diagnosed { disease: expected.into() });
                    let reply = service.respond(user, "yes");
                    assert_eq!(
                        reply.outcome,
                        TurnOutcome::RemediesDisclosed { disease: expected.into() }
                    );
                }
            })
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }

    for (user, _, expected) in inputs {
        let state = service.conversation(user).unwrap();
        assert_eq!(state.diagnosis_log.len(), 25);
        assert_eq!(state.turn_history.len(), 100);
        assert_eq!(state.last_disease.as_deref(), Some(expected));
    }
}

#[test]
fn test_concurrent_turns_for_one_user_are_serialized() {
    let service = Arc::new(service());

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for _ in 0..20 {
                    service.respond("shared", "fever, cough");
                }
            })
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }

    let state = service.conversation("shared").unwrap();
    assert_eq!(state.diagnosis_log.len(), 160);
    assert_eq!(state.turn_history.len(), 320);
}
