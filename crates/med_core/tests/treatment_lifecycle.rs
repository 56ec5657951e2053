//! Integration test: one learner session across both simulators, the quiz and
//! the case viewer, persisted and reopened through a shared blob.

use med_core::test_fixtures::{
    memory_store, run_ticks, sample_library, DKA_CORRECT, SAMPLE_CASE_ID, SEPSIS_CORRECT,
    SEPSIS_QUESTION_ID,
};
use med_core::*;

#[test]
fn full_session_round_trip() {
    let (mut store, storage) = memory_store();

    // Sepsis bundle: antibiotics on time, 2 L, pressor after fluids.
    let mut sepsis = SepsisSimulator::new();
    sepsis.apply_action(&mut store, SepsisAction::GiveAntibiotics);
    sepsis.apply_action(&mut store, SepsisAction::GiveFluid);
    sepsis.apply_action(&mut store, SepsisAction::GiveFluid);
    sepsis.apply_action(&mut store, SepsisAction::StartVasopressor);
    run_ticks(&mut sepsis, &mut store, 15);
    assert_eq!(sepsis.outcome(&store), Some(SepsisOutcome::Stabilized));
    assert_eq!(sepsis.feedback().count_at(FeedbackLevel::Warning), 0);
    sepsis.dispose();

    // DKA: fluids, then insulin, until glucose bottoms out.
    let mut dka = DkaSimulator::new();
    dka.apply_action(&mut store, DkaAction::GiveFluid);
    dka.apply_action(&mut store, DkaAction::GiveFluid);
    dka.apply_action(&mut store, DkaAction::StartInsulin);
    run_ticks(&mut dka, &mut store, 25);
    assert_eq!(dka.phase(), DkaPhase::Insulin);
    assert!(store.dka().glucose < dka::DEXTROSE_GLUCOSE_THRESHOLD);
    dka.apply_action(&mut store, DkaAction::AddDextrose);
    assert_eq!(dka.feedback().last().unwrap().level(), FeedbackLevel::Success);

    // Anion gap closes; transition to subcutaneous insulin.
    store.update_dka(&DkaPatch {
        anion_gap: Some(10),
        ..DkaPatch::default()
    });
    run_ticks(&mut dka, &mut store, 1);
    assert_eq!(dka.phase(), DkaPhase::Resolution);
    dka.apply_action(&mut store, DkaAction::TransitionToSq);
    assert!(store.dka().transitioned_to_sq);
    dka.dispose();

    // Quiz and case.
    let library = sample_library();
    let mut quiz = QuizRunner::new(library.questions.clone()).unwrap();
    quiz.select_answer(SEPSIS_CORRECT).unwrap();
    quiz.submit(&mut store).unwrap();
    quiz.next().unwrap();
    quiz.select_answer(DKA_CORRECT).unwrap();
    quiz.submit(&mut store).unwrap();
    assert!(quiz.is_complete());

    let mut viewer = CaseViewer::new();
    viewer.select(&library, SAMPLE_CASE_ID).unwrap();
    viewer.reveal_diagnosis(&mut store).unwrap();

    let expected_sepsis = store.sepsis().clone();
    let expected_dka = store.dka().clone();
    drop(store);

    let reopened = AppStore::open(Box::new(storage));
    assert_eq!(*reopened.sepsis(), expected_sepsis);
    assert_eq!(*reopened.dka(), expected_dka);
    assert_eq!(reopened.progress().score_for(SEPSIS_QUESTION_ID), Some(100));
    assert!(reopened.progress().has_completed_case(SAMPLE_CASE_ID));
    assert_eq!(reopened.progress().average_score(), Some(100.0));
}
