mod common;

use std::sync::{Arc, Mutex};

use common::*;
use loom_core::{GenerateLessonEvent, LessonStatus};
use loom_db::LessonDb;
use loom_model::{GenerativeModel, ModelError, ModelRequest, ModelResponse};
use loom_pipeline::{NO_ENTRY_MESSAGE, Orchestrator, PipelineError, RunOutcome};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[tokio::test]
async fn intro_to_levers_self_corrects_on_second_attempt() {
    let db = test_db().await;
    let store = store();
    let lesson = levers(&db).await;
    let model = ScriptedModel::new([MISNAMED_LESSON, VALID_LESSON]);

    let outcome = orchestrator(&model, &db, &store, 2)
        .run(&GenerateLessonEvent::for_lesson(&lesson))
        .await
        .unwrap();

    let compiled = store.get(&lesson.id).await.unwrap();
    let address = store.versioned_address(&lesson.id, &compiled);
    assert!(address.starts_with(&format!("{BASE_URL}/{}.js?v=", lesson.id)));
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            address: address.clone(),
            attempts: 2
        }
    );
    assert_eq!(model.calls(), 2);
    assert!(model.prompt(0).contains("Title: Intro to Levers"));

    let feedback = model.prompt(1);
    assert!(feedback.contains("Error: model did not generate LessonComponent"), "{feedback}");
    assert!(feedback.contains("function LeverLesson()"), "{feedback}");

    let stored = db.get_lesson(&lesson.id).await.unwrap();
    assert_eq!(stored.status, LessonStatus::Completed);
    assert_eq!(stored.compiled_url.as_deref(), Some(address.as_str()));
    assert_eq!(stored.error, None);
    assert!(stored.check_invariants().is_ok());

    let module = store.get(&lesson.id).await.unwrap();
    assert!(module.starts_with("function LessonComponent()"));
    assert!(module.contains("React.createElement(Card, null"));
}

#[tokio::test]
async fn exhaustion_persists_last_compile_error() {
    let db = test_db().await;
    let store = store();
    let lesson = levers(&db).await;
    let model = ScriptedModel::new([MISMATCHED_TAG, DANGLING_OPERATOR]);

    let outcome = orchestrator(&model, &db, &store, 2)
        .run(&GenerateLessonEvent::for_lesson(&lesson))
        .await
        .unwrap();

    let expected = loom_compiler::compile(DANGLING_OPERATOR)
        .unwrap_err()
        .to_string();
    assert!(expected.starts_with("Compile error: "));
    assert_eq!(
        outcome,
        RunOutcome::Failed {
            error: expected.clone(),
            attempts: 2
        }
    );

    let stored = db.get_lesson(&lesson.id).await.unwrap();
    assert_eq!(stored.status, LessonStatus::Failed);
    assert_eq!(stored.error.as_deref(), Some(expected.as_str()));
    assert_eq!(stored.compiled_url, None);
    assert!(matches!(
        store.get(&lesson.id).await,
        Err(loom_store::StoreError::NotFound { .. })
    ));
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[tokio::test]
async fn model_calls_are_bounded_by_attempt_budget(#[case] max_attempts: u32) {
    let db = test_db().await;
    let lesson = levers(&db).await;
    let model = ScriptedModel::new(std::iter::repeat_n(MISMATCHED_TAG, 5));

    let outcome = orchestrator(&model, &db, &store(), max_attempts)
        .run(&GenerateLessonEvent::for_lesson(&lesson))
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Failed { attempts, .. } if attempts == max_attempts));
    assert_eq!(model.calls(), max_attempts as usize);
}

#[tokio::test]
async fn valid_first_attempt_calls_model_once() {
    let db = test_db().await;
    let lesson = levers(&db).await;
    let model = ScriptedModel::new([VALID_LESSON, VALID_LESSON]);

    let outcome = orchestrator(&model, &db, &store(), 3)
        .run(&GenerateLessonEvent::for_lesson(&lesson))
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Completed { attempts: 1, .. }));
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn empty_model_output_is_an_attempt_failure() {
    let db = test_db().await;
    let lesson = levers(&db).await;
    let model = ScriptedModel::new(["   "]);

    let outcome = orchestrator(&model, &db, &store(), 1)
        .run(&GenerateLessonEvent::for_lesson(&lesson))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Failed {
            error: NO_ENTRY_MESSAGE.into(),
            attempts: 1
        }
    );
}

#[tokio::test]
async fn model_transport_errors_count_as_attempts() {
    let db = test_db().await;
    let lesson = levers(&db).await;
    let model = ScriptedModel::with_failures(vec![
        Err("connection refused".into()),
        Ok(VALID_LESSON.into()),
    ]);

    let outcome = orchestrator(&model, &db, &store(), 2)
        .run(&GenerateLessonEvent::for_lesson(&lesson))
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Completed { attempts: 2, .. }));
    assert!(model.prompt(1).contains("Model error"), "{}", model.prompt(1));
}

#[tokio::test]
async fn store_failure_triggers_next_attempt() {
    let db = test_db().await;
    let lesson = levers(&db).await;
    let model = ScriptedModel::new([VALID_LESSON, VALID_LESSON]);
    let artifacts = FlakyArtifacts {
        inner: store(),
        failures: Mutex::new(1),
    };

    let outcome = Orchestrator::new(Arc::clone(&model), Arc::clone(&db), artifacts, settings(2))
        .run(&GenerateLessonEvent::for_lesson(&lesson))
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Completed { attempts: 2, .. }));
    assert!(model.prompt(1).contains("Error: Upload error: "), "{}", model.prompt(1));
}

#[tokio::test]
async fn processing_write_failure_is_not_fatal() {
    let db = test_db().await;
    let lesson = levers(&db).await;
    let model = ScriptedModel::new([VALID_LESSON]);
    let lessons = FlakyLessons {
        inner: Arc::clone(&db),
        fail_begin: true,
        fail_final: false,
    };

    let outcome = Orchestrator::new(Arc::clone(&model), lessons, store(), settings(1))
        .run(&GenerateLessonEvent::for_lesson(&lesson))
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Completed { .. }));
    assert_eq!(
        db.get_lesson(&lesson.id).await.unwrap().status,
        LessonStatus::Completed
    );
}

#[tokio::test]
async fn processing_write_failure_after_earlier_run_still_lands() {
    let db = test_db().await;
    let lesson = levers(&db).await;

    // An earlier run failed and left its token on the lesson.
    let failing = ScriptedModel::new([MISMATCHED_TAG]);
    let outcome = orchestrator(&failing, &db, &store(), 1)
        .run(&GenerateLessonEvent::for_lesson(&lesson))
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Failed { .. }));
    let earlier_token = db.current_run_token(&lesson.id).await.unwrap();
    assert!(earlier_token.is_some());

    let model = ScriptedModel::new([VALID_LESSON]);
    let artifacts = store();
    let lessons = FlakyLessons {
        inner: Arc::clone(&db),
        fail_begin: true,
        fail_final: false,
    };
    let outcome = Orchestrator::new(Arc::clone(&model), lessons, artifacts.clone(), settings(1))
        .run(&GenerateLessonEvent::for_lesson(&lesson))
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Completed { attempts: 1, .. }), "{outcome:?}");
    let stored = db.get_lesson(&lesson.id).await.unwrap();
    assert_eq!(stored.status, LessonStatus::Completed);
    assert_eq!(stored.error, None);
    let compiled = artifacts.get(&lesson.id).await.unwrap();
    assert_eq!(
        stored.compiled_url,
        Some(artifacts.versioned_address(&lesson.id, &compiled))
    );
    assert_ne!(db.current_run_token(&lesson.id).await.unwrap(), earlier_token);
}

#[tokio::test]
async fn processing_write_failure_yields_to_newer_claim() {
    let db = test_db().await;
    let lesson = levers(&db).await;
    db.begin_run(&lesson.id, "0123456789abcdef").await.unwrap();

    let model = ScriptedModel::new([VALID_LESSON]);
    let lessons = FlakyLessons {
        inner: Arc::clone(&db),
        fail_begin: true,
        fail_final: false,
    };
    let outcome = Orchestrator::new(Arc::clone(&model), lessons, store(), settings(1))
        .run(&GenerateLessonEvent::for_lesson(&lesson))
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::Superseded { attempts: 1 });
    let stored = db.get_lesson(&lesson.id).await.unwrap();
    assert_eq!(stored.status, LessonStatus::Processing);
    assert_eq!(stored.compiled_url, None);
}

#[tokio::test]
async fn final_write_failure_is_fatal() {
    let db = test_db().await;
    let lesson = levers(&db).await;
    let model = ScriptedModel::new([VALID_LESSON]);
    let lessons = FlakyLessons {
        inner: Arc::clone(&db),
        fail_begin: false,
        fail_final: true,
    };

    let err = Orchestrator::new(Arc::clone(&model), lessons, store(), settings(1))
        .run(&GenerateLessonEvent::for_lesson(&lesson))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::FinalWrite { ref lesson_id, .. } if *lesson_id == lesson.id));
    assert_eq!(
        db.get_lesson(&lesson.id).await.unwrap().status,
        LessonStatus::Processing
    );
}

/// Starts a competing run for the lesson while its own call is in flight.
struct CompetingRunModel {
    db: Arc<LessonDb>,
    lesson_id: String,
}

impl GenerativeModel for CompetingRunModel {
    async fn generate(&self, _request: &ModelRequest) -> Result<ModelResponse, ModelError> {
        self.db
            .begin_run(&self.lesson_id, "ffffffffffffffff")
            .await
            .unwrap();
        Ok(ModelResponse::text(VALID_LESSON))
    }
}

#[tokio::test]
async fn stale_run_does_not_overwrite_newer_run() {
    let db = test_db().await;
    let lesson = levers(&db).await;
    let model = CompetingRunModel {
        db: Arc::clone(&db),
        lesson_id: lesson.id.clone(),
    };

    let outcome = Orchestrator::new(model, Arc::clone(&db), store(), settings(1))
        .run(&GenerateLessonEvent::for_lesson(&lesson))
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::Superseded { attempts: 1 });
    let stored = db.get_lesson(&lesson.id).await.unwrap();
    assert_eq!(stored.status, LessonStatus::Processing);
    assert_eq!(
        db.current_run_token(&lesson.id).await.unwrap().as_deref(),
        Some("ffffffffffffffff")
    );
}
