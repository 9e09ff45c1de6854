#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use loom_db::{DatabaseError, LessonDb, NewLesson, RunClaim, WriteOutcome};
use loom_model::{GenerativeModel, ModelError, ModelRequest, ModelResponse};
use loom_pipeline::{ArtifactSink, LessonStore, Orchestrator, RunSettings};
use loom_store::{ArtifactStore, StoreError};

pub const BASE_URL: &str = "http://localhost:8787/artifacts";

pub const VALID_LESSON: &str = r#"```tsx
function LessonComponent() {
  const [effort, setEffort] = useState<number>(10);
  return (
    <Card>
      <Text variant="h1">Intro to Levers</Text>
      <Slider value={[effort]} onValueChange={(v) => setEffort(v[0])} min={1} max={50} />
      <MathFormula tex="F_e d_e = F_l d_l" />
    </Card>
  );
}
```"#;

/// First attempt of the lever scenario: a component under the wrong name.
pub const MISNAMED_LESSON: &str = "Here is your lesson:\n\nfunction LeverLesson() {\n  return <Card>Levers</Card>;\n}";

pub const MISMATCHED_TAG: &str =
    "function LessonComponent() {\n  return <Card><Text>Levers</Card>;\n}";

pub const DANGLING_OPERATOR: &str =
    "function LessonComponent() {\n  const x = 1 + ;\n  return <Card>{x}</Card>;\n}";

/// Model stub that replays scripted replies and records prompts.
/// `Err` entries become transport failures; an exhausted script returns
/// empty text.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn with_failures(replies: Vec<Result<String, String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompt(&self, index: usize) -> String {
        self.prompts.lock().unwrap()[index].clone()
    }
}

impl GenerativeModel for ScriptedModel {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(ModelResponse::text(text)),
            Some(Err(message)) => Err(ModelError::Parse(message)),
            None => Ok(ModelResponse::default()),
        }
    }
}

/// Lesson store that can fail selected writes.
pub struct FlakyLessons {
    pub inner: Arc<LessonDb>,
    pub fail_begin: bool,
    pub fail_final: bool,
}

impl LessonStore for FlakyLessons {
    async fn new_run_token(&self) -> Result<String, DatabaseError> {
        self.inner.generate_run_token().await
    }

    async fn begin_run(&self, lesson_id: &str, run_token: &str) -> Result<(), DatabaseError> {
        if self.fail_begin {
            return Err(DatabaseError::Query("connection reset".into()));
        }
        self.inner.begin_run(lesson_id, run_token).await
    }

    async fn complete_run(
        &self,
        lesson_id: &str,
        run_token: &str,
        claim: RunClaim,
        address: &str,
    ) -> Result<WriteOutcome, DatabaseError> {
        if self.fail_final {
            return Err(DatabaseError::Query("connection reset".into()));
        }
        self.inner.complete_run(lesson_id, run_token, claim, address).await
    }

    async fn fail_run(
        &self,
        lesson_id: &str,
        run_token: &str,
        claim: RunClaim,
        error: &str,
    ) -> Result<WriteOutcome, DatabaseError> {
        if self.fail_final {
            return Err(DatabaseError::Query("connection reset".into()));
        }
        self.inner.fail_run(lesson_id, run_token, claim, error).await
    }
}

/// Artifact sink that rejects the first `failures` uploads.
pub struct FlakyArtifacts {
    pub inner: ArtifactStore,
    pub failures: Mutex<u32>,
}

impl ArtifactSink for FlakyArtifacts {
    async fn put(&self, lesson_id: &str, compiled: &str) -> Result<String, StoreError> {
        let reject = {
            let mut remaining = self.failures.lock().unwrap();
            let reject = *remaining > 0;
            *remaining = remaining.saturating_sub(1);
            reject
        };
        if reject {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "bucket is read-only",
            )));
        }
        self.inner.put(lesson_id, compiled).await
    }
}

pub async fn test_db() -> Arc<LessonDb> {
    Arc::new(LessonDb::open_local(":memory:").await.unwrap())
}

pub fn store() -> ArtifactStore {
    ArtifactStore::in_memory(BASE_URL)
}

pub fn settings(max_attempts: u32) -> RunSettings {
    RunSettings {
        max_attempts,
        ..RunSettings::default()
    }
}

pub async fn levers(db: &LessonDb) -> loom_core::Lesson {
    db.create_lesson(&NewLesson {
        title: "Intro to Levers".into(),
        objective: "Explain mechanical advantage with a first-class lever".into(),
        course_id: None,
    })
    .await
    .unwrap()
}

pub type TestOrchestrator = Orchestrator<Arc<ScriptedModel>, Arc<LessonDb>, ArtifactStore>;

pub fn orchestrator(
    model: &Arc<ScriptedModel>,
    db: &Arc<LessonDb>,
    store: &ArtifactStore,
    max_attempts: u32,
) -> TestOrchestrator {
    Orchestrator::new(
        Arc::clone(model),
        Arc::clone(db),
        store.clone(),
        settings(max_attempts),
    )
}
