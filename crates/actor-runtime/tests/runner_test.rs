use actor_runtime::action_error::{codes, ActionError};
use actor_runtime::message::{action_defs, ActionDef, ActionDefs, ActorCall};
use actor_runtime::mock::MockActorLock;
use actor_runtime::{ActionName, ActorId, ActorLock, ActorType, InstanceRunner, InstanceWrapper, Value};
use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering::SeqCst};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::sleep;

// --- Test Wrapper ---

/// Records hook and action completions and counts overlapping executions.
#[derive(Default)]
struct Recorder {
    log: Mutex<Vec<String>>,
    exclusive: AtomicUsize,
    shared: AtomicUsize,
    max_shared: AtomicUsize,
    violations: AtomicUsize,
    activate_delay: Duration,
    deactivate_delay: Duration,
    fail_activate: bool,
}

impl Recorder {
    fn record(&self, entry: impl Into<String>) {
        self.log.lock().push(entry.into());
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    fn violations(&self) -> usize {
        self.violations.load(SeqCst)
    }

    async fn exclusively(&self, label: String, delay: Duration) {
        if self.exclusive.fetch_add(1, SeqCst) > 0 || self.shared.load(SeqCst) > 0 {
            self.violations.fetch_add(1, SeqCst);
        }
        sleep(delay).await;
        self.exclusive.fetch_sub(1, SeqCst);
        self.record(label);
    }

    async fn sharing(&self, label: String, delay: Duration) {
        let now = self.shared.fetch_add(1, SeqCst) + 1;
        if self.exclusive.load(SeqCst) > 0 {
            self.violations.fetch_add(1, SeqCst);
        }
        self.max_shared.fetch_max(now, SeqCst);
        sleep(delay).await;
        self.shared.fetch_sub(1, SeqCst);
        self.record(label);
    }
}

#[async_trait]
impl InstanceWrapper for Recorder {
    async fn create(&self) -> Result<(), ActionError> {
        self.record("create");
        Ok(())
    }

    async fn activate(&self) -> Result<(), ActionError> {
        if self.fail_activate {
            return Err(ActionError::application("ACTIVATION_FAILED", "Cannot activate"));
        }
        self.exclusively("activate".into(), self.activate_delay).await;
        Ok(())
    }

    async fn deactivate(&self) -> Result<(), ActionError> {
        self.exclusively("deactivate".into(), self.deactivate_delay).await;
        Ok(())
    }

    async fn release(&self) -> Result<(), ActionError> {
        self.record("release");
        Ok(())
    }

    async fn perform(&self, action: &ActionName, args: Vec<Value>) -> Result<Value, ActionError> {
        let tag = args.first().map(|v| v.to_string()).unwrap_or_default();
        match action.as_str() {
            "write" => {
                self.exclusively(format!("write:{tag}"), Duration::from_millis(10))
                    .await;
                Ok(Value::from(tag))
            }
            "read" => {
                self.sharing(format!("read:{tag}"), Duration::from_millis(10))
                    .await;
                Ok(Value::from(tag))
            }
            "ping" => {
                self.record("ping");
                Ok(Value::from("pong"))
            }
            "explode" => panic!("recorder exploded"),
            other => Err(ActionError::application("UNEXPECTED", format!("No handler for {other}"))),
        }
    }
}

fn defs() -> ActionDefs {
    action_defs([
        ("write", ActionDef::exclusive()),
        ("read", ActionDef::shared()),
        ("ping", ActionDef::unlocked()),
        ("explode", ActionDef::exclusive()),
    ])
}

fn call(action: &str, tag: &str) -> ActorCall {
    ActorCall::new("Recorder", "1", action, vec![Value::from(tag)])
}

fn runner_for(
    recorder: Arc<Recorder>,
    lock: Option<Arc<dyn ActorLock>>,
) -> (InstanceRunner, oneshot::Receiver<()>) {
    let (done, deactivated) = oneshot::channel();
    let runner = InstanceRunner::new(
        ActorType::new("Recorder"),
        ActorId::from("1"),
        recorder,
        lock,
        Arc::new(defs()),
        16,
        Box::new(move || {
            let _ = done.send(());
        }),
    );
    (runner, deactivated)
}

// --- Tests ---

#[tokio::test(start_paused = true)]
async fn test_exclusive_never_overlaps_and_shared_overlaps() {
    let recorder = Arc::new(Recorder {
        activate_delay: Duration::from_millis(5),
        ..Default::default()
    });
    let (runner, _deactivated) = runner_for(recorder.clone(), None);

    // Five reads queued behind activation are admitted together.
    let reads = join_all((0..5).map(|i| runner.call(call("read", &i.to_string())))).await;
    assert!(reads.iter().all(Result::is_ok));
    assert_eq!(recorder.max_shared.load(SeqCst), 5);

    let mixed = vec![
        call("write", "w1"),
        call("read", "r1"),
        call("write", "w2"),
        call("read", "r2"),
        call("read", "r3"),
        call("write", "w3"),
    ];
    let results = join_all(mixed.into_iter().map(|c| runner.call(c))).await;
    assert!(results.iter().all(Result::is_ok));
    assert_eq!(recorder.violations(), 0);

    let writes: Vec<String> = recorder
        .log()
        .into_iter()
        .filter(|entry| entry.starts_with("write:"))
        .collect();
    assert_eq!(writes, vec!["write:w1", "write:w2", "write:w3"]);
}

#[tokio::test(start_paused = true)]
async fn test_unlocked_call_runs_during_activation() {
    let recorder = Arc::new(Recorder {
        activate_delay: Duration::from_millis(50),
        ..Default::default()
    });
    let (runner, _deactivated) = runner_for(recorder.clone(), None);

    let (write, ping) = tokio::join!(runner.call(call("write", "a")), runner.call(call("ping", "")));
    assert_eq!(write, Ok(Value::from("a")));
    assert_eq!(ping, Ok(Value::from("pong")));
    let log = recorder.log();
    let position = |entry: &str| log.iter().position(|e| e == entry);
    assert!(position("ping") < position("activate"));
    assert_eq!(log.last().map(String::as_str), Some("write:a"));
}

#[tokio::test(start_paused = true)]
async fn test_deactivation_admits_unlocked_and_rejects_locked() {
    let recorder = Arc::new(Recorder {
        deactivate_delay: Duration::from_millis(50),
        ..Default::default()
    });
    let (runner, deactivated) = runner_for(recorder.clone(), None);

    assert_eq!(runner.call(call("write", "a")).await, Ok(Value::from("a")));
    runner.trigger_deactivate().await;

    let late_write = runner.call(call("write", "b")).await;
    assert_eq!(late_write.unwrap_err().code, codes::DEACTIVATED);
    assert_eq!(runner.call(call("ping", "")).await, Ok(Value::from("pong")));

    deactivated.await.unwrap();
    assert_eq!(
        recorder.log(),
        vec!["create", "activate", "write:a", "ping", "deactivate", "release"]
    );

    // Nothing is admitted once the loop is gone.
    for action in ["write", "read", "ping"] {
        let error = runner.call(call(action, "z")).await.unwrap_err();
        assert_eq!(error.code, codes::DEACTIVATED);
    }
    assert_eq!(recorder.violations(), 0);
}

#[tokio::test]
async fn test_panic_becomes_application_error() {
    let recorder = Arc::new(Recorder::default());
    let (runner, _deactivated) = runner_for(recorder, None);

    let error = runner.call(call("explode", "")).await.unwrap_err();
    assert_eq!(error.code, codes::UNEXPECTED_APPLICATION_ERROR);
    assert!(error.is_application());
    assert!(error.message.contains("recorder exploded"));

    // The instance keeps serving.
    assert_eq!(runner.call(call("write", "after")).await, Ok(Value::from("after")));
}

#[tokio::test]
async fn test_unknown_action_rejected_without_starting() {
    let recorder = Arc::new(Recorder::default());
    let (runner, deactivated) = runner_for(recorder.clone(), None);

    let error = runner.call(call("fly", "")).await.unwrap_err();
    assert_eq!(error.code, codes::UNKNOWN_ACTION);
    assert!(recorder.log().is_empty());

    // A runner that never started deactivates at once.
    runner.trigger_deactivate().await;
    deactivated.await.unwrap();
    assert!(recorder.log().is_empty());
}

#[tokio::test]
async fn test_activation_failure_reaches_trigger_once() {
    let recorder = Arc::new(Recorder {
        fail_activate: true,
        ..Default::default()
    });
    let (runner, deactivated) = runner_for(recorder.clone(), None);

    let (first, second) =
        tokio::join!(runner.call(call("write", "a")), runner.call(call("read", "b")));
    assert_eq!(first.unwrap_err().code, "ACTIVATION_FAILED");
    assert_eq!(second.unwrap_err().code, codes::DEACTIVATED);

    deactivated.await.unwrap();
    // Never activated, so only the creation is undone.
    assert_eq!(recorder.log(), vec!["create", "release"]);
}

#[tokio::test]
async fn test_actor_lock_held_for_instance_lifetime() {
    let recorder = Arc::new(Recorder::default());
    let lock = Arc::new(MockActorLock::new());
    let (runner, deactivated) = runner_for(recorder.clone(), Some(lock.clone() as Arc<dyn ActorLock>));

    assert!(runner.call(call("write", "a")).await.is_ok());
    assert_eq!(lock.log(), vec!["acquire:recorder:[1]"]);

    runner.trigger_deactivate().await;
    deactivated.await.unwrap();
    assert_eq!(lock.log(), vec!["acquire:recorder:[1]", "release:recorder:[1]"]);
}

#[tokio::test]
async fn test_actor_lock_refusal() {
    let recorder = Arc::new(Recorder::default());
    let lock = Arc::new(MockActorLock::new());
    lock.refuse("held by host-b");
    let (runner, deactivated) = runner_for(recorder.clone(), Some(lock.clone() as Arc<dyn ActorLock>));

    let error = runner.call(call("write", "a")).await.unwrap_err();
    assert_eq!(error.code, codes::ACTOR_LOCK_FAILED);
    assert_eq!(error.param("Reason"), Some(&Value::from("held by host-b")));

    deactivated.await.unwrap();
    assert!(recorder.log().is_empty());
    assert!(lock.log().is_empty());
}
