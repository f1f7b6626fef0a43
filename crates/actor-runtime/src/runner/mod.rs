//! # Instance Runner
//!
//! This module defines the `InstanceRunner`, the per-instance event loop that admits calls
//! according to their [`LockClass`] and drives the instance through its lifecycle:
//! `created → activating → active → deactivation_wanted → deactivating → deactivated`.
//!
//! # Architecture Note
//! The runner is split in two halves:
//!
//! - [`lifecycle::Lifecycle`] is the pure state machine. It holds the queues and counters
//!   and decides what may start next.
//! - The loop in this module owns the event channel and turns [`lifecycle::Step`]s into
//!   spawned tasks.
//!
//! Every action, as well as activation and deactivation, runs in its own Tokio task. A task
//! answers its caller directly and then reports back to the loop with a `Finished` event,
//! so the loop itself never waits on application code.
//!
//! The loop is started lazily by the first [`InstanceRunner::invoke`] and exits once the
//! instance is deactivated and its last unlocked call has finished. Calls that arrive after
//! that are answered with `DEACTIVATED`.

pub mod lifecycle;

use crate::action_error::ActionError;
use crate::error::FrameworkError;
use crate::message::{ActionDefs, ActorCall, LockClass, Response};
use crate::names::{ActorId, ActorType};
use crate::value::Value;
use crate::wrapper::{ActorLock, InstanceWrapper};
use futures::FutureExt;
use lifecycle::{Lifecycle, Step};
use parking_lot::Mutex;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Called once when the runner has fully deactivated.
pub type DeactivatedHook = Box<dyn FnOnce() + Send>;

struct PendingCall {
    call: ActorCall,
    class: LockClass,
    respond_to: Response,
}

/// Which lifecycle hooks succeeded, so shutdown only undoes what was done.
#[derive(Debug, Clone, Copy, Default)]
struct Progress {
    lock_held: bool,
    created: bool,
    activated: bool,
}

enum Event {
    Call(PendingCall),
    Activated {
        progress: Progress,
        result: Result<(), ActionError>,
    },
    Deactivated,
    Finished(LockClass),
    DeactivateRequested,
}

/// Handle to the event loop of one actor instance.
pub struct InstanceRunner {
    actor_type: ActorType,
    action_defs: Arc<ActionDefs>,
    events: mpsc::Sender<Event>,
    /// The loop until the first call starts it.
    idle: Mutex<Option<RunnerLoop>>,
}

impl InstanceRunner {
    /// Creates a runner. Nothing runs until the first call arrives.
    ///
    /// `mailbox_capacity` bounds the event channel; callers wait when it is full.
    pub fn new(
        actor_type: ActorType,
        actor_id: ActorId,
        wrapper: Arc<dyn InstanceWrapper>,
        actor_lock: Option<Arc<dyn ActorLock>>,
        action_defs: Arc<ActionDefs>,
        mailbox_capacity: usize,
        on_deactivated: DeactivatedHook,
    ) -> Self {
        let (events, receiver) = mpsc::channel(mailbox_capacity.max(1));
        let runner_loop = RunnerLoop {
            actor_type: actor_type.clone(),
            actor_id,
            wrapper,
            actor_lock,
            events: events.clone(),
            receiver,
            lifecycle: Lifecycle::new(),
            progress: Progress::default(),
            on_deactivated,
        };
        Self {
            actor_type,
            action_defs,
            events,
            idle: Mutex::new(Some(runner_loop)),
        }
    }

    /// Schedules `call`. The result, or a structured error, is sent on `respond_to`
    /// exactly once.
    ///
    /// Unknown actions are rejected here, before the loop is involved. Waits only while the
    /// event channel is full.
    pub async fn invoke(&self, call: ActorCall, respond_to: Response) {
        let Some(def) = self.action_defs.get(&call.action_name).copied() else {
            debug!(actor_type = %self.actor_type, action = %call.action_name, "Unknown action");
            let error = FrameworkError::UnknownAction {
                actor_type: self.actor_type.clone(),
                action: call.action_name.to_string(),
            };
            let _ = respond_to.send(Err(error.into()));
            return;
        };

        let pending = PendingCall {
            call,
            class: def.lock,
            respond_to,
        };

        let idle = self.idle.lock().take();
        if let Some(runner_loop) = idle {
            tokio::spawn(runner_loop.run(pending));
            return;
        }

        if let Err(mpsc::error::SendError(Event::Call(pending))) =
            self.events.send(Event::Call(pending)).await
        {
            reject(&self.actor_type, pending);
        }
    }

    /// Convenience wrapper around [`InstanceRunner::invoke`] that awaits the result.
    pub async fn call(&self, call: ActorCall) -> Result<Value, ActionError> {
        let (respond_to, response) = oneshot::channel();
        self.invoke(call, respond_to).await;
        response
            .await
            .map_err(|_| ActionError::from(FrameworkError::ResponseDropped))?
    }

    /// Asks the instance to deactivate once its running locked work is done. Running calls
    /// are not interrupted.
    ///
    /// A runner that never received a call finishes immediately.
    pub async fn trigger_deactivate(&self) {
        let idle = self.idle.lock().take();
        if let Some(runner_loop) = idle {
            runner_loop.finish_unstarted();
            return;
        }
        let _ = self.events.send(Event::DeactivateRequested).await;
    }
}

fn reject(actor_type: &ActorType, pending: PendingCall) {
    let error = FrameworkError::Deactivated {
        actor_type: actor_type.clone(),
    };
    let _ = pending.respond_to.send(Err(error.into()));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}

/// Runs application code, turning a panic into `UNEXPECTED_APPLICATION_ERROR`.
async fn guarded<T, F>(future: F) -> Result<T, ActionError>
where
    F: Future<Output = Result<T, ActionError>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(FrameworkError::UnexpectedApplicationError {
            message: panic_message(payload.as_ref()),
        }
        .into()),
    }
}

struct RunnerLoop {
    actor_type: ActorType,
    actor_id: ActorId,
    wrapper: Arc<dyn InstanceWrapper>,
    actor_lock: Option<Arc<dyn ActorLock>>,
    events: mpsc::Sender<Event>,
    receiver: mpsc::Receiver<Event>,
    lifecycle: Lifecycle<PendingCall>,
    progress: Progress,
    on_deactivated: DeactivatedHook,
}

impl RunnerLoop {
    async fn run(mut self, trigger: PendingCall) {
        info!(actor_type = %self.actor_type, actor_id = %self.actor_id, "Runner started");

        let class = trigger.class;
        let steps = self.lifecycle.start(trigger, class);
        let mut exit = self.apply(steps);

        while !exit {
            let Some(event) = self.receiver.recv().await else {
                break;
            };
            let steps = match event {
                Event::Call(pending) => {
                    debug!(
                        actor_type = %self.actor_type,
                        actor_id = %self.actor_id,
                        action = %pending.call.action_name,
                        class = ?pending.class,
                        "Call queued"
                    );
                    let class = pending.class;
                    self.lifecycle.call(pending, class)
                }
                Event::Activated { progress, result } => {
                    self.progress = progress;
                    match &result {
                        Ok(()) => info!(actor_type = %self.actor_type, actor_id = %self.actor_id, "Activated"),
                        Err(e) => warn!(actor_type = %self.actor_type, actor_id = %self.actor_id, error = %e, "Activation failed"),
                    }
                    self.lifecycle.activated(result)
                }
                Event::Deactivated => self.lifecycle.deactivated(),
                Event::Finished(class) => self.lifecycle.finished(class),
                Event::DeactivateRequested => {
                    debug!(actor_type = %self.actor_type, actor_id = %self.actor_id, "Deactivation requested");
                    self.lifecycle.request_deactivation()
                }
            };
            exit = self.apply(steps);
        }

        self.close();
        info!(actor_type = %self.actor_type, actor_id = %self.actor_id, "Runner deactivated");
        (self.on_deactivated)();
    }

    /// Carries out the steps. Returns `true` when the loop should exit.
    fn apply(&mut self, steps: Vec<Step<PendingCall>>) -> bool {
        let mut exit = false;
        for step in steps {
            match step {
                Step::Activate => self.spawn_activation(),
                Step::Deactivate => self.spawn_deactivation(),
                Step::Run(pending) => self.spawn_action(pending),
                Step::Fail(pending, error) => {
                    let _ = pending.respond_to.send(Err(error));
                }
                Step::Reject(pending) => reject(&self.actor_type, pending),
                Step::Exit => exit = true,
            }
        }
        exit
    }

    /// Stops intake and answers everything still in the channel.
    fn close(&mut self) {
        self.receiver.close();
        while let Ok(event) = self.receiver.try_recv() {
            if let Event::Call(pending) = event {
                reject(&self.actor_type, pending);
            }
        }
    }

    fn finish_unstarted(mut self) {
        debug!(actor_type = %self.actor_type, actor_id = %self.actor_id, "Runner deactivated before first call");
        self.close();
        (self.on_deactivated)();
    }

    fn spawn_action(&self, pending: PendingCall) {
        let wrapper = self.wrapper.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let PendingCall {
                call,
                class,
                respond_to,
            } = pending;
            let result = guarded(wrapper.perform(&call.action_name, call.arguments)).await;
            if let Err(e) = &result {
                debug!(action = %call.action_name, error = %e, "Action failed");
            }
            let _ = respond_to.send(result);
            let _ = events.send(Event::Finished(class)).await;
        });
    }

    fn spawn_activation(&self) {
        let wrapper = self.wrapper.clone();
        let actor_lock = self.actor_lock.clone();
        let actor_type = self.actor_type.clone();
        let actor_id = self.actor_id.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let mut progress = Progress::default();
            let result = async {
                if let Some(lock) = &actor_lock {
                    lock.acquire(&actor_type, &actor_id).await.map_err(|reason| {
                        ActionError::from(FrameworkError::ActorLockFailed {
                            actor_type: actor_type.clone(),
                            reason,
                        })
                    })?;
                    progress.lock_held = true;
                }
                guarded(wrapper.create()).await?;
                progress.created = true;
                guarded(wrapper.activate()).await?;
                progress.activated = true;
                Ok::<(), ActionError>(())
            }
            .await;
            let _ = events.send(Event::Activated { progress, result }).await;
        });
    }

    fn spawn_deactivation(&self) {
        let progress = self.progress;
        let wrapper = self.wrapper.clone();
        let actor_lock = self.actor_lock.clone();
        let actor_type = self.actor_type.clone();
        let actor_id = self.actor_id.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            if progress.activated {
                if let Err(e) = guarded(wrapper.deactivate()).await {
                    warn!(%actor_type, %actor_id, error = %e, "Deactivate failed");
                }
            }
            if progress.created {
                if let Err(e) = guarded(wrapper.release()).await {
                    warn!(%actor_type, %actor_id, error = %e, "Release failed");
                }
            }
            if progress.lock_held {
                if let Some(lock) = &actor_lock {
                    lock.release(&actor_type, &actor_id).await;
                }
            }
            let _ = events.send(Event::Deactivated).await;
        });
    }
}
