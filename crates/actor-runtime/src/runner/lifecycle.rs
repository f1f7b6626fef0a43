//! Scheduling state of one actor instance, without any I/O.
//!
//! [`Lifecycle`] owns the three class queues and the running counters. Every event the
//! runner receives is fed into one method here, which returns the [`Step`]s the runner has
//! to carry out. The admission rule lives entirely in [`Lifecycle::advance`]:
//!
//! - unlocked calls start in every state from `Activating` through `Deactivating`;
//! - an exclusive call starts when the instance is `Active` and nothing exclusive or shared
//!   is running (activation and deactivation count as exclusive);
//! - shared calls start when the instance is `Active`, nothing exclusive is running and no
//!   exclusive call is waiting.
//!
//! Queues are FIFO per class. Nothing is ordered across classes.

use crate::action_error::ActionError;
use crate::message::LockClass;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Created,
    Activating,
    Active,
    DeactivationWanted,
    Deactivating,
    Deactivated,
}

/// Work the runner must perform after an event.
#[derive(Debug)]
pub enum Step<C> {
    /// Start the activation task.
    Activate,
    /// Start the deactivation task.
    Deactivate,
    Run(C),
    /// Deliver the activation failure to the call that triggered the activation.
    Fail(C, ActionError),
    /// The call can never be admitted; answer it with `DEACTIVATED`.
    Reject(C),
    /// Nothing is running and nothing can be admitted anymore.
    Exit,
}

#[derive(Debug)]
pub struct Lifecycle<C> {
    state: State,
    exclusive: VecDeque<C>,
    shared: VecDeque<C>,
    unlocked: VecDeque<C>,
    running_exclusive: usize,
    running_shared: usize,
    running_unlocked: usize,
    /// Class of the call that triggered activation, while it is still queued.
    trigger: Option<LockClass>,
    exited: bool,
}

impl<C> Default for Lifecycle<C> {
    fn default() -> Self {
        Self {
            state: State::Created,
            exclusive: VecDeque::new(),
            shared: VecDeque::new(),
            unlocked: VecDeque::new(),
            running_exclusive: 0,
            running_shared: 0,
            running_unlocked: 0,
            trigger: None,
            exited: false,
        }
    }
}

impl<C> Lifecycle<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn running(&self, class: LockClass) -> usize {
        match class {
            LockClass::Exclusive => self.running_exclusive,
            LockClass::Shared => self.running_shared,
            LockClass::None => self.running_unlocked,
        }
    }

    pub fn queued(&self) -> usize {
        self.exclusive.len() + self.shared.len() + self.unlocked.len()
    }

    /// Begins activation on behalf of the first call.
    pub fn start(&mut self, trigger: C, class: LockClass) -> Vec<Step<C>> {
        if self.state != State::Created {
            return self.call(trigger, class);
        }
        let mut steps = vec![Step::Activate];
        self.state = State::Activating;
        self.running_exclusive += 1;
        if class != LockClass::None {
            self.trigger = Some(class);
        }
        self.queue_mut(class).push_back(trigger);
        self.advance(&mut steps);
        steps
    }

    pub fn call(&mut self, call: C, class: LockClass) -> Vec<Step<C>> {
        let mut steps = Vec::new();
        if self.accepts(class) {
            self.queue_mut(class).push_back(call);
            self.advance(&mut steps);
        } else {
            steps.push(Step::Reject(call));
        }
        steps
    }

    pub fn activated(&mut self, result: Result<(), ActionError>) -> Vec<Step<C>> {
        let mut steps = Vec::new();
        self.running_exclusive = self.running_exclusive.saturating_sub(1);
        let trigger = self.trigger.take();
        match result {
            Ok(()) => {
                if self.state == State::Activating {
                    self.state = State::Active;
                }
            }
            Err(error) => {
                if let Some(call) = trigger.and_then(|class| self.queue_mut(class).pop_front()) {
                    steps.push(Step::Fail(call, error));
                }
                self.want_deactivation(&mut steps);
            }
        }
        self.advance(&mut steps);
        steps
    }

    pub fn deactivated(&mut self) -> Vec<Step<C>> {
        let mut steps = Vec::new();
        self.running_exclusive = self.running_exclusive.saturating_sub(1);
        self.state = State::Deactivated;
        self.advance(&mut steps);
        steps
    }

    pub fn finished(&mut self, class: LockClass) -> Vec<Step<C>> {
        let mut steps = Vec::new();
        let running = match class {
            LockClass::Exclusive => &mut self.running_exclusive,
            LockClass::Shared => &mut self.running_shared,
            LockClass::None => &mut self.running_unlocked,
        };
        debug_assert!(*running > 0, "finished a {class:?} call that was not running");
        *running = running.saturating_sub(1);
        self.advance(&mut steps);
        steps
    }

    pub fn request_deactivation(&mut self) -> Vec<Step<C>> {
        let mut steps = Vec::new();
        self.want_deactivation(&mut steps);
        self.advance(&mut steps);
        steps
    }

    fn accepts(&self, class: LockClass) -> bool {
        match class {
            LockClass::None => !matches!(self.state, State::Deactivated),
            LockClass::Exclusive | LockClass::Shared => matches!(
                self.state,
                State::Created | State::Activating | State::Active
            ),
        }
    }

    fn queue_mut(&mut self, class: LockClass) -> &mut VecDeque<C> {
        match class {
            LockClass::Exclusive => &mut self.exclusive,
            LockClass::Shared => &mut self.shared,
            LockClass::None => &mut self.unlocked,
        }
    }

    /// Locked calls that are still queued can never run once deactivation is wanted.
    fn want_deactivation(&mut self, steps: &mut Vec<Step<C>>) {
        if matches!(
            self.state,
            State::Created | State::Activating | State::Active
        ) {
            self.state = State::DeactivationWanted;
        }
        self.trigger = None;
        steps.extend(self.exclusive.drain(..).map(Step::Reject));
        steps.extend(self.shared.drain(..).map(Step::Reject));
    }

    fn advance(&mut self, steps: &mut Vec<Step<C>>) {
        if self.exited {
            return;
        }

        if matches!(
            self.state,
            State::Activating | State::Active | State::DeactivationWanted | State::Deactivating
        ) {
            while let Some(call) = self.unlocked.pop_front() {
                self.running_unlocked += 1;
                steps.push(Step::Run(call));
            }
        }

        match self.state {
            State::Active => {
                if self.running_exclusive == 0 && self.running_shared == 0 {
                    if let Some(call) = self.exclusive.pop_front() {
                        self.running_exclusive += 1;
                        steps.push(Step::Run(call));
                    }
                }
                if self.running_exclusive == 0 && self.exclusive.is_empty() {
                    while let Some(call) = self.shared.pop_front() {
                        self.running_shared += 1;
                        steps.push(Step::Run(call));
                    }
                }
            }
            State::DeactivationWanted => {
                if self.running_exclusive == 0 && self.running_shared == 0 {
                    self.state = State::Deactivating;
                    self.running_exclusive += 1;
                    steps.push(Step::Deactivate);
                }
            }
            State::Deactivated => {
                steps.extend(self.unlocked.drain(..).map(Step::Reject));
                if self.running_unlocked == 0 {
                    self.exited = true;
                    steps.push(Step::Exit);
                }
            }
            State::Created | State::Activating | State::Deactivating => {}
        }
    }
}
