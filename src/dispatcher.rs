//! Timed keystroke dispatch.
//!
//! A [`Dispatcher`] owns at most one [`TypingJob`]. Arming it with
//! [`Dispatcher::start`] moves the job to `Running` and hands back a
//! [`StopHandle`]; [`Dispatcher::run`] then waits out the initial delay and
//! sends one character per tick until the queue drains, the handle is
//! stopped, or the injector fails.
//!
//! Only one tick timer exists at a time. The next one is created after the
//! previous tick has finished sending, so ticks never overlap.

use crate::error::{Result, TyperError};
use crate::injector::{KeystrokeInjector, Keystroke};
use crate::InjectionError;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Pause between two characters when nothing else is configured.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Lifecycle of a [`TypingJob`]. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Running,
    Stopped,
}

/// Why a run ended without an injection error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every character was sent.
    Exhausted,
    /// [`StopHandle::stop`] was called first.
    Cancelled,
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Injection actions performed.
    pub sent: usize,
    pub reason: StopReason,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Sent(Keystroke),
    Finished(StopReason),
}

/// The characters left to type for one run, plus its timing.
#[derive(Debug)]
pub struct TypingJob {
    characters: VecDeque<char>,
    state: JobState,
    initial_delay: Duration,
    tick_interval: Duration,
    sent: usize,
    finished: Option<StopReason>,
}

impl TypingJob {
    pub fn new(
        characters: impl IntoIterator<Item = char>,
        initial_delay: Duration,
        tick_interval: Duration,
    ) -> Self {
        Self {
            characters: characters.into_iter().collect(),
            state: JobState::Idle,
            initial_delay,
            tick_interval,
            sent: 0,
            finished: None,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn remaining(&self) -> usize {
        self.characters.len()
    }

    /// Injection attempts made so far, including a failed one.
    pub fn sent(&self) -> usize {
        self.sent
    }

    /// Why the job ended, once it has ended without an injection error.
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.finished
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// `Idle -> Running`. Has no effect on a stopped job.
    pub fn arm(&mut self) {
        if self.state == JobState::Idle {
            self.state = JobState::Running;
        }
    }

    pub fn cancel(&mut self) {
        self.state = JobState::Stopped;
    }

    /// Perform one dispatch step.
    ///
    /// Pops and sends the next character while the job is running. Once the
    /// job is no longer running or the queue is empty the job is stopped and
    /// `Finished` is returned; a failed send also stops the job. Ticking a
    /// stopped job repeats the reason it first stopped with.
    pub fn tick<I: KeystrokeInjector + ?Sized>(
        &mut self,
        injector: &mut I,
    ) -> std::result::Result<Tick, InjectionError> {
        if self.state != JobState::Running {
            self.state = JobState::Stopped;
            let reason = *self.finished.get_or_insert(StopReason::Cancelled);
            return Ok(Tick::Finished(reason));
        }

        let Some(c) = self.characters.pop_front() else {
            self.state = JobState::Stopped;
            self.finished = Some(StopReason::Exhausted);
            return Ok(Tick::Finished(StopReason::Exhausted));
        };

        let keystroke = Keystroke::from(c);
        self.sent += 1;
        if let Err(e) = keystroke.send(injector) {
            self.state = JobState::Stopped;
            return Err(e);
        }

        Ok(Tick::Sent(keystroke))
    }
}

/// Cancels the job it was handed out for.
///
/// Cloning is cheap and every clone stops the same job. Stopping is
/// idempotent and works before, during, or after the run.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { tx: Arc::new(tx) }, rx)
    }

    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

struct ArmedJob {
    job: TypingJob,
    handle: StopHandle,
    cancel: watch::Receiver<bool>,
}

/// Drives typing jobs against a keystroke injector.
pub struct Dispatcher<I> {
    injector: I,
    tick_interval: Duration,
    current: Option<ArmedJob>,
}

impl<I: KeystrokeInjector> Dispatcher<I> {
    pub fn new(injector: I) -> Self {
        Self::with_tick_interval(injector, DEFAULT_TICK_INTERVAL)
    }

    pub fn with_tick_interval(injector: I, tick_interval: Duration) -> Self {
        Self {
            injector,
            tick_interval,
            current: None,
        }
    }

    pub fn injector(&self) -> &I {
        &self.injector
    }

    pub fn into_injector(self) -> I {
        self.injector
    }

    /// State of the current job, `Idle` if none was ever started.
    pub fn state(&self) -> JobState {
        self.current
            .as_ref()
            .map_or(JobState::Idle, |armed| armed.job.state())
    }

    /// Arm a fresh job for `sequence`.
    ///
    /// Rejected with [`TyperError::AlreadyRunning`] while the previous job is
    /// still running; a stopped job is simply replaced.
    pub fn start(
        &mut self,
        sequence: impl IntoIterator<Item = char>,
        initial_delay: Duration,
    ) -> Result<StopHandle> {
        if self.state() == JobState::Running {
            return Err(TyperError::AlreadyRunning);
        }

        let mut job = TypingJob::new(sequence, initial_delay, self.tick_interval);
        job.arm();
        info!(
            characters = job.remaining(),
            delay = ?initial_delay,
            interval = ?self.tick_interval,
            "Typing job armed"
        );

        let (handle, cancel) = StopHandle::new();
        self.current = Some(ArmedJob {
            job,
            handle: handle.clone(),
            cancel,
        });
        Ok(handle)
    }

    /// Stop the current job, if any.
    pub fn stop(&mut self) {
        if let Some(armed) = self.current.as_mut() {
            armed.handle.stop();
            armed.job.cancel();
        }
    }

    /// Run the armed job to completion.
    ///
    /// Returns the summary once the queue is drained or the job is stopped,
    /// or the injector's error if a send fails.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let Some(armed) = self.current.as_mut() else {
            return Err(TyperError::NotArmed);
        };
        let ArmedJob { job, cancel, .. } = armed;

        let mut wait = if job.remaining() == 0 {
            Duration::ZERO
        } else {
            job.initial_delay()
        };

        loop {
            if !wait.is_zero() {
                tokio::select! {
                    biased;
                    _ = cancel.wait_for(|stopped| *stopped) => job.cancel(),
                    () = tokio::time::sleep(wait) => {}
                }
            }
            if *cancel.borrow() {
                job.cancel();
            }

            match job.tick(&mut self.injector) {
                Ok(Tick::Sent(keystroke)) => {
                    debug!(?keystroke, remaining = job.remaining(), "Sent keystroke");
                    wait = job.tick_interval();
                }
                Ok(Tick::Finished(reason)) => {
                    info!(sent = job.sent(), ?reason, "Typing job finished");
                    return Ok(RunSummary {
                        sent: job.sent(),
                        reason,
                    });
                }
                Err(e) => {
                    error!(sent = job.sent(), error = %e, "Typing aborted");
                    return Err(e.into());
                }
            }
        }
    }
}
