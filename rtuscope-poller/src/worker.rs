//! Background polling worker.
//!
//! The worker owns the session for the duration of one run: it opens the
//! session, loops read-emit-sleep until a stop is requested, then closes
//! the session before the task returns. Stop is cooperative: the flag is a
//! watch channel observed at the top of each cycle and inside the
//! inter-cycle sleep, so a stop is bounded by one read timeout plus one
//! interval.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use rtuscope_common::{
    DeviceConfig, EventReceiver, EventSender, PollEvent, event_channel, format_registers,
};

use crate::session::{ModbusSession, RegisterSession};

/// Observable worker lifecycle state.
///
/// `Stopped` is equivalent to `Idle` for control purposes: `start` is
/// accepted from either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Never started.
    Idle,
    /// Polling loop active.
    Running,
    /// Stop requested, current cycle draining.
    Draining,
    /// Run finished; restartable.
    Stopped,
}

/// What to poll and how often.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPlan {
    /// First holding register of the block.
    pub start_address: u16,
    /// Registers per read; every data event carries exactly this many values.
    pub quantity: u16,
    /// Pause between cycles.
    pub interval: Duration,
}

impl PollPlan {
    /// Derive the plan from a device configuration.
    pub fn from_device(device: &DeviceConfig) -> Self {
        Self {
            start_address: device.start_address,
            quantity: device.quantity,
            interval: Duration::from_millis(device.poll_interval_ms),
        }
    }
}

type SessionFactory<S> = Box<dyn FnMut() -> S + Send>;

/// Handle controlling one polling worker.
///
/// At most one run is active at a time; `start` while a run is live is a
/// no-op. Each run gets a fresh session from the factory and a fresh event
/// channel; sessions are never reused across stop/start.
pub struct PollWorker<S: RegisterSession + 'static> {
    plan: PollPlan,
    sessions: SessionFactory<S>,
    active: Option<ActiveRun>,
    ran: bool,
}

struct ActiveRun {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl PollWorker<ModbusSession> {
    /// Create a worker polling a Modbus RTU device.
    pub fn new(device: DeviceConfig) -> Self {
        let plan = PollPlan::from_device(&device);
        Self::with_sessions(plan, move || ModbusSession::new(device.clone()))
    }
}

impl<S: RegisterSession + 'static> PollWorker<S> {
    /// Create a worker over an arbitrary session source.
    pub fn with_sessions<F>(plan: PollPlan, factory: F) -> Self
    where
        F: FnMut() -> S + Send + 'static,
    {
        Self {
            plan,
            sessions: Box::new(factory),
            active: None,
            ran: false,
        }
    }

    /// The plan this worker polls with.
    pub fn plan(&self) -> PollPlan {
        self.plan
    }

    /// Spawn the polling loop and return the event receiver for this run.
    ///
    /// Returns `None` without side effects when a run is still active, so a
    /// repeated start can never open a second session on the same port.
    pub fn start(&mut self) -> Option<EventReceiver> {
        if let Some(run) = &self.active {
            if !run.handle.is_finished() {
                debug!("start ignored: worker already running");
                return None;
            }
            // previous run ended on its own (fatal connect failure)
            self.ran = true;
        }

        let session = (self.sessions)();
        let (events, receiver) = event_channel();
        let (stop_tx, stop_rx) = watch::channel(false);

        let handle = tokio::spawn(run_loop(session, self.plan, stop_rx, events));
        self.active = Some(ActiveRun {
            stop: stop_tx,
            handle,
        });

        Some(receiver)
    }

    /// Request a stop and wait for the run to finish.
    ///
    /// Cooperative: the in-flight cycle completes first, so this returns
    /// within roughly one read timeout plus one interval. No-op when the
    /// worker was never started or is already stopped; safe to call
    /// repeatedly.
    pub async fn stop(&mut self) {
        let Some(run) = self.active.take() else {
            return;
        };

        let _ = run.stop.send(true);
        if let Err(e) = run.handle.await {
            if e.is_panic() {
                error!("poll worker panicked");
            }
        }
        self.ran = true;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        match &self.active {
            None if self.ran => WorkerState::Stopped,
            None => WorkerState::Idle,
            Some(run) if run.handle.is_finished() => WorkerState::Stopped,
            Some(run) if *run.stop.borrow() => WorkerState::Draining,
            Some(_) => WorkerState::Running,
        }
    }
}

impl<S: RegisterSession + 'static> Drop for PollWorker<S> {
    fn drop(&mut self) {
        // last resort; orderly shutdown is stop().await
        if let Some(run) = &self.active {
            run.handle.abort();
        }
    }
}

/// One worker run: open once, poll until stopped, close on every exit path.
async fn run_loop<S: RegisterSession>(
    mut session: S,
    plan: PollPlan,
    mut stop: watch::Receiver<bool>,
    events: EventSender,
) {
    if let Err(e) = session.open().await {
        error!(error = %e, "connect failed, worker exiting");
        let _ = events.send(PollEvent::Error(e.to_string()));
        session.close().await;
        return;
    }

    info!(
        start = plan.start_address,
        quantity = plan.quantity,
        interval_ms = plan.interval.as_millis() as u64,
        "polling started"
    );

    while !*stop.borrow() {
        match session.read_registers(plan.start_address, plan.quantity).await {
            Ok(values) => {
                debug!(count = values.len(), "read complete");
                let _ = events.send(PollEvent::DataReceived(format_registers(&values)));
            }
            Err(e) => {
                warn!(error = %e, "read failed");
                let _ = events.send(PollEvent::Error(e.to_string()));
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(plan.interval) => {}
            changed = stop.changed() => {
                // a dropped control handle also ends the run
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    session.close().await;
    info!("polling stopped");
}
