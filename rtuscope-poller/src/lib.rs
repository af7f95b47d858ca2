//! Modbus RTU polling core.
//!
//! This crate owns the serial session lifecycle and the background polling
//! loop. A [`worker::PollWorker`] opens one [`session::ModbusSession`] per
//! run, reads a fixed block of holding registers at a fixed interval, and
//! forwards each cycle's outcome over the notification channel from
//! `rtuscope-common`. Consumers never touch the serial handle; they only
//! read events.

pub mod session;
pub mod worker;

pub use session::{ConnectError, ModbusSession, ReadError, RegisterSession};
pub use worker::{PollPlan, PollWorker, WorkerState};
