//! Rtuscope frontend components.
//!
//! The frontend is a plain consumer of the poll worker's notification
//! channel: it knows nothing about the serial session, it only turns
//! events into a timestamped text log and a numeric series for charting.

pub mod history;
pub mod series;

pub use history::{EntryKind, LogEntry, ReadingLog};
pub use series::ChartSeries;
