//! tradegen runner — drives the generator the way a blotter page would.
//!
//! This crate builds on `tradegen-core` to provide:
//! - TOML demo configuration (seed, initial rows, amplitude, timers)
//! - The driver: one atomic action at a time against a `TradeStore`
//! - Fixed, variable (slider) and one-shot timers with a virtual-clock simulation
//! - A background driver thread for real-time sessions
//! - Run summaries and CSV/JSON export

pub mod config;
pub mod driver;
pub mod export;
pub mod schedule;
pub mod summary;
pub mod worker;

pub use config::{Cadence, ConfigError, DemoConfig, TimerConfig};
pub use driver::{Action, ActionOutcome, ActionStats, Driver};
pub use export::{import_summary, save_artifacts, snapshot_csv, summary_json};
pub use schedule::{FiredTimer, Schedule, ScheduleError, Simulation};
pub use summary::RunSummary;
pub use worker::{spawn_driver, DriverCommand, DriverEvent, DriverHandle, WorkerError};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<DemoConfig>();
        assert_sync::<DemoConfig>();
        assert_send::<TimerConfig>();
        assert_sync::<TimerConfig>();
    }

    #[test]
    fn run_summary_is_send_sync() {
        assert_send::<RunSummary>();
        assert_sync::<RunSummary>();
    }

    #[test]
    fn driver_and_schedule_are_send() {
        assert_send::<Driver>();
        assert_send::<Schedule>();
        assert_send::<Simulation>();
    }

    #[test]
    fn channel_messages_are_send() {
        assert_send::<DriverCommand>();
        assert_send::<DriverEvent>();
    }
}
