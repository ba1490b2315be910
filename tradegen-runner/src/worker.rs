//! Background driver thread for real-time sessions.
//!
//! The thread owns the driver (generator, mutator and store) and is the only
//! writer of the live set. Other threads send `DriverCommand`s over an `mpsc`
//! channel and receive `DriverEvent`s back, including every store event.
//! Timers run against wall-clock milliseconds since spawn; an overdue timer
//! fires once and is rescheduled from the current time, so a stalled thread
//! does not burst-fire on wake-up.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use thiserror::Error;
use tradegen_core::{RandomSource, StoreEvent, Trade};

use crate::driver::{Action, Driver};
use crate::schedule::Schedule;
use crate::summary::RunSummary;

/// Commands sent to the driver thread.
#[derive(Debug, Clone)]
pub enum DriverCommand {
    /// Apply an action now (a button press).
    Apply(Action),
    /// Move a variable timer's control (a slider).
    SetLevel { timer: String, level: u8 },
    /// Stop firing timers; commands are still served.
    Pause,
    Resume,
    /// Ask for a copy of the live set.
    Snapshot,
    Shutdown,
}

/// Events sent back from the driver thread.
#[derive(Debug, Clone)]
pub enum DriverEvent {
    Store(StoreEvent),
    Snapshot(Vec<Trade>),
    LevelChanged { timer: String, period_ms: u64 },
    Rejected { command: String, error: String },
    Stopped(Box<RunSummary>),
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("spawn driver thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("driver thread has stopped")]
    Disconnected,

    #[error("driver thread panicked")]
    Panicked,
}

/// Handle to a running driver thread.
pub struct DriverHandle {
    commands: Sender<DriverCommand>,
    events: Receiver<DriverEvent>,
    thread: JoinHandle<()>,
}

impl DriverHandle {
    pub fn send(&self, command: DriverCommand) -> Result<(), WorkerError> {
        self.commands.send(command).map_err(|_| WorkerError::Disconnected)
    }

    pub fn events(&self) -> &Receiver<DriverEvent> {
        &self.events
    }

    /// Stop the thread and return its final summary. Pending events are discarded.
    pub fn shutdown(self) -> Result<RunSummary, WorkerError> {
        // The thread may already be gone; the event stream tells us either way.
        let _ = self.commands.send(DriverCommand::Shutdown);
        let summary = loop {
            match self.events.recv() {
                Ok(DriverEvent::Stopped(summary)) => break Ok(*summary),
                Ok(_) => continue,
                Err(_) => break Err(WorkerError::Disconnected),
            }
        };
        self.thread.join().map_err(|_| WorkerError::Panicked)?;
        summary
    }
}

/// Spawn the driver thread.
pub fn spawn_driver<R>(driver: Driver<R>, schedule: Schedule) -> Result<DriverHandle, WorkerError>
where
    R: RandomSource + Send + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (event_tx, event_rx) = mpsc::channel();
    let thread = thread::Builder::new()
        .name("tradegen-driver".into())
        .spawn(move || driver_loop(driver, schedule, cmd_rx, event_tx))?;
    Ok(DriverHandle {
        commands: cmd_tx,
        events: event_rx,
        thread,
    })
}

fn driver_loop<R: RandomSource>(
    mut driver: Driver<R>,
    mut schedule: Schedule,
    rx: Receiver<DriverCommand>,
    tx: Sender<DriverEvent>,
) {
    let store_tx = tx.clone();
    driver.store_mut().subscribe(move |event| {
        let _ = store_tx.send(DriverEvent::Store(event.clone()));
    });

    let started = Instant::now();
    let elapsed_ms = || started.elapsed().as_millis() as u64;
    let mut paused = false;
    info!("driver thread started with {} timers", schedule.timers().len());

    loop {
        if !paused {
            let now = elapsed_ms();
            while let Some((due, idx)) = schedule.next_due() {
                if due > now {
                    break;
                }
                let action = schedule.fire(idx, now);
                driver.apply(&action);
            }
        }

        let wait = if paused {
            None
        } else {
            schedule
                .next_due()
                .map(|(due, _)| Duration::from_millis(due.saturating_sub(elapsed_ms())))
        };
        let command = match wait {
            Some(timeout) => match rx.recv_timeout(timeout) {
                Ok(cmd) => cmd,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match rx.recv() {
                Ok(cmd) => cmd,
                Err(_) => break,
            },
        };

        debug!("driver command: {command:?}");
        match command {
            DriverCommand::Apply(action) => {
                driver.apply(&action);
            }
            DriverCommand::SetLevel { timer, level } => match schedule.set_level(&timer, level) {
                Ok(period_ms) => {
                    let _ = tx.send(DriverEvent::LevelChanged { timer, period_ms });
                }
                Err(e) => {
                    warn!("rejected level change for '{timer}': {e}");
                    let _ = tx.send(DriverEvent::Rejected {
                        command: format!("set level {level} on '{timer}'"),
                        error: e.to_string(),
                    });
                }
            },
            DriverCommand::Pause => paused = true,
            DriverCommand::Resume => paused = false,
            DriverCommand::Snapshot => {
                let _ = tx.send(DriverEvent::Snapshot(driver.store().all_items().to_vec()));
            }
            DriverCommand::Shutdown => break,
        }
    }

    let summary = driver.summary(elapsed_ms());
    info!(
        "driver thread stopping: {} live trades, {} mutations",
        summary.live_trades, summary.stats.mutated
    );
    let _ = tx.send(DriverEvent::Stopped(Box::new(summary)));
}
