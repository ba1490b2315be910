//! Timers and the virtual-clock simulation.
//!
//! A `Schedule` holds the configured timers and knows which one is due next.
//! `Simulation` drives a `Driver` from a schedule against a millisecond clock
//! that only moves when timers fire, so a 10-minute run takes as long as its
//! actions do and is reproducible from the seed. Ties are broken by timer
//! declaration order.

use log::{debug, info};
use rand::rngs::StdRng;
use thiserror::Error;
use tradegen_core::RandomSource;

use crate::config::{validate_cadence, Cadence, ConfigError, TimerConfig};
use crate::driver::{Action, ActionOutcome, Driver};
use crate::summary::RunSummary;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("no timer named '{0}'")]
    UnknownTimer(String),

    #[error("timer '{0}' does not have a variable cadence")]
    NotVariable(String),

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

#[derive(Debug, Clone)]
pub struct Timer {
    pub name: String,
    pub action: Action,
    cadence: Cadence,
    next_due_ms: Option<u64>,
    last_fired_ms: u64,
    fired: usize,
}

impl Timer {
    fn new(config: &TimerConfig) -> Self {
        Self {
            name: config.name.clone(),
            action: config.action.clone(),
            cadence: config.cadence,
            next_due_ms: Some(config.cadence.first_due_ms()),
            last_fired_ms: 0,
            fired: 0,
        }
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// `None` once a one-shot timer has fired.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.next_due_ms
    }

    pub fn fired(&self) -> usize {
        self.fired
    }
}

#[derive(Debug, Clone, Default)]
pub struct Schedule {
    timers: Vec<Timer>,
}

impl Schedule {
    /// Timers are taken as given; run `DemoConfig::validate` first, since a
    /// zero period never lets the clock advance.
    pub fn new(configs: &[TimerConfig]) -> Self {
        Self {
            timers: configs.iter().map(Timer::new).collect(),
        }
    }

    pub fn timers(&self) -> &[Timer] {
        &self.timers
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Earliest due time and the timer index; the lowest index wins ties.
    pub fn next_due(&self) -> Option<(u64, usize)> {
        self.timers
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.next_due_ms.map(|due| (due, i)))
            .min()
    }

    /// Mark timer `idx` fired at `now_ms` and return its action.
    pub fn fire(&mut self, idx: usize, now_ms: u64) -> Action {
        let timer = &mut self.timers[idx];
        timer.last_fired_ms = now_ms;
        timer.fired += 1;
        timer.next_due_ms = timer.cadence.period_ms().map(|p| now_ms + p);
        timer.action.clone()
    }

    /// Move a variable timer's control to `level`; returns the new period.
    ///
    /// The next firing is re-derived from the last one, so speeding up takes
    /// effect without waiting out the old period.
    pub fn set_level(&mut self, name: &str, level: u8) -> Result<u64, ScheduleError> {
        let timer = self
            .timers
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| ScheduleError::UnknownTimer(name.to_string()))?;
        let Cadence::Variable { min_ms, max_ms, .. } = timer.cadence else {
            return Err(ScheduleError::NotVariable(name.to_string()));
        };
        let cadence = Cadence::Variable { min_ms, max_ms, level };
        validate_cadence(name, &cadence)?;

        let period = cadence.period_ms().unwrap_or(max_ms);
        timer.cadence = cadence;
        if timer.next_due_ms.is_some() {
            timer.next_due_ms = Some(timer.last_fired_ms + period);
        }
        debug!("timer '{name}' level {level} → period {period} ms");
        Ok(period)
    }
}

/// One timer firing during a simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredTimer {
    pub at_ms: u64,
    pub timer: String,
    pub outcome: ActionOutcome,
}

#[derive(Debug)]
pub struct Simulation<R = StdRng> {
    driver: Driver<R>,
    schedule: Schedule,
    clock_ms: u64,
}

impl<R: RandomSource> Simulation<R> {
    pub fn new(driver: Driver<R>, schedule: Schedule) -> Self {
        Self {
            driver,
            schedule,
            clock_ms: 0,
        }
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn driver(&self) -> &Driver<R> {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut Driver<R> {
        &mut self.driver
    }

    pub fn into_driver(self) -> Driver<R> {
        self.driver
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn set_level(&mut self, timer: &str, level: u8) -> Result<u64, ScheduleError> {
        self.schedule.set_level(timer, level)
    }

    /// Fire the next timer if it is due at or before `limit_ms`.
    pub fn step_until(&mut self, limit_ms: u64) -> Option<FiredTimer> {
        let (due, idx) = self.schedule.next_due()?;
        // A level change can pull a due time behind the clock.
        let at_ms = due.max(self.clock_ms);
        if at_ms > limit_ms {
            return None;
        }
        self.clock_ms = at_ms;
        let action = self.schedule.fire(idx, at_ms);
        let outcome = self.driver.apply(&action);
        Some(FiredTimer {
            at_ms,
            timer: self.schedule.timers[idx].name.clone(),
            outcome,
        })
    }

    /// Run every timer due in the next `duration_ms` and summarise.
    pub fn run_for(&mut self, duration_ms: u64) -> RunSummary {
        let end = self.clock_ms.saturating_add(duration_ms);
        info!(
            "simulating {duration_ms} ms with {} timers from t={}",
            self.schedule.timers.len(),
            self.clock_ms
        );
        let mut fired = 0usize;
        while self.step_until(end).is_some() {
            fired += 1;
        }
        self.clock_ms = end;
        let summary = self.driver.summary(self.clock_ms);
        info!(
            "simulation reached t={} ms: {fired} firings, {} live trades",
            self.clock_ms, summary.live_trades
        );
        summary
    }
}
