//! Periodic tick driver around the engine

use crate::collector::{ProcessCollector, ProcessSample};
use crate::engine::{Engine, TickReport, UsageReading};
use crate::notifier::AlertSink;
use crate::protocol::StatusData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

struct Session {
    engine: Engine,
    sink: Box<dyn AlertSink>,
    monitored_count: usize,
}

pub struct TickOutcome {
    pub report: TickReport,
    pub status: StatusData,
}

/// Serializes every engine access behind one lock so ticks never overlap and status
/// queries never observe a half-applied tick.
pub struct Monitor {
    collector: Arc<dyn ProcessCollector>,
    session: Mutex<Session>,
    paused: AtomicBool,
    tick_interval: Duration,
}

impl Monitor {
    pub fn new(
        collector: Arc<dyn ProcessCollector>,
        engine: Engine,
        sink: Box<dyn AlertSink>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            collector,
            session: Mutex::new(Session { engine, sink, monitored_count: 0 }),
            paused: AtomicBool::new(false),
            tick_interval,
        }
    }

    pub async fn run<F>(self: Arc<Self>, mut on_tick: F)
    where
        F: FnMut(&TickOutcome) + Send,
    {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("Monitoring every {:?}", self.tick_interval);

        loop {
            interval.tick().await;
            if let Some(outcome) = self.tick_once().await {
                on_tick(&outcome);
            }
        }
    }

    /// Samples the collector and applies one tick. Returns `None` while paused.
    pub async fn tick_once(&self) -> Option<TickOutcome> {
        if self.is_paused() {
            return None;
        }
        let collector = Arc::clone(&self.collector);
        let samples = match tokio::task::spawn_blocking(move || collector.sample()).await {
            Ok(samples) => samples,
            Err(e) => {
                error!("Process sampling task failed: {}", e);
                Vec::new()
            }
        };
        self.apply(&samples, Instant::now()).await
    }

    /// Applies an already collected sample set at `now`. Returns `None` while paused.
    pub async fn apply(&self, samples: &[ProcessSample], now: Instant) -> Option<TickOutcome> {
        let mut session = self.session.lock().await;
        if self.is_paused() {
            return None;
        }
        let Session { engine, sink, monitored_count } = &mut *session;
        let report = engine.tick(samples, now, &mut **sink);
        *monitored_count = report.process_count;
        let status = StatusData::from_engine(engine.status(now), false, *monitored_count);
        Some(TickOutcome { report, status })
    }

    /// Stops ticking, clears outstanding alerts and drops all baselines.
    pub async fn pause(&self) {
        let mut session = self.session.lock().await;
        if self.paused.swap(true, Ordering::SeqCst) {
            return;
        }
        let Session { engine, sink, monitored_count } = &mut *session;
        let cleared = engine.stop(&mut **sink);
        *monitored_count = 0;
        info!("Monitoring paused, cleared {} alert(s)", cleared.len());
    }

    /// Resumes ticking; the first tick after resuming only primes baselines.
    pub async fn resume(&self) {
        if self.paused.swap(false, Ordering::SeqCst) {
            info!("Monitoring resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub async fn status(&self) -> StatusData {
        let session = self.session.lock().await;
        StatusData::from_engine(
            session.engine.status(Instant::now()),
            self.is_paused(),
            session.monitored_count,
        )
    }

    pub async fn usage(&self) -> Vec<UsageReading> {
        self.session.lock().await.engine.significant_readings()
    }
}
