use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use log::{debug, info, warn};
use steps_core::{
    AccountingSettings, DailyRecord, DayCode, DayTotal, SensorEvent, SensorMode, StepSnapshot,
    WeekSummary, distance_km, distance_meters,
};
use tokio::runtime::{Builder, Handle};
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::clock::{DayClock, LocalClock};
use crate::history;
use crate::ledger::StepLedger;
use crate::listener::StepsListener;
use crate::sensor::{NoSensor, SensorSink, StepSensor};
use crate::store::StepStore;
use crate::types::{AccountingError, Result};
use crate::wake::{NoopWakeLock, WakeGuard, WakeLock};

struct Inner {
    ledger: StepLedger,
    store: Box<dyn StepStore>,
}

/// State reachable from sensor callbacks and the heartbeat worker.
pub(crate) struct Shared {
    inner: Mutex<Inner>,
    clock: Arc<dyn DayClock>,
    listener: Arc<dyn StepsListener>,
    settings: AccountingSettings,
    // 0 while not listening; sinks from older cycles carry stale values
    generation: AtomicU64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn deliver(&self, generation: u64, mode: SensorMode, event: SensorEvent) {
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("dropping sensor event from a stopped listener");
            return;
        }
        if event.mode() != mode {
            debug!("dropping {} event while in {} mode", event.mode(), mode);
            return;
        }
        let snapshot = {
            let mut guard = self.lock();
            let today = self.clock.today();
            let Inner { ledger, store } = &mut *guard;
            if !ledger.ingest(event, today, store.as_ref()) {
                return;
            }
            ledger.snapshot(self.settings.stride_length_m)
        };
        self.listener.on_steps_updated(snapshot);
    }

    /// Snapshot after applying any pending day rollover.
    fn refreshed_snapshot(&self) -> StepSnapshot {
        let mut guard = self.lock();
        let today = self.clock.today();
        let Inner { ledger, store } = &mut *guard;
        ledger.roll_over(today, store.as_ref());
        ledger.snapshot(self.settings.stride_length_m)
    }

    /// Read-only snapshot for the heartbeat.
    fn current_snapshot(&self) -> StepSnapshot {
        self.lock().ledger.snapshot(self.settings.stride_length_m)
    }

    fn emit(&self, snapshot: StepSnapshot) {
        self.listener.on_steps_updated(snapshot);
    }
}

struct ListeningSession {
    mode: SensorMode,
    heartbeat: Option<AbortHandle>,
    _wake: Option<WakeGuard>,
}

/// Owns the step sensor subscription and today's step total.
///
/// One accountant is expected per process. The owner drives it with
/// [`start`](Self::start) and [`stop`](Self::stop); sensor events arrive
/// through the [`SensorSink`] handed to the sensor at start.
pub struct StepAccountant {
    shared: Arc<Shared>,
    sensor: Arc<dyn StepSensor>,
    wake_lock: Arc<dyn WakeLock>,
    runtime: Option<Handle>,
    session: Option<ListeningSession>,
    last_mode: Option<SensorMode>,
    next_generation: u64,
}

pub struct AccountantBuilder {
    store: Box<dyn StepStore>,
    listener: Arc<dyn StepsListener>,
    sensor: Arc<dyn StepSensor>,
    clock: Arc<dyn DayClock>,
    wake_lock: Arc<dyn WakeLock>,
    settings: AccountingSettings,
    runtime: Option<Handle>,
}

impl AccountantBuilder {
    pub fn sensor(mut self, sensor: impl StepSensor + 'static) -> Self {
        self.sensor = Arc::new(sensor);
        self
    }

    pub fn clock(mut self, clock: impl DayClock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn wake_lock(mut self, wake_lock: impl WakeLock + 'static) -> Self {
        self.wake_lock = Arc::new(wake_lock);
        self
    }

    pub fn settings(mut self, settings: AccountingSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Runtime for the heartbeat. Defaults to the runtime current at `start`,
    /// or a dedicated worker thread when there is none.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn build(self) -> StepAccountant {
        let today = self.clock.today();
        let ledger = StepLedger::restore(self.store.as_ref(), today);
        debug!(
            "restored {} steps for {} (offset {:?})",
            ledger.steps_today(),
            today,
            ledger.calibration_offset()
        );
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                ledger,
                store: self.store,
            }),
            clock: self.clock,
            listener: self.listener,
            settings: self.settings,
            generation: AtomicU64::new(0),
        });
        StepAccountant {
            shared,
            sensor: self.sensor,
            wake_lock: self.wake_lock,
            runtime: self.runtime,
            session: None,
            last_mode: None,
            next_generation: 0,
        }
    }
}

impl StepAccountant {
    pub fn builder(
        store: impl StepStore + 'static,
        listener: impl StepsListener + 'static,
    ) -> AccountantBuilder {
        AccountantBuilder {
            store: Box::new(store),
            listener: Arc::new(listener),
            sensor: Arc::new(NoSensor),
            clock: Arc::new(LocalClock),
            wake_lock: Arc::new(NoopWakeLock),
            settings: AccountingSettings::default(),
            runtime: None,
        }
    }

    /// Accountant on the local clock with no sensor attached.
    pub fn new(store: impl StepStore + 'static, listener: impl StepsListener + 'static) -> Self {
        Self::builder(store, listener).build()
    }

    /// Starts listening and returns the chosen mode.
    ///
    /// Calling this while already listening only re-emits the current
    /// snapshot. Without step hardware the accountant stays inactive, emits
    /// a single snapshot and reports [`SensorMode::Unavailable`]. Fails when
    /// the sensor refuses registration or the heartbeat worker cannot start.
    pub fn start(&mut self) -> Result<SensorMode> {
        if let Some(session) = &self.session {
            let mode = session.mode;
            self.shared.emit(self.shared.refreshed_snapshot());
            return Ok(mode);
        }

        let mode = self.sensor.capabilities().preferred_mode();
        self.last_mode = Some(mode);
        if !mode.is_available() {
            info!("no step sensor available; step counting disabled");
            self.shared.emit(self.shared.refreshed_snapshot());
            return Ok(mode);
        }

        let wake = match WakeGuard::acquire(self.wake_lock.clone()) {
            Ok(guard) => Some(guard),
            Err(err) => {
                warn!("continuing without wake lock: {}", err);
                None
            }
        };

        self.next_generation += 1;
        let generation = self.next_generation;
        self.shared.generation.store(generation, Ordering::SeqCst);
        let sink = SensorSink::new(Arc::downgrade(&self.shared), mode, generation);
        if let Err(err) = self.sensor.register(mode, sink) {
            self.shared.generation.store(0, Ordering::SeqCst);
            return Err(err);
        }

        let heartbeat = match self.spawn_heartbeat() {
            Ok(heartbeat) => heartbeat,
            Err(err) => {
                self.shared.generation.store(0, Ordering::SeqCst);
                self.sensor.unregister();
                return Err(err);
            }
        };
        self.session = Some(ListeningSession {
            mode,
            heartbeat,
            _wake: wake,
        });
        info!("step accounting started in {} mode", mode);
        self.shared.emit(self.shared.refreshed_snapshot());
        Ok(mode)
    }

    /// Stops listening. Persisted state is kept; a no-op when not started.
    pub fn stop(&mut self) {
        self.shared.generation.store(0, Ordering::SeqCst);
        let Some(session) = self.session.take() else {
            return;
        };
        self.sensor.unregister();
        if let Some(heartbeat) = &session.heartbeat {
            heartbeat.abort();
        }
        drop(session);
        info!("step accounting stopped");
    }

    pub fn is_listening(&self) -> bool {
        self.session.is_some()
    }

    /// Mode picked by the most recent `start`, if any.
    pub fn mode(&self) -> Option<SensorMode> {
        self.last_mode
    }

    pub fn has_step_sensor(&self) -> bool {
        self.sensor.capabilities().preferred_mode().is_available()
    }

    pub fn settings(&self) -> AccountingSettings {
        self.shared.settings
    }

    pub fn snapshot(&self) -> StepSnapshot {
        self.shared.refreshed_snapshot()
    }

    /// Pushes the current snapshot to the listener outside the heartbeat,
    /// applying any pending rollover first.
    pub fn refresh(&self) -> StepSnapshot {
        let snapshot = self.shared.refreshed_snapshot();
        self.shared.emit(snapshot);
        snapshot
    }

    pub fn day(&self) -> DayCode {
        self.snapshot().day
    }

    pub fn steps_today(&self) -> u64 {
        self.snapshot().steps_today
    }

    pub fn distance_today_meters(&self) -> f64 {
        distance_meters(self.steps_today(), self.shared.settings.stride_length_m)
    }

    pub fn distance_today_km(&self) -> f64 {
        distance_km(self.steps_today(), self.shared.settings.stride_length_m)
    }

    /// Best completed day on record; `None` until a day has rolled over.
    pub fn daily_record(&self) -> Option<DailyRecord> {
        let mut guard = self.shared.lock();
        let today = self.shared.clock.today();
        let Inner { ledger, store } = &mut *guard;
        ledger.roll_over(today, store.as_ref());
        store.daily_record().unwrap_or_else(|err| {
            warn!("failed to load daily record: {}", err);
            None
        })
    }

    pub fn day_totals(&self, start: DayCode, end: DayCode) -> Result<Vec<DayTotal>> {
        self.shared.lock().store.day_totals(start, end)
    }

    /// Seven days ending today, including the live total.
    pub fn week_summary(&self) -> Result<WeekSummary> {
        let mut guard = self.shared.lock();
        let today = self.shared.clock.today();
        let Inner { ledger, store } = &mut *guard;
        ledger.roll_over(today, store.as_ref());
        history::week_summary(
            store.as_ref(),
            ledger.day(),
            self.shared.settings.stride_length_m,
        )
    }

    fn spawn_heartbeat(&self) -> Result<Option<AbortHandle>> {
        let period = self.shared.settings.heartbeat_interval;
        if period.is_zero() {
            return Ok(None);
        }
        let shared = Arc::downgrade(&self.shared);
        let first_tick = Instant::now() + period;
        let beat = heartbeat(shared, first_tick, period);
        if let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) {
            return Ok(Some(runtime.spawn(beat).abort_handle()));
        }

        debug!("no async runtime available; running heartbeat on its own thread");
        let runtime = Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|err| AccountingError::Heartbeat(format!("build runtime: {}", err)))?;
        let task = runtime.spawn(beat);
        let abort = task.abort_handle();
        std::thread::Builder::new()
            .name("step-heartbeat".to_string())
            .spawn(move || {
                // ends once the task is aborted or the accountant is gone
                let _ = runtime.block_on(task);
            })
            .map_err(|err| AccountingError::Heartbeat(format!("spawn worker: {}", err)))?;
        Ok(Some(abort))
    }
}

/// Re-emits the current snapshot every `period` without touching state.
async fn heartbeat(shared: Weak<Shared>, first_tick: Instant, period: Duration) {
    let mut ticker = tokio::time::interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let Some(shared) = shared.upgrade() else {
            break;
        };
        shared.emit(shared.current_snapshot());
    }
}

impl Drop for StepAccountant {
    fn drop(&mut self) {
        self.stop();
    }
}
