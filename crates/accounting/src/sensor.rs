use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use steps_core::{SensorEvent, SensorMode};

use crate::accountant::Shared;
use crate::types::{AccountingError, Result};

/// Step hardware present on the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorCapabilities {
    pub step_counter: bool,
    pub step_detector: bool,
}

impl SensorCapabilities {
    /// Counter first, detector as fallback.
    pub fn preferred_mode(&self) -> SensorMode {
        if self.step_counter {
            SensorMode::Cumulative
        } else if self.step_detector {
            SensorMode::Discrete
        } else {
            SensorMode::Unavailable
        }
    }
}

/// Platform step sensor. `register` is called at most once per listening cycle.
pub trait StepSensor: Send + Sync {
    fn capabilities(&self) -> SensorCapabilities;
    fn register(&self, mode: SensorMode, sink: SensorSink) -> Result<()>;
    fn unregister(&self);
}

/// Delivery handle passed to the sensor on registration. Events sent after the
/// accountant stops, or events of the wrong kind, are dropped.
#[derive(Clone)]
pub struct SensorSink {
    shared: Weak<Shared>,
    mode: SensorMode,
    generation: u64,
}

impl SensorSink {
    pub(crate) fn new(shared: Weak<Shared>, mode: SensorMode, generation: u64) -> Self {
        Self {
            shared,
            mode,
            generation,
        }
    }

    pub fn mode(&self) -> SensorMode {
        self.mode
    }

    pub fn deliver(&self, event: SensorEvent) {
        if let Some(shared) = self.shared.upgrade() {
            shared.deliver(self.generation, self.mode, event);
        }
    }
}

impl std::fmt::Debug for SensorSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorSink")
            .field("mode", &self.mode)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Device without step hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSensor;

impl StepSensor for NoSensor {
    fn capabilities(&self) -> SensorCapabilities {
        SensorCapabilities::default()
    }

    fn register(&self, mode: SensorMode, _sink: SensorSink) -> Result<()> {
        Err(AccountingError::Sensor(format!("no {} sensor", mode)))
    }

    fn unregister(&self) {}
}

/// Sensor driven by hand: replays, simulators and tests push events through
/// [`ManualSensor::emit`]. Clones share the same registration.
#[derive(Debug, Clone)]
pub struct ManualSensor {
    inner: Arc<Mutex<ManualState>>,
}

#[derive(Debug)]
struct ManualState {
    capabilities: SensorCapabilities,
    sink: Option<SensorSink>,
    registrations: usize,
}

impl ManualSensor {
    pub fn new(capabilities: SensorCapabilities) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualState {
                capabilities,
                sink: None,
                registrations: 0,
            })),
        }
    }

    pub fn counter() -> Self {
        Self::new(SensorCapabilities {
            step_counter: true,
            step_detector: true,
        })
    }

    pub fn detector() -> Self {
        Self::new(SensorCapabilities {
            step_counter: false,
            step_detector: true,
        })
    }

    fn state(&self) -> MutexGuard<'_, ManualState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns false when nothing is registered.
    pub fn emit(&self, event: SensorEvent) -> bool {
        let sink = self.state().sink.clone();
        match sink {
            Some(sink) => {
                sink.deliver(event);
                true
            }
            None => false,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.state().sink.is_some()
    }

    /// Total number of `register` calls seen.
    pub fn registrations(&self) -> usize {
        self.state().registrations
    }
}

impl StepSensor for ManualSensor {
    fn capabilities(&self) -> SensorCapabilities {
        self.state().capabilities
    }

    fn register(&self, mode: SensorMode, sink: SensorSink) -> Result<()> {
        let mut state = self.state();
        let supported = match mode {
            SensorMode::Cumulative => state.capabilities.step_counter,
            SensorMode::Discrete => state.capabilities.step_detector,
            SensorMode::Unavailable => false,
        };
        if !supported {
            return Err(AccountingError::Sensor(format!("no {} sensor", mode)));
        }
        if state.sink.is_some() {
            return Err(AccountingError::Sensor("listener already registered".to_string()));
        }
        state.sink = Some(sink);
        state.registrations += 1;
        Ok(())
    }

    fn unregister(&self) {
        self.state().sink = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_mode_falls_back_to_detector() {
        let both = SensorCapabilities {
            step_counter: true,
            step_detector: true,
        };
        let detector_only = SensorCapabilities {
            step_counter: false,
            step_detector: true,
        };
        assert_eq!(both.preferred_mode(), SensorMode::Cumulative);
        assert_eq!(detector_only.preferred_mode(), SensorMode::Discrete);
        assert_eq!(
            SensorCapabilities::default().preferred_mode(),
            SensorMode::Unavailable
        );
    }

    #[test]
    fn manual_sensor_without_registration_drops_events() {
        let sensor = ManualSensor::counter();
        assert!(!sensor.emit(SensorEvent::Counter(10.0)));
        assert!(!sensor.is_registered());
        assert_eq!(sensor.registrations(), 0);
    }
}
