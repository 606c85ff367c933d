//! Step accounting: turns a reboot-resettable hardware step counter (or a
//! step detector) into a persisted "steps since local midnight" value.

mod accountant;
mod clock;
mod history;
mod ledger;
mod listener;
mod sensor;
mod store;
mod types;
mod wake;

pub use accountant::{AccountantBuilder, StepAccountant};
pub use clock::{DayClock, LocalClock, ManualClock};
pub use history::{WEEK_DAYS, week_summary};
pub use ledger::StepLedger;
pub use listener::{ChannelListener, StepsListener};
pub use sensor::{ManualSensor, NoSensor, SensorCapabilities, SensorSink, StepSensor};
pub use store::{MemoryStore, StepStore};
pub use types::{AccountingError, Result};
pub use wake::{NoopWakeLock, WakeGuard, WakeLock};
