use std::fmt;

/// Errors surfaced by the accountant and its platform seams.
#[derive(Debug)]
pub enum AccountingError {
    Db(steps_db::DbError),
    Sensor(String),
    WakeLock(String),
    Heartbeat(String),
}

impl fmt::Display for AccountingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Db(err) => write!(f, "db error: {}", err),
            Self::Sensor(message) => write!(f, "sensor error: {}", message),
            Self::WakeLock(message) => write!(f, "wake lock error: {}", message),
            Self::Heartbeat(message) => write!(f, "heartbeat error: {}", message),
        }
    }
}

impl std::error::Error for AccountingError {}

impl From<steps_db::DbError> for AccountingError {
    fn from(err: steps_db::DbError) -> Self {
        Self::Db(err)
    }
}

pub type Result<T> = std::result::Result<T, AccountingError>;
