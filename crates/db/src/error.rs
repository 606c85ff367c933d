#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("{0}")]
    DayCode(#[from] steps_core::DayCodeError),
}

pub type Result<T> = std::result::Result<T, DbError>;
