use serde::{Deserialize, Serialize};

/// Day range selector: a named preset or explicit `yyyyMMdd` bounds.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RangeParams {
    pub range: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}
