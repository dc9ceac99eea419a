use thiserror::Error;

/// Failures while decoding one of the bundled datasets.
///
/// Per-district gaps in the census table are not errors; they degrade to
/// "Data Not Available" in the rendered output. Only structurally unusable
/// input surfaces here.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("portfolio month {index}: unparseable date {date:?}")]
    BadDate { index: usize, date: String },

    #[error("portfolio month {index}: holding entry is too short")]
    ShortHolding { index: usize },

    #[error("portfolio dataset has no months")]
    EmptyPortfolio,

    #[error("topology object {0:?} not found")]
    MissingObject(String),

    #[error("topology arc index {0} out of range")]
    ArcOutOfRange(i64),

    #[error("topology has no arcs")]
    NoArcs,
}
