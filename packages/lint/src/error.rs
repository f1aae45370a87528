//! Error types for the detection engine

use thiserror::Error;

/// A Result alias where the Err case is [`LintError`].
pub type Result<T> = std::result::Result<T, LintError>;

/// Errors surfaced by the detection engine.
///
/// Nothing here is fatal: an unparseable URL only excludes that call from
/// family matching, and a closed batch only means the burst it belonged to has
/// already been adjudicated.
#[derive(Debug, Error)]
pub enum LintError {
    /// URL could not be parsed; the call is excluded from family matching only.
    #[error("url not parseable: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Entry added to a batch that has already fired.
    #[error("batch already fired")]
    BatchClosed,
}
