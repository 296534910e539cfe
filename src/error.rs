use thiserror::Error;

/// Fatal configuration-level violations raised by the curve/meeting/scenario core.
///
/// Per-record anomalies (missing months, unstable back-solves) never surface
/// here; they degrade to omission or clamping.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error("Unknown price formula '{0}'. Expected one of: priceComplement, direct.")]
    UnknownPriceFormula(String),

    #[error("Invalid increment_bp {0}: must be > 0.")]
    NonPositiveIncrement(i32),

    #[error("Invalid rate bounds: min_rate={min} must be <= max_rate={max}.")]
    InvalidRateBounds { min: f64, max: f64 },

    #[error("Non-finite value for `{0}`.")]
    NonFiniteInput(&'static str),

    #[error("Invalid guard `{name}` = {value}: must be >= 0.")]
    NegativeGuard { name: &'static str, value: f64 },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<CurveError> for AppError {
    fn from(err: CurveError) -> Self {
        AppError::new(2, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
