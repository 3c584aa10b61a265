use thiserror::Error;

/// Main error type for ertkit
#[derive(Error, Debug)]
pub enum EkError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Computation error: {0}")]
    Computation(#[from] ComputationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Malformed or structurally incomplete problem units.
///
/// A unit failing with one of these is skipped by batch loaders; the rest of
/// the batch continues.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Problem unit {unit} has no evaluation rows")]
    EmptyUnit { unit: String },

    #[error("Row {row} of {unit} has {actual} trial columns, expected {expected}")]
    RaggedRow {
        unit: String,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Trial metadata mismatch in {unit}: {field} has {actual} entries, expected {expected}")]
    TrialMetadataMismatch {
        unit: String,
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Thresholds of {unit} are not decreasing at row {row}")]
    UnsortedTargets { unit: String, row: usize },

    #[error("Invalid threshold {value} in {unit} at row {row}")]
    InvalidThreshold { unit: String, row: usize, value: f64 },

    #[error("Cannot merge {left} with {right}: units are not identical")]
    IncompatibleMerge { left: String, right: String },

    #[error("Invalid data format: {message}")]
    InvalidFormat { message: String },

    #[error("Data loading failed: {message}")]
    LoadingFailed { message: String },
}

/// Errors raised while deriving statistics.
///
/// Only raised when no meaningful fallback exists; recoverable situations are
/// logged and substituted instead.
#[derive(Error, Debug)]
pub enum ComputationError {
    #[error("Reference data required for run-length based targets is missing: {message}")]
    MissingReferenceData { message: String },

    #[error("No reference data for f{function} in {dimension}-D")]
    ReferenceProblemMissing { function: u32, dimension: u32 },

    #[error("Reference score for target #{target_index} of f{function} is not finite")]
    NonFiniteReferenceScore { function: u32, target_index: usize },

    #[error("Function {function} processed twice for algorithm {algorithm}")]
    DuplicateFunction { algorithm: String, function: u32 },

    #[error("Algorithm {algorithm} covers functions {processed:?}, requested {requested:?}")]
    FunctionSetMismatch {
        algorithm: String,
        processed: Vec<u32>,
        requested: Vec<u32>,
    },

    #[error("Distribution of {algorithm} has {actual} entries, envelope has {expected}")]
    EnvelopeLengthMismatch {
        algorithm: String,
        expected: usize,
        actual: usize,
    },

    #[error("No envelope entry of at least {threshold} evaluations for {algorithm}")]
    EmptyEnvelopeSelection { algorithm: String, threshold: f64 },

    #[error("No data in {dimension}-D")]
    NoDataInDimension { dimension: u32 },
}

/// Result type alias for ertkit operations
pub type EkResult<T> = Result<T, EkError>;

/// Macro for creating validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)*) => {
        $crate::EkError::Validation(format!($($arg)*))
    };
}

/// Macro for creating internal errors
#[macro_export]
macro_rules! internal_error {
    ($($arg:tt)*) => {
        $crate::EkError::Internal(format!($($arg)*))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::EkError::Config(format!($($arg)*))
    };
}
