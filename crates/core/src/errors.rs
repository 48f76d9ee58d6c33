use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Unified error type for the entire wealth-planner-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Holding not found: {0}")]
    HoldingNotFound(String),

    #[error("Duplicate holding id: {0}")]
    DuplicateHolding(String),

    #[error("Holding kind cannot change from {expected} to {found}")]
    KindChanged { expected: String, found: String },

    #[error("Invalid exchange rate for {currency}: {rate}")]
    InvalidRate { currency: String, rate: f64 },

    #[error("Invalid currency code '{0}': must be exactly 3 ASCII letters")]
    InvalidCurrency(String),

    #[error("No goal parameters configured")]
    GoalNotSet,

    // ── Import / Export ─────────────────────────────────────────────
    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Quotes ──────────────────────────────────────────────────────
    #[error("Quote error ({provider}): {message}")]
    Quote { provider: String, message: String },

    #[error("Quote not available for {0}")]
    QuoteNotAvailable(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::Csv(e.to_string())
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        CoreError::Validation(errors)
    }
}

// ── Field-level validation ──────────────────────────────────────────

/// What is wrong with a single form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldError {
    /// A required value is missing or blank
    Required,
    /// The value must not be negative
    Negative,
    /// The value must be strictly greater than zero
    NotPositive,
    /// NaN or infinity
    NotFinite,
    /// Not a 3-letter currency code
    InvalidCurrency,
    /// Violates an ordering constraint with another field
    OutOfRange,
    /// Another holding already uses this value
    Duplicate,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldError::Required => write!(f, "is required"),
            FieldError::Negative => write!(f, "must not be negative"),
            FieldError::NotPositive => write!(f, "must be greater than zero"),
            FieldError::NotFinite => write!(f, "must be a finite number"),
            FieldError::InvalidCurrency => write!(f, "must be a 3-letter currency code"),
            FieldError::OutOfRange => write!(f, "is out of range"),
            FieldError::Duplicate => write!(f, "is already in use"),
        }
    }
}

/// The full set of field problems found in one validation pass.
///
/// Keys are field names (snake_case, matching the struct fields).
/// A field appears at most once; the first rule it breaks wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field` unless one is already recorded.
    pub fn add(&mut self, field: &'static str, error: FieldError) {
        self.fields.entry(field).or_insert(error);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<FieldError> {
        self.fields.get(field).copied()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, FieldError)> + '_ {
        self.fields.iter().map(|(k, v)| (*k, *v))
    }

    /// Merge another set into this one (existing entries win).
    pub fn extend(&mut self, other: ValidationErrors) {
        for (field, error) in other.fields {
            self.add(field, error);
        }
    }

    /// `Ok(())` when empty, otherwise the set wrapped in `CoreError::Validation`.
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(self))
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, error) in &self.fields {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field} {error}")?;
            first = false;
        }
        Ok(())
    }
}
