//! # Operation Outcomes
//!
//! Some operations have a primary guarantee and a best-effort tail. The tail
//! failing must not fail the call, so its result is carried alongside the
//! value instead of as an error.
//!
//! ```text
//! Result<Outcome<T>, PaymentError>
//!   Ok(Success(value))                    everything went through
//!   Ok(PartialSuccess { value, reason })  primary done, best-effort step degraded
//!   Err(error)                            primary failed, error.kind() says how
//! ```

/// Successful result of an operation, possibly degraded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Every step succeeded
    Success(T),
    /// The primary step succeeded, a best-effort step did not
    PartialSuccess { value: T, reason: String },
}

impl<T> Outcome<T> {
    /// The value, regardless of whether the call degraded
    pub fn into_value(self) -> T {
        match self {
            Outcome::Success(value) | Outcome::PartialSuccess { value, .. } => value,
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Success(value) | Outcome::PartialSuccess { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::PartialSuccess { .. })
    }

    /// Why the call degraded, if it did
    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::PartialSuccess { reason, .. } => Some(reason),
        }
    }
}
