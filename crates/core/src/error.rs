use thiserror::Error;

/// Raised when an email or template value object fails validation.
///
/// Every problem found during construction is collected, so a caller fixing
/// bad input sees all of it at once rather than one address per attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", .problems.join("; "))]
pub struct ValidationError {
    problems: Vec<String>,
}

impl ValidationError {
    /// Create a validation error from a non-empty list of problems.
    pub fn new(problems: Vec<String>) -> Self {
        Self { problems }
    }

    /// The individual problems that were found.
    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    /// Return `Err` if any problems were collected, `Ok(())` otherwise.
    pub(crate) fn check(problems: Vec<String>) -> Result<(), Self> {
        if problems.is_empty() {
            Ok(())
        } else {
            Err(Self::new(problems))
        }
    }
}
