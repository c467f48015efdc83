use super::Intent;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The backend already holds the state the toggle asked for.
    Benign,
    Genuine,
}

/// Default reading of a failed toggle.
///
/// The backends report duplicates as `Like already exists` and missing
/// rows as `Like does not exist`, usually with a 400, so the message is
/// what decides. A typed 409 on an add also counts.
pub fn classify_failure(intent: Intent, err: &ApiError) -> Verdict {
    let message = err.message().unwrap_or_default();
    let benign = match intent {
        Intent::Add => matches!(err, ApiError::Conflict(_)) || message.contains("already exists"),
        Intent::Remove => message.contains("does not exist"),
    };
    if benign {
        Verdict::Benign
    } else {
        Verdict::Genuine
    }
}
