use std::time::{Duration, Instant};

use clausemind_common::error::{ClauseError, ClauseResult};

/// Caller-supplied time budget, checked cooperatively between units of work.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline {
    expires_at: Option<Instant>,
}

impl Deadline {
    /// A deadline that never expires.
    pub fn none() -> Self {
        Self { expires_at: None }
    }

    pub fn after(budget: Duration) -> Self {
        Self {
            expires_at: Some(Instant::now() + budget),
        }
    }

    pub fn at(instant: Instant) -> Self {
        Self {
            expires_at: Some(instant),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|t| Instant::now() >= t)
    }

    pub fn check(&self, stage: &'static str) -> ClauseResult<()> {
        if self.is_expired() {
            Err(ClauseError::Timeout { stage })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_deadline_never_expires() {
        let d = Deadline::none();
        assert!(!d.is_expired());
        assert!(d.check("scoring").is_ok());
    }

    #[test]
    fn zero_budget_is_expired() {
        let d = Deadline::after(Duration::ZERO);
        assert!(d.is_expired());
        assert!(matches!(
            d.check("segmentation"),
            Err(ClauseError::Timeout {
                stage: "segmentation"
            })
        ));
    }

    #[test]
    fn generous_budget_has_time_left() {
        let d = Deadline::after(Duration::from_secs(60));
        assert!(!d.is_expired());
        assert!(d.check("extraction").is_ok());
    }
}
