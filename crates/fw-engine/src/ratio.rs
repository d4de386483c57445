//! Elapsed time against a budget.

use chrono::{DateTime, Utc};

use crate::error::EngineError;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Elapsed hours, remaining hours and their ratio to the budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElapsedRatio {
    pub elapsed_hours: f64,
    /// Negative once the budget is spent.
    pub remaining_hours: f64,
    pub ratio: f64,
}

impl ElapsedRatio {
    /// Measure `reference_at..now` against `budget_hours`.
    ///
    /// A reference instant in the future counts as zero elapsed time.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] if `budget_hours` is not
    /// finite and positive.
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(
        reference_at: DateTime<Utc>,
        now: DateTime<Utc>,
        budget_hours: f64,
    ) -> Result<Self, EngineError> {
        if !budget_hours.is_finite() || budget_hours <= 0.0 {
            return Err(EngineError::InvalidConfiguration {
                field: "budget_hours".to_string(),
                reason: format!("{budget_hours} is not a positive number of hours"),
            });
        }

        let elapsed_hours =
            ((now - reference_at).num_milliseconds() as f64 / MILLIS_PER_HOUR).max(0.0);

        Ok(Self {
            elapsed_hours,
            remaining_hours: budget_hours - elapsed_hours,
            ratio: elapsed_hours / budget_hours,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn overdue_entity_has_negative_remaining() {
        let now = Utc::now();
        let measured = ElapsedRatio::compute(now - Duration::hours(200), now, 168.0).unwrap();
        assert!(close(measured.elapsed_hours, 200.0));
        assert!(close(measured.remaining_hours, -32.0));
        assert!(close(measured.ratio, 200.0 / 168.0));
    }

    #[test]
    fn half_spent_budget() {
        let now = Utc::now();
        let measured = ElapsedRatio::compute(now - Duration::hours(1), now, 2.0).unwrap();
        assert!(close(measured.ratio, 0.5));
        assert!(close(measured.remaining_hours, 1.0));
    }

    #[test]
    fn future_reference_clamps_to_zero() {
        let now = Utc::now();
        let measured = ElapsedRatio::compute(now + Duration::minutes(5), now, 8.0).unwrap();
        assert!(close(measured.elapsed_hours, 0.0));
        assert!(close(measured.ratio, 0.0));
        assert!(close(measured.remaining_hours, 8.0));
    }

    #[test]
    fn ratio_is_monotone_in_time() {
        let reference = Utc::now();
        let mut previous = 0.0;
        for minutes in [0, 1, 59, 60, 600, 6_000, 60_000] {
            let measured =
                ElapsedRatio::compute(reference, reference + Duration::minutes(minutes), 24.0)
                    .unwrap();
            assert!(measured.ratio >= previous);
            previous = measured.ratio;
        }
    }

    #[test]
    fn non_positive_budget_is_rejected() {
        let now = Utc::now();
        for budget in [0.0, -1.0, f64::NAN] {
            let err = ElapsedRatio::compute(now, now, budget).expect_err("rejected");
            assert!(matches!(err, EngineError::InvalidConfiguration { .. }));
        }
    }
}
