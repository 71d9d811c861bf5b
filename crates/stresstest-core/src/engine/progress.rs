/// Decides when a progress notification is due.
///
/// A notification fires whenever the collected count enters a new 10% decile
/// of the total, and always on the final outcome. Deciles are derived from the
/// ratio `completed / total`, so totals below ten still report.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total: u64,
    completed: u64,
    last_decile: u64,
}

impl ProgressTracker {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            completed: 0,
            last_decile: 0,
        }
    }

    /// Count one collected outcome. Returns `Some(completed)` when a
    /// notification should be emitted for it.
    pub fn record(&mut self) -> Option<u64> {
        self.completed += 1;
        if self.total == 0 {
            return None;
        }

        let decile = (self.completed.saturating_mul(10) / self.total).min(10);
        let crossed = decile > self.last_decile;
        if crossed {
            self.last_decile = decile;
        }

        (crossed || self.completed == self.total).then_some(self.completed)
    }
}

/// `completed / total` as a percentage; zero when `total` is zero.
pub fn percent(completed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    completed as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifications(total: u64) -> Vec<u64> {
        let mut tracker = ProgressTracker::new(total);
        (0..total).filter_map(|_| tracker.record()).collect()
    }

    #[test]
    fn hundred_requests_notify_every_ten() {
        assert_eq!(
            notifications(100),
            vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]
        );
    }

    #[test]
    fn small_totals_still_report() {
        assert_eq!(notifications(5), vec![1, 2, 3, 4, 5]);
        assert_eq!(notifications(1), vec![1]);
    }

    #[test]
    fn uneven_totals_notify_on_each_decile_and_completion() {
        // 10% of 15 is 1.5 requests: deciles are entered at 2, 3, 5, 6, 8, 9, 11, 12, 14, 15.
        assert_eq!(notifications(15), vec![2, 3, 5, 6, 8, 9, 11, 12, 14, 15]);
    }

    #[test]
    fn final_outcome_always_notifies() {
        let n = notifications(1_003);
        assert_eq!(n.last(), Some(&1_003));
        assert!(n.len() <= 11);
    }

    #[test]
    fn percent_handles_zero_total() {
        assert_eq!(percent(0, 0), 0.0);
        assert!((percent(1, 4) - 25.0).abs() < f64::EPSILON);
    }
}
