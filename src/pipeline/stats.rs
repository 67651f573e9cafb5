//! Statistics for a verification session.

use serde::Serialize;

/// Counters accumulated over every submission of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VerificationStats {
    /// Submissions that produced a verdict.
    pub completed: usize,
    /// Verdicts that passed.
    pub passed: usize,
    /// Verdicts that failed.
    pub failed: usize,
    /// Submissions aborted by an unexpected error.
    pub submission_errors: usize,
    /// Extractions that failed or timed out and were replaced by empty text.
    pub extraction_failures: usize,
    /// Submissions dropped because the attempt was reset or abandoned meanwhile.
    pub discarded: usize,
    /// Average time of completed submissions in milliseconds.
    pub average_submission_time_ms: f64,
}

impl VerificationStats {
    /// Pass rate of completed submissions as a percentage.
    pub fn pass_rate(&self) -> f64 {
        if self.completed == 0 {
            0.0
        } else {
            (self.passed as f64 / self.completed as f64) * 100.0
        }
    }
}

/// Statistics management for a verification session.
#[derive(Debug, Default)]
pub struct StatsManager {
    stats: VerificationStats,
}

impl StatsManager {
    /// Creates a new StatsManager instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a copy of the current statistics.
    pub fn get_stats(&self) -> VerificationStats {
        self.stats.clone()
    }

    /// Records a submission that produced a verdict.
    ///
    /// # Arguments
    ///
    /// * `passed` - Whether the verdict passed
    /// * `extraction_failures` - Number of stages that saw substitute empty text
    /// * `elapsed_ms` - Duration of the submission in milliseconds
    pub fn record_verdict(&mut self, passed: bool, extraction_failures: usize, elapsed_ms: f64) {
        let stats = &mut self.stats;
        let old_count = stats.completed;

        stats.completed += 1;
        if passed {
            stats.passed += 1;
        } else {
            stats.failed += 1;
        }
        stats.extraction_failures += extraction_failures;

        let old_total_time = stats.average_submission_time_ms * old_count as f64;
        stats.average_submission_time_ms = (old_total_time + elapsed_ms) / stats.completed as f64;
    }

    /// Records a submission aborted by an unexpected error.
    pub fn record_submission_error(&mut self) {
        self.stats.submission_errors += 1;
    }

    /// Records a result dropped because its attempt was superseded.
    pub fn record_discarded(&mut self) {
        self.stats.discarded += 1;
    }
}
