//! Verification report structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Outcome of reading the artifacts of one run back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// When the verification started
    pub verified_at: DateTime<Utc>,

    /// Artifacts looked at
    pub total_verified: usize,

    /// Artifacts read back with the recorded checksum
    pub passed: usize,

    /// Artifacts missing, unreadable or with a different checksum
    pub failed: usize,

    /// Artifacts whose store cannot read back
    pub skipped: usize,

    pub failures: Vec<VerificationFailure>,

    pub duration_ms: u64,
}

/// One artifact that did not verify
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationFailure {
    /// Stored file name
    pub filename: String,

    /// Node the artifact was rendered from
    pub source_path: String,

    /// Checksum recorded at export time
    pub expected_checksum: String,

    /// Checksum of the bytes read back, empty when nothing could be read
    pub actual_checksum: String,

    pub reason: String,
}

impl VerificationReport {
    /// Creates an empty report
    pub fn new() -> Self {
        Self {
            verified_at: Utc::now(),
            total_verified: 0,
            passed: 0,
            failed: 0,
            skipped: 0,
            failures: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Counts an artifact whose checksum matched
    pub fn record_pass(&mut self) {
        self.total_verified += 1;
        self.passed += 1;
    }

    /// Records an artifact that failed verification
    pub fn record_failure(&mut self, failure: VerificationFailure) {
        self.total_verified += 1;
        self.failed += 1;
        self.failures.push(failure);
    }

    /// Counts an artifact the store cannot read back
    pub fn record_skip(&mut self) {
        self.total_verified += 1;
        self.skipped += 1;
    }

    /// Sets the verification duration in milliseconds
    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    /// True when no artifact failed; skips do not count against it
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Passed artifacts as a percentage of all verified ones
    pub fn success_rate(&self) -> f64 {
        if self.total_verified == 0 {
            return 100.0;
        }
        (self.passed as f64 / self.total_verified as f64) * 100.0
    }

    /// Human-readable multi-line report
    pub fn format_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "📊 Verification Report");
        let _ = writeln!(out, "  Verified at: {}", self.verified_at);
        let _ = writeln!(out, "  Duration: {} ms", self.duration_ms);
        let _ = writeln!(out, "  Artifacts: {}", self.total_verified);
        let _ = writeln!(out, "  ✅ Passed: {}", self.passed);
        let _ = writeln!(out, "  ❌ Failed: {}", self.failed);
        let _ = writeln!(out, "  ⏭️  Skipped: {}", self.skipped);
        let _ = writeln!(out, "  Success rate: {:.2}%", self.success_rate());

        if !self.failures.is_empty() {
            let _ = writeln!(out, "\n❌ Failures:");
            for (i, failure) in self.failures.iter().enumerate() {
                let _ = writeln!(out, "  {}. {} (from {})", i + 1, failure.filename, failure.source_path);
                let _ = writeln!(out, "     Reason: {}", failure.reason);
            }
        }
        out
    }
}

impl Default for VerificationReport {
    fn default() -> Self {
        Self::new()
    }
}
