//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - Console output on stderr
//! - Optional JSON lines in a rotated local file
//! - Level from configuration, overridable with `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use strata::logging::init_logging;
//! use strata::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(export = "nightly", "Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an export run
///
/// # Example
///
/// ```no_run
/// use strata::log_export_start;
/// use strata::domain::{ExportName, TimeWindow};
///
/// let name = ExportName::new("nightly").unwrap();
/// let window = TimeWindow::since(chrono::Utc::now());
/// log_export_start!(name, window);
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($export:expr, $window:expr) => {
        tracing::info!(
            export = %$export,
            window = %$window,
            "Starting export"
        );
    };
}

/// Log the completion of an export run
///
/// # Example
///
/// ```no_run
/// use strata::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!("nightly", 42, Duration::from_secs(10));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($export:expr, $count:expr, $duration:expr) => {
        tracing::info!(
            export = %$export,
            exported = $count,
            duration_ms = $duration.as_millis() as u64,
            "Export run finished"
        );
    };
}

/// Log a resource that failed one stage of an export
///
/// # Example
///
/// ```no_run
/// use strata::log_resource_failure;
/// use strata::domain::StrataError;
///
/// let error = StrataError::Storage("disk full".to_string());
/// log_resource_failure!("/Subjects/s1", "store", error);
/// ```
#[macro_export]
macro_rules! log_resource_failure {
    ($resource:expr, $stage:expr, $error:expr) => {
        tracing::error!(
            resource = %$resource,
            stage = $stage,
            error = %$error,
            "Resource failed, continuing"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::{ExportName, StrataError, TimeWindow};
    use std::time::Duration;

    #[test]
    fn test_macros_expand() {
        let name = ExportName::new("nightly").unwrap();
        let window = TimeWindow::since(chrono::Utc::now());
        log_export_start!(name, window);
        log_export_complete!(name, 3usize, Duration::from_millis(5));
        log_resource_failure!("/Subjects/s1", "format", StrataError::Formatting("gone".to_string()));
    }
}
