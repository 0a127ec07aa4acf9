//! Feature-specific logging macros and utilities
//!
//! Each area of the SDK logs under its own target so it can be filtered with
//! `RUST_LOG`, e.g. `RUST_LOG=index_server_sdk::fallback=debug`.

/// Feature categories for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFeature {
    Query,
    Topology,
    Transport,
    Fallback,
}

impl LogFeature {
    /// Get the target string for this feature
    pub fn target(&self) -> &'static str {
        match self {
            LogFeature::Query => "index_server_sdk::query",
            LogFeature::Topology => "index_server_sdk::topology",
            LogFeature::Transport => "index_server_sdk::transport",
            LogFeature::Fallback => "index_server_sdk::fallback",
        }
    }
}

// Query compilation
#[macro_export]
macro_rules! log_query_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "index_server_sdk::query", $($arg)*)
    };
}

// Node resolution and directory listing
#[macro_export]
macro_rules! log_topology_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "index_server_sdk::topology", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_topology_info {
    ($($arg:tt)*) => {
        log::info!(target: "index_server_sdk::topology", $($arg)*)
    };
}

// Primary HTTP transport
#[macro_export]
macro_rules! log_transport_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "index_server_sdk::transport", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_transport_info {
    ($($arg:tt)*) => {
        log::info!(target: "index_server_sdk::transport", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_transport_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "index_server_sdk::transport", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_transport_error {
    ($($arg:tt)*) => {
        log::error!(target: "index_server_sdk::transport", $($arg)*)
    };
}

// Remote script fallback
#[macro_export]
macro_rules! log_fallback_info {
    ($($arg:tt)*) => {
        log::info!(target: "index_server_sdk::fallback", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_fallback_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "index_server_sdk::fallback", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_fallback_error {
    ($($arg:tt)*) => {
        log::error!(target: "index_server_sdk::fallback", $($arg)*)
    };
}

/// Logs how long an operation took when finished
pub struct PerformanceTimer {
    start: std::time::Instant,
    feature: LogFeature,
    operation: String,
}

impl PerformanceTimer {
    pub fn new(feature: LogFeature, operation: String) -> Self {
        log::debug!(target: feature.target(), "Starting timed operation: {}", operation);
        Self {
            start: std::time::Instant::now(),
            feature,
            operation,
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        log::debug!(
            target: self.feature.target(),
            "Operation '{}' completed in {:?}",
            self.operation,
            duration
        );
    }
}
