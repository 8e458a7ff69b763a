//! Logging helpers layered on top of `tracing`.
//!
//! The terminal formatter in the CLI renders events with the [`SUCCESS_TARGET`]
//! target as positive status lines (`[+]`) and [`PRINT_TARGET`] events as raw output.

pub const SUCCESS_TARGET: &str = "netry::success";
pub const PRINT_TARGET: &str = "netry::print";

/// Logs a positive status line.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::__tracing::info!(target: "netry::success", $($arg)*)
    };
}

/// Emits a line of formatted output without any status symbol.
#[macro_export]
macro_rules! output {
    () => {
        $crate::__tracing::info!(target: "netry::print", raw_msg = "")
    };
    ($msg:expr) => {
        $crate::__tracing::info!(target: "netry::print", raw_msg = %$msg)
    };
}
