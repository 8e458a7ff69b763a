//! # Netry Core
//!
//! Turns a [`ScanConfig`](netry_common::config::ScanConfig) into a running scan:
//!
//! * **[`compiler`]**: directives to scanner argument tokens.
//! * **[`plan`]**: the full, ordered argument list for one invocation.
//! * **[`scanner`]**: runs the scanner process under a deadline and a cancellation token.
//! * **[`aggregator`]**: collects decoded hosts into the final [`ScanResult`](netry_common::scan::ScanResult).

pub mod aggregator;
pub mod compiler;
pub mod plan;
pub mod scanner;

pub use compiler::{CompileError, CompiledOption};
pub use plan::{PlanError, ScanPlan};
pub use scanner::{NmapScanner, ScanError, perform_scan};
