//! # Netry Common
//!
//! Types shared by every member of the workspace:
//!
//! * **[`directive`]**: the shorthand grammars for ports, targets and info requests.
//! * **[`network`]**: decoded scan results (hosts and their ports).
//! * **[`scan`]**: the terminal outcome of a scan and the aggregated result.
//! * **[`config`]**: the immutable configuration record handed to the core.

pub mod config;
pub mod directive;
pub mod log;
pub mod network;
pub mod scan;

#[doc(hidden)]
pub use tracing as __tracing;
