//! End-to-end tests for the scan orchestrator, driven by fake scanner scripts.

#[cfg(all(test, unix))]
mod scan;
