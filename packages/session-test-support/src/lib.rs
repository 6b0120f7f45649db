//! Test support utilities for the sea-session workspace.
//!
//! Currently this only provides unified logging initialization shared by
//! unit and integration tests.

pub mod logging;
