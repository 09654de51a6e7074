//! Data models for the launcher
//!
//! This module contains the derived values computed during one invocation.

mod plan;

pub use plan::ExecutionPlan;
