//! A travel-planning assistant backed by Gemini and a handful of travel
//! lookups.
//!
//! The crate ships a CLI, and can also be used as a library through
//! [`SessionBuilder`].

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod config;
mod session;
pub mod tools;

pub use session::{Session, SessionBuilder};

/// Re-exports of [`trip_planner_core`] crate.
pub mod core {
    pub use trip_planner_core::*;
}
