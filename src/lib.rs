//! CPU scheduling simulator.
//!
//! Runs a fixed workload of processes through a scheduling policy and
//! produces a per-processor [`Timeline`] of process and idle segments.

pub mod core;
pub mod error;
pub mod scheduler;
pub mod sim;

pub use crate::core::{Owner, SchedEvent, Segment, Timeline};
pub use error::{InputError, SchedError, TimelineError};
pub use scheduler::{Policy, Scheduler};
pub use sim::{BernoulliWorkload, Process, Registry, Sim, Summary, summarize};
