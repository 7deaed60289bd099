use thiserror::Error;

use crate::core::{CpuId, Ticks};

/// Rejected before a run starts; no partial timeline is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("workload contains no processes")]
    EmptyWorkload,
    #[error("process id {0:?} appears more than once")]
    DuplicateId(String),
    #[error("process {0:?} has a negative arrival time")]
    NegativeArrival(String),
    #[error("process {0:?} has a zero burst time")]
    ZeroBurst(String),
    #[error("workload does not finish within the representable time range")]
    HorizonOverflow,
    #[error("time quantum must be positive")]
    ZeroQuantum,
    #[error("processor count must be positive")]
    ZeroCpus,
    #[error("malformed process descriptor {0:?}, expected ID:ARRIVAL:BURST")]
    Malformed(String),
}

/// A finished timeline broke one of its structural guarantees. Never
/// expected on valid input; indicates a scheduler bug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelineError {
    #[error("empty segment [{start}, {end}) on cpu {cpu}")]
    EmptySegment { cpu: CpuId, start: Ticks, end: Ticks },
    #[error("segment starting at {start} overlaps previous segment ending at {prev_end} on cpu {cpu}")]
    Overlap {
        cpu: CpuId,
        prev_end: Ticks,
        start: Ticks,
    },
    #[error("uncovered time [{prev_end}, {start}) on cpu {cpu}")]
    Gap {
        cpu: CpuId,
        prev_end: Ticks,
        start: Ticks,
    },
    #[error("segment placed on cpu {cpu}, but the timeline only has {num_cpus}")]
    UnknownProcessor { cpu: CpuId, num_cpus: usize },
    #[error("process {id:?} ran for {actual} ticks, burst is {expected}")]
    BurstMismatch {
        id: String,
        expected: Ticks,
        actual: Ticks,
    },
    #[error("segment owner {0:?} is not a registered process")]
    UnknownOwner(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    #[error("simulation invariant violated: {0}")]
    InvariantViolation(#[from] TimelineError),
}
