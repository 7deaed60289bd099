pub mod fcfs;
pub mod multi_rr;
pub mod round_robin;
pub mod sjf;
pub mod srtf;

use crate::{
    core::{Pid, ReadyQueue, SimCtx, Ticks, Timeline},
    error::{InputError, SchedError},
    sim::Registry,
};
pub use fcfs::Fcfs;
pub use multi_rr::{MultiRoundRobin, RoundRobinPolicy};
pub use round_robin::RoundRobin;
pub use sjf::Sjf;
pub use srtf::{Srtf, SrtfPolicy};

/// A complete scheduling algorithm: registry in, validated timeline out.
pub trait Scheduler {
    fn name(&self) -> &'static str;

    fn build(&self, registry: &Registry) -> Result<Timeline, SchedError>;

    fn schedule(&self, registry: &Registry) -> Result<Timeline, SchedError> {
        let timeline = self.build(registry)?;
        let checked = timeline.validate(registry);
        debug_assert!(
            checked.is_ok(),
            "{} produced an invalid timeline: {checked:?}",
            self.name()
        );
        checked?;
        log::info!(
            "{}: {} processes, {} segments, makespan {}",
            self.name(),
            registry.len(),
            timeline.segments().len(),
            timeline.makespan()
        );
        Ok(timeline)
    }
}

/// Hooks a tick-driven policy plugs into [`crate::core::SchedCore`].
pub trait DispatchPolicy {
    fn ready_queue(&self) -> ReadyQueue;

    fn enqueue(&mut self, ctx: &mut SimCtx, pid: Pid);

    /// Units `pid` may run once dispatched; `None` runs it to completion.
    fn slice(&self, _ctx: &SimCtx, _pid: Pid) -> Option<Ticks> {
        None
    }

    /// Asked every tick for a running task that neither completed nor
    /// exhausted its slice.
    fn should_preempt(&self, _ctx: &SimCtx, _pid: Pid) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Fcfs,
    Sjf,
    Srtf,
    RoundRobin { quantum: Ticks },
    MultiRoundRobin { quantum: Ticks, cpus: usize },
}

impl Policy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fcfs => "fcfs",
            Self::Sjf => "sjf",
            Self::Srtf => "srtf",
            Self::RoundRobin { .. } => "rr",
            Self::MultiRoundRobin { .. } => "mrr",
        }
    }

    pub fn simulate(&self, registry: &Registry) -> Result<Timeline, SchedError> {
        match *self {
            Self::Fcfs => Fcfs.schedule(registry),
            Self::Sjf => Sjf.schedule(registry),
            Self::Srtf => Srtf.schedule(registry),
            Self::RoundRobin { quantum } => RoundRobin::new(quantum)?.schedule(registry),
            Self::MultiRoundRobin { quantum, cpus } => {
                MultiRoundRobin::new(quantum, cpus)?.schedule(registry)
            }
        }
    }
}

pub(crate) fn check_quantum(quantum: Ticks) -> Result<Ticks, InputError> {
    if quantum == 0 {
        return Err(InputError::ZeroQuantum);
    }
    Ok(quantum)
}
