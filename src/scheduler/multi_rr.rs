use super::{DispatchPolicy, Scheduler, check_quantum};
use crate::{
    core::{Pid, ReadyQueue, SimCtx, Ticks, Timeline},
    error::{InputError, SchedError},
    sim::{Registry, Sim},
};

/// Round robin across `cpus` processors pulling from one shared FIFO queue.
#[derive(Debug, Clone, Copy)]
pub struct MultiRoundRobin {
    quantum: Ticks,
    cpus: usize,
}

impl MultiRoundRobin {
    pub fn new(quantum: Ticks, cpus: usize) -> Result<Self, InputError> {
        if cpus == 0 {
            return Err(InputError::ZeroCpus);
        }
        Ok(Self {
            quantum: check_quantum(quantum)?,
            cpus,
        })
    }

    pub fn sim(&self, registry: &Registry) -> Sim<RoundRobinPolicy> {
        Sim::new(registry, self.cpus, RoundRobinPolicy::new(self.quantum))
    }
}

impl Scheduler for MultiRoundRobin {
    fn name(&self) -> &'static str {
        "mrr"
    }

    fn build(&self, registry: &Registry) -> Result<Timeline, SchedError> {
        Ok(self.sim(registry).run()?)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RoundRobinPolicy {
    quantum: Ticks,
}

impl RoundRobinPolicy {
    pub fn new(quantum: Ticks) -> Self {
        debug_assert!(quantum > 0);
        Self { quantum }
    }
}

impl DispatchPolicy for RoundRobinPolicy {
    fn ready_queue(&self) -> ReadyQueue {
        ReadyQueue::new_fifo()
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, pid: Pid) {
        ctx.ready_push_fifo(pid);
    }

    fn slice(&self, ctx: &SimCtx, pid: Pid) -> Option<Ticks> {
        Some(self.quantum.min(ctx.task(pid).remaining))
    }
}
