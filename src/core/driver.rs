use log::{debug, trace};

use super::{
    event::SchedEvent,
    observer::Observer,
    state::{CpuId, CpuState, Pid, SimCtx, Task, Ticks},
    timeline::{Owner, Timeline, TimelineBuilder},
};
use crate::{error::TimelineError, scheduler::DispatchPolicy};

/// Unit-time simulation over a fixed set of processors sharing one ready
/// queue. Each tick at instant `now` first accounts the unit `[now-1, now)`
/// on every busy processor in index order, then hands idle processors the
/// next ready task.
pub struct SchedCore<P: DispatchPolicy> {
    pub ctx: SimCtx,
    pub policy: P,
    timeline: TimelineBuilder,
    observer: Observer,
    pending: Vec<SchedEvent>,
    finished: bool,
}

impl<P: DispatchPolicy> SchedCore<P> {
    pub fn new(tasks: Vec<Task>, num_cpus: usize, policy: P) -> Self {
        assert!(num_cpus > 0, "Simulation requires at least one CPU");
        let ctx = SimCtx::new(tasks, num_cpus, policy.ready_queue());
        Self {
            ctx,
            policy,
            timeline: TimelineBuilder::new(num_cpus),
            observer: Observer::new(),
            pending: Vec::new(),
            finished: false,
        }
    }

    pub fn tick(&mut self) -> Result<Vec<SchedEvent>, TimelineError> {
        let mut events = std::mem::take(&mut self.pending);
        if self.finished {
            return Ok(events);
        }

        let cpu_count = self.ctx.cpus.len();
        for cpu in 0..cpu_count {
            self.account_cpu(cpu, &mut events)?;
        }

        if self.ctx.all_completed() {
            for cpu in 0..cpu_count {
                self.close_idle(cpu)?;
            }
            self.finished = true;
            debug!(
                "all {} tasks completed at t={}",
                self.ctx.tasks.len(),
                self.ctx.now
            );
            return Ok(events);
        }

        for cpu in 0..cpu_count {
            if self.ctx.cpu_is_idle(cpu) {
                self.try_dispatch(cpu, &mut events)?;
            }
        }

        self.observer.observe(&self.ctx);
        self.ctx.advance_time(1);
        Ok(events)
    }

    // Charge the elapsed unit to whatever `cpu` was running and release the
    // cpu if its task completed, used up its slice or lost to the policy.
    fn account_cpu(
        &mut self,
        cpu: CpuId,
        events: &mut Vec<SchedEvent>,
    ) -> Result<(), TimelineError> {
        let CpuState::Running {
            pid,
            since,
            slice_left,
        } = self.ctx.cpus[cpu]
        else {
            return Ok(());
        };

        let slice_left = slice_left.map(|left| left.saturating_sub(1));
        let remaining = {
            let task = self.ctx.task_mut(pid);
            debug_assert!(task.remaining > 0, "Running task {pid} has no work left");
            task.remaining -= 1;
            task.remaining
        };
        self.ctx.cpus[cpu] = CpuState::Running {
            pid,
            since,
            slice_left,
        };

        if remaining == 0 {
            self.release_cpu(cpu, pid, since)?;
            self.ctx.mark_completed(pid);
            debug!("t={} cpu{cpu}: task {pid} completed", self.ctx.now);
            events.push(SchedEvent::Completed { cpu, pid });
            return Ok(());
        }

        let slice_expired = slice_left == Some(0);
        if slice_expired || self.policy.should_preempt(&self.ctx, pid) {
            self.release_cpu(cpu, pid, since)?;
            self.ctx.mark_ready(pid);
            self.policy.enqueue(&mut self.ctx, pid);
            debug!(
                "t={} cpu{cpu}: task {pid} preempted with {remaining} left",
                self.ctx.now
            );
            events.push(SchedEvent::Preempted {
                cpu,
                pid,
                remaining,
            });
        }

        Ok(())
    }

    fn release_cpu(
        &mut self,
        cpu: CpuId,
        pid: Pid,
        since: Ticks,
    ) -> Result<(), TimelineError> {
        let owner = Owner::process(self.ctx.task(pid).id.as_str());
        self.timeline.push(owner, since, self.ctx.now, cpu)?;
        self.ctx.clear_cpu(cpu);
        Ok(())
    }

    fn close_idle(&mut self, cpu: CpuId) -> Result<(), TimelineError> {
        if let CpuState::Idle { since } = self.ctx.cpus[cpu] {
            if since < self.ctx.now {
                self.timeline.push(Owner::Idle, since, self.ctx.now, cpu)?;
                self.ctx.clear_cpu(cpu);
            }
        }
        Ok(())
    }

    fn try_dispatch(
        &mut self,
        cpu: CpuId,
        events: &mut Vec<SchedEvent>,
    ) -> Result<(), TimelineError> {
        let Some(pid) = self.ctx.ready_pop() else {
            trace!("t={} cpu{cpu}: idle", self.ctx.now);
            events.push(SchedEvent::CpuIdle { cpu });
            return Ok(());
        };

        self.close_idle(cpu)?;
        let slice = self.policy.slice(&self.ctx, pid);
        self.ctx.set_running(cpu, pid, slice);
        debug!(
            "t={} cpu{cpu}: dispatched task {pid} slice={slice:?}",
            self.ctx.now
        );
        events.push(SchedEvent::Dispatched { cpu, pid, slice });
        Ok(())
    }

    pub fn wake_task(&mut self, pid: Pid) {
        self.ctx.mark_ready(pid);
        self.policy.enqueue(&mut self.ctx, pid);
        trace!("t={}: task {pid} arrived", self.ctx.now);
        self.pending.push(SchedEvent::Arrived { pid });
    }

    /// Nothing running and nothing queued: the next tick can only be an
    /// arrival.
    pub fn is_quiescent(&self) -> bool {
        self.ctx.all_cpus_idle() && self.ctx.ready.is_empty()
    }

    /// Jumps a quiescent core forward; open idle spans simply grow.
    pub fn skip_to(&mut self, time: Ticks) {
        debug_assert!(self.is_quiescent(), "Cannot skip time with work pending");
        if time > self.ctx.now {
            trace!("skipping idle ticks {}..{time}", self.ctx.now);
            self.ctx.now = time;
        }
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    pub fn into_timeline(self) -> Timeline {
        debug_assert!(self.finished, "Timeline frozen before every task completed");
        self.timeline.finish()
    }
}
