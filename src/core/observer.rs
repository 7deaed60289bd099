use rustc_hash::FxHashSet;

use super::state::{CpuState, SimCtx, TaskState, Ticks};

/// Checks cross-structure invariants after every tick.
#[derive(Debug, Default)]
pub struct Observer {
    peak_running: usize,
    last_remaining: Vec<Ticks>,
}

impl Observer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, ctx: &SimCtx) {
        let mut on_cpu = FxHashSet::default();
        for (cpu, state) in ctx.cpus.iter().enumerate() {
            if let CpuState::Running { pid, .. } = *state {
                let task = ctx.task(pid);
                let first = on_cpu.insert(pid);
                debug_assert!(first, "Task {pid} assigned to more than one cpu");
                debug_assert_eq!(
                    task.state,
                    TaskState::Running,
                    "cpu{cpu} current task {pid} must be Running"
                );
                debug_assert_eq!(
                    task.current_cpu,
                    Some(cpu),
                    "Task {pid} metadata current_cpu mismatch"
                );
            }
        }
        self.peak_running = self.peak_running.max(on_cpu.len());
        debug_assert!(self.peak_running <= ctx.cpus.len());

        for pid in ctx.queued() {
            let task = ctx.task(pid);
            debug_assert_ne!(
                task.state,
                TaskState::Completed,
                "Completed task {pid} still present in ready queue"
            );
            debug_assert_ne!(
                task.state,
                TaskState::Running,
                "Running task {pid} must not appear in the ready queue"
            );
            debug_assert!(
                ctx.ready.contains(pid),
                "Membership claims task {pid} is queued, but queue does not contain it"
            );
        }
        debug_assert_eq!(ctx.queued().count(), ctx.ready.len());

        if self.last_remaining.is_empty() {
            self.last_remaining = ctx.tasks.iter().map(|t| t.remaining).collect();
        }
        for (task, last) in ctx.tasks.iter().zip(self.last_remaining.iter_mut()) {
            debug_assert!(
                task.remaining <= *last,
                "Remaining time of task {} grew from {} to {}",
                task.pid,
                last,
                task.remaining
            );
            *last = task.remaining;
        }
    }

    /// Most processors seen running a task within a single tick.
    pub fn peak_running(&self) -> usize {
        self.peak_running
    }
}
