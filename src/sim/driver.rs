use super::registry::Registry;
use crate::{
    core::{Pid, SchedCore, SchedEvent, Ticks, Timeline},
    error::TimelineError,
    scheduler::DispatchPolicy,
};

/// Feeds a registry's processes into a [`SchedCore`] as they arrive.
pub struct Sim<P: DispatchPolicy> {
    pub core: SchedCore<P>,
    // Pids in arrival order; `cursor` points at the next one to arrive
    arrivals: Vec<Pid>,
    arrival_times: Vec<Ticks>,
    cursor: usize,
}

impl<P: DispatchPolicy> Sim<P> {
    pub fn new(registry: &Registry, num_cpus: usize, policy: P) -> Self {
        let arrivals = registry.by_arrival().to_vec();
        let arrival_times = arrivals.iter().map(|&pid| registry.get(pid).arrival).collect();
        Self {
            core: SchedCore::new(registry.tasks(), num_cpus, policy),
            arrivals,
            arrival_times,
            cursor: 0,
        }
    }

    pub fn step(&mut self) -> Result<Vec<SchedEvent>, TimelineError> {
        self.handle_arrivals();
        let events = self.core.tick()?;

        if !self.core.is_finished() && self.core.is_quiescent() {
            let next = self.arrival_times.get(self.cursor).copied();
            debug_assert!(next.is_some(), "Quiescent core with no arrivals left");
            if let Some(next) = next {
                self.core.skip_to(next);
            }
        }

        Ok(events)
    }

    fn handle_arrivals(&mut self) {
        let now = self.core.now();
        // Contiguous, since arrivals are sorted
        while self.cursor < self.arrivals.len() && self.arrival_times[self.cursor] <= now {
            self.core.wake_task(self.arrivals[self.cursor]);
            self.cursor += 1;
        }
    }

    pub fn all_completed(&self) -> bool {
        self.core.is_finished()
    }

    pub fn run(mut self) -> Result<Timeline, TimelineError> {
        while !self.all_completed() {
            self.step()?;
        }
        Ok(self.core.into_timeline())
    }
}
