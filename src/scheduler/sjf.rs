use std::cmp::Reverse;

use keyed_priority_queue::KeyedPriorityQueue;
use log::debug;

use super::Scheduler;
use crate::{
    core::{Owner, Pid, Rank, Timeline, TimelineBuilder},
    error::SchedError,
    sim::Registry,
};

/// Non-preemptive shortest job first on one processor. Decisions happen only
/// when the processor frees up; ties go to the earliest arrival, then input
/// order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sjf;

impl Scheduler for Sjf {
    fn name(&self) -> &'static str {
        "sjf"
    }

    fn build(&self, registry: &Registry) -> Result<Timeline, SchedError> {
        let arrivals = registry.by_arrival();
        let mut timeline = TimelineBuilder::new(1);
        let mut ready: KeyedPriorityQueue<Pid, Reverse<Rank>> = KeyedPriorityQueue::new();
        let mut cursor = 0;
        let mut now = 0;

        while cursor < arrivals.len() || !ready.is_empty() {
            while let Some(&pid) = arrivals.get(cursor) {
                let process = registry.get(pid);
                if process.arrival > now {
                    break;
                }
                let rank = Rank {
                    work: process.burst,
                    arrival: process.arrival,
                    pid,
                };
                ready.push(pid, Reverse(rank));
                cursor += 1;
            }

            let Some((pid, _)) = ready.pop() else {
                // Nothing ready, so the loop condition guarantees a future arrival
                let next = registry.get(arrivals[cursor]).arrival;
                timeline.push(Owner::Idle, now, next, 0)?;
                now = next;
                continue;
            };

            let process = registry.get(pid);
            let end = now + process.burst;
            debug!("t={now}: {} (burst {}) runs until {end}", process.id, process.burst);
            timeline.push(Owner::process(process.id.as_str()), now, end, 0)?;
            now = end;
        }

        Ok(timeline.finish())
    }
}
