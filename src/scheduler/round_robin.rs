use std::collections::VecDeque;

use log::debug;

use super::{Scheduler, check_quantum};
use crate::{
    core::{Owner, Pid, Ticks, Timeline, TimelineBuilder},
    error::{InputError, SchedError},
    sim::Registry,
};

/// Fixed-quantum round robin over a FIFO ready queue on one processor.
#[derive(Debug, Clone, Copy)]
pub struct RoundRobin {
    quantum: Ticks,
}

impl RoundRobin {
    pub fn new(quantum: Ticks) -> Result<Self, InputError> {
        Ok(Self {
            quantum: check_quantum(quantum)?,
        })
    }
}

impl Scheduler for RoundRobin {
    fn name(&self) -> &'static str {
        "rr"
    }

    fn build(&self, registry: &Registry) -> Result<Timeline, SchedError> {
        let arrivals = registry.by_arrival();
        let mut remaining: Vec<Ticks> = registry.iter().map(|p| p.burst).collect();
        let mut timeline = TimelineBuilder::new(1);
        let mut ready: VecDeque<Pid> = VecDeque::new();
        let mut cursor = 0;
        let mut now = 0;

        let admit = |now: Ticks, cursor: &mut usize, ready: &mut VecDeque<Pid>| {
            while let Some(&pid) = arrivals.get(*cursor) {
                if registry.get(pid).arrival > now {
                    break;
                }
                ready.push_back(pid);
                *cursor += 1;
            }
        };

        admit(now, &mut cursor, &mut ready);
        while cursor < arrivals.len() || !ready.is_empty() {
            let Some(pid) = ready.pop_front() else {
                let next = registry.get(arrivals[cursor]).arrival;
                timeline.push(Owner::Idle, now, next, 0)?;
                now = next;
                admit(now, &mut cursor, &mut ready);
                continue;
            };

            let process = registry.get(pid);
            let run = self.quantum.min(remaining[pid]);
            let end = now + run;
            timeline.push(Owner::process(process.id.as_str()), now, end, 0)?;
            remaining[pid] -= run;
            now = end;

            // Arrivals during the slice queue up ahead of the preempted process
            admit(now, &mut cursor, &mut ready);
            if remaining[pid] > 0 {
                debug!("t={now}: {} preempted with {} left", process.id, remaining[pid]);
                ready.push_back(pid);
            } else {
                debug!("t={now}: {} completed", process.id);
            }
        }

        Ok(timeline.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Process;

    fn spans(timeline: &Timeline) -> Vec<(String, u64, u64)> {
        timeline
            .segments()
            .iter()
            .map(|s| (s.owner.to_string(), s.start, s.end))
            .collect()
    }

    #[test]
    fn quantum_two_preempts_after_two_units() {
        let registry = Registry::new(vec![
            Process::new("P1", 0, 5),
            Process::new("P2", 3, 1),
            Process::new("P3", 10, 11),
        ])
        .unwrap();

        let timeline = RoundRobin::new(2).unwrap().schedule(&registry).unwrap();
        let spans = spans(&timeline);
        assert_eq!(spans[0], ("P1".into(), 0, 2));
        assert_eq!(
            &spans[..6],
            &[
                ("P1".into(), 0, 2),
                ("P1".into(), 2, 4),
                ("P2".into(), 4, 5),
                ("P1".into(), 5, 6),
                ("Idle".into(), 6, 10),
                ("P3".into(), 10, 12),
            ]
        );
        assert_eq!(timeline.makespan(), 21);
    }

    #[test]
    fn arrival_at_preemption_instant_goes_first() {
        let registry = Registry::new(vec![
            Process::new("A", 0, 4),
            Process::new("B", 2, 2),
        ])
        .unwrap();

        let timeline = RoundRobin::new(2).unwrap().schedule(&registry).unwrap();
        assert_eq!(
            spans(&timeline),
            vec![
                ("A".into(), 0, 2),
                ("B".into(), 2, 4),
                ("A".into(), 4, 6)
            ]
        );
    }

    #[test]
    fn zero_quantum_is_rejected() {
        assert_eq!(RoundRobin::new(0).unwrap_err(), InputError::ZeroQuantum);
    }
}
