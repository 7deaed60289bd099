use log::debug;

use super::Scheduler;
use crate::{
    core::{Owner, Timeline, TimelineBuilder},
    error::SchedError,
    sim::Registry,
};

/// Non-preemptive, arrival order on one processor.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fcfs;

impl Scheduler for Fcfs {
    fn name(&self) -> &'static str {
        "fcfs"
    }

    fn build(&self, registry: &Registry) -> Result<Timeline, SchedError> {
        let mut timeline = TimelineBuilder::new(1);
        let mut now = 0;

        for &pid in registry.by_arrival() {
            let process = registry.get(pid);
            if now < process.arrival {
                timeline.push(Owner::Idle, now, process.arrival, 0)?;
                now = process.arrival;
            }

            let end = now + process.burst;
            debug!("t={now}: {} runs until {end}", process.id);
            timeline.push(Owner::process(process.id.as_str()), now, end, 0)?;
            now = end;
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
    fn classic_workload() {
        let registry = Registry::new(vec![
            Process::new("P1", 0, 5),
            Process::new("P2", 3, 1),
            Process::new("P3", 10, 11),
            Process::new("P4", 12, 2),
            Process::new("P5", 15, 12),
        ])
        .unwrap();

        let timeline = Fcfs.schedule(&registry).unwrap();
        assert_eq!(
            spans(&timeline),
            vec![
                ("P1".into(), 0, 5),
                ("P2".into(), 5, 6),
                ("Idle".into(), 6, 10),
                ("P3".into(), 10, 21),
                ("P4".into(), 21, 23),
                ("P5".into(), 23, 35),
            ]
        );
    }

    #[test]
    fn equal_arrivals_keep_input_order_and_leading_idle() {
        let registry = Registry::new(vec![
            Process::new("B", 2, 1),
            Process::new("A", 2, 3),
        ])
        .unwrap();

        let timeline = Fcfs.schedule(&registry).unwrap();
        assert_eq!(
            spans(&timeline),
            vec![
                ("Idle".into(), 0, 2),
                ("B".into(), 2, 3),
                ("A".into(), 3, 6)
            ]
        );
    }
}
