use super::{DispatchPolicy, Scheduler};
use crate::{
    core::{Pid, Rank, ReadyQueue, SimCtx, Timeline},
    error::SchedError,
    sim::{Registry, Sim},
};

/// Preemptive shortest remaining time first on one processor.
#[derive(Debug, Clone, Copy, Default)]
pub struct Srtf;

impl Scheduler for Srtf {
    fn name(&self) -> &'static str {
        "srtf"
    }

    fn build(&self, registry: &Registry) -> Result<Timeline, SchedError> {
        Ok(Sim::new(registry, 1, SrtfPolicy).run()?)
    }
}

/// Ranks queued tasks by remaining work and preempts the running task as
/// soon as a queued one has a better rank.
#[derive(Debug, Clone, Copy, Default)]
pub struct SrtfPolicy;

fn rank(ctx: &SimCtx, pid: Pid) -> Rank {
    let task = ctx.task(pid);
    Rank {
        work: task.remaining,
        arrival: task.arrival,
        pid,
    }
}

impl DispatchPolicy for SrtfPolicy {
    fn ready_queue(&self) -> ReadyQueue {
        ReadyQueue::new_ranked()
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, pid: Pid) {
        let rank = rank(ctx, pid);
        ctx.ready_push_ranked(pid, rank);
    }

    fn should_preempt(&self, ctx: &SimCtx, pid: Pid) -> bool {
        ctx.ready
            .peek_rank()
            .is_some_and(|best| best < rank(ctx, pid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::Owner, sim::Process};

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
            Process::new("P4", 12, 5),
            Process::new("P5", 15, 12),
        ])
        .unwrap();

        let timeline = Srtf.schedule(&registry).unwrap();
        // P2 (1) beats P1's remaining 2 at t=3; P4 (5) beats P3's remaining 9 at t=12
        assert_eq!(
            spans(&timeline),
            vec![
                ("P1".into(), 0, 3),
                ("P2".into(), 3, 4),
                ("P1".into(), 4, 6),
                ("Idle".into(), 6, 10),
                ("P3".into(), 10, 12),
                ("P4".into(), 12, 17),
                ("P3".into(), 17, 26),
                ("P5".into(), 26, 38),
            ]
        );
    }

    #[test]
    fn preempted_job_resumes_and_sums_to_burst() {
        let registry = Registry::new(vec![
            Process::new("long", 0, 8),
            Process::new("short", 2, 2),
        ])
        .unwrap();

        let timeline = Srtf.schedule(&registry).unwrap();
        let long: Vec<_> = timeline
            .segments()
            .iter()
            .filter(|s| s.owner == Owner::process("long"))
            .map(|s| (s.start, s.end))
            .collect();
        assert_eq!(long, vec![(0, 2), (4, 10)]);
        assert_eq!(timeline.busy_time(&Owner::process("long")), 8);
    }

    #[test]
    fn equal_remaining_does_not_preempt() {
        let registry = Registry::new(vec![
            Process::new("A", 0, 4),
            Process::new("B", 1, 3),
        ])
        .unwrap();

        // At t=1 A has 3 left, same as B: A keeps the cpu
        let timeline = Srtf.schedule(&registry).unwrap();
        assert_eq!(
            spans(&timeline),
            vec![("A".into(), 0, 4), ("B".into(), 4, 7)]
        );
    }

    #[test]
    fn full_tie_falls_back_to_input_order() {
        let registry = Registry::new(vec![
            Process::new("B", 0, 2),
            Process::new("A", 0, 2),
        ])
        .unwrap();

        let timeline = Srtf.schedule(&registry).unwrap();
        assert_eq!(
            spans(&timeline),
            vec![("B".into(), 0, 2), ("A".into(), 2, 4)]
        );
    }

    #[test]
    fn late_arrival_leaves_leading_idle() {
        let registry = Registry::new(vec![Process::new("P1", 1000, 2)]).unwrap();
        let timeline = Srtf.schedule(&registry).unwrap();
        assert_eq!(
            spans(&timeline),
            vec![("Idle".into(), 0, 1000), ("P1".into(), 1000, 1002)]
        );
    }
}
