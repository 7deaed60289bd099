use average::{Estimate, Mean};

use super::registry::Registry;
use crate::core::{Owner, Ticks, Timeline};

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessMetrics {
    pub id: String,
    pub arrival: Ticks,
    pub burst: Ticks,
    pub first_start: Ticks,
    pub completion: Ticks,
    /// `completion - arrival`
    pub turnaround: Ticks,
    /// `turnaround - burst`
    pub waiting: Ticks,
    /// `first_start - arrival`
    pub response: Ticks,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub processes: Vec<ProcessMetrics>,
    pub makespan: Ticks,
    pub busy: Ticks,
    pub utilization: f64,
    pub avg_turnaround: f64,
    pub avg_waiting: f64,
    pub avg_response: f64,
}

/// Per-process statistics, in registry order. Expects a timeline that
/// already passed [`Timeline::validate`] against `registry`.
pub fn summarize(timeline: &Timeline, registry: &Registry) -> Summary {
    let mut spans: Vec<Option<(Ticks, Ticks)>> = vec![None; registry.len()];
    for seg in timeline.segments() {
        let Owner::Process(id) = &seg.owner else {
            continue;
        };
        let Some(pid) = registry.pid_of(id) else {
            continue;
        };
        let span = spans[pid].get_or_insert((seg.start, seg.end));
        span.0 = span.0.min(seg.start);
        span.1 = span.1.max(seg.end);
    }

    let processes: Vec<ProcessMetrics> = registry
        .iter()
        .zip(spans)
        .map(|(p, span)| {
            let (first_start, completion) = span.unwrap_or((p.arrival, p.arrival));
            let turnaround = completion.saturating_sub(p.arrival);
            ProcessMetrics {
                id: p.id.clone(),
                arrival: p.arrival,
                burst: p.burst,
                first_start,
                completion,
                turnaround,
                waiting: turnaround.saturating_sub(p.burst),
                response: first_start.saturating_sub(p.arrival),
            }
        })
        .collect();

    let makespan = timeline.makespan();
    let busy = registry.total_burst();
    let capacity = makespan as f64 * timeline.num_cpus() as f64;
    let utilization = if makespan == 0 {
        0.0
    } else {
        busy as f64 / capacity
    };

    Summary {
        avg_turnaround: avg(processes.iter().map(|m| m.turnaround as f64)),
        avg_waiting: avg(processes.iter().map(|m| m.waiting as f64)),
        avg_response: avg(processes.iter().map(|m| m.response as f64)),
        processes,
        makespan,
        busy,
        utilization,
    }
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<Mean>().estimate()
}
