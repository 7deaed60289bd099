use rustc_hash::FxHashMap;

use super::process::Process;
use crate::{
    core::{Pid, Task, TaskState, Ticks},
    error::InputError,
};

/// Validated, immutable workload. Every simulation run derives its own
/// mutable task state from it via [`Registry::tasks`].
#[derive(Debug, Clone)]
pub struct Registry {
    processes: Vec<Process>,
    by_id: FxHashMap<String, Pid>,
    // Stable: equal arrivals keep input order
    by_arrival: Vec<Pid>,
}

impl Registry {
    pub fn new(processes: Vec<Process>) -> Result<Self, InputError> {
        if processes.is_empty() {
            return Err(InputError::EmptyWorkload);
        }

        let mut by_id = FxHashMap::default();
        for (pid, process) in processes.iter().enumerate() {
            if process.burst == 0 {
                return Err(InputError::ZeroBurst(process.id.clone()));
            }
            if by_id.insert(process.id.clone(), pid).is_some() {
                return Err(InputError::DuplicateId(process.id.clone()));
            }
        }

        // Every schedule ends by the last arrival plus all service, so this
        // bound keeps later tick arithmetic from overflowing
        let last_arrival = processes.iter().map(|p| p.arrival).max().unwrap_or(0);
        processes
            .iter()
            .try_fold(last_arrival, |end: Ticks, p| end.checked_add(p.burst))
            .ok_or(InputError::HorizonOverflow)?;

        let mut by_arrival: Vec<Pid> = (0..processes.len()).collect();
        by_arrival.sort_by_key(|&pid| processes[pid].arrival);

        Ok(Self {
            processes,
            by_id,
            by_arrival,
        })
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn get(&self, pid: Pid) -> &Process {
        &self.processes[pid]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> + '_ {
        self.processes.iter()
    }

    pub fn pid_of(&self, id: &str) -> Option<Pid> {
        self.by_id.get(id).copied()
    }

    pub fn by_arrival(&self) -> &[Pid] {
        &self.by_arrival
    }

    pub fn total_burst(&self) -> Ticks {
        self.processes.iter().map(|p| p.burst).sum()
    }

    /// Fresh per-run state, one task per process, indexed by pid.
    pub fn tasks(&self) -> Vec<Task> {
        self.processes
            .iter()
            .enumerate()
            .map(|(pid, p)| Task {
                pid,
                id: p.id.clone(),
                arrival: p.arrival,
                burst: p.burst,
                remaining: p.burst,
                state: TaskState::Waiting,
                current_cpu: None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_arrival_stably() {
        let registry = Registry::new(vec![
            Process::new("A", 4, 1),
            Process::new("B", 0, 1),
            Process::new("C", 4, 1),
            Process::new("D", 1, 1),
        ])
        .unwrap();
        assert_eq!(registry.by_arrival(), &[1, 3, 0, 2]);
        assert_eq!(registry.pid_of("C"), Some(2));
        assert_eq!(registry.total_burst(), 4);
    }

    #[test]
    fn rejects_invalid_workloads() {
        assert_eq!(Registry::new(vec![]).unwrap_err(), InputError::EmptyWorkload);
        assert_eq!(
            Registry::new(vec![Process::new("P1", 0, 0)]).unwrap_err(),
            InputError::ZeroBurst("P1".into())
        );
        assert_eq!(
            Registry::new(vec![Process::new("P1", 0, 1), Process::new("P1", 2, 3)]).unwrap_err(),
            InputError::DuplicateId("P1".into())
        );
    }

    #[test]
    fn rejects_workload_past_the_time_horizon() {
        assert_eq!(
            Registry::new(vec![Process::new("P1", 0, Ticks::MAX), Process::new("P2", 0, 1)])
                .unwrap_err(),
            InputError::HorizonOverflow
        );
        assert_eq!(
            Registry::new(vec![Process::new("P1", Ticks::MAX, 1)]).unwrap_err(),
            InputError::HorizonOverflow
        );
        assert!(Registry::new(vec![Process::new("P1", Ticks::MAX - 1, 1)]).is_ok());
    }

    #[test]
    fn tasks_are_independent_copies() {
        let registry = Registry::new(vec![Process::new("P1", 0, 3)]).unwrap();
        let mut first = registry.tasks();
        first[0].remaining = 0;
        assert_eq!(registry.tasks()[0].remaining, 3);
    }
}
