use keyed_priority_queue::KeyedPriorityQueue;
use rustc_hash::FxHashSet;
use std::cmp::Reverse;
use std::collections::VecDeque;

// Index into the registry's process Vec
pub type Pid = usize;
pub type CpuId = usize;
pub type Ticks = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    // Not yet arrived
    Waiting,
    Ready,
    Running,
    Completed,
}

/// Per-run copy of a process. Built fresh from the registry for every
/// simulation, so runs never share `remaining`.
#[derive(Debug, Clone)]
pub struct Task {
    pub pid: Pid,
    pub id: String,
    pub arrival: Ticks,
    pub burst: Ticks,
    pub remaining: Ticks,
    pub state: TaskState,
    pub current_cpu: Option<CpuId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuState {
    Idle {
        since: Ticks,
    },
    Running {
        pid: Pid,
        since: Ticks,
        // None runs the task to completion
        slice_left: Option<Ticks>,
    },
}

/// Ordering key for shortest-first queues: least work, then earliest
/// arrival, then input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rank {
    pub work: Ticks,
    pub arrival: Ticks,
    pub pid: Pid,
}

#[derive(Debug)]
pub enum ReadyQueue {
    Fifo {
        tasks: VecDeque<Pid>,
    },
    // KeyedPriorityQueue is a max-heap, so ranks are stored reversed
    Ranked {
        tasks: KeyedPriorityQueue<Pid, Reverse<Rank>>,
    },
}

impl ReadyQueue {
    pub fn new_fifo() -> Self {
        Self::Fifo {
            tasks: VecDeque::new(),
        }
    }

    pub fn new_ranked() -> Self {
        Self::Ranked {
            tasks: KeyedPriorityQueue::new(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Fifo { tasks } => tasks.len(),
            Self::Ranked { tasks } => tasks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, pid: Pid) -> bool {
        match self {
            Self::Fifo { tasks } => tasks.contains(&pid),
            Self::Ranked { tasks } => tasks.get_priority(&pid).is_some(),
        }
    }

    /// Best-ranked entry of a ranked queue. Fifo queues have no rank.
    pub fn peek_rank(&self) -> Option<Rank> {
        match self {
            Self::Fifo { .. } => None,
            Self::Ranked { tasks } => tasks.peek().map(|(_, rank)| rank.0),
        }
    }
}

#[derive(Debug)]
pub struct SimCtx {
    pub now: Ticks,
    pub cpus: Vec<CpuState>,
    pub tasks: Vec<Task>,
    pub ready: ReadyQueue,
    // Mirrors `ready` membership so admission happens exactly once
    queued: FxHashSet<Pid>,
    completed: usize,
}

impl SimCtx {
    pub fn new(tasks: Vec<Task>, num_cpus: usize, ready: ReadyQueue) -> Self {
        debug_assert!(
            tasks.iter().enumerate().all(|(i, t)| t.pid == i),
            "Pid must match Vec index"
        );
        Self {
            now: 0,
            cpus: vec![CpuState::Idle { since: 0 }; num_cpus],
            tasks,
            ready,
            queued: FxHashSet::default(),
            completed: 0,
        }
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    pub fn task(&self, pid: Pid) -> &Task {
        &self.tasks[pid]
    }

    pub fn task_mut(&mut self, pid: Pid) -> &mut Task {
        &mut self.tasks[pid]
    }

    fn ready_push(&mut self, pid: Pid, rank: Option<Rank>) {
        assert!(
            self.queued.insert(pid),
            "Task {pid} already present in the ready queue"
        );

        let task = self.task(pid);
        debug_assert_eq!(
            task.state,
            TaskState::Ready,
            "Task {pid} must be Ready when enqueued"
        );

        match &mut self.ready {
            ReadyQueue::Fifo { tasks } => tasks.push_back(pid),
            ReadyQueue::Ranked { tasks } => {
                tasks.push(
                    pid,
                    Reverse(rank.expect("Attempted to push to a ranked queue with no rank")),
                );
            }
        };
    }

    pub fn ready_push_fifo(&mut self, pid: Pid) {
        self.ready_push(pid, None);
    }

    pub fn ready_push_ranked(&mut self, pid: Pid, rank: Rank) {
        self.ready_push(pid, Some(rank));
    }

    pub fn ready_pop(&mut self) -> Option<Pid> {
        let pid = match &mut self.ready {
            ReadyQueue::Fifo { tasks } => tasks.pop_front(),
            ReadyQueue::Ranked { tasks } => tasks.pop().map(|(pid, _)| pid),
        }?;

        let removed = self.queued.remove(&pid);
        debug_assert!(removed, "Task {pid} missing ready-queue membership");

        Some(pid)
    }

    pub fn is_queued(&self, pid: Pid) -> bool {
        self.queued.contains(&pid)
    }

    pub fn queued(&self) -> impl Iterator<Item = Pid> + '_ {
        self.queued.iter().copied()
    }

    pub fn cpu_is_idle(&self, cpu: CpuId) -> bool {
        matches!(self.cpus[cpu], CpuState::Idle { .. })
    }

    pub fn all_cpus_idle(&self) -> bool {
        (0..self.cpus.len()).all(|cpu| self.cpu_is_idle(cpu))
    }

    pub fn all_completed(&self) -> bool {
        self.completed == self.tasks.len()
    }

    pub fn mark_ready(&mut self, pid: Pid) {
        let task = self.task_mut(pid);
        debug_assert!(
            task.state != TaskState::Completed,
            "Completed task {pid} cannot be ready"
        );
        task.state = TaskState::Ready;
        task.current_cpu = None;
    }

    pub fn mark_completed(&mut self, pid: Pid) {
        debug_assert!(
            !self.queued.contains(&pid),
            "Completing task {pid} that is still enqueued"
        );

        let task = self.task_mut(pid);
        debug_assert!(
            task.state == TaskState::Running,
            "Task {pid} must have been running before marked complete"
        );
        debug_assert_eq!(task.remaining, 0, "Task {pid} completed with work left");

        task.state = TaskState::Completed;
        task.current_cpu = None;
        self.completed += 1;
    }

    pub fn set_running(&mut self, cpu: CpuId, pid: Pid, slice: Option<Ticks>) {
        debug_assert!(
            !self.queued.contains(&pid),
            "Running task {pid} must not be enqueued"
        );
        debug_assert!(self.cpu_is_idle(cpu), "CPU {cpu} already running a task");

        let now = self.now;
        self.cpus[cpu] = CpuState::Running {
            pid,
            since: now,
            slice_left: slice,
        };
        let task = self.task_mut(pid);
        task.state = TaskState::Running;
        task.current_cpu = Some(cpu);
    }

    pub fn clear_cpu(&mut self, cpu: CpuId) {
        self.cpus[cpu] = CpuState::Idle { since: self.now };
    }
}
