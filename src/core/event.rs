use crate::core::{CpuId, Pid, Ticks};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedEvent {
    Arrived {
        pid: Pid,
    },
    Dispatched {
        cpu: CpuId,
        pid: Pid,
        slice: Option<Ticks>,
    },
    Preempted {
        cpu: CpuId,
        pid: Pid,
        remaining: Ticks,
    },
    Completed {
        cpu: CpuId,
        pid: Pid,
    },
    // CPU idle even after dispatch
    CpuIdle {
        cpu: CpuId,
    },
}
