pub mod driver;
pub mod event;
pub mod observer;
pub mod state;
pub mod timeline;

pub use driver::SchedCore;
pub use event::SchedEvent;
pub use observer::Observer;
pub use state::{CpuId, CpuState, Pid, Rank, ReadyQueue, SimCtx, Task, TaskState, Ticks};
pub use timeline::{Owner, Segment, Timeline, TimelineBuilder};
