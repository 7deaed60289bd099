pub mod driver;
pub mod metrics;
pub mod process;
pub mod registry;
pub mod workload;

pub use driver::Sim;
pub use metrics::{ProcessMetrics, Summary, summarize};
pub use process::Process;
pub use registry::Registry;
pub use workload::BernoulliWorkload;
