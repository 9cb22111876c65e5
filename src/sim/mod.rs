pub mod driver;
pub mod job;
pub mod policy;
pub mod report;
pub mod table;
pub mod workload;

pub use driver::Sim;
pub use job::{Metrics, Pid, Process, ProcessError, Schedule};
pub use policy::{Policy, PolicyError, calculate_scheduling, default_quantum, simulate, simulate_with};
pub use report::{Summary, format_gantt};
pub use table::{RowError, TableError, parse_row, parse_rows};
pub use workload::{WorkloadConfig, bernoulli_processes};
