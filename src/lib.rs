pub mod core;
pub mod logger;
pub mod scheduler;
pub mod sim;

pub use crate::core::{Segment, SimEvent, Ticks};
pub use scheduler::Scheduler;
pub use sim::{
    Metrics, Pid, Policy, PolicyError, Process, ProcessError, Schedule, Sim, Summary,
    calculate_scheduling, simulate,
};
