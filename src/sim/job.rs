use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::state::{Segment, Ticks};

pub type Pid = u64;

// Lower `priority` values are more urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Process {
    pub pid: Pid,
    pub arrival: Ticks,
    pub burst: Ticks,
    pub priority: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProcessError {
    #[error("process {pid}: burst time must be greater than zero")]
    ZeroBurst { pid: Pid },
    #[error("process {pid}: arrival {arrival} plus burst {burst} overflows the clock")]
    ClockOverflow { pid: Pid, arrival: Ticks, burst: Ticks },
}

impl Process {
    pub fn new(pid: Pid, arrival: Ticks, burst: Ticks, priority: u64) -> Result<Self, ProcessError> {
        if burst == 0 {
            return Err(ProcessError::ZeroBurst { pid });
        }
        if arrival.checked_add(burst).is_none() {
            return Err(ProcessError::ClockOverflow {
                pid,
                arrival,
                burst,
            });
        }
        Ok(Self {
            pid,
            arrival,
            burst,
            priority,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Metrics {
    pub waiting_time: Ticks,
    pub turnaround_time: Ticks,
}

impl Metrics {
    pub fn new(arrival: Ticks, burst: Ticks, completion: Ticks) -> Self {
        let turnaround_time = completion - arrival;
        Self {
            waiting_time: turnaround_time - burst,
            turnaround_time,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    pub segments: Vec<Segment>,
    pub metrics: BTreeMap<Pid, Metrics>,
}

impl Schedule {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.metrics.is_empty()
    }

    pub fn makespan(&self) -> Ticks {
        self.segments.last().map_or(0, |s| s.end)
    }

    pub fn service(&self, pid: Pid) -> Ticks {
        self.segments
            .iter()
            .filter(|s| s.pid == pid)
            .map(Segment::duration)
            .sum()
    }
}
