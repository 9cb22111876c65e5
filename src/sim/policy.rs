use std::{fmt, num::NonZeroU64, str::FromStr};

use thiserror::Error;

use super::{
    driver::Sim,
    job::{Process, Schedule},
};
use crate::{
    core::{event::SimEvent, state::Ticks},
    scheduler::{
        DEFAULT_QUANTUM, FifoScheduler, PriorityScheduler, SLICE_INF, Scheduler, SjfScheduler,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    Fcfs,
    Sjf,
    RoundRobin,
    Priority,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("unknown scheduling algorithm {0:?}")]
    Unknown(String),
}

impl Policy {
    pub const ALL: [Policy; 4] = [
        Policy::Fcfs,
        Policy::Sjf,
        Policy::RoundRobin,
        Policy::Priority,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Policy::Fcfs => "FCFS",
            Policy::Sjf => "SJF",
            Policy::RoundRobin => "Round Robin",
            Policy::Priority => "Priority Scheduling",
        }
    }

    pub fn is_preemptive(self) -> bool {
        matches!(self, Policy::RoundRobin)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Policy {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Policy::ALL
            .into_iter()
            .find(|policy| policy.name() == s)
            .ok_or_else(|| PolicyError::Unknown(s.to_owned()))
    }
}

pub fn default_quantum() -> NonZeroU64 {
    NonZeroU64::new(DEFAULT_QUANTUM).unwrap_or(NonZeroU64::MIN)
}

type EventSink<'a> = &'a mut dyn FnMut(Ticks, &SimEvent);

fn run<S: Scheduler>(processes: &[Process], slice: Ticks, on_event: EventSink<'_>) -> Schedule {
    Sim::<S>::new(processes.to_vec(), slice).run_with(on_event)
}

// `quantum` only matters for Round-Robin
pub fn simulate(policy: Policy, processes: &[Process], quantum: NonZeroU64) -> Schedule {
    simulate_with(policy, processes, quantum, |_, _| {})
}

pub fn simulate_with(
    policy: Policy,
    processes: &[Process],
    quantum: NonZeroU64,
    mut on_event: impl FnMut(Ticks, &SimEvent),
) -> Schedule {
    log::debug!("running {policy} over {} processes", processes.len());
    let sink: EventSink<'_> = &mut on_event;
    match policy {
        Policy::Fcfs => run::<FifoScheduler>(processes, SLICE_INF, sink),
        Policy::Sjf => run::<SjfScheduler>(processes, SLICE_INF, sink),
        Policy::RoundRobin => run::<FifoScheduler>(processes, quantum.get(), sink),
        Policy::Priority => run::<PriorityScheduler>(processes, SLICE_INF, sink),
    }
}

// Unknown names produce an empty schedule rather than an error
pub fn calculate_scheduling(
    algorithm: &str,
    processes: &[Process],
    quantum: Option<NonZeroU64>,
) -> Schedule {
    match algorithm.parse::<Policy>() {
        Ok(policy) => simulate(policy, processes, quantum.unwrap_or_else(default_quantum)),
        Err(err) => {
            log::warn!("{err}; returning an empty schedule");
            Schedule::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for policy in Policy::ALL {
            assert_eq!(policy.to_string().parse::<Policy>(), Ok(policy));
        }
    }

    #[test]
    fn names_are_exact() {
        assert_eq!(
            "round robin".parse::<Policy>(),
            Err(PolicyError::Unknown("round robin".into()))
        );
        assert!("Priority".parse::<Policy>().is_err());
        assert!("".parse::<Policy>().is_err());
    }

    #[test]
    fn unknown_name_yields_empty_schedule() {
        let procs = vec![Process::new(1, 0, 3, 0).unwrap()];
        assert!(calculate_scheduling("Lottery", &procs, None).is_empty());
    }

    #[test]
    fn missing_quantum_defaults_to_two() {
        let procs = vec![Process::new(1, 0, 3, 0).unwrap(), Process::new(2, 0, 3, 0).unwrap()];
        let schedule = calculate_scheduling("Round Robin", &procs, None);
        assert_eq!(schedule.segments[0].duration(), 2);
        assert_eq!(schedule.segments[1].pid, 2);
        assert_eq!(default_quantum().get(), 2);
    }

    #[test]
    fn simulate_with_sees_each_slice() {
        let procs = vec![Process::new(1, 0, 3, 0).unwrap(), Process::new(2, 5, 1, 0).unwrap()];
        let mut slices = 0;
        let mut idles = 0;

        let schedule = simulate_with(Policy::RoundRobin, &procs, default_quantum(), |_, event| {
            match event {
                SimEvent::Slice { .. } => slices += 1,
                SimEvent::CpuIdle { .. } => idles += 1,
                SimEvent::TaskStateChange { .. } => {}
            }
        });

        assert_eq!(slices, schedule.segments.len());
        assert_eq!(slices, 3);
        assert_eq!(idles, 1);
    }

    #[test]
    fn quantum_is_ignored_by_non_preemptive_policies() {
        let procs = vec![Process::new(1, 0, 9, 0).unwrap(), Process::new(2, 0, 1, 0).unwrap()];
        let q1 = NonZeroU64::new(1).unwrap();
        for policy in Policy::ALL.into_iter().filter(|p| !p.is_preemptive()) {
            assert_eq!(
                simulate(policy, &procs, q1),
                simulate(policy, &procs, default_quantum()),
                "{policy}"
            );
            assert_eq!(simulate(policy, &procs, q1).segments.len(), 2, "{policy}");
        }
    }
}
