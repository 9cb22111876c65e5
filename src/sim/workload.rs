use rand::prelude::*;

use super::job::Process;
use crate::core::state::Ticks;

#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadConfig {
    // Arrivals are drawn for ticks 0..ticks
    pub ticks: Ticks,
    pub p_arrival: f64,
    pub p_short: f64,
    pub short_burst: Ticks,
    pub long_burst: Ticks,
    pub max_priority: u64,
    pub seed: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            ticks: 20,
            p_arrival: 0.3,
            p_short: 0.3,
            short_burst: 2,
            long_burst: 6,
            max_priority: 4,
            seed: 0,
        }
    }
}

// Pids count up from 1 in arrival order
pub fn bernoulli_processes(cfg: &WorkloadConfig) -> Vec<Process> {
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let mut processes = Vec::new();

    for t in 0..cfg.ticks {
        if rng.random::<f64>() < cfg.p_arrival {
            let burst = if rng.random::<f64>() < cfg.p_short {
                cfg.short_burst
            } else {
                cfg.long_burst
            };
            let priority = rng.random_range(0..=cfg.max_priority);

            processes.push(Process {
                pid: processes.len() as u64 + 1,
                arrival: t,
                burst: burst.max(1),
                priority,
            });
        }
    }

    processes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_workload() {
        let cfg = WorkloadConfig {
            ticks: 200,
            seed: 7,
            ..WorkloadConfig::default()
        };
        assert_eq!(bernoulli_processes(&cfg), bernoulli_processes(&cfg));
    }

    #[test]
    fn processes_respect_config() {
        let cfg = WorkloadConfig {
            ticks: 500,
            p_arrival: 0.5,
            ..WorkloadConfig::default()
        };
        let procs = bernoulli_processes(&cfg);

        assert!(!procs.is_empty());
        for (i, p) in procs.iter().enumerate() {
            assert_eq!(p.pid, i as u64 + 1);
            assert!(p.arrival < cfg.ticks);
            assert!(p.burst == cfg.short_burst || p.burst == cfg.long_burst);
            assert!(p.priority <= cfg.max_priority);
        }
        assert!(procs.windows(2).all(|w| w[0].arrival < w[1].arrival));
    }

    #[test]
    fn certain_arrival_fills_every_tick() {
        let cfg = WorkloadConfig {
            ticks: 10,
            p_arrival: 1.0,
            ..WorkloadConfig::default()
        };
        assert_eq!(bernoulli_processes(&cfg).len(), 10);
    }
}
