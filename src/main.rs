use std::num::NonZeroU64;

use anyhow::{Context, bail};
use sched_sim::{
    Policy, Process, SimEvent, Summary, logger,
    sim::{WorkloadConfig, bernoulli_processes, default_quantum, format_gantt, parse_rows, simulate_with},
};

const USAGE: &str = "usage: sched_sim [--process=ARRIVAL,BURST[,PRIORITY]]... [--file=PATH] [ALGORITHM] [QUANTUM] [SEED]
  ALGORITHM  \"FCFS\", \"SJF\", \"Round Robin\", \"Priority Scheduling\" or \"all\"
  --process  one process; repeat for more. Pids follow row order from 1
  --file     one ARRIVAL,BURST[,PRIORITY] row per line, \"-\" for stdin
Without --process or --file a random workload is drawn from SEED.";

fn main() -> anyhow::Result<()> {
    logger::init().context("installing logger")?;

    let mut args = Vec::new();
    let mut rows = Vec::new();
    for arg in std::env::args().skip(1) {
        if let Some(row) = arg.strip_prefix("--process=") {
            rows.push(row.to_owned());
            continue;
        }
        if let Some(path) = arg.strip_prefix("--file=") {
            rows.extend(read_rows(path)?);
            continue;
        }
        match arg.as_str() {
            "--help" | "-h" => {
                println!("{USAGE}");
                return Ok(());
            }
            _ if arg.starts_with("--") => bail!("unknown flag {arg}\n{USAGE}"),
            _ => args.push(arg),
        }
    }
    if args.len() > 3 {
        bail!("too many arguments\n{USAGE}");
    }

    let policies = match args.first().map(String::as_str) {
        None | Some("all") => Policy::ALL.to_vec(),
        Some(name) => vec![name.parse::<Policy>()?],
    };
    let quantum = match args.get(1) {
        Some(q) => q
            .parse::<NonZeroU64>()
            .with_context(|| format!("time quantum must be a positive integer, got {q:?}"))?,
        None => default_quantum(),
    };
    let seed = match args.get(2) {
        Some(s) => s
            .parse::<u64>()
            .with_context(|| format!("seed must be a non-negative integer, got {s:?}"))?,
        None => 0,
    };

    let processes = if rows.is_empty() {
        let processes = bernoulli_processes(&WorkloadConfig {
            seed,
            ..WorkloadConfig::default()
        });
        if processes.is_empty() {
            bail!("seed {seed} generated no processes");
        }
        processes
    } else {
        if args.get(2).is_some() {
            log::warn!("seed {seed} ignored, processes were given explicitly");
        }
        parse_rows(rows.iter().map(String::as_str)).context("reading process table")?
    };
    print_processes(&processes);

    for policy in policies {
        println!("\n== {policy} ==");
        let schedule = simulate_with(policy, &processes, quantum, |now, event| {
            if let SimEvent::CpuIdle { .. } | SimEvent::Slice { .. } = event {
                log::debug!("t={now} {event:?}");
            } else {
                log::trace!("t={now} {event:?}");
            }
        });
        println!("{}", format_gantt(&schedule.segments));

        println!("{:>5} {:>8} {:>11}", "PID", "Waiting", "Turnaround");
        for (pid, m) in &schedule.metrics {
            println!("{pid:>5} {:>8} {:>11}", m.waiting_time, m.turnaround_time);
        }
        if let Some(summary) = Summary::from_metrics(&schedule.metrics) {
            println!("{summary}");
        }
    }

    Ok(())
}

fn read_rows(path: &str) -> anyhow::Result<Vec<String>> {
    let text = if path == "-" {
        std::io::read_to_string(std::io::stdin()).context("reading processes from stdin")?
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading processes from {path}"))?
    };
    Ok(text.lines().map(str::to_owned).collect())
}

fn print_processes(processes: &[Process]) {
    println!("{:>5} {:>8} {:>6} {:>9}", "PID", "Arrival", "Burst", "Priority");
    for p in processes {
        println!(
            "{:>5} {:>8} {:>6} {:>9}",
            p.pid, p.arrival, p.burst, p.priority
        );
    }
}
