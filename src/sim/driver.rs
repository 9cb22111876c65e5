use super::job::{Metrics, Process, Schedule};
use crate::{
    core::{
        driver::SchedCore,
        event::SimEvent,
        state::{TaskState, Ticks},
    },
    scheduler::Scheduler,
};

pub struct Sim<S: Scheduler> {
    pub core: SchedCore<S>,
    // Tasks are stored in admission order, so everything at or past the
    // cursor has yet to arrive
    arrival_cursor: usize,
}

impl<S: Scheduler> Sim<S> {
    pub fn new(mut processes: Vec<Process>, slice: Ticks) -> Self {
        // Stable: equal keys keep their input order
        processes.sort_by_key(S::admission_key);

        let mut core = SchedCore::<S>::new(slice);
        for process in processes {
            core.ctx.create_task(process);
        }

        Self {
            core,
            arrival_cursor: 0,
        }
    }

    // One dispatch decision: a single slice, or a jump to the next arrival
    pub fn step(&mut self) -> Vec<SimEvent> {
        let mut events = Vec::new();
        self.handle_arrivals(&mut events);

        if self.core.try_schedule_cpu(&mut events).is_some() {
            self.core.run_current(&mut events);
            // Tasks that arrived during the slice queue up ahead of the one
            // that just ran
            self.handle_arrivals(&mut events);
            self.core.settle_current(&mut events);
        } else if let Some(next) = self.next_arrival() {
            self.core.idle_until(next, &mut events);
        }

        self.core.observe();
        events
    }

    fn handle_arrivals(&mut self, events: &mut Vec<SimEvent>) {
        let now = self.core.now();
        // This will be contiguous, since tasks are sorted by arrival first
        while let Some(task) = self.core.ctx.tasks.get(self.arrival_cursor) {
            if task.process.arrival > now {
                break;
            }
            let task_id = self.arrival_cursor;
            self.arrival_cursor += 1;
            self.core.wake_task(task_id, events);
        }
    }

    fn next_arrival(&self) -> Option<Ticks> {
        self.core
            .ctx
            .tasks
            .get(self.arrival_cursor)
            .map(|task| task.process.arrival)
    }

    pub fn all_jobs_completed(&self) -> bool {
        self.core
            .ctx
            .tasks
            .iter()
            .all(|task| task.state == TaskState::Completed)
    }

    pub fn run(self) -> Schedule {
        self.run_with(|_, _| {})
    }

    // `on_event` also gets the clock at the start of the producing step
    pub fn run_with(mut self, mut on_event: impl FnMut(Ticks, &SimEvent)) -> Schedule {
        log::debug!("simulating {} processes", self.core.ctx.tasks.len());

        while !self.all_jobs_completed() {
            let now = self.core.now();
            for event in self.step() {
                on_event(now, &event);
            }
        }

        log::debug!(
            "simulation finished at t={} after {} steps",
            self.core.now(),
            self.core.observer().steps()
        );
        self.into_schedule()
    }

    fn into_schedule(self) -> Schedule {
        let ctx = self.core.ctx;
        let mut completed: Vec<(Ticks, &Process)> = ctx
            .tasks
            .iter()
            .filter_map(|task| Some((task.completion_time?, &task.process)))
            .collect();
        // If a pid repeats, the copy that finished last owns the entry
        completed.sort_by_key(|&(completion, _)| completion);
        let metrics = completed
            .into_iter()
            .map(|(completion, p)| (p.pid, Metrics::new(p.arrival, p.burst, completion)))
            .collect();

        Schedule {
            segments: ctx.timeline,
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::TaskState,
        scheduler::{FifoScheduler, SLICE_INF},
    };

    fn procs(rows: &[(u64, u64, u64)]) -> Vec<Process> {
        rows.iter()
            .map(|&(pid, arrival, burst)| Process::new(pid, arrival, burst, 0).unwrap())
            .collect()
    }

    #[test]
    fn idle_step_jumps_to_next_arrival() {
        let mut sim = Sim::<FifoScheduler>::new(procs(&[(1, 4, 2)]), SLICE_INF);

        let events = sim.step();

        assert_eq!(events, vec![SimEvent::CpuIdle { from: 0, to: 4 }]);
        assert_eq!(sim.core.now(), 4);
        assert!(!sim.all_jobs_completed());
    }

    #[test]
    fn slice_step_admits_mid_slice_arrivals_before_requeue() {
        let mut sim = Sim::<FifoScheduler>::new(procs(&[(1, 0, 4), (2, 1, 4)]), 2);

        let events = sim.step();

        assert_eq!(
            events,
            vec![
                SimEvent::TaskStateChange {
                    task: 0,
                    from: TaskState::Pending,
                    to: TaskState::Runnable,
                },
                SimEvent::TaskStateChange {
                    task: 0,
                    from: TaskState::Runnable,
                    to: TaskState::Running,
                },
                SimEvent::Slice {
                    task: 0,
                    start: 0,
                    end: 2,
                },
                SimEvent::TaskStateChange {
                    task: 1,
                    from: TaskState::Pending,
                    to: TaskState::Runnable,
                },
                SimEvent::TaskStateChange {
                    task: 0,
                    from: TaskState::Running,
                    to: TaskState::Runnable,
                },
            ]
        );
    }

    #[test]
    fn empty_input_is_already_complete() {
        let sim = Sim::<FifoScheduler>::new(Vec::new(), SLICE_INF);
        assert!(sim.all_jobs_completed());
        assert!(sim.run().is_empty());
    }

    #[test]
    fn run_with_reports_every_event() {
        let sim = Sim::<FifoScheduler>::new(procs(&[(1, 0, 1), (2, 3, 1)]), SLICE_INF);
        let mut idle = Vec::new();

        let schedule = sim.run_with(|now, event| {
            if let SimEvent::CpuIdle { from, to } = event {
                assert_eq!(now, *from);
                idle.push((*from, *to));
            }
        });

        assert_eq!(idle, vec![(1, 3)]);
        assert_eq!(schedule.makespan(), 4);
    }

    #[test]
    fn repeated_pid_reports_the_last_completion() {
        // The second copy is admitted later but finishes first
        let sim = Sim::<FifoScheduler>::new(procs(&[(7, 0, 5), (7, 1, 1)]), 2);

        let schedule = sim.run();

        assert_eq!(schedule.service(7), 6);
        assert_eq!(
            schedule.metrics.into_iter().collect::<Vec<_>>(),
            vec![(7, Metrics::new(0, 5, 6))]
        );
    }

    #[test]
    #[should_panic(expected = "simulation clock overflowed")]
    fn combined_work_past_the_clock_stops_the_run() {
        let sim = Sim::<FifoScheduler>::new(
            procs(&[(1, u64::MAX - 3, 2), (2, u64::MAX - 3, 2)]),
            SLICE_INF,
        );

        sim.run();
    }
}
