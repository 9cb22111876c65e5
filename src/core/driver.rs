use super::{
    event::SimEvent,
    observer::Observer,
    state::{Segment, SimCtx, TaskId, TaskState, Ticks},
};
use crate::scheduler::{DispatchError, ENQ_PREEMPT, ENQ_REENQ, ENQ_WAKEUP, EnqueueFlags, Scheduler};

pub struct SchedCore<S: Scheduler> {
    pub ctx: SimCtx,
    pub scheduler: S,
    observer: Observer,
}

impl<S: Scheduler> SchedCore<S> {
    pub fn new(slice: Ticks) -> Self {
        let mut ctx = SimCtx::new();
        let scheduler = S::init(&mut ctx, slice);
        let observer = Observer::new();
        Self {
            ctx,
            scheduler,
            observer,
        }
    }

    pub fn wake_task(&mut self, task: TaskId, events: &mut Vec<SimEvent>) {
        let from = self.ctx.task(task).state;
        self.ctx.mark_runnable(task);
        events.push(SimEvent::TaskStateChange {
            task,
            from,
            to: TaskState::Runnable,
        });
        self.scheduler.enqueue(&mut self.ctx, task, ENQ_WAKEUP);
    }

    pub fn try_schedule_cpu(&mut self, events: &mut Vec<SimEvent>) -> Option<TaskId> {
        debug_assert!(self.ctx.cpu_is_idle(), "dispatch while CPU is busy");

        let task = match self.scheduler.dispatch(&mut self.ctx) {
            Ok(task) => task,
            Err(DispatchError::NoRunnableTask) => return None,
        };

        let from = self.ctx.set_running(task);
        events.push(SimEvent::TaskStateChange {
            task,
            from,
            to: TaskState::Running,
        });
        Some(task)
    }

    // Runs for the allocated slice or until the task finishes
    pub fn run_current(&mut self, events: &mut Vec<SimEvent>) -> Option<Segment> {
        let task_id = self.ctx.current?;
        let task = self.ctx.task(task_id);
        let slice = task
            .allocated_timeslice
            .expect("Dispatched task must have a timeslice");
        debug_assert!(
            self.ctx.now >= task.process.arrival,
            "Task {task_id} dispatched before it arrived"
        );

        let run = task.remaining.min(slice);
        let segment = self.ctx.record_segment(task_id, run);
        log::trace!(
            "pid {} ran [{}, {}), {} left",
            segment.pid,
            segment.start,
            segment.end,
            self.ctx.task(task_id).remaining
        );
        events.push(SimEvent::Slice {
            task: task_id,
            start: segment.start,
            end: segment.end,
        });
        Some(segment)
    }

    pub fn settle_current(&mut self, events: &mut Vec<SimEvent>) {
        let Some(task_id) = self.ctx.current else {
            return;
        };
        self.ctx.clear_cpu();

        let now = self.ctx.now;
        let task = self.ctx.task(task_id);
        if task.remaining == 0 {
            log::trace!("pid {} completed at {now}", task.pid());
            self.ctx.mark_completed(task_id, now);
            events.push(SimEvent::TaskStateChange {
                task: task_id,
                from: TaskState::Running,
                to: TaskState::Completed,
            });
            return;
        }

        log::trace!("pid {} preempted at {now}", task.pid());
        self.ctx.mark_runnable(task_id);
        events.push(SimEvent::TaskStateChange {
            task: task_id,
            from: TaskState::Running,
            to: TaskState::Runnable,
        });
        let flags: EnqueueFlags = ENQ_PREEMPT | ENQ_REENQ;
        self.scheduler.enqueue(&mut self.ctx, task_id, flags);
    }

    pub fn idle_until(&mut self, at: Ticks, events: &mut Vec<SimEvent>) {
        let from = self.ctx.now;
        debug_assert!(at > from, "idle gap must move the clock forward");
        log::trace!("cpu idle [{from}, {at})");
        self.ctx.advance_time(at - from);
        events.push(SimEvent::CpuIdle { from, to: at });
    }

    pub fn observe(&mut self) {
        self.observer.observe(&self.ctx);
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}
