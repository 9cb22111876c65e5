use std::marker::PhantomData;

use super::{DispatchError, ENQ_REENQ, EnqueueFlags, SLICE_INF, Scheduler, SimCtx, TaskId, Ticks};
use crate::{
    core::{DsqId, Rank},
    sim::job::Process,
};

// Smaller keys run first
pub trait RankBy {
    fn key(process: &Process) -> u64;
}

pub struct ByBurst;

impl RankBy for ByBurst {
    fn key(process: &Process) -> u64 {
        process.burst
    }
}

pub struct ByPriority;

impl RankBy for ByPriority {
    fn key(process: &Process) -> u64 {
        process.priority
    }
}

pub struct PriqScheduler<R> {
    global_priq: DsqId,
    _rank: PhantomData<R>,
}

pub type SjfScheduler = PriqScheduler<ByBurst>;
pub type PriorityScheduler = PriqScheduler<ByPriority>;

impl<R: RankBy> Scheduler for PriqScheduler<R> {
    // Non-preemptive regardless of the requested slice
    fn init(ctx: &mut SimCtx, _slice: Ticks) -> Self {
        Self {
            global_priq: ctx.create_dsq_priq(),
            _rank: PhantomData,
        }
    }

    fn admission_key(process: &Process) -> (Ticks, u64) {
        (process.arrival, R::key(process))
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, task: TaskId, flags: EnqueueFlags) {
        // Every task gets SLICE_INF, so one can only arrive here by waking up
        assert!(
            flags & ENQ_REENQ == 0,
            "task {task} re-enqueued into a non-preemptive queue"
        );
        let rank = Rank {
            key: R::key(&ctx.task(task).process),
            seq: task,
        };
        ctx.dsq_push_priq(self.global_priq, task, SLICE_INF, rank);
    }

    fn dispatch(&mut self, ctx: &mut SimCtx) -> Result<TaskId, DispatchError> {
        ctx.dsq_pop(self.global_priq)
            .ok_or(DispatchError::NoRunnableTask)
    }
}
