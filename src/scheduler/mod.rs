pub mod fifo;
pub mod priq;

use crate::{
    core::{
        Ticks,
        state::{SimCtx, TaskId},
    },
    sim::job::Process,
};
pub use fifo::FifoScheduler;
pub use priq::{ByBurst, ByPriority, PriorityScheduler, PriqScheduler, RankBy, SjfScheduler};

pub type EnqueueFlags = u64;

// Task became runnable for the first time
pub const ENQ_WAKEUP: EnqueueFlags = 1 << 0;
// Task comes straight off the CPU with work left
pub const ENQ_PREEMPT: EnqueueFlags = 1 << 32;
pub const ENQ_REENQ: EnqueueFlags = 1 << 40;

pub const SLICE_INF: Ticks = u64::MAX;

pub const DEFAULT_QUANTUM: Ticks = 2;

#[derive(Debug, PartialEq, Eq)]
pub enum DispatchError {
    NoRunnableTask,
}

pub trait Scheduler {
    fn init(ctx: &mut SimCtx, slice: Ticks) -> Self;

    // Input is stable-sorted by this before task ids are handed out, and
    // task ids are the tie-break sequence
    fn admission_key(process: &Process) -> (Ticks, u64) {
        (process.arrival, 0)
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, task: TaskId, flags: EnqueueFlags);

    fn dispatch(&mut self, ctx: &mut SimCtx) -> Result<TaskId, DispatchError>;
}
