use super::{DispatchError, ENQ_REENQ, EnqueueFlags, SLICE_INF, Scheduler, SimCtx, TaskId, Ticks};
use crate::core::DsqId;

// FCFS with SLICE_INF, Round-Robin with a finite slice
pub struct FifoScheduler {
    dsq: DsqId,
    slice: Ticks,
}

impl Scheduler for FifoScheduler {
    fn init(ctx: &mut SimCtx, slice: Ticks) -> Self {
        Self {
            dsq: ctx.create_dsq_fifo(),
            slice,
        }
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, task: TaskId, flags: EnqueueFlags) {
        if flags & ENQ_REENQ != 0 {
            assert!(
                self.slice != SLICE_INF,
                "task {task} came back from a run-to-completion slice"
            );
            log::trace!("task {task} used up its slice, back of the queue");
        }
        ctx.dsq_push_fifo(self.dsq, task, self.slice);
    }

    fn dispatch(&mut self, ctx: &mut SimCtx) -> Result<TaskId, DispatchError> {
        ctx.dsq_pop(self.dsq).ok_or(DispatchError::NoRunnableTask)
    }
}
