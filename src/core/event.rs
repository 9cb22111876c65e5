use crate::core::{TaskId, TaskState, Ticks};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    TaskStateChange {
        task: TaskId,
        from: TaskState,
        to: TaskState,
    },
    // CPU ran `task` over [start, end)
    Slice {
        task: TaskId,
        start: Ticks,
        end: Ticks,
    },
    // Nothing runnable; clock jumped forward to the next arrival
    CpuIdle {
        from: Ticks,
        to: Ticks,
    },
}
