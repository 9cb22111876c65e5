use super::state::{SimCtx, TaskState};

#[derive(Debug)]
pub struct Observer {
    step: u64,
    // Segments already validated
    seen_segments: usize,
}

impl Observer {
    pub fn new() -> Self {
        Self {
            step: 0,
            seen_segments: 0,
        }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, ctx: &SimCtx) {
        self.step += 1;

        if let Some(task_id) = ctx.current {
            let task = ctx.task(task_id);
            debug_assert_eq!(
                task.state,
                TaskState::Running,
                "cpu.current task {task_id} must be Running"
            );
        }

        for task in &ctx.tasks {
            debug_assert!(
                task.remaining <= task.process.burst,
                "Task {} has more work left than its burst",
                task.id
            );
            debug_assert_eq!(
                task.state == TaskState::Completed,
                task.completion_time.is_some(),
                "Task {} completion time out of sync with its state",
                task.id
            );
        }

        for (&task_id, &dsq_id) in &ctx.task_to_dsq {
            let task = ctx.task(task_id);
            debug_assert_eq!(
                task.state,
                TaskState::Runnable,
                "Task {task_id} in DSQ {dsq_id:?} must be Runnable"
            );
            if let Some(dsq) = ctx.dsqs.get(dsq_id) {
                debug_assert!(
                    dsq.contains(task_id),
                    "task_to_dsq claims task {task_id} in DSQ {dsq_id:?}, but queue does not contain it"
                );
            } else {
                debug_assert!(false, "task_to_dsq references unknown DSQ {dsq_id:?}");
            }
        }

        let mut prev_end = match self.seen_segments {
            0 => None,
            n => Some(ctx.timeline[n - 1].end),
        };
        for segment in &ctx.timeline[self.seen_segments..] {
            debug_assert!(
                segment.start < segment.end,
                "Empty segment {segment:?}"
            );
            if let Some(prev_end) = prev_end {
                debug_assert!(
                    segment.start >= prev_end,
                    "Segment {segment:?} overlaps the previous one ending at {prev_end}"
                );
            }
            debug_assert!(segment.end <= ctx.now, "Segment {segment:?} ends in the future");
            prev_end = Some(segment.end);
        }
        self.seen_segments = ctx.timeline.len();
    }
}

impl Default for Observer {
    fn default() -> Self {
        Self::new()
    }
}
