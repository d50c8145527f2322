use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-task-name pending/dead-lettered counts (spec §4.8 supplement): the
/// read model an operator endpoint or CLI checks before declaring the job
/// runtime healthy. Succeeded rows aren't counted here — they're audit
/// trail, not runtime health.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub pending: u64,
    pub dead_lettered: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct JobRuntimeStatus {
    pub by_task: HashMap<String, TaskCounts>,
}

impl JobRuntimeStatus {
    pub fn is_healthy(&self) -> bool {
        self.by_task.values().all(|c| c.dead_lettered == 0)
    }
}
