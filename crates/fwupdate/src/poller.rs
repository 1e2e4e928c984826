/*
 * SPDX-FileCopyrightText: Copyright (c) 2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: Apache-2.0
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 * http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

// Polls a controller-tracked async task. Two distinct waits: confirming the
// BMC actually started working (remote image pulls can be silently dropped),
// and waiting for the terminal state.

use std::time::Duration;

use tracing::debug;

use anvil_redfish::{RedfishClient, Task, TaskState};

use crate::error::{UpdateError, UpdateResult};

pub struct TaskPoller<'a> {
    client: &'a RedfishClient,
    interval: Duration,
}

impl<'a> TaskPoller<'a> {
    pub fn new(client: &'a RedfishClient, interval: Duration) -> TaskPoller<'a> {
        TaskPoller { client, interval }
    }

    /// Block until the task has visibly started (Running or already
    /// terminal). A task that goes terminal here without success fails the
    /// attempt. `max_polls` bounds the wait.
    pub async fn wait_for_start(&self, task: Task, max_polls: u32) -> UpdateResult<Task> {
        let mut task = task;
        let mut polls = 0;
        loop {
            if task.is_finished() {
                // The controller may finish synchronously before we ever see
                // it running.
                if task.is_success() {
                    return Ok(task);
                }
                return Err(task_failed(&task));
            }
            match task.state {
                // Not a task document at all: nothing to wait on.
                None => return Ok(task),
                Some(TaskState::Running) => return Ok(task),
                Some(state) => debug!(state = %state, "Task has not started yet"),
            }

            polls += 1;
            if polls > max_polls {
                return Err(UpdateError::TransferStartTimeout);
            }
            tokio::time::sleep(self.interval).await;
            task = self.refetch(&task).await?;
        }
    }

    /// Block until the task reaches a terminal state and return it as-is;
    /// the caller decides pass/fail from the final state. `max_polls` bounds
    /// the wait.
    pub async fn wait_for_finish(&self, task: Task, max_polls: u32) -> UpdateResult<Task> {
        let mut task = task;
        let mut polls = 0;
        loop {
            if task.state.is_none() || task.is_finished() {
                return Ok(task);
            }
            debug!(
                state = %task.state_name(),
                percent = task.percent_complete,
                "Update task still running"
            );

            polls += 1;
            if polls > max_polls {
                return Err(UpdateError::TaskPollExhausted);
            }
            tokio::time::sleep(self.interval).await;
            task = self.refetch(&task).await?;
        }
    }

    async fn refetch(&self, task: &Task) -> UpdateResult<Task> {
        let url = task.url.as_deref().ok_or(UpdateError::TaskUrlMissing)?;
        Ok(self.client.get_task(url).await?)
    }
}

/// Turn a terminal-but-unsuccessful task into the round's error, carrying
/// the BMC's leading message for the journal.
pub(crate) fn task_failed(task: &Task) -> UpdateError {
    UpdateError::TaskFailed {
        state: task.state_name(),
        message: task
            .first_message()
            .unwrap_or("no further detail from the BMC")
            .to_string(),
    }
}
