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

use serde_json::{Value, json};

use anvil_fwupdate::{FirmwareUpdater, UpdateRequest};
use anvil_redfish::Task;

use super::args::Opts;
use crate::cfg::runtime::RuntimeContext;
use crate::output;
use crate::result::AnvilCliResult;

pub async fn update(opts: Opts, ctx: &RuntimeContext) -> AnvilCliResult<()> {
    let updater = FirmwareUpdater::new(ctx.client.clone()).with_log_dir(opts.log_dir.clone());
    let request = UpdateRequest {
        image_uri: opts.image_uri,
        activate_mode: opts.activate_mode,
        firmware_type: opts.firmware_type,
    };

    let outcome = updater.run(&request).await?;
    tracing::info!(
        rounds = outcome.rounds,
        journal = %outcome.journal_path.display(),
        "Firmware update completed"
    );

    output::print(&output::success(Some(task_output(&outcome.task))));
    Ok(())
}

// Remap the final task document into the external output fields.
pub(crate) fn task_output(task: &Task) -> Value {
    json!({
        "TaskId": task.id,
        "TaskDesc": task.name,
        "TaskState": task.state.map(|s| s.to_string()),
        "TaskPercent": task.percent_complete.map(|p| format!("{p}%")),
        "Messages": task.messages.first().map(|m| json!({
            "ID": m.message_id,
            "Message": m.message,
            "Severity": m.severity,
            "Resolution": m.resolution,
        })),
    })
}
