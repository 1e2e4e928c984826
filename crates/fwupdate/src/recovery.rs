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

// Last-resort recovery for a wedged BMC: force-restart it and wait for the
// Redfish service to answer again.

use std::time::Duration;

use tracing::{debug, info, warn};

use anvil_redfish::RedfishClient;

/// Force-restart the BMC, sleep `settle`, then probe the service root with a
/// linearly decreasing backoff: sleep `backoff_start` units, probe, decrement,
/// down to one unit. Worst case total wait is the triangular sum of
/// `backoff_start` units. Returns whether the BMC answered; callers treat an
/// exhausted countdown as advisory — the next retry round finds out for real.
pub async fn reset_bmc_and_wait_alive(
    client: &RedfishClient,
    settle: Duration,
    backoff_start: u32,
    backoff_unit: Duration,
) -> bool {
    info!("Force-restarting the BMC and waiting for it to come back");

    // Fire and forget: a reset request against a wedged BMC often errors
    // even when the reset takes.
    match client.manager_path().await {
        Ok(manager) => {
            let action = format!("{manager}/Actions/Manager.Reset");
            let payload = serde_json::json!({ "ResetType": "ForceRestart" });
            if let Err(err) = client.post(&action, &payload).await {
                debug!(error = %err, "Manager reset request failed, continuing anyway");
            }
        }
        Err(err) => debug!(error = %err, "Could not resolve the manager path, continuing anyway"),
    }

    tokio::time::sleep(settle).await;

    let mut interval = backoff_start;
    while interval > 0 {
        debug!(interval, "BMC not probed yet, next check after backoff");
        tokio::time::sleep(backoff_unit * interval).await;
        match client.probe().await {
            Ok(status) if status < 300 => {
                info!("BMC is alive again");
                return true;
            }
            Ok(status) => debug!(status, "BMC answered but is not ready yet"),
            Err(err) => debug!(error = %err, "BMC still unreachable"),
        }
        interval -= 1;
    }

    warn!("BMC did not come back within the probe window; the next round will find out");
    false
}
