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

// FirmwareUpdater is the top-level control loop for one update command:
// validate, open the journal, then run bounded rounds of
// build-payload → submit → wait-for-transfer → wait-for-completion until one
// round succeeds or the rounds run out.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde_json::Value;
use tracing::{info, warn};

use anvil_redfish::{RedfishClient, Task};

use crate::error::{UpdateError, UpdateResult};
use crate::journal::{
    STAGE_DOWNLOAD_FILE, STAGE_UPDATE, STATE_FAILED, STATE_IN_PROGRESS, STATE_START, STATE_SUCCESS,
    UpdateJournal,
};
use crate::poller::{TaskPoller, task_failed};
use crate::{payload, recovery};

/// Redfish action the update request is submitted to.
pub const SIMPLE_UPDATE_URI: &str = "/UpdateService/Actions/UpdateService.SimpleUpdate";

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum, serde::Serialize, serde::Deserialize,
)]
#[clap(rename_all = "verbatim")]
pub enum ActivateMode {
    Auto,
    Manual,
}

impl fmt::Display for ActivateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum, serde::Serialize, serde::Deserialize,
)]
#[clap(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum FirmwareType {
    Bmc,
    Bios,
    Cpld,
    Psufw,
}

impl fmt::Display for FirmwareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = format!("{self:?}").to_uppercase();
        write!(f, "{s}")
    }
}

/// User-supplied intent, immutable once validated.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub image_uri: String,
    pub activate_mode: ActivateMode,
    /// Advisory hint; validated against the supported set but not sent on
    /// the wire — the BMC derives the target from the image itself.
    pub firmware_type: Option<FirmwareType>,
}

/// Knobs of the retry/poll/recovery machinery. Defaults match production
/// behavior; tests shrink the durations.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Maximum number of full update rounds.
    pub max_rounds: u32,
    /// Interval between task polls.
    pub poll_interval: Duration,
    /// Poll bound while waiting for a remote transfer to start.
    pub start_poll_limit: u32,
    /// Poll bound while waiting for the task to go terminal.
    pub finish_poll_limit: u32,
    /// Whether a transport-class round failure in Auto mode force-restarts
    /// the BMC before the next round.
    pub reset_on_failure: bool,
    /// Fixed sleep after the reset request before probing starts.
    pub reset_settle: Duration,
    /// Starting value of the linearly decreasing probe backoff.
    pub probe_backoff_start: u32,
    /// Length of one backoff unit.
    pub probe_backoff_unit: Duration,
    /// Where the per-run journal folder is created.
    pub log_dir: PathBuf,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        UpdaterConfig {
            max_rounds: 3,
            poll_interval: Duration::from_secs(3),
            start_poll_limit: 100,
            finish_poll_limit: 1200,
            reset_on_failure: true,
            reset_settle: Duration::from_secs(5),
            probe_backoff_start: 30,
            probe_backoff_unit: Duration::from_secs(1),
            log_dir: PathBuf::from("."),
        }
    }
}

/// Result of a successful run: the final task document (remapped into the
/// output envelope by the CLI layer), where the journal landed, and how many
/// rounds it took.
#[derive(Debug)]
pub struct UpdateOutcome {
    pub task: Task,
    pub journal_path: PathBuf,
    pub rounds: u32,
}

// Mutable per-run state, owned exclusively by the orchestrator and torn
// down (journal finalized) on every exit path.
struct UpdateSession {
    journal: UpdateJournal,
    serial_number: String,
    started: DateTime<Local>,
    round: u32,
    last_error: Option<UpdateError>,
}

pub struct FirmwareUpdater {
    client: RedfishClient,
    config: UpdaterConfig,
}

impl FirmwareUpdater {
    pub fn new(client: RedfishClient) -> FirmwareUpdater {
        FirmwareUpdater {
            client,
            config: UpdaterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: UpdaterConfig) -> FirmwareUpdater {
        self.config = config;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> FirmwareUpdater {
        self.config.log_dir = dir.into();
        self
    }

    /// Run the full update flow to completion.
    pub async fn run(&self, request: &UpdateRequest) -> UpdateResult<UpdateOutcome> {
        let started = Local::now();

        // The journal folder is named after the product serial number, so
        // discovery happens before anything else; failing here is fatal.
        let serial_number = self.product_serial_number().await?;
        let journal = UpdateJournal::create(&self.config.log_dir, &serial_number, started)?;
        let mut session = UpdateSession {
            journal,
            serial_number,
            started,
            round: 0,
            last_error: None,
        };

        info!(
            image = %request.image_uri,
            mode = %request.activate_mode,
            serial = %session.serial_number,
            "Starting out-of-band firmware update"
        );

        // Validation failures are fatal and never start a round, but the
        // journal is already open so the run leaves a (valid, empty) trace.
        if let Err(err) = validate(request) {
            close_journal(&mut session.journal);
            return Err(err);
        }

        while session.round < self.config.max_rounds {
            session.round += 1;
            info!(round = session.round, "Starting firmware update round");
            session
                .journal
                .append(STAGE_UPDATE, STATE_START, &format!("Round {}", session.round))?;

            // All per-round state (payload, task documents, errors) lives
            // inside run_round; nothing leaks into the next round.
            match self.run_round(&mut session.journal, request).await {
                Ok(task) => {
                    info!(round = session.round, "Firmware update round succeeded");
                    close_journal(&mut session.journal);
                    return Ok(UpdateOutcome {
                        task,
                        journal_path: session.journal.path().to_path_buf(),
                        rounds: session.round,
                    });
                }
                Err(err) if err.is_fatal() => {
                    close_journal(&mut session.journal);
                    return Err(err);
                }
                Err(err) => {
                    warn!(round = session.round, error = %err, "Firmware update round failed");
                    session
                        .journal
                        .append(STAGE_UPDATE, STATE_FAILED, &err.to_string())?;
                    if self.should_recover(request, &err) {
                        recovery::reset_bmc_and_wait_alive(
                            &self.client,
                            self.config.reset_settle,
                            self.config.probe_backoff_start,
                            self.config.probe_backoff_unit,
                        )
                        .await;
                    }
                    session.last_error = Some(err);
                }
            }
        }

        close_journal(&mut session.journal);
        let elapsed = Local::now().signed_duration_since(session.started);
        warn!(
            rounds = session.round,
            elapsed = %elapsed,
            "Firmware update failed after exhausting all rounds"
        );
        Err(session
            .last_error
            .unwrap_or(UpdateError::TaskPollExhausted))
    }

    /// One full attempt: build the payload (uploading if needed), submit the
    /// SimpleUpdate action, confirm the transfer started for remote images,
    /// then wait for the task to go terminal.
    async fn run_round(
        &self,
        journal: &mut UpdateJournal,
        request: &UpdateRequest,
    ) -> UpdateResult<Task> {
        let (update_payload, remote) =
            payload::build_payload(&self.client, journal, &request.image_uri).await?;

        let body =
            serde_json::to_value(&update_payload).expect("SimpleUpdatePayload always serializes");
        let response = self.client.post(SIMPLE_UPDATE_URI, &body).await?;
        let task = Task::from_value(&response.body);

        let poller = TaskPoller::new(&self.client, self.config.poll_interval);

        let task = if remote {
            info!("Waiting for the BMC to download the firmware image");
            journal.append(
                STAGE_DOWNLOAD_FILE,
                STATE_START,
                "Start download remote file to BMC",
            )?;
            match poller
                .wait_for_start(task, self.config.start_poll_limit)
                .await
            {
                Ok(task) => {
                    journal.append(
                        STAGE_DOWNLOAD_FILE,
                        STATE_SUCCESS,
                        "Download remote file to BMC success",
                    )?;
                    task
                }
                Err(err) => {
                    journal.append(STAGE_DOWNLOAD_FILE, STATE_FAILED, &err.to_string())?;
                    return Err(err);
                }
            }
        } else {
            task
        };

        journal.append(
            STAGE_UPDATE,
            STATE_IN_PROGRESS,
            "Waiting for the update task to finish",
        )?;
        let task = poller
            .wait_for_finish(task, self.config.finish_poll_limit)
            .await?;
        if task.is_success() {
            Ok(task)
        } else {
            Err(task_failed(&task))
        }
    }

    fn should_recover(&self, request: &UpdateRequest, err: &UpdateError) -> bool {
        self.config.reset_on_failure
            && request.activate_mode == ActivateMode::Auto
            && err.wants_recovery()
    }

    async fn product_serial_number(&self) -> UpdateResult<String> {
        let system = self.client.get_system().await?;
        match system
            .pointer("/SerialNumber")
            .and_then(Value::as_str)
            .filter(|sn| !sn.is_empty())
        {
            Some(serial) => {
                tracing::debug!(serial = %serial, "Resolved product serial number");
                Ok(serial.to_string())
            }
            None => Err(UpdateError::SerialNumberNotSet),
        }
    }
}

fn validate(request: &UpdateRequest) -> UpdateResult<()> {
    // The activate mode and firmware type are already constrained to their
    // supported sets by construction; the image URI is the only free-form
    // field left to check.
    if request.image_uri.trim().is_empty() {
        return Err(UpdateError::InvalidOption(
            "Error: option `image-uri` is required.".to_string(),
        ));
    }
    Ok(())
}

fn close_journal(journal: &mut UpdateJournal) {
    if let Err(err) = journal.finalize() {
        warn!(path = %journal.path().display(), error = %err, "Failed to finalize update journal");
    }
}

#[cfg(test)]
mod tests {
    use clap::ValueEnum;

    use super::*;

    #[test]
    fn activate_mode_choices_match_the_documented_set() {
        let values: Vec<String> = ActivateMode::value_variants()
            .iter()
            .map(|v| v.to_possible_value().unwrap().get_name().to_string())
            .collect();
        assert_eq!(values, ["Auto", "Manual"]);
    }

    #[test]
    fn firmware_type_choices_match_the_documented_set() {
        let values: Vec<String> = FirmwareType::value_variants()
            .iter()
            .map(|v| v.to_possible_value().unwrap().get_name().to_string())
            .collect();
        assert_eq!(values, ["BMC", "BIOS", "CPLD", "PSUFW"]);
    }

    #[test]
    fn empty_image_uri_is_rejected() {
        let request = UpdateRequest {
            image_uri: "  ".to_string(),
            activate_mode: ActivateMode::Auto,
            firmware_type: None,
        };
        let err = validate(&request).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "Error: option `image-uri` is required.");
    }

    #[test]
    fn default_config_matches_production_policy() {
        let config = UpdaterConfig::default();
        assert_eq!(config.max_rounds, 3);
        assert_eq!(config.probe_backoff_start, 30);
        assert!(config.reset_on_failure);
    }
}
