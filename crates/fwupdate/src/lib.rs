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

//! Out-of-band firmware update orchestration.
//!
//! `FirmwareUpdater` drives the whole lifecycle against a BMC: stage the
//! image (local upload, BMC temp path, or remote URI), submit the
//! SimpleUpdate action, poll the resulting task to a terminal state, retry
//! failed rounds up to a bound, optionally force-restarting a wedged BMC in
//! between, and journal every step to a per-run log folder.

pub mod error;
pub mod journal;
pub mod orchestrator;
pub mod payload;
pub mod poller;
pub mod recovery;

pub use error::{UpdateError, UpdateResult};
pub use journal::UpdateJournal;
pub use orchestrator::{
    ActivateMode, FirmwareType, FirmwareUpdater, UpdateOutcome, UpdateRequest, UpdaterConfig,
};
pub use payload::SimpleUpdatePayload;
