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

use anvil_fwupdate::UpdateError;
use anvil_redfish::RedfishError;

pub type AnvilCliResult<T> = Result<T, AnvilCliError>;

// Numeric failure classes surfaced to the invoking shell.
pub const EXIT_INTERNAL_ERROR: i32 = 1;
pub const EXIT_VALIDATION_ERROR: i32 = 2;
pub const EXIT_TRANSPORT_ERROR: i32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum AnvilCliError {
    #[error("{0}")]
    GenericError(String),

    #[error(transparent)]
    Update(#[from] UpdateError),

    #[error(transparent)]
    Redfish(#[from] RedfishError),
}

impl AnvilCliError {
    /// Process exit code distinguishing validation, internal and
    /// transport-layer failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            AnvilCliError::GenericError(_) => EXIT_INTERNAL_ERROR,
            AnvilCliError::Redfish(_) => EXIT_TRANSPORT_ERROR,
            AnvilCliError::Update(err) => match err {
                UpdateError::InvalidOption(_)
                | UpdateError::SerialNumberNotSet
                | UpdateError::ImageUriNoSchema
                | UpdateError::ImageUriIllegalSchema(_) => EXIT_VALIDATION_ERROR,
                UpdateError::CreateLogFolder(_)
                | UpdateError::CreateLogFile(_)
                | UpdateError::Journal(_) => EXIT_INTERNAL_ERROR,
                UpdateError::Upload { .. }
                | UpdateError::Redfish(_)
                | UpdateError::TaskUrlMissing
                | UpdateError::TaskFailed { .. }
                | UpdateError::TransferStartTimeout
                | UpdateError::TaskPollExhausted => EXIT_TRANSPORT_ERROR,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failures_map_to_the_validation_class() {
        let err = AnvilCliError::Update(UpdateError::ImageUriIllegalSchema("ftp".to_string()));
        assert_eq!(err.exit_code(), EXIT_VALIDATION_ERROR);
    }

    #[test]
    fn task_failures_map_to_the_transport_class() {
        let err = AnvilCliError::Update(UpdateError::TaskFailed {
            state: "Exception".to_string(),
            message: "update failed".to_string(),
        });
        assert_eq!(err.exit_code(), EXIT_TRANSPORT_ERROR);
    }

    #[test]
    fn journal_failures_map_to_the_internal_class() {
        let err = AnvilCliError::Update(UpdateError::Journal(std::io::Error::other("disk full")));
        assert_eq!(err.exit_code(), EXIT_INTERNAL_ERROR);
    }
}
