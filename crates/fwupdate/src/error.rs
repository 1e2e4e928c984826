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

use anvil_redfish::RedfishError;

pub type UpdateResult<T> = Result<T, UpdateError>;

/// Failure taxonomy of the update flow. `is_fatal` failures abort the
/// command before or outside the retry loop; everything else is round-local
/// and retried while rounds remain. `wants_recovery` marks the
/// transport-class subset where force-restarting the BMC between rounds has
/// a chance of helping.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("{0}")]
    InvalidOption(String),

    #[error("Error: product SN is not correct.")]
    SerialNumberNotSet,

    #[error("Error: failed to create log folder.")]
    CreateLogFolder(#[source] std::io::Error),

    #[error("Error: failed to create log file.")]
    CreateLogFile(#[source] std::io::Error),

    #[error("Error: URI is not a local file nor a remote network protocol file.")]
    ImageUriNoSchema,

    #[error("Error: Protocol `{0}` is not supported.")]
    ImageUriIllegalSchema(String),

    #[error("failed to upload `{path}` to the BMC temp store: {source}")]
    Upload {
        path: String,
        #[source]
        source: RedfishError,
    },

    #[error(transparent)]
    Redfish(#[from] RedfishError),

    #[error("the BMC returned a task document with no @odata.id to poll")]
    TaskUrlMissing,

    #[error("update task ended in state `{state}`: {message}")]
    TaskFailed { state: String, message: String },

    #[error("gave up waiting for the BMC to start the file transfer")]
    TransferStartTimeout,

    #[error("gave up waiting for the update task to reach a terminal state")]
    TaskPollExhausted,

    #[error("failed to append to the update journal: {0}")]
    Journal(#[source] std::io::Error),
}

impl UpdateError {
    /// Fatal failures abort immediately; no retry round is entered.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            UpdateError::InvalidOption(_)
                | UpdateError::SerialNumberNotSet
                | UpdateError::CreateLogFolder(_)
                | UpdateError::CreateLogFile(_)
        )
    }

    /// True when the failure smells like a wedged BMC (unreachable HTTP
    /// stack, exhausted temp storage) rather than a rejected request, i.e.
    /// when a forced restart between rounds is worth trying.
    pub fn wants_recovery(&self) -> bool {
        matches!(
            self,
            UpdateError::Upload { .. }
                | UpdateError::Redfish(_)
                | UpdateError::TransferStartTimeout
                | UpdateError::TaskPollExhausted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_fatal_and_never_recover() {
        let err = UpdateError::InvalidOption("Error: option `image-uri` is required.".to_string());
        assert!(err.is_fatal());
        assert!(!err.wants_recovery());
    }

    #[test]
    fn scheme_errors_are_round_local_but_not_recovery_eligible() {
        let err = UpdateError::ImageUriIllegalSchema("ftp".to_string());
        assert!(!err.is_fatal());
        assert!(!err.wants_recovery());
        assert_eq!(err.to_string(), "Error: Protocol `ftp` is not supported.");
    }

    #[test]
    fn task_failure_does_not_trigger_a_reset() {
        // The BMC processed the request fine; restarting it would not help.
        let err = UpdateError::TaskFailed {
            state: "Exception".to_string(),
            message: "image signature rejected".to_string(),
        };
        assert!(!err.is_fatal());
        assert!(!err.wants_recovery());
    }
}
