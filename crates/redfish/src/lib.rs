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

//! Minimal Redfish client for talking to a BMC out-of-band.
//!
//! This crate carries only what the CLI needs: authenticated GET/POST against
//! resource paths, a multipart upload primitive for the BMC temp store, a
//! liveness probe, and the async task model polled during long-running
//! operations.

mod client;
mod task;

pub use client::{BmcEndpoint, RedfishClient, RedfishResponse, SERVICE_ROOT, UPLOAD_URI};
pub use task::{Task, TaskMessage, TaskState};

#[derive(thiserror::Error, Debug)]
pub enum RedfishError {
    #[error("Network error talking to BMC at {url}. {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} at {url}: {message}")]
    Protocol {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Could not deserialize response from {url}. Body: {body}. {source}")]
    JsonDeserialize {
        url: String,
        body: String,
        source: serde_json::Error,
    },

    #[error("Response from {url} is missing `{field}`")]
    MissingField { url: String, field: &'static str },

    #[error("Could not read `{path}`: {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },

    #[error("Reqwest error: '{0}'")]
    ReqwestError(#[from] reqwest::Error),
}

impl RedfishError {
    /// HTTP status of the failing response, when the BMC answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RedfishError::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }
}
