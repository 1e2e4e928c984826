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

use std::path::Path;
use std::time::Duration;

use anvil_fwupdate::UpdaterConfig;
use anvil_redfish::{BmcEndpoint, RedfishClient};

const TEST_SERIAL: &str = "TESTSN01";

pub async fn create_mock_http_server() -> mockito::ServerGuard {
    mockito::Server::new_async().await
}

pub fn client_for(server: &mockito::ServerGuard) -> RedfishClient {
    RedfishClient::new(BmcEndpoint {
        host: server.url(),
        port: None,
        username: "admin".to_string(),
        password: "secret".to_string(),
        insecure: true,
    })
    .expect("client should build")
}

/// Mock the serial-number discovery every update run starts with.
pub fn mock_identity(server: &mut mockito::ServerGuard) {
    server
        .mock("GET", "/redfish/v1/Systems")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"Members":[{"@odata.id":"/redfish/v1/Systems/1"}]}"#)
        .create();
    server
        .mock("GET", "/redfish/v1/Systems/1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(r#"{{"Id":"1","SerialNumber":"{TEST_SERIAL}"}}"#))
        .create();
}

/// Production retry/recovery policy with all the waits shrunk to keep the
/// test suite fast.
pub fn fast_config(log_dir: &Path) -> UpdaterConfig {
    UpdaterConfig {
        max_rounds: 3,
        poll_interval: Duration::from_millis(1),
        start_poll_limit: 10,
        finish_poll_limit: 50,
        reset_on_failure: false,
        reset_settle: Duration::ZERO,
        probe_backoff_start: 3,
        probe_backoff_unit: Duration::from_millis(1),
        log_dir: log_dir.to_path_buf(),
    }
}

/// Parse the journal written under `log_dir` back into JSON, asserting the
/// framing is valid whatever path the run took.
pub fn read_journal(log_dir: &Path) -> serde_json::Value {
    let folder = std::fs::read_dir(log_dir)
        .unwrap()
        .filter_map(Result::ok)
        .find(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .expect("journal folder should exist");
    assert!(
        folder
            .file_name()
            .to_string_lossy()
            .ends_with(&format!("_{TEST_SERIAL}"))
    );
    let text = std::fs::read_to_string(folder.path().join("update-firmware.log")).unwrap();
    serde_json::from_str(&text).expect("journal must be valid JSON")
}

/// Journal entries matching a stage/state pair.
pub fn journal_entries<'a>(
    log: &'a serde_json::Value,
    stage: &str,
    state: &str,
) -> Vec<&'a serde_json::Value> {
    log.pointer("/log")
        .and_then(serde_json::Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter(|e| e["Stage"] == stage && e["State"] == state)
                .collect()
        })
        .unwrap_or_default()
}
