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

// Redfish async task model. Tasks are re-fetched on every poll; nothing here
// is persisted beyond the command invocation.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    New,
    Starting,
    Running,
    Suspended,
    Interrupted,
    Pending,
    Stopping,
    Completed,
    Killed,
    Exception,
    Cancelled,
    Service,
}

impl TaskState {
    /// Terminal states. Terminal does not imply successful; callers inspect
    /// `is_success` to decide pass/fail.
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Killed | TaskState::Exception | TaskState::Cancelled
        )
    }

    pub fn is_success(self) -> bool {
        self == TaskState::Completed
    }
}

impl FromStr for TaskState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(TaskState::New),
            "Starting" => Ok(TaskState::Starting),
            "Running" => Ok(TaskState::Running),
            "Suspended" => Ok(TaskState::Suspended),
            "Interrupted" => Ok(TaskState::Interrupted),
            "Pending" => Ok(TaskState::Pending),
            "Stopping" => Ok(TaskState::Stopping),
            "Completed" => Ok(TaskState::Completed),
            "Killed" => Ok(TaskState::Killed),
            "Exception" => Ok(TaskState::Exception),
            "Cancelled" => Ok(TaskState::Cancelled),
            "Service" => Ok(TaskState::Service),
            _ => Err(()),
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskMessage {
    #[serde(rename = "MessageId", default)]
    pub message_id: Option<String>,
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
    #[serde(rename = "Severity", default)]
    pub severity: Option<String>,
    #[serde(rename = "Resolution", default)]
    pub resolution: Option<String>,
}

/// Last known state of a controller-tracked async operation, plus the raw
/// document it was parsed from (the raw document is what gets remapped into
/// the command output on success).
#[derive(Debug, Clone)]
pub struct Task {
    pub url: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub state: Option<TaskState>,
    pub percent_complete: Option<i64>,
    pub messages: Vec<TaskMessage>,
    pub document: Value,
}

impl Task {
    /// Lenient parse: a controller may answer a SimpleUpdate synchronously
    /// with a message document that is not a task at all, so every field is
    /// optional and unknown states map to `None`.
    pub fn from_value(document: &Value) -> Task {
        let url = document
            .pointer("/@odata.id")
            .and_then(Value::as_str)
            .map(str::to_string);
        let id = document
            .pointer("/Id")
            .and_then(Value::as_str)
            .map(str::to_string);
        let name = document
            .pointer("/Name")
            .and_then(Value::as_str)
            .map(str::to_string);
        let state = document
            .pointer("/TaskState")
            .and_then(Value::as_str)
            .and_then(|s| TaskState::from_str(s).ok());
        let percent_complete = parse_percent(document.pointer("/PercentComplete"));
        let messages = parse_messages(document.pointer("/Messages"));

        Task {
            url,
            id,
            name,
            state,
            percent_complete,
            messages,
            document: document.clone(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_some_and(TaskState::is_finished)
    }

    /// A synchronous (non-task) completion response counts as success: the
    /// BMC answered 2xx without ever opening a task.
    pub fn is_success(&self) -> bool {
        match self.state {
            Some(state) => state.is_success(),
            None => true,
        }
    }

    pub fn state_name(&self) -> String {
        match self.state {
            Some(state) => state.to_string(),
            None => "Unknown".to_string(),
        }
    }

    /// Leading human-readable message, used for journaling failures.
    pub fn first_message(&self) -> Option<&str> {
        self.messages.first().and_then(|m| m.message.as_deref())
    }
}

// PercentComplete is an integer per the schema, but some firmware renders it
// as a string like "20%".
fn parse_percent(value: Option<&Value>) -> Option<i64> {
    let value = value?;
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    value.as_str()?.trim_end_matches('%').parse().ok()
}

// Messages is an array per the schema; single-object renderings exist in the
// field and are accepted too.
fn parse_messages(value: Option<&Value>) -> Vec<TaskMessage> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect(),
        Some(object @ Value::Object(_)) => serde_json::from_value(object.clone())
            .map(|m| vec![m])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_a_running_task() {
        let doc = json!({
            "@odata.id": "/redfish/v1/TaskService/Tasks/1",
            "Id": "1",
            "Name": "Upgrade Task",
            "TaskState": "Running",
            "PercentComplete": 42,
            "Messages": [
                { "MessageId": "iBMC.1.0.Updating", "Message": "updating", "Severity": "OK" }
            ]
        });
        let task = Task::from_value(&doc);
        assert_eq!(task.url.as_deref(), Some("/redfish/v1/TaskService/Tasks/1"));
        assert_eq!(task.state, Some(TaskState::Running));
        assert_eq!(task.percent_complete, Some(42));
        assert_eq!(task.first_message(), Some("updating"));
        assert!(!task.is_finished());
    }

    #[test]
    fn exception_is_finished_but_not_success() {
        let doc = json!({ "TaskState": "Exception" });
        let task = Task::from_value(&doc);
        assert!(task.is_finished());
        assert!(!task.is_success());
        assert_eq!(task.state_name(), "Exception");
    }

    #[test]
    fn synchronous_response_counts_as_success() {
        let doc = json!({ "Messages": { "Message": "the request completed" } });
        let task = Task::from_value(&doc);
        assert!(task.state.is_none());
        assert!(task.is_success());
        assert_eq!(task.first_message(), Some("the request completed"));
    }

    #[test]
    fn unknown_state_maps_to_none() {
        let doc = json!({ "TaskState": "SomethingVendorSpecific" });
        assert!(Task::from_value(&doc).state.is_none());
    }

    #[test]
    fn percent_accepts_string_rendering() {
        let doc = json!({ "PercentComplete": "20%" });
        assert_eq!(Task::from_value(&doc).percent_complete, Some(20));
    }
}
