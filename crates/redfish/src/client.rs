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

use reqwest::header::ETAG;
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::{RedfishError, Task};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Every Redfish resource lives under this root.
pub const SERVICE_ROOT: &str = "/redfish/v1";

/// Where the BMC accepts multipart firmware uploads. Files land in the BMC's
/// temp store under /tmp/web/<basename>.
pub const UPLOAD_URI: &str = "/UpdateService/upload";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmcEndpoint {
    pub host: String,
    pub port: Option<u16>,
    pub username: String,
    pub password: String,
    // BMCs ship self-signed certs; verification is opt-in.
    pub insecure: bool,
}

impl BmcEndpoint {
    fn base_url(&self) -> String {
        let host = if self.host.starts_with("http://") || self.host.starts_with("https://") {
            self.host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", self.host)
        };
        match self.port {
            Some(port) => format!("{host}:{port}"),
            None => host,
        }
    }
}

/// Status, entity tag and parsed body of a Redfish response.
#[derive(Debug, Clone)]
pub struct RedfishResponse {
    pub status: u16,
    pub etag: Option<String>,
    pub body: Value,
}

/// Stateless-per-request Redfish client. Cheap to clone; connection pooling
/// lives inside reqwest.
#[derive(Debug, Clone)]
pub struct RedfishClient {
    endpoint: BmcEndpoint,
    http: HttpClient,
}

impl RedfishClient {
    pub fn new(endpoint: BmcEndpoint) -> Result<Self, RedfishError> {
        let http = HttpClient::builder()
            .timeout(DEFAULT_TIMEOUT)
            .danger_accept_invalid_certs(endpoint.insecure)
            .build()?;
        Ok(RedfishClient { endpoint, http })
    }

    // Absolute resource paths (already under /redfish/v1, e.g. a task's
    // @odata.id) are used as-is; everything else is joined to the root.
    fn url(&self, path: &str) -> String {
        let base = self.endpoint.base_url();
        if path.starts_with(SERVICE_ROOT) {
            format!("{base}{path}")
        } else {
            format!("{base}{SERVICE_ROOT}{path}")
        }
    }

    pub async fn get(&self, path: &str) -> Result<RedfishResponse, RedfishError> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, payload: &Value) -> Result<RedfishResponse, RedfishError> {
        self.request(Method::POST, path, Some(payload)).await
    }

    /// Liveness probe against the service root. Returns the raw status code
    /// without interpreting the body; any transport error is the caller's
    /// signal that the BMC is still down.
    pub async fn probe(&self) -> Result<u16, RedfishError> {
        let url = format!("{}{}", self.endpoint.base_url(), SERVICE_ROOT);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| RedfishError::Network {
                url: url.clone(),
                source,
            })?;
        Ok(response.status().as_u16())
    }

    /// Upload a local file to the BMC temp store via multipart POST.
    pub async fn upload_file(&self, file: &Path) -> Result<RedfishResponse, RedfishError> {
        let url = self.url(UPLOAD_URI);
        let bytes = tokio::fs::read(file)
            .await
            .map_err(|source| RedfishError::FileRead {
                path: file.display().to_string(),
                source,
            })?;
        let filename = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        debug!(url = %url, file = %file.display(), bytes = bytes.len(), "Uploading file to BMC");

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename)
            .mime_str("application/octet-stream")?;
        let form = reqwest::multipart::Form::new().part("imgfile", part);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.endpoint.username, Some(&self.endpoint.password))
            .multipart(form)
            .send()
            .await
            .map_err(|source| RedfishError::Network {
                url: url.clone(),
                source,
            })?;
        Self::into_redfish_response(url, response).await
    }

    /// Fetch a task resource by its @odata.id and parse it leniently.
    pub async fn get_task(&self, task_url: &str) -> Result<Task, RedfishError> {
        let response = self.get(task_url).await?;
        Ok(Task::from_value(&response.body))
    }

    /// The computer system document of the (single-system) host, fetched via
    /// the first member of the Systems collection.
    pub async fn get_system(&self) -> Result<Value, RedfishError> {
        let member = self.first_member("/Systems").await?;
        Ok(self.get(&member).await?.body)
    }

    /// Resource path of the first member of the Managers collection.
    pub async fn manager_path(&self) -> Result<String, RedfishError> {
        self.first_member("/Managers").await
    }

    async fn first_member(&self, collection: &str) -> Result<String, RedfishError> {
        let response = self.get(collection).await?;
        response
            .body
            .pointer("/Members/0/@odata.id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RedfishError::MissingField {
                url: self.url(collection),
                field: "Members/0/@odata.id",
            })
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Value>,
    ) -> Result<RedfishResponse, RedfishError> {
        let url = self.url(path);
        debug!(method = %method, url = %url, "Redfish request");

        let mut request = self
            .http
            .request(method, &url)
            .basic_auth(&self.endpoint.username, Some(&self.endpoint.password));
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request
            .send()
            .await
            .map_err(|source| RedfishError::Network {
                url: url.clone(),
                source,
            })?;
        Self::into_redfish_response(url, response).await
    }

    async fn into_redfish_response(
        url: String,
        response: reqwest::Response,
    ) -> Result<RedfishResponse, RedfishError> {
        let status = response.status();
        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response
            .text()
            .await
            .map_err(|source| RedfishError::Network {
                url: url.clone(),
                source,
            })?;

        if !status.is_success() {
            // Error bodies are parsed best-effort; BMCs have been seen to
            // answer 4xx/5xx with HTML.
            let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);
            return Err(RedfishError::Protocol {
                url,
                status: status.as_u16(),
                message: extract_error_message(&body, status),
            });
        }

        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|source| RedfishError::JsonDeserialize {
                url,
                body: truncate_body(&text),
                source,
            })?
        };
        Ok(RedfishResponse {
            status: status.as_u16(),
            etag,
            body,
        })
    }
}

// Pull the most specific human-readable message out of a Redfish error body.
fn extract_error_message(body: &Value, status: StatusCode) -> String {
    for pointer in [
        "/error/@Message.ExtendedInfo/0/Message",
        "/Messages/0/Message",
        "/error/message",
    ] {
        if let Some(message) = body.pointer(pointer).and_then(Value::as_str) {
            return message.to_string();
        }
    }
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}

fn truncate_body(text: &str) -> String {
    const LIMIT: usize = 256;
    if text.len() <= LIMIT {
        text.to_string()
    } else {
        let mut end = LIMIT;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &text[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(host: &str) -> BmcEndpoint {
        BmcEndpoint {
            host: host.to_string(),
            port: None,
            username: "admin".to_string(),
            password: "secret".to_string(),
            insecure: true,
        }
    }

    #[test]
    fn url_joins_relative_paths_to_service_root() {
        let client = RedfishClient::new(endpoint("bmc.example.com")).unwrap();
        assert_eq!(
            client.url("/Systems"),
            "https://bmc.example.com/redfish/v1/Systems"
        );
    }

    #[test]
    fn url_keeps_absolute_odata_ids() {
        let client = RedfishClient::new(endpoint("bmc.example.com")).unwrap();
        assert_eq!(
            client.url("/redfish/v1/TaskService/Tasks/1"),
            "https://bmc.example.com/redfish/v1/TaskService/Tasks/1"
        );
    }

    #[test]
    fn url_respects_explicit_scheme_and_port() {
        let mut ep = endpoint("http://127.0.0.1");
        ep.port = Some(8443);
        let client = RedfishClient::new(ep).unwrap();
        assert_eq!(client.url("/"), "http://127.0.0.1:8443/redfish/v1/");
    }

    #[test]
    fn error_message_prefers_extended_info() {
        let body = serde_json::json!({
            "error": {
                "@Message.ExtendedInfo": [
                    { "Message": "insufficient space on /tmp" }
                ],
                "message": "generic"
            }
        });
        assert_eq!(
            extract_error_message(&body, StatusCode::BAD_REQUEST),
            "insufficient space on /tmp"
        );
    }

    #[test]
    fn error_message_falls_back_to_status_reason() {
        assert_eq!(
            extract_error_message(&Value::Null, StatusCode::NOT_FOUND),
            "Not Found"
        );
    }
}
