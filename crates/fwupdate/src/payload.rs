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

// Decides how the firmware image reaches the BMC and builds the
// SimpleUpdate request body. Local files are pushed to the BMC temp store
// first; BMC-local paths are referenced directly; anything else must be a
// remote URI with a supported transfer protocol.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;
use url::Url;

use anvil_redfish::RedfishClient;

use crate::error::{UpdateError, UpdateResult};
use crate::journal::{
    self, STAGE_UPLOAD_FILE, STATE_FAILED, STATE_INVALID_URI, STATE_START, STATE_SUCCESS,
};

/// Transfer protocols the BMC can pull an image over.
pub const TRANSFER_PROTOCOLS: &[&str] = &["HTTPS", "SCP", "SFTP", "CIFS", "TFTP", "NFS"];

// Paths under /tmp already live on the BMC.
const BMC_TMP_PREFIX: &str = "/tmp/";
// Where multipart uploads land on the BMC.
const BMC_UPLOAD_DIR: &str = "/tmp/web";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleUpdatePayload {
    #[serde(rename = "ImageURI")]
    pub image_uri: String,
    #[serde(rename = "TransferProtocol", skip_serializing_if = "Option::is_none")]
    pub transfer_protocol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    LocalFile(PathBuf),
    BmcPath(String),
    Remote { uri: String, protocol: String },
}

/// Classify the user-supplied image URI. First match wins: a readable local
/// file always takes the upload branch, even if the string would also parse
/// as a URI.
pub fn classify_image_uri(image_uri: &str) -> UpdateResult<ImageSource> {
    let path = Path::new(image_uri);
    let readable_file = std::fs::File::open(path)
        .and_then(|f| f.metadata())
        .map(|m| m.is_file())
        .unwrap_or(false);
    if readable_file {
        return Ok(ImageSource::LocalFile(path.to_path_buf()));
    }

    if image_uri.starts_with(BMC_TMP_PREFIX) {
        return Ok(ImageSource::BmcPath(image_uri.to_string()));
    }

    let parsed = Url::parse(image_uri).map_err(|_| UpdateError::ImageUriNoSchema)?;
    let scheme = parsed.scheme();
    if !TRANSFER_PROTOCOLS
        .iter()
        .any(|p| p.eq_ignore_ascii_case(scheme))
    {
        return Err(UpdateError::ImageUriIllegalSchema(scheme.to_string()));
    }

    Ok(ImageSource::Remote {
        uri: image_uri.to_string(),
        protocol: scheme.to_ascii_uppercase(),
    })
}

/// Build the wire-ready payload for one round, uploading the image to the
/// BMC temp store when it is a local file. Returns the payload plus whether
/// the BMC still has to pull the image from a remote host (which is what the
/// transfer-start wait keys off). Every branch leaves a journal trail.
pub async fn build_payload(
    client: &RedfishClient,
    journal: &mut journal::UpdateJournal,
    image_uri: &str,
) -> UpdateResult<(SimpleUpdatePayload, bool)> {
    match classify_image_uri(image_uri) {
        Ok(ImageSource::LocalFile(path)) => {
            info!(image = %path.display(), "Firmware image is a local file, uploading to the BMC temp store");
            journal.append(STAGE_UPLOAD_FILE, STATE_START, "")?;
            if let Err(source) = client.upload_file(&path).await {
                let err = UpdateError::Upload {
                    path: path.display().to_string(),
                    source,
                };
                journal.append(STAGE_UPLOAD_FILE, STATE_FAILED, &err.to_string())?;
                return Err(err);
            }
            journal.append(STAGE_UPLOAD_FILE, STATE_SUCCESS, "")?;

            let basename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok((
                SimpleUpdatePayload {
                    image_uri: format!("{BMC_UPLOAD_DIR}/{basename}"),
                    transfer_protocol: None,
                },
                false,
            ))
        }
        Ok(ImageSource::BmcPath(uri)) => {
            info!(image = %uri, "Firmware image already lives on the BMC");
            Ok((
                SimpleUpdatePayload {
                    image_uri: uri,
                    transfer_protocol: None,
                },
                false,
            ))
        }
        Ok(ImageSource::Remote { uri, protocol }) => {
            info!(image = %uri, protocol = %protocol, "Firmware image is remote, the BMC will pull it");
            Ok((
                SimpleUpdatePayload {
                    image_uri: uri,
                    transfer_protocol: Some(protocol),
                },
                true,
            ))
        }
        Err(err) => {
            journal.append(STAGE_UPLOAD_FILE, STATE_INVALID_URI, &err.to_string())?;
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn all_supported_schemes_are_accepted_case_insensitively() {
        for scheme in ["https", "HTTPS", "scp", "Sftp", "cifs", "tftp", "NFS"] {
            let uri = format!("{scheme}://fileserver.example.com/fw/image.hpm");
            match classify_image_uri(&uri) {
                Ok(ImageSource::Remote { protocol, .. }) => {
                    assert_eq!(protocol, scheme.to_ascii_uppercase());
                }
                other => panic!("{uri} should classify as remote, got {other:?}"),
            }
        }
    }

    #[test]
    fn unsupported_scheme_is_named_in_the_error() {
        let err = classify_image_uri("ftp://fileserver.example.com/fw/image.hpm").unwrap_err();
        assert_eq!(err.to_string(), "Error: Protocol `ftp` is not supported.");
    }

    #[test]
    fn bare_name_has_no_schema() {
        let err = classify_image_uri("image.hpm").unwrap_err();
        assert!(matches!(err, UpdateError::ImageUriNoSchema));
    }

    #[test]
    fn bmc_tmp_path_is_referenced_directly() {
        match classify_image_uri("/tmp/web/image.hpm") {
            Ok(ImageSource::BmcPath(uri)) => assert_eq!(uri, "/tmp/web/image.hpm"),
            other => panic!("expected BmcPath, got {other:?}"),
        }
    }

    #[test]
    fn readable_local_file_wins_over_every_other_branch() {
        // tempdir() lives under /tmp, so this also pins the precedence of
        // the upload branch over the BMC-path branch.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.hpm");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"firmware").unwrap();

        match classify_image_uri(path.to_str().unwrap()) {
            Ok(ImageSource::LocalFile(p)) => assert_eq!(p, path),
            other => panic!("expected LocalFile, got {other:?}"),
        }
    }

    #[test]
    fn directories_do_not_count_as_local_files() {
        // Created outside /tmp so the BMC-path branch does not apply either.
        let dir = tempfile::tempdir_in(".").unwrap();
        let err = classify_image_uri(dir.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, UpdateError::ImageUriNoSchema));
    }

    #[test]
    fn a_directory_under_tmp_is_a_bmc_path() {
        let dir = tempfile::tempdir_in("/tmp").unwrap();
        match classify_image_uri(dir.path().to_str().unwrap()) {
            Ok(ImageSource::BmcPath(_)) => {}
            other => panic!("expected BmcPath, got {other:?}"),
        }
    }

    #[test]
    fn payload_serializes_with_redfish_field_names() {
        let payload = SimpleUpdatePayload {
            image_uri: "https://fileserver.example.com/fw/image.hpm".to_string(),
            transfer_protocol: Some("HTTPS".to_string()),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "ImageURI": "https://fileserver.example.com/fw/image.hpm",
                "TransferProtocol": "HTTPS"
            })
        );

        let local = SimpleUpdatePayload {
            image_uri: "/tmp/web/image.hpm".to_string(),
            transfer_protocol: None,
        };
        let value = serde_json::to_value(&local).unwrap();
        assert_eq!(value, serde_json::json!({ "ImageURI": "/tmp/web/image.hpm" }));
    }
}
