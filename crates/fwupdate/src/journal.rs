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

// Durable audit log of one update run. Lives in a per-run folder named
// <timestamp>_<serial> so operators can line runs up against the machines
// they touched.

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::{UpdateError, UpdateResult};

pub const STAGE_UPDATE: &str = "Update firmware";
pub const STAGE_UPLOAD_FILE: &str = "Upload File";
pub const STAGE_DOWNLOAD_FILE: &str = "Download File";

pub const STATE_START: &str = "Start";
pub const STATE_IN_PROGRESS: &str = "In Progress";
pub const STATE_SUCCESS: &str = "Success";
pub const STATE_FAILED: &str = "Failed";
pub const STATE_INVALID_URI: &str = "Invalid URI";

const LOG_FILE_NAME: &str = "update-firmware.log";
const LOG_HEAD: &str = "{\"log\":[\n";
const LOG_TAIL: &str = "\n]}\n";
const ENTRY_SEPARATOR: &str = ",\n";

#[derive(Debug, Serialize)]
struct JournalEntry<'a> {
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Stage")]
    stage: &'a str,
    #[serde(rename = "State")]
    state: &'a str,
    #[serde(rename = "Note")]
    note: &'a str,
}

/// Append-only journal with crash-safe framing. Entries are flushed with a
/// trailing separator so appends never have to look back; `finalize` strips
/// only that most recent separator and closes the array, so the file is
/// well-formed JSON on every exit path. Dropping the journal finalizes it if
/// nobody did so explicitly.
#[derive(Debug)]
pub struct UpdateJournal {
    file: File,
    path: PathBuf,
    entries: u64,
    finalized: bool,
}

impl UpdateJournal {
    /// Create `<parent>/<timestamp>_<serial>/update-firmware.log` and write
    /// the framing head. The timestamp is the session start, not the call
    /// time, so the folder name matches what the orchestrator reports.
    pub fn create(
        parent: &Path,
        serial_number: &str,
        started: DateTime<Local>,
    ) -> UpdateResult<UpdateJournal> {
        let folder = parent.join(format!(
            "{}_{}",
            started.format("%Y%m%d%H%M%S"),
            serial_number
        ));
        fs::create_dir_all(&folder).map_err(UpdateError::CreateLogFolder)?;

        let path = folder.join(LOG_FILE_NAME);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(UpdateError::CreateLogFile)?;
        file.write_all(LOG_HEAD.as_bytes())
            .map_err(UpdateError::CreateLogFile)?;

        tracing::debug!(path = %path.display(), "Created update journal");
        Ok(UpdateJournal {
            file,
            path,
            entries: 0,
            finalized: false,
        })
    }

    /// Append one timestamped entry and flush it to disk.
    pub fn append(&mut self, stage: &str, state: &str, note: &str) -> UpdateResult<()> {
        let entry = JournalEntry {
            time: Local::now().format("%Y%m%dT%H%M%S%z").to_string(),
            stage,
            state,
            note,
        };
        let rendered = serde_json::to_string(&entry)
            .map_err(|e| UpdateError::Journal(std::io::Error::other(e)))?;
        self.file
            .write_all(format!("  {rendered}{ENTRY_SEPARATOR}").as_bytes())
            .map_err(UpdateError::Journal)?;
        self.file.flush().map_err(UpdateError::Journal)?;
        self.entries += 1;
        Ok(())
    }

    /// Repair the framing and close the array. Idempotent.
    pub fn finalize(&mut self) -> std::io::Result<()> {
        if self.finalized {
            return Ok(());
        }
        self.finalized = true;
        if self.entries > 0 {
            let len = self.file.metadata()?.len();
            self.file
                .set_len(len.saturating_sub(ENTRY_SEPARATOR.len() as u64))?;
        }
        self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(LOG_TAIL.as_bytes())?;
        self.file.flush()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UpdateJournal {
    fn drop(&mut self) {
        if let Err(err) = self.finalize() {
            tracing::warn!(path = %self.path.display(), error = %err, "Failed to finalize update journal");
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn read_log(journal_path: &Path) -> Value {
        let text = fs::read_to_string(journal_path).unwrap();
        serde_json::from_str(&text).expect("journal must be valid JSON")
    }

    #[test]
    fn empty_journal_is_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = UpdateJournal::create(dir.path(), "SN123", Local::now()).unwrap();
        journal.finalize().unwrap();

        let log = read_log(journal.path());
        assert_eq!(log.pointer("/log").unwrap().as_array().unwrap().len(), 0);
    }

    #[test]
    fn entries_appear_in_append_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = UpdateJournal::create(dir.path(), "SN123", Local::now()).unwrap();
        journal
            .append(STAGE_UPDATE, STATE_START, "Round 1")
            .unwrap();
        journal.append(STAGE_UPLOAD_FILE, STATE_START, "").unwrap();
        journal.append(STAGE_UPLOAD_FILE, STATE_SUCCESS, "").unwrap();
        journal.finalize().unwrap();

        let log = read_log(journal.path());
        let entries = log.pointer("/log").unwrap().as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["Stage"], STAGE_UPDATE);
        assert_eq!(entries[0]["Note"], "Round 1");
        assert_eq!(entries[1]["State"], STATE_START);
        assert_eq!(entries[2]["State"], STATE_SUCCESS);
    }

    #[test]
    fn drop_repairs_framing_without_explicit_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let path;
        {
            let mut journal = UpdateJournal::create(dir.path(), "SN123", Local::now()).unwrap();
            journal
                .append(STAGE_UPDATE, STATE_FAILED, "round aborted mid-stream")
                .unwrap();
            path = journal.path().to_path_buf();
            // dropped here, unfinalized
        }
        let log = read_log(&path);
        assert_eq!(log.pointer("/log").unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn notes_with_quotes_are_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = UpdateJournal::create(dir.path(), "SN123", Local::now()).unwrap();
        journal
            .append(
                STAGE_UPDATE,
                STATE_FAILED,
                "Error: Protocol `ftp` is not supported. \"quoted\"",
            )
            .unwrap();
        journal.finalize().unwrap();

        let log = read_log(journal.path());
        let note = log.pointer("/log/0/Note").unwrap().as_str().unwrap();
        assert!(note.contains("\"quoted\""));
    }

    #[test]
    fn folder_is_named_timestamp_underscore_serial() {
        let dir = tempfile::tempdir().unwrap();
        let journal = UpdateJournal::create(dir.path(), "2102311TEL", Local::now()).unwrap();
        let folder = journal.path().parent().unwrap();
        let name = folder.file_name().unwrap().to_string_lossy();
        assert!(name.ends_with("_2102311TEL"));
        // 14-digit local timestamp before the underscore
        let stamp = name.split('_').next().unwrap();
        assert_eq!(stamp.len(), 14);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn finalize_twice_is_harmless() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = UpdateJournal::create(dir.path(), "SN123", Local::now()).unwrap();
        journal.append(STAGE_UPDATE, STATE_START, "Round 1").unwrap();
        journal.finalize().unwrap();
        journal.finalize().unwrap();
        read_log(journal.path());
    }
}
