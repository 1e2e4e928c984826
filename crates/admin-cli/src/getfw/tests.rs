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

use clap::Parser;

use super::cmds::{map_firmware, normalize_version};
use crate::cfg::cli_options::{Cli, Command};

// parse_getfw ensures getfw parses.
#[test]
fn parse_getfw() {
    let cli = Cli::try_parse_from([
        "anvil", "-H", "10.0.0.1", "-U", "root", "-P", "secret", "getfw",
    ])
    .expect("should parse getfw");
    assert!(matches!(cli.command, Command::Getfw(_)));
}

#[test]
fn versions_are_normalized_to_three_padded_segments() {
    assert_eq!(normalize_version("3.1.7"), "3.01.07");
    assert_eq!(normalize_version("6.58"), "6.58.00");
    assert_eq!(normalize_version("2"), "2.00.00");
    assert_eq!(normalize_version("1.05.11"), "1.05.11");
}

#[test]
fn firmware_type_and_activation_derive_from_software_id() {
    let item = serde_json::json!({
        "Name": "ActiveBMC",
        "SoftwareId": "BMC-backplane",
        "Version": "3.1.7",
        "Updateable": true
    });
    let mapped = map_firmware(&item);
    assert_eq!(mapped["Type"], "BMC");
    assert_eq!(mapped["Version"], "3.01.07");
    assert_eq!(mapped["SupportActivateType"][0], "automatic");

    let item = serde_json::json!({
        "Name": "Bios",
        "SoftwareId": "BIOS-mainboard",
        "Version": "6.58",
        "Updateable": true
    });
    let mapped = map_firmware(&item);
    assert_eq!(mapped["Type"], "BIOS");
    assert_eq!(mapped["SupportActivateType"][0], "dcpowercycle");
}

#[test]
fn unknown_types_have_no_activation_class() {
    let item = serde_json::json!({
        "Name": "PSU1",
        "SoftwareId": "PSUFW-delta",
        "Version": "1.2"
    });
    let mapped = map_firmware(&item);
    assert_eq!(mapped["Type"], "PSUFW");
    assert!(mapped["SupportActivateType"].is_null());
}
