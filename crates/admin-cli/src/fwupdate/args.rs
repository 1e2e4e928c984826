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

use std::path::PathBuf;

use clap::Parser;

use anvil_fwupdate::{ActivateMode, FirmwareType};

#[derive(Parser, Debug, Clone)]
pub struct Opts {
    #[clap(
        short = 'u',
        long,
        help = "Firmware image URI: a local file, a BMC /tmp path, or a remote protocol URI"
    )]
    pub image_uri: String,
    #[clap(
        short = 'e',
        long,
        value_enum,
        help = "Firmware activate mode, choices: {Auto, Manual}"
    )]
    pub activate_mode: ActivateMode,
    #[clap(
        short = 't',
        long,
        value_enum,
        help = "Firmware type, choices: {BMC, BIOS, CPLD, PSUFW}"
    )]
    pub firmware_type: Option<FirmwareType>,
    #[clap(
        long,
        default_value = ".",
        help = "Directory where the per-run update log folder is created"
    )]
    pub log_dir: PathBuf,
}
