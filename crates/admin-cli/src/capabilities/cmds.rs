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

use serde_json::json;

use crate::output;
use crate::result::AnvilCliResult;

// Commands that only read BMC state vs. commands that change it.
const GET_COMMANDS: &[&str] = &["getcapabilities", "getfw"];
const SET_COMMANDS: &[&str] = &["fwupdate"];

pub fn getcapabilities() -> AnvilCliResult<()> {
    output::print(&output::success(Some(json!({
        "GetCommandList": GET_COMMANDS,
        "SetCommandList": SET_COMMANDS,
    }))));
    Ok(())
}
