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

use serde_json::{Value, json};

use crate::cfg::runtime::RuntimeContext;
use crate::output;
use crate::result::AnvilCliResult;

const FIRMWARE_INVENTORY: &str = "/UpdateService/FirmwareInventory";

pub async fn getfw(ctx: &RuntimeContext) -> AnvilCliResult<()> {
    let collection = ctx.client.get(FIRMWARE_INVENTORY).await?;
    let members = collection
        .body
        .pointer("/Members")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut firmware = Vec::with_capacity(members.len());
    for member in &members {
        let Some(path) = member.pointer("/@odata.id").and_then(Value::as_str) else {
            continue;
        };
        let item = ctx.client.get(path).await?.body;
        firmware.push(map_firmware(&item));
    }

    output::print(&output::success(Some(json!({ "Firmware": firmware }))));
    Ok(())
}

// The firmware name is not solid enough to parse the type from; the
// SoftwareId prefix ("BMC-...", "BIOS-...") is.
pub(super) fn map_firmware(item: &Value) -> Value {
    let software_id = item
        .pointer("/SoftwareId")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let firmware_type = software_id.split('-').next().unwrap_or_default();

    json!({
        "Name": item.pointer("/Name"),
        "Type": if firmware_type.is_empty() { Value::Null } else { json!(firmware_type) },
        "Version": item.pointer("/Version").and_then(Value::as_str).map(normalize_version),
        "Updateable": item.pointer("/Updateable"),
        "SupportActivateType": support_activate_type(firmware_type),
    })
}

// How a firmware of this type takes effect: the BMC activates on its own,
// BIOS and CPLD need a DC power cycle, anything else is unspecified.
fn support_activate_type(firmware_type: &str) -> Value {
    match firmware_type {
        "BMC" => json!(["automatic"]),
        "BIOS" | "CPLD" => json!(["dcpowercycle"]),
        _ => Value::Null,
    }
}

// Normalize versions to three segments with two-digit minor and patch,
// e.g. "3.1.7" -> "3.01.07".
pub(super) fn normalize_version(version: &str) -> String {
    let mut segments = version.split('.');
    let first = segments.next().unwrap_or_default();
    let second = segments
        .next()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(0);
    let third = segments
        .next()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(0);
    format!("{first}.{second:02}.{third:02}")
}
