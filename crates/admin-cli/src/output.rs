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

// The normalized output envelope every command renders to stdout.

use serde_json::{Value, json};

pub const STATE_SUCCESS: &str = "Success";
pub const STATE_FAILURE: &str = "Failure";

const SUCCESS_MESSAGE: &str = "Success: successfully completed request";

pub fn success(payload: Option<Value>) -> Value {
    let message = match payload {
        Some(payload) => json!([payload]),
        None => json!([SUCCESS_MESSAGE]),
    };
    json!({ "State": STATE_SUCCESS, "Message": message })
}

pub fn failure(message: &str) -> Value {
    json!({ "State": STATE_FAILURE, "Message": [message] })
}

pub fn print(envelope: &Value) {
    match serde_json::to_string_pretty(envelope) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{envelope}"),
    }
}
