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

use anvil_redfish::{BmcEndpoint, RedfishClient};

use crate::cfg::cli_options::ConnectOptions;
use crate::result::AnvilCliResult;

// RuntimeContext is context passed to all subcommand dispatch handlers.
// This is built at the beginning of runtime and then passed to the
// appropriate dispatcher.
pub struct RuntimeContext {
    pub client: RedfishClient,
}

impl RuntimeContext {
    pub fn new(connect: &ConnectOptions) -> AnvilCliResult<RuntimeContext> {
        let client = RedfishClient::new(BmcEndpoint {
            host: connect.host.clone(),
            port: connect.port,
            username: connect.username.clone(),
            password: connect.password.clone(),
            insecure: !connect.verify_tls,
        })?;
        Ok(RuntimeContext { client })
    }
}
