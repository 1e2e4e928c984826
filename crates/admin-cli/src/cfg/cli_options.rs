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

use crate::cfg::dispatch::Dispatch;
use crate::cfg::runtime::RuntimeContext;
use crate::result::AnvilCliResult;
use crate::{capabilities, fwupdate, getfw};

#[derive(Parser, Debug)]
#[clap(
    name = "anvil",
    version,
    about = "Out-of-band server management through the BMC Redfish service"
)]
pub struct Cli {
    #[clap(flatten)]
    pub connect: ConnectOptions,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ConnectOptions {
    #[clap(
        short = 'H',
        long,
        env = "ANVIL_BMC_HOST",
        help = "BMC address, hostname or https:// URL"
    )]
    pub host: String,
    #[clap(short = 'p', long, help = "BMC HTTPS port if not the default")]
    pub port: Option<u16>,
    #[clap(
        short = 'U',
        long,
        env = "ANVIL_BMC_USERNAME",
        help = "BMC account username"
    )]
    pub username: String,
    #[clap(
        short = 'P',
        long,
        env = "ANVIL_BMC_PASSWORD",
        help = "BMC account password"
    )]
    pub password: String,
    #[clap(
        long,
        help = "Verify the BMC TLS certificate (BMCs usually ship self-signed certs)"
    )]
    pub verify_tls: bool,
}

#[derive(clap::Subcommand, Debug)]
#[clap(rename_all = "lowercase")]
pub enum Command {
    #[clap(about = "Update outband firmware through the BMC")]
    Fwupdate(fwupdate::Opts),
    #[clap(about = "Get outband firmware inventory")]
    Getfw(getfw::Opts),
    #[clap(about = "List commands supported by this tool")]
    Getcapabilities(capabilities::Opts),
}

impl Dispatch for Command {
    async fn dispatch(self, ctx: RuntimeContext) -> AnvilCliResult<()> {
        match self {
            Command::Fwupdate(opts) => opts.dispatch(ctx).await,
            Command::Getfw(opts) => opts.dispatch(ctx).await,
            Command::Getcapabilities(opts) => opts.dispatch(ctx).await,
        }
    }
}
