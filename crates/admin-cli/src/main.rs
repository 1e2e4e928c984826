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

mod capabilities;
mod cfg;
mod fwupdate;
mod getfw;
mod output;
mod result;

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cfg::cli_options::Cli;
use crate::cfg::dispatch::Dispatch;
use crate::cfg::runtime::RuntimeContext;
use crate::result::AnvilCliResult;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    // Diagnostics go to stderr; stdout carries only the JSON envelope.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let outcome = rt.block_on(run(cli));
    rt.shutdown_timeout(Duration::from_secs(2));

    if let Err(err) = outcome {
        output::print(&output::failure(&err.to_string()));
        std::process::exit(err.exit_code());
    }
    Ok(())
}

async fn run(cli: Cli) -> AnvilCliResult<()> {
    let ctx = RuntimeContext::new(&cli.connect)?;
    cli.command.dispatch(ctx).await
}
