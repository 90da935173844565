// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Publishes random sensor readings for local testing of the bridge.

use clap::Parser;
use devbridge::cli::{self, SimulatorArgs};
use devbridge::simulator::Simulator;

#[tokio::main(flavor = "current_thread")]
async fn main() -> devbridge::Result<()> {
    let args = SimulatorArgs::parse();
    cli::init_tracing();

    let simulator = Simulator::from_settings(&args.into_settings())?;
    simulator.run(cli::shutdown_signal()).await
}
