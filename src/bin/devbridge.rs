// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge process: MQTT telemetry in, enriched JSON out over WebSocket.

use clap::Parser;
use devbridge::bridge::Bridge;
use devbridge::cli::{self, BridgeArgs};

#[tokio::main(flavor = "current_thread")]
async fn main() -> devbridge::Result<()> {
    let args = BridgeArgs::parse();
    cli::init_tracing();

    let settings = args.into_settings();
    let bridge = Bridge::from_settings(&settings).inspect_err(|e| {
        tracing::error!(error = %e, "Failed to start bridge");
    })?;

    bridge.run(cli::shutdown_signal()).await
}
