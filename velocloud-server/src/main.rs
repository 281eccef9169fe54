use std::time::Duration;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tokio_graceful_shutdown::{SubsystemBuilder, Toplevel};

use velocloud_server::receiver::Receiver;
use velocloud_server::{Cli, VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    log::info!(
        "velocloud-server {} listening on UDP port {}, retaining {} rotations",
        VERSION,
        args.port,
        args.capacity
    );

    Toplevel::new(move |s| async move {
        let receiver = Receiver::new(&args);
        s.start(SubsystemBuilder::new("Receiver", move |h| receiver.run(h)));
    })
    .catch_signals()
    .handle_shutdown_requests(Duration::from_secs(5))
    .await
    .into_diagnostic()
}
