use std::sync::Arc;

use clap::Parser;
use invoicedesk_server::config::init_tracing;
use invoicedesk_server::{InvoiceActions, NetworkModule, ServerArgs};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();
    init_tracing(args.log_json)?;

    let store = args.open_store().await?;
    let actions = Arc::new(InvoiceActions::new(Arc::clone(&store)));

    let mut network = NetworkModule::new(args.network_config(), actions);
    let port = network.start().await?;
    info!(port, "invoicedesk server listening");

    network.serve(shutdown_signal()).await?;

    store.close().await?;
    info!("invoicedesk server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
