use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trading_warehouse_setup::client::BigQueryClient;
use trading_warehouse_setup::config::SetupConfig;
use trading_warehouse_setup::provisioner::Provisioner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trading_warehouse_setup=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SetupConfig::default();
    info!(
        "Starting warehouse setup for {}.{}",
        config.project_id, config.dataset_name
    );

    let client = BigQueryClient::new().await?;
    let provisioner = Provisioner::new(&client, config);
    provisioner.run().await?;

    Ok(())
}
