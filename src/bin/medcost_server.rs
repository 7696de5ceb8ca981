use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use medcost::{router, AppState, Predictor, ServerCli, SimulatedDistribution};

#[tokio::main]
async fn main() -> Result<()> {
    medcost::init_tracing();
    let cli = ServerCli::parse();

    let predictor = Predictor::load(&cli.artifacts.scaler_path, &cli.artifacts.model_path)
        .with_context(|| {
            format!(
                "failed to load artifacts (scaler {}, model {})",
                cli.artifacts.scaler_path.display(),
                cli.artifacts.model_path.display()
            )
        })?;
    tracing::info!(
        scaler = %cli.artifacts.scaler_path.display(),
        model = %cli.artifacts.model_path.display(),
        features = predictor.scaler().n_features(),
        estimators = predictor.model().estimators.len(),
        "artifacts loaded"
    );

    let settings = cli.build_simulation();
    let distribution = SimulatedDistribution::generate(&settings)
        .context("failed to generate simulated distribution")?;

    let state = AppState::new(predictor, distribution, cli.processing_delay());
    let app = router(state);

    let addr: SocketAddr = cli
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", cli.bind))?;
    tracing::info!("medcost-server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .await
        .context("server shutdown")?;
    Ok(())
}
