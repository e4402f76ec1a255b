use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use drawing_vault::config::Config;
use drawing_vault::store::sidecar::rewrite_sidecar;

/// Rescan the upload directory and rewrite the metadata sidecar.
#[derive(Parser)]
#[command(name = "rebuild_metadata")]
struct Args {
    /// Upload directory; defaults to UPLOAD_DIR.
    #[arg(long)]
    upload_dir: Option<std::path::PathBuf>,

    /// Discard the current sidecar instead of keeping records of files still present.
    #[arg(long)]
    fresh: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drawing_vault=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(dir) = args.upload_dir {
        config.upload_dir = dir;
    }

    let count = rewrite_sidecar(&config.upload_dir, &config.public_base_url, !args.fresh).await?;
    println!(
        "Metadata rebuilt: {} record(s) in {}",
        count,
        config.sidecar_path().display()
    );
    Ok(())
}
