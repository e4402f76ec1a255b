use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use drawing_vault::client::process::apply_job;
use drawing_vault::client::rows::build_rows;
use drawing_vault::client::{ApiClient, Notice, Selection, StatusBoard};
use drawing_vault::config::{Config, StoreBackend};
use drawing_vault::{create_routes, AppState};

#[derive(Parser)]
#[command(name = "drawing-vault", version, about = "Engineering drawing upload and processing service")]
struct Cli {
    /// Server used by the client commands.
    #[arg(long, global = true, default_value = "http://localhost:5000")]
    server: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service (the default).
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        upload_dir: Option<PathBuf>,
        /// sidecar or sqlite
        #[arg(long)]
        backend: Option<String>,
    },
    /// Work with uploaded files on a running server.
    Files {
        #[command(subcommand)]
        action: FilesCommand,
    },
    /// Submit files for processing and wait for the outcome.
    Process {
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long, default_value_t = 120)]
        timeout_secs: u64,
    },
}

#[derive(Subcommand)]
enum FilesCommand {
    List {
        #[arg(long)]
        project: Option<String>,
    },
    Upload {
        paths: Vec<PathBuf>,
        #[arg(long)]
        project: Option<String>,
    },
    Rm {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "drawing_vault=debug,tower_http=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
        upload_dir: None,
        backend: None,
    }) {
        Command::Serve {
            host,
            port,
            upload_dir,
            backend,
        } => {
            let mut config = Config::from_env()?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(dir) = upload_dir {
                config.upload_dir = dir;
            }
            if let Some(backend) = backend {
                config.store_backend = backend.parse::<StoreBackend>()?;
            }
            serve(config).await
        }
        Command::Files { action } => {
            let client = ApiClient::new(&cli.server)?;
            run_files(&client, action).await
        }
        Command::Process { ids, timeout_secs } => {
            let client = ApiClient::new(&cli.server)?;
            run_process(&client, ids, Duration::from_secs(timeout_secs)).await
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    info!(
        "Starting | upload_dir={} | backend={:?}",
        config.upload_dir.display(),
        config.store_backend
    );

    let (state, worker) = AppState::build(config)
        .await
        .context("failed to open storage")?;
    tokio::spawn(worker.run());

    let app = create_routes(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server is running on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_files(client: &ApiClient, action: FilesCommand) -> anyhow::Result<()> {
    match action {
        FilesCommand::List { project } => {
            let files = client.list_files(project.as_deref()).await?;
            if files.is_empty() {
                println!("No files uploaded yet");
                return Ok(());
            }
            for row in build_rows(&files, &StatusBoard::default()) {
                println!(
                    "{:>4}  {:<14}  {:<40}  {:<5}  {:>10}  {}  {}",
                    row.serial_no,
                    row.document_no,
                    row.name,
                    row.kind.label(),
                    row.size,
                    row.last_modified,
                    row.id
                );
            }
        }
        FilesCommand::Upload { paths, project } => {
            if paths.is_empty() {
                println!("{}", Notice::nothing_to_upload());
                return Ok(());
            }
            let notice = match client.upload_paths(&paths, project.as_deref()).await {
                Ok(files) => Notice::uploaded(files.len()),
                Err(e) => {
                    tracing::warn!("Upload failed: {}", e);
                    Notice::upload_failed()
                }
            };
            println!("{}", notice);
        }
        FilesCommand::Rm { ids } => {
            let notice = match client.delete_files(&ids).await {
                Ok(count) => Notice::deleted(count),
                Err(e) => {
                    tracing::warn!("Delete failed: {}", e);
                    Notice::delete_failed()
                }
            };
            println!("{}", notice);
        }
    }
    Ok(())
}

async fn run_process(client: &ApiClient, ids: Vec<String>, timeout: Duration) -> anyhow::Result<()> {
    let job = client.submit_job(&ids).await?;
    info!("Submitted job {} for {} file(s)", job.id, job.file_ids.len());

    let job = client
        .wait_for_job(job.id, Duration::from_millis(500), timeout)
        .await?;

    let mut board = StatusBoard::default();
    let mut selection = Selection::default();
    let notice = apply_job(&job, &mut board, &mut selection);

    for id in &job.file_ids {
        println!("{:<48} {}", id, board.status(id).label());
    }
    for (id, message) in &job.errors {
        println!("{:<48} error: {}", id, message);
    }
    println!("{}", notice);
    Ok(())
}
