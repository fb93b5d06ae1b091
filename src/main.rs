use axum::Router;
use clap::Parser;
use cloud_demo_services::config::{ServerConfig, StorageConfig};
use cloud_demo_services::infrastructure::storage;
use cloud_demo_services::{UploadState, create_api_app, create_upload_app, with_http_tracing};
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Service to run (upload, api, all)
    #[arg(short, long, default_value = "all")]
    mode: String,

    /// Port for the upload service
    #[arg(long, default_value_t = 5000)]
    upload_port: u16,

    /// Port for the skeleton API service
    #[arg(long, default_value_t = 3000)]
    api_port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cloud_demo_services=info,metrics=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let run_upload = matches!(args.mode.as_str(), "upload" | "all");
    let run_api = matches!(args.mode.as_str(), "api" | "all");
    if !run_upload && !run_api {
        anyhow::bail!("unknown mode '{}', expected upload, api or all", args.mode);
    }

    info!("🚀 Starting cloud demo services [Mode: {}]...", args.mode);

    let server_config = ServerConfig::from_env();
    let mut handles = Vec::new();

    if run_upload {
        let storage_config = StorageConfig::from_env();
        let store = storage::setup_storage(&storage_config).await;
        info!(
            "🛡️  Upload Config: Max Size={}MB, Store errors as 200={}",
            server_config.max_file_size / 1024 / 1024,
            server_config.store_errors_as_ok
        );

        let app = create_upload_app(UploadState {
            store,
            config: server_config.clone(),
        });
        handles.push(serve("Upload", app, args.upload_port).await?);
        info!(
            "📖 Swagger UI documentation: http://localhost:{}/swagger-ui",
            args.upload_port
        );
    }

    if run_api {
        handles.push(serve("API", create_api_app(), args.api_port).await?);
    }

    for handle in handles {
        if let Err(e) = handle.await {
            error!("❌ Server task failed: {}", e);
        }
    }

    info!("👋 Services exited cleanly.");
    Ok(())
}

async fn serve(
    name: &'static str,
    app: Router,
    port: u16,
) -> anyhow::Result<tokio::task::JoinHandle<()>> {
    let app = with_http_tracing(app);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("✅ {} server listening on: http://0.0.0.0:{}", name, port);

    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            error!("❌ {} server runtime error: {}", name, e);
        }
        info!("🛑 {} server shut down gracefully.", name);
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, initiating graceful shutdown...");
        },
    }
}
