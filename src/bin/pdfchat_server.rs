use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use pdfchat::{
    build_pipeline, logging, router, AppState, PdfExtractor, PipelineArgs, ProviderArgs,
    ServerSettings,
};

#[derive(Parser, Debug)]
#[command(
    name = "pdfchat-server",
    about = "HTTP API for uploading a PDF and asking questions about it"
)]
struct ServerCli {
    /// Address to bind the HTTP server to (host:port).
    #[arg(long, env = "PDFCHAT_BIND", default_value = "0.0.0.0:8000")]
    bind: String,

    /// Browser origins allowed by CORS, comma separated.
    #[arg(
        long,
        env = "PDFCHAT_CORS_ORIGINS",
        default_value = "http://localhost:3000",
        value_delimiter = ','
    )]
    cors_origins: Vec<String>,

    /// Largest accepted upload in bytes.
    #[arg(long, env = "PDFCHAT_MAX_UPLOAD_BYTES", default_value_t = 32 * 1024 * 1024)]
    max_upload_bytes: usize,

    /// Default log filter when RUST_LOG is unset.
    #[arg(long, env = "PDFCHAT_LOG", default_value = "info")]
    log_level: String,

    #[command(flatten)]
    pipeline: PipelineArgs,

    #[command(flatten)]
    providers: ProviderArgs,
}

fn main() -> Result<()> {
    let cli = ServerCli::parse();
    logging::init(&cli.log_level);

    // The pipeline owns blocking HTTP clients, which must be created and
    // dropped outside the async runtime.
    let pipeline = Arc::new(build_pipeline(
        &cli.pipeline,
        &cli.providers,
        Arc::new(PdfExtractor),
    )?);
    let settings = ServerSettings {
        allowed_origins: cli.cors_origins.clone(),
        max_upload_bytes: cli.max_upload_bytes,
    };
    let app = router(AppState::new(Arc::clone(&pipeline)), &settings)?;
    let addr: SocketAddr = cli
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", cli.bind))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    let served = runtime.block_on(serve(addr, app));
    drop(runtime);
    drop(pipeline);
    served
}

async fn serve(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("pdfchat-server listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server shutdown")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
