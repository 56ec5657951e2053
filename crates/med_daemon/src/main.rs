mod hosted;
mod routes;
mod state;
mod tick_loop;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use med_content::{resolve_content, FileStorage};
use med_core::AppStore;
use state::{AppState, Session, SharedSession};
use std::path::PathBuf;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "med_daemon", about = "Multisystem Master HTTP daemon")]
struct Args {
    #[arg(long, default_value_t = 3001)]
    port: u16,
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,
    /// Load content from this directory instead of the built-in set.
    #[arg(long)]
    content_dir: Option<String>,
    /// Persisted snapshot file.
    #[arg(long, default_value = "./multisystem-master-storage.json")]
    store: PathBuf,
    #[arg(long, default_value_t = 1.0)]
    ticks_per_sec: f64,
    #[arg(long, default_value = "http://localhost:5173")]
    cors_origin: String,
}

/// Resolves on Ctrl-C or SIGTERM, after disposing both simulators.
async fn shutdown_signal(session: SharedSession) {
    let terminate = async {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut term) => {
                    term.recv().await;
                }
                Err(err) => {
                    tracing::warn!("cannot listen for SIGTERM: {err}");
                    std::future::pending::<()>().await;
                }
            }
        }
        #[cfg(not(unix))]
        std::future::pending::<()>().await;
    };
    tokio::select! {
        _ = signal::ctrl_c() => {},
        () = terminate => {},
    }
    tracing::info!("shutting down");
    session.lock().dispose();
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    ensure!(
        args.ticks_per_sec > 0.0 && args.ticks_per_sec.is_finite(),
        "--ticks-per-sec must be a positive number"
    );

    let content = resolve_content(args.content_dir.as_deref())?;
    let store = AppStore::open(Box::new(FileStorage::new(&args.store)));
    tracing::info!(
        store = %args.store.display(),
        content_version = %content.content_version,
        "session loaded"
    );

    let app_state = AppState::new(Session::new(store, content), args.ticks_per_sec);
    let router = routes::make_router_with_cors(app_state.clone(), &args.cors_origin)?;

    let tick_task = tokio::spawn(tick_loop::run_tick_loop(
        app_state.session.clone(),
        app_state.update_tx.clone(),
        args.ticks_per_sec,
    ));

    let addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(app_state.session.clone()))
        .await
        .context("serving HTTP")?;

    tick_task.await.context("tick loop task")?;
    Ok(())
}
