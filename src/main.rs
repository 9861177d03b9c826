use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookdrop::config::Config;
use bookdrop::library::BookLibrary;
use bookdrop::server::BookServer;
use bookdrop::state::ServerState;
use bookdrop::utils::shutdown_signal;

// use mimalloc as the global allocator
// 10-20% faster than system allocator
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() {
    // load .env file if it exists (fails silently if not found)
    let _ = dotenvy::dotenv();

    // load configuration from environment variables
    let config = Config::from_env();

    // build tokio runtime with configured worker threads
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime");

    runtime.block_on(async {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .with(tracing_subscriber::fmt::layer())
            .init();

        let (server, mut received_rx) = BookServer::new();
        let library = BookLibrary::new(config.books_dir.clone());

        let state = server.start().await.expect("Failed to start book server");
        print_startup_banner(&state, &config);

        // relay progress frames to the log; a real host would drive a UI
        let mut progress_rx = server.subscribe_progress();
        tokio::spawn(async move {
            while progress_rx.changed().await.is_ok() {
                let frame = progress_rx.borrow().clone();
                if let Some(p) = frame {
                    tracing::debug!("upload progress: {:?}", p);
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_signal() => break,
                maybe = received_rx.recv() => match maybe {
                    Some(file) => {
                        if let Err(e) = library.save(&file).await {
                            tracing::error!("failed to save {}: {}", file.file_name, e);
                        }
                    }
                    None => break,
                },
            }
        }

        server.stop().await;
    });
}

/// print startup banner with server info
fn print_startup_banner(state: &ServerState, config: &Config) {
    tracing::info!("bookdrop starting...");
    tracing::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    match &state.address {
        Some(addr) => tracing::info!("📡 UPLOAD PAGE: {}", addr),
        None => tracing::info!("📡 UPLOAD PAGE: address unknown (no LAN interface?)"),
    }
    tracing::info!("📁 Saving books to: {:?}", config.books_dir);
    tracing::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
