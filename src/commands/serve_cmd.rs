use tokio::net::TcpListener;
use tokio::runtime::{Builder, Runtime};
use tutorbot::config::Config;
use tutorbot::{
    create_app, create_app_state, server_error, server_info, server_info_with_fields, server_warn,
};

pub fn build_runtime(workers: Option<usize>) -> std::io::Result<Runtime> {
    let mut builder = Builder::new_multi_thread();
    builder.enable_all();
    if let Some(workers) = workers {
        builder.worker_threads(workers);
    }
    builder.build()
}

pub fn execute(config: Config) -> anyhow::Result<()> {
    let runtime = build_runtime(config.workers)?;
    runtime.block_on(serve(config))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = config.bind_addr();

    if config.openrouter_api_key.is_none() && config.provider == "openrouter" {
        server_warn!(
            "OPENROUTER_API_KEY is not set; /ask_tutor will answer 500 until it is"
        );
    }

    let app_state = create_app_state(config)?;
    server_info_with_fields!(
        provider = app_state.provider.name(),
        min_delay_ms = app_state.limiter.min_delay().as_millis() as u64;
        "Tutor provider ready"
    );
    let app = create_app(app_state);

    let listener = TcpListener::bind(&addr).await?;
    server_info!("Server running at http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    server_info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            server_error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                server_error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    server_info!("Shutdown signal received");
}
