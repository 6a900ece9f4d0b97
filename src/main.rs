use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use tokio_healthcheck::config::Config;
use tokio_healthcheck::health::{Background, BoxError, Healthcheck, Manual, OnDemand};
use tokio_healthcheck::observability::Metrics;
use tokio_healthcheck::server::{ServerError, StatusServer};
use tokio_healthcheck::{logging, VERSION};

fn main() -> Result<(), ServerError> {
    let config = Config::from_env()?;

    if let Err(e) = logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!("Starting tokio_healthcheck {}...", VERSION);
    config.log_summary();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: Config) -> Result<(), ServerError> {
    let metrics = Arc::new(Metrics::new()?);
    let hc = Arc::new(Healthcheck::new().with_status_hook(metrics.status_hook()));
    let checks = CancellationToken::new();
    let history_size = config.health.history_size;

    hc.register(
        &checks,
        OnDemand::new("tmp-writable", Duration::from_secs(1), |_| async {
            let path = std::env::temp_dir().join("tokio_healthcheck.probe");
            tokio::fs::write(&path, b"ok").await?;
            tokio::fs::remove_file(&path).await?;
            Ok::<(), BoxError>(())
        })
        .with_history_capacity(history_size),
    );

    let warmup = Manual::new("warmup").with_history_capacity(history_size);
    hc.register(&checks, warmup.clone());

    hc.register(
        &checks,
        Background::new(
            "dns",
            Err("not resolved yet"),
            Duration::from_secs(1),
            Duration::from_secs(10),
            Duration::from_secs(2),
            |_| async {
                let mut addrs = tokio::net::lookup_host("localhost:80").await?;
                match addrs.next() {
                    Some(_) => Ok::<(), BoxError>(()),
                    None => Err("localhost did not resolve".into()),
                }
            },
        )
        .with_history_capacity(history_size),
    );

    let server = Arc::new(StatusServer::new(
        config.server.clone(),
        Arc::clone(&hc),
        Arc::clone(&metrics),
    ));
    let listener = server.bind().await?;
    let server_task = tokio::spawn({
        let server = Arc::clone(&server);
        async move { server.run(listener).await }
    });

    // Stand-in for application startup work
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        warmup.set_ok();
        info!("Warmup complete");
    });

    shutdown_signal().await;
    info!("Shutting down...");

    server
        .shutdown_gracefully(config.server.shutdown_timeout)
        .await;

    match server_task.await {
        Ok(Err(e)) => error!("Status server error: {}", e),
        Err(e) => error!("Status server task failed: {}", e),
        Ok(Ok(())) => {}
    }

    checks.cancel();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
