use anyhow::Result;
use countdown::prelude::*;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    // 2. Load the configuration, optionally from the file named in `COUNTDOWN_CONFIG`.
    let config_path = std::env::var_os("COUNTDOWN_CONFIG").map(PathBuf::from);
    let config = CountdownConfig::load(config_path.as_deref())?;

    // 3. Create the engine and hook up observers before any intent is sent.
    let engine = CountdownEngine::new(config);
    spawn_event_listeners(&engine);
    register_renderer(&engine).await;

    // 4. Drive a short scripted session: start, pause, resume.
    let mut events = engine.subscribe_events();
    engine.set_duration(0, 0, 5).await;
    engine.start().await;

    tokio::time::sleep(Duration::from_secs(2)).await;
    engine.pause().await;
    let remaining = engine.remaining_millis().await;
    info!("Paused with {}ms left", remaining);

    tokio::time::sleep(Duration::from_secs(1)).await;
    engine.resume().await;

    // 5. Wait for the run to finish, or cancel it on Ctrl+C.
    tokio::select! {
        _ = async {
            loop {
                match events.recv().await {
                    Ok(CountdownEvent::Completed { .. }) | Err(RecvError::Closed) => break,
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                }
            }
        } => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Shutdown signal received.");
        }
    }

    engine.shutdown().await;
    Ok(())
}

/// Spawns tasks that log the engine's event streams.
fn spawn_event_listeners(engine: &CountdownEngine) {
    let mut system_rx = engine.subscribe_system_events();
    tokio::spawn(async move {
        while let Ok(event) = system_rx.recv().await {
            info!("[SYSTEM] => {:?}", event);
        }
    });

    let mut event_rx = engine.subscribe_events();
    tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(CountdownEvent::Tick { .. }) => {}
                Ok(event) => info!("[COUNTDOWN] => {:?}", event),
                Err(RecvError::Lagged(skipped)) => debug!("[COUNTDOWN] => skipped {} events", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });
}

/// Registers a listener that prints the digits whenever the second changes.
async fn register_renderer(engine: &CountdownEngine) {
    let mut last_shown = None;
    engine
        .subscribe(move |snapshot| {
            let digits = DigitDisplay::from(snapshot);
            if last_shown != Some(digits) {
                last_shown = Some(digits);
                let angle = sweep_angle(snapshot.remaining_millis, snapshot.elapsed_time);
                info!("[RENDER] => {} {} ({:.0} deg)", snapshot.status, digits, angle);
            }
        })
        .await;
}
