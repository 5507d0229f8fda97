use anyhow::Result;
use bobdsp_client::{BobDspClient, ClientMirror, PluginCatalog, PortWatcher, SyncEvent, SyncSession};
use colored::Colorize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::info;

pub async fn run(api: Arc<BobDspClient>) -> Result<()> {
    let mirror = ClientMirror::new();
    let mut events = mirror.subscribe();

    let catalog = Arc::new(PluginCatalog::new(api.clone()));
    let clients = SyncSession::new(api.clone(), mirror.clone())
        .with_plugin_catalog(catalog)
        .spawn();

    let watcher = PortWatcher::new(api);
    let ports = watcher.port_list();
    let ports_handle = watcher.spawn();

    println!("{}", "Watching BobDSP host, Ctrl-C to stop".cyan().bold());

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(SyncEvent::Replaced { session_changed }) => {
                    if session_changed {
                        info!("Host restarted (session {})", mirror.session_id());
                    }
                    let names: Vec<String> = mirror.clients().into_iter().map(|c| c.name).collect();
                    info!(
                        "{} clients: {}; {} ports",
                        names.len(),
                        names.join(", "),
                        ports.lock().ports().len()
                    );
                }
                Ok(SyncEvent::ValuesChanged) => {
                    for client in mirror.clients() {
                        let values: Vec<String> = client
                            .controls()
                            .iter()
                            .map(|c| format!("{}={}", c.name, c.value()))
                            .collect();
                        info!("{}: {}", client.name, values.join(" "));
                    }
                }
                Ok(SyncEvent::Reset) => info!("{}", "Connection lost, resyncing".yellow()),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("Skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                println!("\n{}", "Stopping".cyan());
                break;
            }
        }
    }

    clients.stop();
    ports_handle.stop();
    Ok(())
}
