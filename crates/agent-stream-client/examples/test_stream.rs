use std::sync::Arc;

use agent_stream_client::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let transport = HttpTransport::new(BackendConfig::from_env())?;
    let manager = SessionManager::new(Arc::new(transport));

    let mut revision = manager.watch_revision();
    let mut printed = 0;
    manager.start(StreamRequest::Test);
    loop {
        let events = manager.events();
        for event in &events[printed..] {
            println!("[{}] {}", event.kind, event.payload);
        }
        printed = events.len();

        if !manager.busy() {
            break;
        }
        if revision.changed().await.is_err() {
            break;
        }
    }
    Ok(())
}
