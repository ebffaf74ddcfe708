use std::sync::Arc;

use agent_stream_client::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let query = std::env::args().nth(1).unwrap_or_else(|| {
        "Help me get transcript of meeting AI Sharing and summarize it".to_string()
    });

    let transport = HttpTransport::new(BackendConfig::from_env())?;
    let manager = SessionManager::new(Arc::new(transport));

    let mut revision = manager.watch_revision();
    let mut printed = 0;
    manager.start(StreamRequest::query(query));
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
