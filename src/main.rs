use std::io::BufRead;

use logtriage::config::EngineConfig;
use logtriage::pipeline::{ClassificationRouter, LogRecord};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mut config = EngineConfig::default();
    if let Ok(dir) = std::env::var("LOGTRIAGE_EMBEDDING_DIR") {
        config.embedding_dir = dir.into();
    }
    if let Ok(dir) = std::env::var("LOGTRIAGE_CLASSIFIER_DIR") {
        config.classifier_dir = dir.into();
    }
    if let Ok(url) = std::env::var("LOGTRIAGE_OLLAMA_URL") {
        config.generative_url = url;
    }
    if let Ok(model) = std::env::var("LOGTRIAGE_OLLAMA_MODEL") {
        config.generative_model = model;
    }

    eprintln!("logtriage v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Embedding model: {}", config.embedding_dir.display());
    eprintln!("   Classifier head: {}", config.classifier_dir.display());
    eprintln!(
        "   Generative endpoint: {} (model: {})",
        config.generative_url, config.generative_model
    );
    eprintln!("   Input: source<TAB>message per line on stdin\n");

    // Missing statistical artifacts are fatal — the engine has no degraded
    // mode without them.
    let router = ClassificationRouter::from_config(&config)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: failed to initialize classification engine: {e}");
            std::process::exit(1);
        });

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let Some((source, message)) = line.split_once('\t') else {
            tracing::warn!(line = %line, "Skipping line without a tab separator");
            continue;
        };

        let record = LogRecord::new(source, message);
        let label = router.classify(&record).await;
        println!("{source}\t{message}\t{label}");
    }

    Ok(())
}
