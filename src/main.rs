mod chunk;
mod cli;
mod config;
mod credential;
mod engine;
mod error;
mod logging;
mod merger;
mod project_layout;
mod proxy;
mod tts;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use chunk::splitter::TextSplitter;
use chunk::store::ChunkStore;
use config::{EngineConfig, ModelId, PersistedConfig, ProxyMode, VoiceSettings};
use credential::pool::CredentialPool;
use engine::{EngineEvent, PipelineRuntime};
use error::Result;
use logging::LogConfig;
use merger::Merger;
use project_layout::ProjectLayout;
use proxy::pool::ProxyPool;
use tts::client::BASE_URL;
use tts::credit::CreditProbe;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    logging::init_logging(&LogConfig::from_env()).expect("failed to initialize logging");
    logging::log_platform_info();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--version" || a == "-v") {
        cli::print_version();
        return Ok(());
    }
    if args.iter().any(|a| a == "--help" || a == "-h") || args.len() < 2 {
        cli::print_help();
        return Ok(());
    }

    let text_path = PathBuf::from(&args[1]);

    let mut engine_config = EngineConfig::default();
    let mut voice = VoiceSettings::default();
    let mut proxy_keys: Vec<String> = Vec::new();

    if let Some(config_path) = flag_value(&args, "--config") {
        let data = tokio::fs::read_to_string(&config_path).await?;
        let persisted = PersistedConfig::from_json(&data)?;
        engine_config = persisted.api_settings;
        voice = persisted.voice_settings;
        proxy_keys = persisted.proxy_links;
    }

    if let Some(voice_id) = flag_value(&args, "--voice") {
        voice.voice_id = voice_id;
    }
    if let Some(model) = flag_value(&args, "--model") {
        voice.model_id = parse_model_id(&model).unwrap_or(voice.model_id);
    }
    if let Some(concurrency) = flag_value(&args, "--concurrency").and_then(|v| v.parse().ok()) {
        engine_config.concurrency = concurrency;
    }
    if let Some(mode) = flag_value(&args, "--proxy-mode") {
        engine_config.proxy_mode = match mode.as_str() {
            "rotation" => ProxyMode::Rotation,
            _ => ProxyMode::None,
        };
    }

    engine_config.validate()?;

    let credentials_path = env::var("TTS_CREDENTIALS_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./credentials.txt"));
    let credential_pool = Arc::new(CredentialPool::load_from_file(&credentials_path).await?);

    let credit_probe = CreditProbe::new(
        reqwest::Client::new(),
        BASE_URL.to_string(),
        engine_config.credit_threshold,
    );
    let remaining_credit = credit_probe
        .check_all(&credential_pool, engine_config.concurrency)
        .await;
    tracing::info!(remaining_credit, "aggregate credit probed across active credentials");
    if credential_pool.active_count().await == 0 {
        return Err(error::PipelineError::InvalidConfig(
            "every credential is quarantined before synthesis started".to_string(),
        ));
    }

    let layout = ProjectLayout::from_source_path(&text_path);
    let source_text = tokio::fs::read_to_string(&text_path).await?;
    if source_text.trim().is_empty() {
        return Err(error::PipelineError::EmptyText);
    }

    let splitter = TextSplitter::new(engine_config.effective_chunk_size(voice.model_id));
    let pieces = splitter.split(&source_text);

    let chunk_store = Arc::new(
        ChunkStore::create(
            layout.chunks_text_dir.clone(),
            layout.chunks_audio_dir.clone(),
            &pieces,
        )
        .await?,
    );

    println!("tts_batch v{}", env!("CARGO_PKG_VERSION"));
    println!("Project directory: {}", layout.project_dir.display());
    println!("Chunks: {}", chunk_store.len());

    let (proxy_pool, proxy_provider_url) = if engine_config.proxy_mode == ProxyMode::Rotation {
        let provider_url = env::var("TTS_PROXY_PROVIDER_URL")
            .unwrap_or_else(|_| config::constants::DEFAULT_PROXY_PROVIDER_URL.to_string());
        (
            Some(Arc::new(ProxyPool::new(proxy_keys, std::time::Duration::from_secs(300)))),
            Some(provider_url),
        )
    } else {
        (None, None)
    };

    let runtime = PipelineRuntime::new(
        engine_config,
        Arc::clone(&chunk_store),
        credential_pool,
        proxy_pool,
        proxy_provider_url,
    );

    let (tx, mut rx) = mpsc::channel(64);
    let run_handle = tokio::spawn({
        let engine_voice = voice.clone();
        async move { runtime.run(engine_voice, tx).await }
    });

    let mut succeeded = 0usize;
    let mut failed = 0usize;
    while let Some(event) = rx.recv().await {
        match event {
            EngineEvent::ChunkStateChanged { number, status } => {
                tracing::debug!(number, ?status, "chunk state changed");
            }
            EngineEvent::RunCompleted {
                succeeded: s,
                failed: f,
            } => {
                succeeded = s;
                failed = f;
            }
        }
    }
    run_handle.await??;

    println!("Succeeded: {succeeded}, Failed: {failed}");

    if failed == 0 {
        Merger::merge(&chunk_store, &layout.default_output_path).await?;
        println!("Merged output: {}", layout.default_output_path.display());
        Ok(())
    } else {
        println!("Some chunks failed; skipping merge.");
        std::process::exit(1);
    }
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|pos| args.get(pos + 1))
        .cloned()
}

fn parse_model_id(value: &str) -> Option<ModelId> {
    match value {
        "v3" => Some(ModelId::V3),
        "flash_v2_5" => Some(ModelId::FlashV25),
        "flash_v2" => Some(ModelId::FlashV2),
        "turbo_v2_5" => Some(ModelId::TurboV25),
        "turbo_v2" => Some(ModelId::TurboV2),
        "multilingual_v2" => Some(ModelId::MultilingualV2),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_value_present() {
        let args = vec!["bin".to_string(), "--voice".to_string(), "abc".to_string()];
        assert_eq!(flag_value(&args, "--voice"), Some("abc".to_string()));
    }

    #[test]
    fn test_flag_value_missing() {
        let args = vec!["bin".to_string()];
        assert_eq!(flag_value(&args, "--voice"), None);
    }

    #[test]
    fn test_parse_model_id_known() {
        assert_eq!(parse_model_id("v3"), Some(ModelId::V3));
        assert_eq!(parse_model_id("multilingual_v2"), Some(ModelId::MultilingualV2));
    }

    #[test]
    fn test_parse_model_id_unknown() {
        assert_eq!(parse_model_id("not-a-model"), None);
    }
}
