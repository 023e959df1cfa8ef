/// CLI argument parsing and help text

pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!("tts_batch v{}", version);
    println!("Batch text-to-speech pipeline: splits a text file into chunks,");
    println!("synthesizes each one concurrently, and merges the results.");
    println!();
    println!("USAGE:");
    println!("    tts_batch [OPTIONS] <TEXT_FILE>");
    println!();
    println!("OPTIONS:");
    println!("    --config <PATH>         Persisted JSON config (api_settings/voice_settings/proxy_links/voices)");
    println!("    --voice <VOICE_ID>      Voice ID to synthesize with");
    println!("    --model <MODEL_ID>      Model id (v3, flash_v2_5, flash_v2, turbo_v2_5, turbo_v2, multilingual_v2)");
    println!("    --concurrency <N>       Number of concurrent workers (default: 4)");
    println!("    --proxy-mode <MODE>     none or rotation (default: none)");
    println!("    --keep-chunks           Keep per-chunk text/audio files after a successful merge");
    println!("    -h, --help              Print this help message");
    println!("    -v, --version           Print version information");
    println!();
    println!("EXAMPLES:");
    println!("    tts_batch speech.txt --voice abc123 --model multilingual_v2");
    println!("    tts_batch speech.txt --config settings.json --concurrency 8");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("    TTS_CREDENTIALS_FILE        Path to a line-delimited credentials file (default: ./credentials.txt)");
    println!("    TTS_BATCH_LOG_DIR           Override the log directory");
    println!("    RUST_LOG                    Log level (error/warn/info/debug/trace)");
}

pub fn print_version() {
    println!("tts_batch v{}", env!("CARGO_PKG_VERSION"));
}
