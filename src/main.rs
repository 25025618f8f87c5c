use banter::core::config;
use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "banter", about = "Terminal chat client with persisted transcripts")]
struct Args {
    /// Backend base URL (overrides config file and BANTER_BACKEND_URL)
    #[arg(long)]
    backend_url: Option<String>,

    /// Model identifier for completions
    #[arg(short, long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to banter.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("banter.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("banter: {e}");
            std::process::exit(1);
        }
    };
    let resolved = config::resolve(&config, args.backend_url.as_deref(), args.model.as_deref());

    log::info!(
        "banter starting up (backend: {}, model: {})",
        resolved.base_url,
        resolved.model_name
    );

    banter::tui::run(resolved)
}
