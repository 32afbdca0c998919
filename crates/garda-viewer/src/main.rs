//! Garda - desktop entry point

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(name = "garda")]
#[command(about = "Extruded letterforms and a glowing cube, with bloom")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "garda.toml")]
    config: PathBuf,

    /// Typeface JSON to load (URL or local path)
    #[arg(short, long)]
    font: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Move only on discrete key presses, ignoring key repeat
    #[arg(long)]
    no_key_repeat: bool,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    write_config: bool,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use bevy::app::AppExit;
    use garda_core::config::{load_config, save_default_config};
    use garda_core::lifecycle::CancelToken;
    use tracing::{info, Level};
    use tracing_subscriber::FmtSubscriber;

    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Garda v{}", env!("CARGO_PKG_VERSION"));

    if args.write_config {
        save_default_config(&args.config)?;
        info!(path = %args.config.display(), "Wrote default configuration");
        return Ok(());
    }

    // Load configuration
    let mut config = load_config(&args.config)?;

    if let Some(font) = args.font {
        config.font.url = font;
    }
    if args.no_key_repeat {
        config.input.key_repeat = false;
    }
    config.validate()?;

    info!(
        font = %config.font.url,
        key_repeat = config.input.key_repeat,
        "Configuration loaded"
    );

    match garda_viewer::build_app(config, CancelToken::new()).run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => anyhow::bail!("Garda exited with code {}", code),
    }
}

// The browser build starts through the library's wasm_bindgen exports
#[cfg(target_arch = "wasm32")]
fn main() {}
