use clap::Parser;
use code_recognizer::{CodeRecognizer, RecognizeOptions, RecognizerConfig, SymbolType};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "code-recognizer")]
#[command(about = "Recognize a Data Matrix, QR code or alphanumeric string in an image")]
#[command(version)]
pub struct Args {
    /// Image file to recognize
    #[arg(default_value = "./test_img/DM.png")]
    pub image: PathBuf,

    /// What to recognize: DM, QR or CHAR
    #[arg(long, short = 't', default_value = "DM")]
    pub symbol: String,

    /// Counter-clockwise rotation that makes characters upright (CHAR only)
    #[arg(long, default_value = "0")]
    pub rotation: u32,

    /// Decode the whole frame instead of the detected code region
    #[arg(long)]
    pub no_roi: bool,

    /// Save the image when nothing is recognized
    #[arg(long)]
    pub save_failed: bool,

    /// Base directory for failure artifacts
    #[arg(long, env = "CODE_LOG_DIR", default_value = "./")]
    pub log_dir: PathBuf,

    /// Data Matrix decode timeout in milliseconds
    #[arg(long, env = "CODE_DATAMATRIX_TIMEOUT_MS", default_value = "1000")]
    pub datamatrix_timeout_ms: u64,

    /// Text engine for CHAR recognition (ocrs, leptess)
    #[arg(long, env = "CODE_TEXT_ENGINE")]
    pub text_engine: Option<String>,

    /// Directory for downloaded OCR models (uses the user cache dir if not set)
    #[arg(long, env = "CODE_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl From<&Args> for RecognizerConfig {
    fn from(args: &Args) -> Self {
        Self {
            log_dir: args.log_dir.clone(),
            datamatrix_timeout: Duration::from_millis(args.datamatrix_timeout_ms),
            text_engine: args.text_engine.clone(),
            model_dir: args.model_dir.clone(),
            ..Default::default()
        }
    }
}

#[derive(Serialize)]
struct Output {
    symbol: SymbolType,
    codes: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let symbol: SymbolType = args.symbol.parse()?;
    let image = image::open(&args.image)
        .map_err(|e| anyhow::anyhow!("Failed to load {:?}: {}", args.image, e))?;

    tracing::info!(
        "code-recognizer v{} reading {:?} as {}",
        env!("CARGO_PKG_VERSION"),
        args.image,
        symbol
    );

    let recognizer = CodeRecognizer::new(RecognizerConfig::from(&args));
    let options = RecognizeOptions::default()
        .rotation(args.rotation)
        .capture_roi(!args.no_roi)
        .save_on_failure(args.save_failed);

    let codes = recognizer.recognize(&image, symbol, &options)?;

    println!("{}", serde_json::to_string_pretty(&Output { symbol, codes })?);
    Ok(())
}
