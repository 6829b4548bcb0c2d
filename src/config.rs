use std::path::PathBuf;
use std::time::Duration;

/// Default base directory for failure artifacts
pub const DEFAULT_LOG_DIR: &str = "./";
/// Default bound on a single Data Matrix decode
pub const DEFAULT_DATAMATRIX_TIMEOUT: Duration = Duration::from_millis(1000);
/// Larger image dimension after rescaling
pub const DEFAULT_TARGET_DIMENSION: u32 = 300;
/// Closing radius used to merge code modules before contour tracing
pub const DEFAULT_ROI_MERGE_RADIUS: u8 = 6;
/// White border added around a crop before it reaches a code decoder
pub const DEFAULT_QUIET_ZONE: u32 = 24;

/// Recognizer configuration
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    /// Base directory under which timestamped failure directories are created
    pub log_dir: PathBuf,
    pub datamatrix_timeout: Duration,
    pub target_dimension: u32,
    pub roi_merge_radius: u8,
    pub quiet_zone: u32,
    /// Text engine name ("ocrs" or "leptess"); first available engine if unset
    pub text_engine: Option<String>,
    /// Model cache directory (uses the user cache directory if not set)
    pub model_dir: Option<PathBuf>,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            datamatrix_timeout: DEFAULT_DATAMATRIX_TIMEOUT,
            target_dimension: DEFAULT_TARGET_DIMENSION,
            roi_merge_radius: DEFAULT_ROI_MERGE_RADIUS,
            quiet_zone: DEFAULT_QUIET_ZONE,
            text_engine: None,
            model_dir: None,
        }
    }
}

impl RecognizerConfig {
    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = log_dir.into();
        self
    }

    /// Directory holding downloaded model files
    pub fn model_cache_dir(&self) -> PathBuf {
        self.model_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("code-recognizer")
        })
    }
}
