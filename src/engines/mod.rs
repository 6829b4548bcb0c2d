//! Decoder and text engine implementations
//!
//! Matrix code decoders are always built. Text engines are conditionally
//! compiled based on feature flags and constructed lazily, since loading
//! their models takes seconds.

pub mod datamatrix;
pub mod qr;

#[cfg(any(feature = "engine-ocrs", feature = "engine-leptess"))]
mod download;

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

#[cfg(feature = "engine-leptess")]
pub mod leptess;

use crate::config::RecognizerConfig;
use crate::engine::TextEngine;
use crate::error::RecognizeError;
use std::sync::{Arc, Mutex, OnceLock};

type TextEngineFactory =
    Box<dyn Fn() -> Result<Arc<dyn TextEngine>, RecognizeError> + Send + Sync>;

/// Names of the text engines compiled into this build, default first
pub fn available_text_engines() -> Vec<&'static str> {
    #[allow(unused_mut)]
    let mut names = Vec::new();
    #[cfg(feature = "engine-ocrs")]
    names.push("ocrs");
    #[cfg(feature = "engine-leptess")]
    names.push("leptess");
    names
}

/// Construct the named text engine, or the first available one
pub fn create_text_engine(
    config: &RecognizerConfig,
) -> Result<Arc<dyn TextEngine>, RecognizeError> {
    let available = available_text_engines();
    let name = match config.text_engine.as_deref() {
        Some(name) => name,
        None => available.first().copied().ok_or_else(|| {
            RecognizeError::InitializationError(
                "No text engines available. Build with --features engine-ocrs or --features engine-leptess".to_string(),
            )
        })?,
    };

    tracing::info!("Initializing {} text engine...", name);

    match name {
        #[cfg(feature = "engine-ocrs")]
        "ocrs" => Ok(Arc::new(ocrs::OcrsEngine::new(config)?)),
        #[cfg(feature = "engine-leptess")]
        "leptess" => Ok(Arc::new(leptess::LeptessEngine::new(config)?)),
        other => Err(RecognizeError::InitializationError(format!(
            "Unknown text engine '{}' (available: {})",
            other,
            available.join(", ")
        ))),
    }
}

/// Text engine constructed on first use and reused afterwards
pub struct LazyTextEngine {
    factory: TextEngineFactory,
    engine: OnceLock<Arc<dyn TextEngine>>,
    init_lock: Mutex<()>,
}

impl LazyTextEngine {
    /// Defer construction to `factory`, run at most once successfully
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn TextEngine>, RecognizeError> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            engine: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Wrap an engine that is already constructed
    pub fn ready(engine: Arc<dyn TextEngine>) -> Self {
        let lazy = Self::new(|| {
            Err(RecognizeError::InitializationError(
                "engine already constructed".to_string(),
            ))
        });
        let _ = lazy.engine.set(engine);
        lazy
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.get().is_some()
    }

    /// Get the engine, constructing it on first call
    ///
    /// A failed construction is not cached; the next call tries again.
    pub fn get(&self) -> Result<Arc<dyn TextEngine>, RecognizeError> {
        if let Some(engine) = self.engine.get() {
            return Ok(engine.clone());
        }

        // Serialize construction so concurrent first calls load models once
        let _guard = self.init_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(engine) = self.engine.get() {
            return Ok(engine.clone());
        }

        let engine = (self.factory)()?;
        tracing::info!("Text engine '{}' ready", engine.name());
        Ok(self.engine.get_or_init(|| engine).clone())
    }
}
