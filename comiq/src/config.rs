//! Configuration files.

use std::{collections::BTreeMap, env, fs, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    ai::AiParams,
    errors::BoxedError,
    ocr::{CommandEngine, EngineOptions, OcrRegistry},
    services::oai::OpenAiModel,
    Error, Result,
};

/// The environment variable holding the model provider's API key.
pub const API_KEY_VAR: &str = "MLLM_API_KEY";

/// The model we use if none is configured.
pub const DEFAULT_MODEL_NAME: &str = "gemini-2.5-flash";

/// Google's OpenAI-compatible endpoint for Gemini models.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";

/// Everything needed to build an [`Extractor`](crate::Extractor), except
/// the API key, which we always take from the environment.
///
/// ```json
/// {
///   "model_name": "gemini-2.5-flash",
///   "ai": { "temperature": 0.2 },
///   "ocr": { "tesseract": { "lang": "eng", "psm": 11 } },
///   "engines": {
///     "paddleocr-local": { "command": "python3", "args": ["scripts/paddleocr_wrapper.py"] }
///   }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The model to ask.
    pub model_name: String,
    /// The base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Sampling parameters.
    pub ai: AiParams,
    /// Options for each OCR engine, by engine name.
    pub ocr: BTreeMap<String, EngineOptions>,
    /// Extra OCR engines implemented by external programs, by engine name.
    pub engines: BTreeMap<String, CommandSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model_name: DEFAULT_MODEL_NAME.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            ai: AiParams::default(),
            ocr: BTreeMap::new(),
            engines: BTreeMap::new(),
        }
    }
}

/// How to run an external OCR program. See [`CommandEngine`].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CommandSpec {
    /// The program to run.
    pub command: String,
    /// Arguments to pass before the image path.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Config {
    /// Load a JSON configuration file. Missing fields get their defaults.
    pub fn from_path(path: &Path) -> Result<Config> {
        let config_err = |source: BoxedError| Error::Config {
            path: path.to_owned(),
            source,
        };
        let data = fs::read_to_string(path).map_err(|e| config_err(e.into()))?;
        let config: Config = serde_json::from_str(&data).map_err(|e| config_err(e.into()))?;
        debug!("loaded configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Load `path` if we have one, or use the defaults.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => Config::from_path(path),
            None => Ok(Config::default()),
        }
    }

    /// Build a registry containing the default engines, plus any command
    /// engines we've configured. Configured engines may replace defaults.
    pub fn registry(&self) -> OcrRegistry {
        let mut registry = OcrRegistry::with_default_engines();
        for (name, spec) in &self.engines {
            registry.register(
                name.as_str(),
                CommandEngine::new(&spec.command, spec.args.clone()),
            );
        }
        registry
    }

    /// Create a client for our configured model, using the API key from the
    /// environment.
    pub fn model(&self) -> Result<OpenAiModel> {
        let api_key = api_key()?;
        Ok(OpenAiModel::new(
            &api_key,
            Some(self.base_url.as_str()),
            &self.model_name,
        ))
    }
}

/// Look up our API key. Call `dotenv` first if you want to support `.env`
/// files.
pub fn api_key() -> Result<String> {
    match env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(Error::MissingCredential { var: API_KEY_VAR }),
    }
}
