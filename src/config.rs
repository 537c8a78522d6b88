use crate::storage::{BackendLocal, StorageManager};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_USER: &str = "local";
const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/models";
/// all-MiniLM-L6-v2 produces 384-dim embeddings
const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;

/// Environment variable holding the optional bearer credential for the backends.
pub const API_KEY_ENV: &str = "HUGGINGFACE_API_KEY";

/// Generation backends, one ordered model list per artifact kind.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Tried in order for summaries
    #[serde(default = "default_summary_models")]
    pub summary_models: Vec<String>,

    /// Tried in order for flashcards
    #[serde(default = "default_card_models")]
    pub flashcard_models: Vec<String>,

    /// Tried in order for quizzes
    #[serde(default = "default_card_models")]
    pub quiz_models: Vec<String>,

    /// Per-request timeout. Unset means requests never time out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            summary_models: default_summary_models(),
            flashcard_models: default_card_models(),
            quiz_models: default_card_models(),
            timeout_secs: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Every stored vector has exactly this many components
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_embedding_model(),
            dimensions: default_embedding_dimensions(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_summary_models() -> Vec<String> {
    vec![
        "facebook/bart-large-cnn".to_string(),
        "google/pegasus-xsum".to_string(),
        "microsoft/DialoGPT-medium".to_string(),
    ]
}

fn default_card_models() -> Vec<String> {
    vec![
        "microsoft/DialoGPT-medium".to_string(),
        "facebook/bart-large-cnn".to_string(),
        "google/pegasus-xsum".to_string(),
    ]
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_embedding_dimensions() -> usize {
    DEFAULT_EMBEDDING_DIMENSIONS
}

fn default_user() -> String {
    DEFAULT_USER.to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Owner used when the CLI is not given `--user`
    #[serde(default = "default_user")]
    pub default_user: String,

    /// Whether the local note store reports vector search as available
    #[serde(default)]
    pub vector_search: bool,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(skip_serializing, skip_deserializing)]
    pub api_key: Option<String>,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_user: default_user(),
            vector_search: false,
            generation: GenerationConfig::default(),
            embedding: EmbeddingConfig::default(),
            api_key: None,
            base_path: PathBuf::new(),
        }
    }
}

impl Config {
    fn validate(&self) -> anyhow::Result<()> {
        if self.default_user.trim().is_empty() {
            bail!("default_user must not be empty");
        }

        if self.generation.endpoint.trim().is_empty() {
            bail!("generation.endpoint must not be empty");
        }

        if self.embedding.endpoint.trim().is_empty() {
            bail!("embedding.endpoint must not be empty");
        }

        if self.embedding.model.trim().is_empty() {
            bail!("embedding.model must not be empty");
        }

        if self.embedding.dimensions == 0 {
            bail!("embedding.dimensions must be greater than 0");
        }

        if self.generation.timeout_secs == Some(0) {
            bail!("generation.timeout_secs must be greater than 0");
        }

        for (field, models) in [
            ("summary_models", &self.generation.summary_models),
            ("flashcard_models", &self.generation.flashcard_models),
            ("quiz_models", &self.generation.quiz_models),
        ] {
            if models.iter().any(|m| m.trim().is_empty()) {
                bail!("generation.{field} contains an empty model name");
            }
        }

        Ok(())
    }

    /// Loads `config.yaml` from `base_path`, writing the defaults first if the
    /// file does not exist yet.
    pub fn load_with(base_path: &Path) -> anyhow::Result<Self> {
        let store = BackendLocal::new(base_path)
            .with_context(|| format!("failed to create {}", base_path.display()))?;

        // create new if does not exist
        if !store.exists(CONFIG_FILE) {
            store.write(
                CONFIG_FILE,
                serde_yml::to_string(&Self::default())?.as_bytes(),
            )?;
        }

        let config_str = String::from_utf8(store.read(CONFIG_FILE)?)
            .context("config file is not valid utf8")?;
        let mut config: Self = serde_yml::from_str(&config_str).context("config is malformed")?;

        config.base_path = base_path.to_path_buf();
        config.api_key = std::env::var(API_KEY_ENV)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let store = BackendLocal::new(&self.base_path)?;

        let config_str = serde_yml::to_string(&self)?;
        store.write(CONFIG_FILE, config_str.as_bytes())?;
        Ok(())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}
