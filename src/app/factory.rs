use crate::{
    app::local::StudyApp,
    config::Config,
    generation::GenerationProvider,
    huggingface::{HuggingFaceClient, HuggingFaceModel},
    notes::{BackendJson, NoteStore},
    semantic::EmbeddingProvider,
    storage::BackendLocal,
};
use anyhow::{anyhow, Context, Result};
use homedir::my_home;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const BASE_PATH_ENV: &str = "STUDYKIT_BASE_PATH";

/// Application factory for creating and configuring application components
pub struct AppFactory;

pub struct AppPaths {
    pub base_path: PathBuf,
    pub data_path: PathBuf,
}

impl AppFactory {
    /// Get application paths, creating the base directory if needed
    pub fn get_paths() -> Result<AppPaths> {
        let base_path = Self::get_base_path()?;
        let data_path = base_path.join("data");

        std::fs::create_dir_all(&base_path)
            .context("Failed to create application base directory")?;

        Ok(AppPaths {
            base_path,
            data_path,
        })
    }

    /// `STUDYKIT_BASE_PATH`, else `~/.local/share/studykit`
    fn get_base_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(BASE_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let home = my_home()
            .context("Could not determine home directory")?
            .ok_or_else(|| anyhow!("Home directory path is empty"))?;

        Ok(home.join(".local/share/studykit"))
    }

    /// Build the whole application from the config found under `paths`.
    pub fn create_app(paths: &AppPaths) -> Result<(Config, StudyApp)> {
        let config = Config::load_with(&paths.base_path)?;

        let store = BackendJson::load(Box::new(BackendLocal::new(&paths.data_path)?))?
            .with_vector_capability(config.vector_search);
        let store: Arc<dyn NoteStore> = Arc::new(store);

        let generation_client = Arc::new(HuggingFaceClient::new(
            &config.generation.endpoint,
            config.api_key.clone(),
            config.generation.timeout_secs.map(Duration::from_secs),
        )?);
        let generator = GenerationProvider::from_config(&config.generation, generation_client);

        let embedding_client = Arc::new(HuggingFaceClient::new(
            &config.embedding.endpoint,
            config.api_key.clone(),
            config.generation.timeout_secs.map(Duration::from_secs),
        )?);
        let embeddings = Arc::new(EmbeddingProvider::new(
            Box::new(HuggingFaceModel::new(embedding_client, &config.embedding.model)),
            config.embedding.dimensions,
        ));

        log::debug!(
            "vector_search={} summary_backends={} flashcard_backends={} quiz_backends={}",
            config.vector_search,
            config.generation.summary_models.len(),
            config.generation.flashcard_models.len(),
            config.generation.quiz_models.len()
        );

        Ok((config, StudyApp::new(store, generator, embeddings)))
    }
}
