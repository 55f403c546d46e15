use crate::ckan::CkanClient;
use crate::config::AppConfig;
use crate::stories::StoryStore;

/// Shared per-process state: read-only configuration plus the stateless
/// clients built from it once at startup.
pub struct AppState {
    pub config: AppConfig,
    pub ckan: CkanClient,
    pub stories: StoryStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let ckan = CkanClient::new(&config.ckan);
        let stories = StoryStore::new(config.stories_path.clone());
        Self { config, ckan, stories }
    }
}
