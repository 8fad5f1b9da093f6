use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::auth::{StaticToken, TokenProvider};
use crate::error::{QuestError, Result};
use crate::http::ApiClient;
use crate::local::{FileSlots, LocalGoals, LocalLog, SlotStore};
use crate::remote::{RemoteGoals, RemoteLog};
use crate::store::{GoalsStore, LogStore, Tracker};

pub const DEFAULT_DATA_DIR: &str = ".calorie-quest";

/// Which persistence adapter backs the stores. Exactly one per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    #[default]
    Local,
    Remote,
}

impl FromStr for Strategy {
    type Err = QuestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Strategy::Local),
            "remote" => Ok(Strategy::Remote),
            other => Err(QuestError::Configuration(format!(
                "unknown storage strategy {other:?}, expected \"local\" or \"remote\""
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuestConfig {
    pub strategy: Strategy,
    /// Local strategy: directory holding the slot files
    pub data_dir: PathBuf,
    /// Remote strategy: service root, e.g. `https://api.example.com`
    pub api_base_url: Option<String>,
    pub api_token: Option<String>,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Local,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            api_base_url: None,
            api_token: None,
        }
    }
}

impl QuestConfig {
    /// Read `QUEST_STORAGE`, `QUEST_DATA_DIR`, `QUEST_API_BASE_URL` and
    /// `QUEST_API_TOKEN`. Callers load any `.env` file beforehand.
    pub fn from_env() -> Result<Self> {
        let strategy = match std::env::var("QUEST_STORAGE") {
            Ok(v) => v.parse()?,
            Err(_) => Strategy::default(),
        };
        let data_dir = std::env::var("QUEST_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));
        let api_base_url = std::env::var("QUEST_API_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let api_token = std::env::var("QUEST_API_TOKEN")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let config = Self {
            strategy,
            data_dir,
            api_base_url,
            api_token,
        };
        config.check()?;
        Ok(config)
    }

    pub fn check(&self) -> Result<()> {
        if self.strategy == Strategy::Remote && self.api_base_url.is_none() {
            return Err(QuestError::Configuration(
                "QUEST_API_BASE_URL is required for the remote strategy".to_string(),
            ));
        }
        Ok(())
    }

    fn token(&self) -> Arc<dyn TokenProvider> {
        match &self.api_token {
            Some(t) => Arc::new(StaticToken::new(t.clone())),
            None => Arc::new(StaticToken::none()),
        }
    }

    /// Wire a [`Tracker`] to the configured strategy.
    pub fn open(&self) -> Result<Tracker> {
        self.check()?;
        let tracker = match self.strategy {
            Strategy::Local => {
                let slots: Arc<dyn SlotStore> = Arc::new(FileSlots::new(&self.data_dir));
                Tracker::new(
                    LogStore::new(Arc::new(LocalLog::new(slots.clone()))),
                    GoalsStore::new(Arc::new(LocalGoals::new(slots))),
                )
            }
            Strategy::Remote => {
                let base_url = self.api_base_url.as_deref().ok_or_else(|| {
                    QuestError::Configuration("missing api base url".to_string())
                })?;
                let api = ApiClient::new(base_url, self.token());
                Tracker::new(
                    LogStore::new(Arc::new(RemoteLog::new(api.clone()))),
                    GoalsStore::new(Arc::new(RemoteGoals::new(api))),
                )
            }
        };
        tracing::debug!(strategy = ?self.strategy, "tracker opened");
        Ok(tracker)
    }
}
