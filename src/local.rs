//! Local strategy: whole-day JSON documents in durable key-value slots.
//!
//! Each day lives in slot `foodlog_<YYYY-MM-DD>`, read in full and rewritten
//! in full on every mutation. Goals and profile use the `quest` and
//! `userProfile` slots.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::backend::{GoalsBackend, LogBackend};
use crate::daily::{date_key, local_date};
use crate::error::{QuestError, Result};
use crate::models::{FoodEntry, NutritionGoals, UserProfile};

pub const GOALS_SLOT: &str = "quest";
pub const PROFILE_SLOT: &str = "userProfile";

pub fn log_slot(date: NaiveDate) -> String {
    format!("foodlog_{}", date_key(date))
}

/// Durable string slots keyed by name.
#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// Slots held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySlots {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SlotStore for MemorySlots {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.slots.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.slots
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per slot under a directory.
#[derive(Debug, Clone)]
pub struct FileSlots {
    dir: PathBuf,
}

impl FileSlots {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl SlotStore for FileSlots {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating {}", self.dir.display()))?;

        // Write-then-rename so a crash never leaves a truncated slot. Each
        // write gets its own temp file so concurrent sets of one key cannot
        // rename each other's file away.
        let path = self.path(key);
        let tmp = self.dir.join(format!(".{key}.{}.tmp", Uuid::new_v4()));
        tokio::fs::write(&tmp, value)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }
}

async fn read_slot<T: DeserializeOwned>(slots: &dyn SlotStore, key: &str) -> anyhow::Result<Option<T>> {
    match slots.get(key).await? {
        Some(raw) => {
            let value = serde_json::from_str(&raw).with_context(|| format!("parsing slot {key}"))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

async fn write_slot<T: Serialize + ?Sized>(
    slots: &dyn SlotStore,
    key: &str,
    value: &T,
) -> anyhow::Result<()> {
    let raw = serde_json::to_string(value).with_context(|| format!("encoding slot {key}"))?;
    slots.set(key, &raw).await
}

/// Food log kept in local slots.
pub struct LocalLog {
    slots: Arc<dyn SlotStore>,
    // Serializes read-modify-write cycles so concurrent adds cannot drop each other
    write_lock: Mutex<()>,
}

impl LocalLog {
    pub fn new(slots: Arc<dyn SlotStore>) -> Self {
        Self {
            slots,
            write_lock: Mutex::new(()),
        }
    }

    async fn read_day(&self, key: &str) -> anyhow::Result<Vec<FoodEntry>> {
        Ok(read_slot(self.slots.as_ref(), key).await?.unwrap_or_default())
    }
}

#[async_trait]
impl LogBackend for LocalLog {
    async fn fetch(&self, date: NaiveDate) -> Result<Vec<FoodEntry>> {
        Ok(self.read_day(&log_slot(date)).await?)
    }

    async fn create(&self, entry: &FoodEntry) -> Result<FoodEntry> {
        let _guard = self.write_lock.lock().await;
        let key = log_slot(local_date(&entry.timestamp));
        let mut day = self.read_day(&key).await?;
        if day.iter().any(|e| e.id == entry.id) {
            return Err(anyhow!("entry {} already exists in {key}", entry.id).into());
        }
        day.push(entry.clone());
        write_slot(self.slots.as_ref(), &key, &day).await?;
        Ok(entry.clone())
    }

    async fn update(&self, entry: &FoodEntry) -> Result<FoodEntry> {
        let _guard = self.write_lock.lock().await;
        let key = log_slot(local_date(&entry.timestamp));
        let mut day = self.read_day(&key).await?;
        let slot = day
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or_else(|| QuestError::NotFound(entry.id.clone()))?;
        *slot = entry.clone();
        write_slot(self.slots.as_ref(), &key, &day).await?;
        Ok(entry.clone())
    }

    async fn delete(&self, entry: &FoodEntry) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let key = log_slot(local_date(&entry.timestamp));
        let mut day = self.read_day(&key).await?;
        let before = day.len();
        day.retain(|e| e.id != entry.id);
        if day.len() == before {
            return Err(QuestError::NotFound(entry.id.clone()));
        }
        write_slot(self.slots.as_ref(), &key, &day).await?;
        Ok(())
    }
}

/// Goals and profile kept in local slots.
#[derive(Clone)]
pub struct LocalGoals {
    slots: Arc<dyn SlotStore>,
}

impl LocalGoals {
    pub fn new(slots: Arc<dyn SlotStore>) -> Self {
        Self { slots }
    }
}

#[async_trait]
impl GoalsBackend for LocalGoals {
    async fn load_goals(&self) -> Result<Option<NutritionGoals>> {
        Ok(read_slot(self.slots.as_ref(), GOALS_SLOT).await?)
    }

    async fn save_goals(&self, goals: &NutritionGoals) -> Result<()> {
        Ok(write_slot(self.slots.as_ref(), GOALS_SLOT, goals).await?)
    }

    async fn load_profile(&self) -> Result<Option<UserProfile>> {
        Ok(read_slot(self.slots.as_ref(), PROFILE_SLOT).await?)
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        Ok(write_slot(self.slots.as_ref(), PROFILE_SLOT, profile).await?)
    }
}
