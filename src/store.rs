//! In-memory food log and goals, kept consistent with one persistence adapter.
//!
//! Every mutation is write-through: the adapter must confirm before the
//! in-memory collection changes, so a failed call leaves the collection
//! exactly as it was. Dropping a pending future cancels it before anything
//! is applied.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::backend::{GoalsBackend, LogBackend};
use crate::daily::{aggregate, local_date, today, DailyLog};
use crate::entry::{apply_patch, normalize};
use crate::error::{QuestError, Result};
use crate::models::{FoodEntry, FoodPatch, FoodSubmission, NutritionGoals, UserProfile};
use crate::progress::ProgressView;

struct LogState {
    date: NaiveDate,
    entries: Vec<FoodEntry>,
    /// Bumped whenever the view is reloaded or reset; results started under
    /// an older epoch are discarded.
    epoch: u64,
}

/// Authoritative in-memory collection of food entries.
pub struct LogStore {
    backend: Arc<dyn LogBackend>,
    state: Mutex<LogState>,
    in_flight: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

/// Held while a mutation for one id is pending or waiting its turn.
///
/// Dropping it, including when the waiting future is cancelled, releases
/// the id and removes the map entry once no one else references it.
struct InFlight<'a> {
    store: &'a LogStore,
    id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.store.release(&self.id);
    }
}

impl LogStore {
    pub fn new(backend: Arc<dyn LogBackend>) -> Self {
        Self {
            backend,
            state: Mutex::new(LogState {
                date: today(),
                entries: Vec::new(),
                epoch: 0,
            }),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    fn state(&self) -> MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn in_flight(&self) -> MutexGuard<'_, HashMap<String, Arc<AsyncMutex<()>>>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait until no other mutation for `id` is pending, then claim it.
    async fn claim(&self, id: &str) -> InFlight<'_> {
        let lock = {
            let mut map = self.in_flight();
            // Entries only the map still references belong to nobody
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            map.entry(id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        let mut claim = InFlight {
            store: self,
            id: id.to_string(),
            guard: None,
        };
        claim.guard = Some(lock.lock_owned().await);
        claim
    }

    fn release(&self, id: &str) {
        let mut map = self.in_flight();
        if map.get(id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            map.remove(id);
        }
    }

    fn epoch(&self) -> u64 {
        self.state().epoch
    }

    /// Lock the state for applying a result, unless the view moved on.
    fn current(&self, epoch: u64) -> Result<MutexGuard<'_, LogState>> {
        let state = self.state();
        if state.epoch != epoch {
            warn!(epoch, current = state.epoch, "discarding result for a superseded view");
            return Err(QuestError::Superseded);
        }
        Ok(state)
    }

    fn find(&self, id: &str) -> Result<FoodEntry> {
        self.state()
            .entries
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| QuestError::NotFound(id.to_string()))
    }

    /// Replace the collection with what the adapter holds for `date`.
    ///
    /// Starts a new view: results of operations begun before this call are
    /// discarded. On failure the previous collection is kept.
    pub async fn load(&self, date: NaiveDate) -> Result<Vec<FoodEntry>> {
        let epoch = {
            let mut state = self.state();
            state.epoch += 1;
            state.epoch
        };

        let entries = self.backend.fetch(date).await.inspect_err(|e| {
            warn!(%date, error = %e, "failed to load food log");
        })?;

        {
            let mut state = self.current(epoch)?;
            state.date = date;
            state.entries = entries;
        }
        debug!(%date, "food log loaded");
        Ok(self.list_for_date(date))
    }

    /// Forget the loaded collection, e.g. when the owning view goes away.
    pub fn reset(&self) {
        let mut state = self.state();
        state.epoch += 1;
        state.entries.clear();
    }

    /// The date of the most recent successful [`LogStore::load`].
    pub fn loaded_date(&self) -> NaiveDate {
        self.state().date
    }

    /// Validate a submission and persist it.
    pub async fn add(&self, submission: FoodSubmission) -> Result<FoodEntry> {
        let entry = normalize(submission)?;
        self.add_entry(entry).await
    }

    /// Persist an already-normalized entry.
    ///
    /// Concurrent adds apply in completion order; listings sort by timestamp.
    pub async fn add_entry(&self, entry: FoodEntry) -> Result<FoodEntry> {
        let epoch = self.epoch();
        let stored = self.backend.create(&entry).await.inspect_err(|e| {
            warn!(id = %entry.id, error = %e, "failed to add food entry");
        })?;

        {
            let mut state = self.current(epoch)?;
            state.entries.retain(|e| e.id != stored.id);
            state.entries.push(stored.clone());
        }
        debug!(id = %stored.id, calories = stored.calories, "food entry added");
        Ok(stored)
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        let _claim = self.claim(id).await;
        let epoch = self.epoch();
        let entry = self.find(id)?;

        self.backend.delete(&entry).await.inspect_err(|e| {
            warn!(%id, error = %e, "failed to remove food entry");
        })?;

        self.current(epoch)?.entries.retain(|e| e.id != id);
        debug!(%id, "food entry removed");
        Ok(())
    }

    pub async fn update(&self, id: &str, patch: &FoodPatch) -> Result<FoodEntry> {
        let _claim = self.claim(id).await;
        let epoch = self.epoch();
        let current = self.find(id)?;
        let updated = apply_patch(&current, patch)?;

        let stored = self.backend.update(&updated).await.inspect_err(|e| {
            warn!(%id, error = %e, "failed to update food entry");
        })?;

        {
            let mut state = self.current(epoch)?;
            match state.entries.iter_mut().find(|e| e.id == id) {
                Some(slot) => *slot = stored.clone(),
                None => return Err(QuestError::NotFound(id.to_string())),
            }
        }
        debug!(%id, "food entry updated");
        Ok(stored)
    }

    /// Entries logged on `date` (local time), oldest first.
    pub fn list_for_date(&self, date: NaiveDate) -> Vec<FoodEntry> {
        let mut entries: Vec<FoodEntry> = self
            .state()
            .entries
            .iter()
            .filter(|e| local_date(&e.timestamp) == date)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.timestamp);
        entries
    }

    pub fn daily_log(&self, date: NaiveDate) -> DailyLog {
        aggregate(&self.list_for_date(date), date)
    }

    pub fn progress(&self, date: NaiveDate, goals: Option<&NutritionGoals>) -> Result<ProgressView> {
        ProgressView::compute(&self.daily_log(date), goals)
    }
}

/// The user's profile and nutrition goals.
pub struct GoalsStore {
    backend: Arc<dyn GoalsBackend>,
    goals: Mutex<Option<NutritionGoals>>,
    profile: Mutex<Option<UserProfile>>,
}

impl GoalsStore {
    pub fn new(backend: Arc<dyn GoalsBackend>) -> Self {
        Self {
            backend,
            goals: Mutex::new(None),
            profile: Mutex::new(None),
        }
    }

    pub fn goals(&self) -> Option<NutritionGoals> {
        *self.goals.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.profile
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_cached_goals(&self, goals: NutritionGoals) {
        *self.goals.lock().unwrap_or_else(PoisonError::into_inner) = Some(goals);
    }

    fn set_cached_profile(&self, profile: UserProfile) {
        *self.profile.lock().unwrap_or_else(PoisonError::into_inner) = Some(profile);
    }

    /// Read goals and profile from the adapter. `None` means onboarding
    /// has not happened yet.
    pub async fn load(&self) -> Result<Option<NutritionGoals>> {
        let (goals, profile) = self.backend.load_state().await?;
        if let Some(goals) = goals {
            self.set_cached_goals(goals);
        }
        if let Some(profile) = profile {
            self.set_cached_profile(profile);
        }
        Ok(goals)
    }

    /// Validate the profile, derive goals from it and persist both.
    ///
    /// If the goals cannot be saved, the previously stored profile is
    /// written back so storage never holds a profile without its goals.
    pub async fn onboard(&self, profile: UserProfile) -> Result<NutritionGoals> {
        profile.validate()?;
        let goals = NutritionGoals::from_profile(&profile);
        let previous = self.backend.load_profile().await?;

        self.backend.save_profile(&profile).await.inspect_err(|e| {
            warn!(error = %e, "failed to save profile");
        })?;
        if let Err(e) = self.backend.save_goals(&goals).await {
            warn!(error = %e, "failed to save goals");
            if let Some(previous) = previous {
                if let Err(restore) = self.backend.save_profile(&previous).await {
                    warn!(error = %restore, "failed to restore previous profile");
                }
            }
            return Err(e);
        }

        self.set_cached_profile(profile);
        self.set_cached_goals(goals);
        debug!(daily_calorie_goal = goals.daily_calorie_goal, "onboarding complete");
        Ok(goals)
    }

    /// Override the goals, e.g. with user-edited values.
    pub async fn set_goals(&self, goals: NutritionGoals) -> Result<()> {
        goals.validate()?;
        self.backend.save_goals(&goals).await.inspect_err(|e| {
            warn!(error = %e, "failed to save goals");
        })?;
        self.set_cached_goals(goals);
        Ok(())
    }

    /// Save an edited profile. Goals are left alone.
    pub async fn update_profile(&self, profile: UserProfile) -> Result<()> {
        profile.validate()?;
        self.backend.save_profile(&profile).await.inspect_err(|e| {
            warn!(error = %e, "failed to save profile");
        })?;
        self.set_cached_profile(profile);
        Ok(())
    }
}

/// A log store and goals store wired to the same strategy.
pub struct Tracker {
    pub log: LogStore,
    pub goals: GoalsStore,
}

impl Tracker {
    pub fn new(log: LogStore, goals: GoalsStore) -> Self {
        Self { log, goals }
    }

    /// Progress for `date` against the current goals.
    pub fn progress(&self, date: NaiveDate) -> Result<ProgressView> {
        self.log.progress(date, self.goals.goals().as_ref())
    }
}
