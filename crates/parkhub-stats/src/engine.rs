//! Statistics engine.

use chrono::{DateTime, Local, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use parkhub_core::traits::directory::ActorNames;
use parkhub_lot::{PlaceSnapshot, PlaceState};

use crate::export::StatsExport;
use crate::rank::{RankEntry, RankTable};
use crate::report::{RankedEntry, RankedReport, format_duration};

/// Accumulates usage statistics from pre-transition place snapshots.
///
/// All counters live behind one lock, so concurrent [`count`](Self::count)
/// calls never lose an increment.
#[derive(Debug)]
pub struct StatsEngine {
    state: RwLock<StatsExport>,
}

impl StatsEngine {
    /// Create an empty engine seeded with the known actors.
    pub fn new(directory: ActorNames) -> Self {
        Self {
            state: RwLock::new(StatsExport {
                actor_directory: directory,
                ..StatsExport::default()
            }),
        }
    }

    /// Restore an engine from an export.
    pub fn from_export(export: StatsExport) -> Self {
        Self {
            state: RwLock::new(export),
        }
    }

    /// Count a place that is about to change state.
    ///
    /// `snapshot` must be taken *before* the transition:
    /// - `Reserved`: the reservation is turning into an occupancy (or being
    ///   cleared); place, actor, weekday and month each gain one
    /// - `Occupied`: the place is being freed; the time since
    ///   `occupied_since` is added to the total
    /// - `Free`: ignored
    pub async fn count(&self, snapshot: &PlaceSnapshot) {
        self.count_at(snapshot, Utc::now()).await;
    }

    /// Same as [`count`](Self::count) with an explicit clock reading.
    pub async fn count_at(&self, snapshot: &PlaceSnapshot, now: DateTime<Utc>) {
        match snapshot.state {
            PlaceState::Reserved => {
                let Some(occupant) = &snapshot.occupant else {
                    debug!(place = %snapshot.id, "Reserved snapshot without occupant ignored");
                    return;
                };
                let local = now.with_timezone(&Local);
                let weekday = local.format("%A").to_string();
                let month = local.format("%B").to_string();

                let mut state = self.state.write().await;
                state.by_place.increment(snapshot.id.as_str());
                state.by_actor.increment(occupant.as_str());
                state.by_weekday.increment(&weekday);
                state.by_month.increment(&month);
                debug!(
                    place = %snapshot.id,
                    actor = %occupant,
                    weekday = %weekday,
                    month = %month,
                    "Occupancy counted"
                );
            }
            PlaceState::Occupied => {
                let Some(since) = snapshot.occupied_since else {
                    debug!(place = %snapshot.id, "Occupied snapshot without start ignored");
                    return;
                };
                let elapsed = (now - since).num_milliseconds().max(0) as f64 / 1000.0;

                let mut state = self.state.write().await;
                state.total_occupied_seconds += elapsed;
                debug!(place = %snapshot.id, elapsed, "Occupied time counted");
            }
            PlaceState::Free => {
                debug!(place = %snapshot.id, "Free place not counted");
            }
        }
    }

    /// Add actors not yet known. Existing names are never replaced or
    /// removed, so historical tables keep rendering.
    pub async fn update_actor_directory(&self, directory: &ActorNames) -> usize {
        let mut state = self.state.write().await;
        let mut added = 0;
        for (actor, name) in directory {
            if !state.actor_directory.contains_key(actor) {
                state.actor_directory.insert(actor.clone(), name.clone());
                added += 1;
            }
        }
        if added > 0 {
            info!(added, "Statistics directory extended");
        }
        added
    }

    /// Build the ranked report.
    pub async fn ranked_report(&self) -> RankedReport {
        let state = self.state.read().await;

        let plain = |table: &RankTable| -> Vec<RankedEntry> {
            table
                .ranked()
                .into_iter()
                .map(|RankEntry { key, count }| RankedEntry {
                    label: key.clone(),
                    key,
                    count,
                })
                .collect()
        };

        let actors = state
            .by_actor
            .ranked()
            .into_iter()
            .map(|RankEntry { key, count }| RankedEntry {
                label: state
                    .actor_directory
                    .get(key.as_str())
                    .cloned()
                    .unwrap_or_else(|| key.clone()),
                key,
                count,
            })
            .collect();

        RankedReport {
            places: plain(&state.by_place),
            actors,
            weekdays: plain(&state.by_weekday),
            months: plain(&state.by_month),
            total_reservations: state.by_place.total(),
            total_occupied_seconds: state.total_occupied_seconds,
            total_time: format_duration(state.total_occupied_seconds),
        }
    }

    /// Copy of the whole state.
    pub async fn export(&self) -> StatsExport {
        self.state.read().await.clone()
    }

    /// Replace the whole state with `export`.
    pub async fn import(&self, export: StatsExport) {
        let mut state = self.state.write().await;
        *state = export;
        info!(
            places = state.by_place.len(),
            actors = state.by_actor.len(),
            "Statistics imported"
        );
    }
}
