//! Local player profile: points, inventory and collected pickups, optionally
//! persisted to a JSON save file.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tallgrass_core::{
    BonusProvider, Bonuses, CollectibleId, CollectionStore, Inventory, InventoryItem, ItemEffect,
    RewardSink,
};
use thiserror::Error;
use tracing::{debug, info, warn};

const SAVE_VERSION: u32 = 1;

/// Persisted shape of the profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct ProfileSnapshot {
    /// Save format version.
    pub(crate) version: u32,
    /// Points collected so far.
    pub(crate) points: u32,
    /// Pickups already taken off the map.
    pub(crate) collected: Vec<CollectibleId>,
    /// Items held, in acquisition order.
    pub(crate) inventory: Vec<InventoryItem>,
}

/// Errors raised while reading or writing the save file.
#[derive(Debug, Error)]
pub(crate) enum ProfileError {
    /// The save file could not be read or written.
    #[error("could not access save file {path}")]
    Io {
        /// Location of the save file.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The save file does not hold a valid profile.
    #[error("could not parse save file")]
    Parse(#[from] serde_json::Error),
    /// The save file was written by an incompatible version.
    #[error("save version {0} is not supported")]
    UnsupportedVersion(u32),
}

impl ProfileSnapshot {
    /// Encodes the snapshot as pretty-printed JSON.
    pub(crate) fn encode(&self) -> Result<String, ProfileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes a snapshot, rejecting unknown versions.
    pub(crate) fn decode(value: &str) -> Result<Self, ProfileError> {
        let snapshot: Self = serde_json::from_str(value)?;
        if snapshot.version != SAVE_VERSION {
            return Err(ProfileError::UnsupportedVersion(snapshot.version));
        }
        Ok(snapshot)
    }
}

/// Profile kept in memory and mirrored to disk after every change.
///
/// Save failures are logged and otherwise ignored; play never stops because
/// the disk is unavailable.
#[derive(Debug, Default)]
pub(crate) struct LocalProfile {
    snapshot: ProfileSnapshot,
    save_path: Option<PathBuf>,
}

impl LocalProfile {
    /// Loads the profile stored at `path`, starting fresh when it is absent or unreadable.
    pub(crate) fn open(path: Option<PathBuf>) -> Self {
        let snapshot = match path.as_deref() {
            Some(path) => match read_snapshot(path) {
                Ok(Some(snapshot)) => {
                    info!(
                        path = %path.display(),
                        points = snapshot.points,
                        items = snapshot.inventory.len(),
                        "profile loaded"
                    );
                    snapshot
                }
                Ok(None) => ProfileSnapshot::default(),
                Err(error) => {
                    warn!(%error, "ignoring unreadable save file");
                    ProfileSnapshot::default()
                }
            },
            None => ProfileSnapshot::default(),
        };

        Self {
            snapshot: ProfileSnapshot {
                version: SAVE_VERSION,
                ..snapshot
            },
            save_path: path,
        }
    }

    /// Points collected so far.
    pub(crate) fn points(&self) -> u32 {
        self.snapshot.points
    }

    /// Items held, in acquisition order.
    pub(crate) fn inventory(&self) -> &[InventoryItem] {
        &self.snapshot.inventory
    }

    fn persist(&self) {
        let Some(path) = &self.save_path else {
            return;
        };
        if let Err(error) = write_snapshot(path, &self.snapshot) {
            warn!(%error, "profile not saved");
        }
    }
}

fn read_snapshot(path: &Path) -> Result<Option<ProfileSnapshot>, ProfileError> {
    match fs::read_to_string(path) {
        Ok(contents) => ProfileSnapshot::decode(&contents).map(Some),
        Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ProfileError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_snapshot(path: &Path, snapshot: &ProfileSnapshot) -> Result<(), ProfileError> {
    let encoded = snapshot.encode()?;
    fs::write(path, encoded).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl RewardSink for LocalProfile {
    fn award_points(&mut self, amount: u32) {
        self.snapshot.points = self.snapshot.points.saturating_add(amount);
        debug!(amount, total = self.snapshot.points, "points awarded");
        self.persist();
    }
}

impl BonusProvider for LocalProfile {
    fn bonuses(&self) -> Bonuses {
        let effects: Vec<ItemEffect> = self
            .snapshot
            .inventory
            .iter()
            .filter_map(|item| ItemEffect::for_item(&item.id))
            .collect();
        Bonuses::from_effects(&effects)
    }
}

impl Inventory for LocalProfile {
    fn add_item(&mut self, item: InventoryItem) -> bool {
        if self.snapshot.inventory.iter().any(|held| held.id == item.id) {
            return false;
        }
        self.snapshot.inventory.push(item);
        self.persist();
        true
    }
}

impl CollectionStore for LocalProfile {
    fn collected_ids(&self) -> Vec<CollectibleId> {
        self.snapshot.collected.clone()
    }

    fn record_collected(&mut self, id: &CollectibleId) {
        if self.snapshot.collected.contains(id) {
            return;
        }
        self.snapshot.collected.push(id.clone());
        self.persist();
    }
}
