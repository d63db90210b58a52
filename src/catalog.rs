use std::path::Path;

use tracing::{info, warn};

use crate::model::{Resource, ResourceKind};
use crate::snapshot::Snapshot;

pub const RESOURCES_FILE: &str = "resources.json";

/// The resources every fresh install starts with.
pub const DEFAULT_RESOURCES: [(&str, &str, ResourceKind); 5] = [
    ("microscope-a", "Microscope A", ResourceKind::Equipment),
    ("microscope-b", "Microscope B", ResourceKind::Equipment),
    ("cold-room-1", "Cold Room 1", ResourceKind::Room),
    ("centrifuge", "Centrifuge", ResourceKind::Equipment),
    ("pcr-machine", "PCR Machine", ResourceKind::Equipment),
];

pub fn default_resources() -> Vec<Resource> {
    DEFAULT_RESOURCES
        .iter()
        .map(|&(id, name, kind)| Resource::new(id, name, kind))
        .collect()
}

/// Read-only list of bookable resources, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ResourceCatalog {
    resources: Vec<Resource>,
}

impl ResourceCatalog {
    /// Load `resources.json` from `data_dir`, seeding it with the defaults if
    /// it does not exist. Never fails: an unreadable or corrupt document, or a
    /// failed seed write, leaves the defaults in memory and logs a warning.
    pub fn load_or_seed(data_dir: &Path) -> Self {
        let snapshot = Snapshot::new(data_dir.join(RESOURCES_FILE));
        let resources = match snapshot.load::<Resource>() {
            Ok(Some(resources)) => {
                info!("loaded {} resources from {}", resources.len(), snapshot.path().display());
                resources
            }
            Ok(None) => {
                let defaults = default_resources();
                match snapshot.write(&defaults) {
                    Ok(()) => info!("seeded resource catalog at {}", snapshot.path().display()),
                    Err(e) => warn!("could not seed {}: {e}; using defaults", snapshot.path().display()),
                }
                defaults
            }
            Err(e) => {
                warn!("could not load {}: {e}; using defaults", snapshot.path().display());
                default_resources()
            }
        };
        Self { resources }
    }

    pub fn list(&self) -> &[Resource] {
        &self.resources
    }

    pub fn get(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Display name for `id`, or `id` itself when no resource matches.
    pub fn name_of(&self, id: &str) -> String {
        self.get(id).map_or_else(|| id.to_string(), |r| r.name.clone())
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Default for ResourceCatalog {
    fn default() -> Self {
        Self {
            resources: default_resources(),
        }
    }
}
