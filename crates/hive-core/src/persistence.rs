//! Save and restore the best mother seen so far.

use crate::constants::{BRAIN_HIDDEN, BRAIN_INPUTS, BRAIN_OUTPUTS};
use crate::goal::GoalNet;
use crate::nn::{FeedforwardNet, ShapeError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed champion file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported champion format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("saved network has the wrong shape: {0}")]
    Topology(#[from] ShapeError),
    #[error("no champion has been recorded yet")]
    NoChampion,
}

/// Snapshot of the highest-scoring living mother.
#[derive(Clone, Debug, PartialEq)]
pub struct Champion {
    pub brain: FeedforwardNet,
    pub goal_net: GoalNet,
    pub points: u32,
}

#[derive(Serialize, Deserialize)]
struct SavedChampion {
    format_version: u32,
    brain: FeedforwardNet,
    goal_net: FeedforwardNet,
    points: u32,
}

/// Reject networks that could not drive a creature.
pub fn check_brain(brain: &FeedforwardNet) -> Result<(), ShapeError> {
    brain.validate()?;
    if !brain.has_topology(BRAIN_INPUTS, &BRAIN_HIDDEN, BRAIN_OUTPUTS) {
        return Err(ShapeError::Topology {
            expected: format!("{BRAIN_INPUTS}->{BRAIN_HIDDEN:?}->{BRAIN_OUTPUTS}"),
            actual: brain.topology(),
        });
    }
    Ok(())
}

impl Champion {
    pub fn to_json(&self) -> Result<String, PersistError> {
        let saved = SavedChampion {
            format_version: FORMAT_VERSION,
            brain: self.brain.clone(),
            goal_net: self.goal_net.net().clone(),
            points: self.points,
        };
        Ok(serde_json::to_string_pretty(&saved)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let saved: SavedChampion = serde_json::from_str(json)?;
        if saved.format_version != FORMAT_VERSION {
            return Err(PersistError::UnsupportedVersion {
                found: saved.format_version,
                expected: FORMAT_VERSION,
            });
        }
        check_brain(&saved.brain)?;
        let goal_net = GoalNet::from_net(saved.goal_net)?;
        Ok(Self {
            brain: saved.brain,
            goal_net,
            points: saved.points,
        })
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        let io_err = |source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, self.to_json()?).map_err(io_err)?;
        info!(path = %path.display(), points = self.points, "saved champion");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, PersistError> {
        let json = fs::read_to_string(path).map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let champion = Self::from_json(&json)?;
        info!(path = %path.display(), points = champion.points, "loaded champion");
        Ok(champion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{GOAL_INPUTS, GOAL_SIGNALS};
    use crate::rng::create_rng;

    fn champion(seed: u64) -> Champion {
        let mut rng = create_rng(seed);
        Champion {
            brain: FeedforwardNet::new(BRAIN_INPUTS, &BRAIN_HIDDEN, BRAIN_OUTPUTS, &mut rng),
            goal_net: GoalNet::new(&mut rng),
            points: 321,
        }
    }

    #[test]
    fn save_then_load_restores_exact_weights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("best.json");
        let original = champion(5);
        original.save(&path).unwrap();
        let loaded = Champion::load(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Champion::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, PersistError::Io { .. }));
    }

    #[test]
    fn garbage_is_a_json_error() {
        assert!(matches!(
            Champion::from_json("{ not json"),
            Err(PersistError::Json(_))
        ));
    }

    #[test]
    fn future_versions_are_rejected() {
        let json = champion(6).to_json().unwrap().replace(
            &format!("\"format_version\": {FORMAT_VERSION}"),
            "\"format_version\": 99",
        );
        assert!(matches!(
            Champion::from_json(&json),
            Err(PersistError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn wrong_topologies_are_rejected() {
        let mut rng = create_rng(7);
        let mut bad = champion(7);
        bad.brain = FeedforwardNet::new(29, &BRAIN_HIDDEN, BRAIN_OUTPUTS, &mut rng);
        let json = bad.to_json().unwrap();
        assert!(matches!(
            Champion::from_json(&json),
            Err(PersistError::Topology(ShapeError::Topology { .. }))
        ));

        let saved = SavedChampion {
            format_version: FORMAT_VERSION,
            brain: champion(8).brain,
            goal_net: FeedforwardNet::new(GOAL_INPUTS, &[8], GOAL_SIGNALS, &mut rng),
            points: 1,
        };
        let json = serde_json::to_string(&saved).unwrap();
        assert!(matches!(
            Champion::from_json(&json),
            Err(PersistError::Topology(_))
        ));
    }
}
