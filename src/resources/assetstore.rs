//! Shared frame sequences loaded from the asset pipeline output.
//!
//! Layout on disk:
//!
//! ```text
//! <dir>/bodies/<name>.json          [BodyFrame, ...]   one body variant
//! <dir>/bodyparts/<type>-<name>.json [PartFrame, ...]  one part variant
//! ```
//!
//! Part sequences are sorted by `frame` on load. Every pet reads the same
//! `Arc`s; nothing mutates them once the store is ready.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use log::{debug, info, warn};
use rustc_hash::FxHashMap;

use crate::components::animationplayer::{CLOSED_EYE_VARIANT, PetLook};
use crate::components::frame::{BodyFrame, PartFrame, PartType};
use crate::components::partslot::{PartSlot, PartSlots};
use crate::error::PetError;

#[derive(Resource, Default)]
pub struct AssetStore {
    bodies: Vec<Arc<[BodyFrame]>>,
    parts: Vec<Arc<[PartFrame]>>,
    /// Part variant indices grouped by type.
    by_type: FxHashMap<PartType, Vec<usize>>,
    ready: bool,
}

impl AssetStore {
    /// An empty store that is not ready yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ready store from already-loaded sequences.
    pub fn from_sequences(bodies: Vec<Arc<[BodyFrame]>>, parts: Vec<Arc<[PartFrame]>>) -> Self {
        let mut store = Self::new();
        for body in bodies {
            store.insert_body(body);
        }
        for part in parts {
            store.insert_part(part);
        }
        store.ready = true;
        store
    }

    /// Load every body and part file below `dir` and mark the store ready.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, PetError> {
        let dir = dir.as_ref();
        let mut store = Self::new();
        for path in json_files(&dir.join("bodies"))? {
            let frames: Vec<BodyFrame> = read_json(&path)?;
            debug!("body {:?}: {} frames", path, frames.len());
            store.insert_body(frames.into());
        }
        for path in json_files(&dir.join("bodyparts"))? {
            let mut frames: Vec<PartFrame> = read_json(&path)?;
            frames.sort_by_key(|f| f.frame);
            debug!("part {:?}: {} frames", path, frames.len());
            store.insert_part(frames.into());
        }
        store.ready = true;
        info!(
            "Loaded {} body variants and {} part variants from {:?}",
            store.bodies.len(),
            store.parts.len(),
            dir
        );
        Ok(store)
    }

    fn insert_body(&mut self, body: Arc<[BodyFrame]>) {
        if body.is_empty() {
            warn!("skipping empty body sequence");
            return;
        }
        self.bodies.push(body);
    }

    fn insert_part(&mut self, part: Arc<[PartFrame]>) {
        let Some(first) = part.first() else {
            warn!("skipping empty part sequence");
            return;
        };
        let part_type = first.part_type;
        self.by_type
            .entry(part_type)
            .or_default()
            .push(self.parts.len());
        self.parts.push(part);
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    fn ensure_ready(&self) -> Result<(), PetError> {
        if self.ready {
            Ok(())
        } else {
            Err(PetError::NotReady)
        }
    }

    /// A randomly chosen whole body sequence.
    pub fn random_body(&self, rng: &mut fastrand::Rng) -> Result<Arc<[BodyFrame]>, PetError> {
        self.ensure_ready()?;
        if self.bodies.is_empty() {
            return Err(PetError::AssetNotFound("no body variants loaded".into()));
        }
        Ok(self.bodies[rng.usize(0..self.bodies.len())].clone())
    }

    /// A random variant of `part_type`, skipping variants named in `exclude`.
    pub fn random_part(
        &self,
        part_type: PartType,
        exclude: &[&str],
        rng: &mut fastrand::Rng,
    ) -> Result<Arc<[PartFrame]>, PetError> {
        self.ensure_ready()?;
        let candidates: Vec<usize> = self
            .by_type
            .get(&part_type)
            .into_iter()
            .flatten()
            .copied()
            .filter(|&i| !exclude.contains(&self.parts[i][0].name.as_str()))
            .collect();
        if candidates.is_empty() {
            return Err(PetError::AssetNotFound(format!(
                "no '{}' part variant",
                part_type.as_str()
            )));
        }
        Ok(self.parts[candidates[rng.usize(0..candidates.len())]].clone())
    }

    /// The `other` counterpart of a variant: same name, `other` type
    /// (e.g. the `leg2` that pairs with a `leg1`).
    pub fn matching_part(
        &self,
        part: &[PartFrame],
        other: PartType,
    ) -> Result<Arc<[PartFrame]>, PetError> {
        self.ensure_ready()?;
        let name = part
            .first()
            .map(|f| f.name.as_str())
            .ok_or_else(|| PetError::AssetNotFound("empty part sequence".into()))?;
        self.by_type
            .get(&other)
            .into_iter()
            .flatten()
            .map(|&i| &self.parts[i])
            .find(|seq| seq[0].name == name)
            .cloned()
            .ok_or_else(|| {
                PetError::AssetNotFound(format!("no '{}' part named '{}'", other.as_str(), name))
            })
    }

    /// First frame of the reserved closed-eye variant.
    pub fn closed_eye(&self) -> Result<Arc<PartFrame>, PetError> {
        self.ensure_ready()?;
        self.parts
            .iter()
            .find(|seq| seq[0].name == CLOSED_EYE_VARIANT)
            .map(|seq| Arc::new(seq[0].clone()))
            .ok_or_else(|| PetError::AssetNotFound(format!("no '{}' eye", CLOSED_EYE_VARIANT)))
    }

    /// Choose every variant one pet needs.
    ///
    /// Legs and arms come in matching pairs, both eyes share one non-closed
    /// variant.
    pub fn pick_look(&self, rng: &mut fastrand::Rng) -> Result<PetLook, PetError> {
        let bodies = self.random_body(rng)?;
        let mouth = self.random_part(PartType::Mouth, &[], rng)?;
        let leg1 = self.random_part(PartType::Leg1, &[], rng)?;
        let leg2 = self.matching_part(&leg1, PartType::Leg2)?;
        let arm1 = self.random_part(PartType::Arm1, &[], rng)?;
        let arm2 = self.matching_part(&arm1, PartType::Arm2)?;
        let eye = self.random_part(PartType::Eye, &[CLOSED_EYE_VARIANT], rng)?;
        let closed_eye = self.closed_eye()?;

        let parts = PartSlots::from_fn(|slot| match slot {
            PartSlot::Mouth => mouth.clone(),
            PartSlot::Leg1 => leg1.clone(),
            PartSlot::Leg2 => leg2.clone(),
            PartSlot::Arm1 => arm1.clone(),
            PartSlot::Arm2 => arm2.clone(),
            PartSlot::Eye1 | PartSlot::Eye2 => eye.clone(),
        });
        Ok(PetLook {
            bodies,
            parts,
            closed_eye,
        })
    }
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>, PetError> {
    let entries = fs::read_dir(dir).map_err(|source| PetError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PetError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    // Stable variant order regardless of directory iteration order.
    files.sort();
    Ok(files)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, PetError> {
    let text = fs::read_to_string(path).map_err(|source| PetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| PetError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn rng() -> fastrand::Rng {
        fastrand::Rng::with_seed(3)
    }

    #[test]
    fn test_new_store_is_not_ready() {
        let store = AssetStore::new();
        assert!(!store.is_ready());
        assert!(matches!(store.random_body(&mut rng()), Err(PetError::NotReady)));
        assert!(matches!(store.closed_eye(), Err(PetError::NotReady)));
    }

    #[test]
    fn test_random_part_respects_exclusions() {
        let store = fixtures::store();
        let mut rng = rng();
        for _ in 0..20 {
            let eye = store.random_part(PartType::Eye, &[CLOSED_EYE_VARIANT], &mut rng).unwrap();
            assert_eq!(eye[0].name, "ROUND");
        }
    }

    #[test]
    fn test_missing_part_type_is_asset_not_found() {
        let store = AssetStore::from_sequences(vec![fixtures::body_sequence("blob", 1)], vec![]);
        let err = store.random_part(PartType::Mouth, &[], &mut rng()).unwrap_err();
        assert!(matches!(err, PetError::AssetNotFound(_)));
        assert!(store.pick_look(&mut rng()).is_err());
    }

    #[test]
    fn test_empty_store_has_no_body() {
        let store = AssetStore::from_sequences(vec![], vec![]);
        assert!(matches!(
            store.random_body(&mut rng()),
            Err(PetError::AssetNotFound(_))
        ));
    }

    #[test]
    fn test_matching_part_pairs_by_name() {
        let store = fixtures::store();
        let leg1 = store.random_part(PartType::Leg1, &[], &mut rng()).unwrap();
        let leg2 = store.matching_part(&leg1, PartType::Leg2).unwrap();
        assert_eq!(leg2[0].part_type, PartType::Leg2);
        assert_eq!(leg2[0].name, leg1[0].name);
    }

    #[test]
    fn test_pick_look_fills_every_slot() {
        let store = fixtures::store();
        let look = store.pick_look(&mut rng()).unwrap();
        for (slot, seq) in look.parts.iter() {
            assert_eq!(seq[0].part_type, slot.part_type());
        }
        assert_eq!(look.closed_eye.name, CLOSED_EYE_VARIANT);
        assert!(Arc::ptr_eq(&look.parts[PartSlot::Eye1], &look.parts[PartSlot::Eye2]));
    }

    #[test]
    fn test_load_dir_reads_and_sorts_sequences() {
        let dir = std::env::temp_dir().join(format!("petsprite-assets-{}", std::process::id()));
        fs::create_dir_all(dir.join("bodies")).unwrap();
        fs::create_dir_all(dir.join("bodyparts")).unwrap();
        fs::write(
            dir.join("bodies/blob.json"),
            r#"[{"path":"M 0 0 L 5 5","points":[],"frame":0,"name":"blob","size":{"x":5,"y":5}}]"#,
        )
        .unwrap();
        fs::write(
            dir.join("bodyparts/mouth-SMILE.json"),
            r#"[
              {"path":"M 0 0","type":"mouth","frame":1,"name":"SMILE","boundingBox":{"topLeft":{"x":0,"y":0},"bottomRight":{"x":1,"y":1}}},
              {"path":"M 0 0","type":"mouth","frame":0,"name":"SMILE","boundingBox":{"topLeft":{"x":0,"y":0},"bottomRight":{"x":1,"y":1}}}
            ]"#,
        )
        .unwrap();
        fs::write(dir.join("bodyparts/notes.txt"), "ignored").unwrap();

        let store = AssetStore::load_dir(&dir).unwrap();
        assert!(store.is_ready());
        assert_eq!(store.body_count(), 1);
        assert_eq!(store.part_count(), 1);
        let mouth = store.random_part(PartType::Mouth, &[], &mut rng()).unwrap();
        assert_eq!(mouth[0].frame, 0);
        assert_eq!(mouth[1].frame, 1);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_dir_accepts_arc_outlines() {
        let dir = std::env::temp_dir().join(format!("petsprite-arcs-{}", std::process::id()));
        fs::create_dir_all(dir.join("bodies")).unwrap();
        fs::create_dir_all(dir.join("bodyparts")).unwrap();
        fs::write(
            dir.join("bodies/round.json"),
            r#"[{"path":"M 0 0 A 2 2 0 0 1 4 0 Z","points":[],"frame":0,"name":"round","size":{"x":4,"y":2}}]"#,
        )
        .unwrap();
        fs::write(
            dir.join("bodyparts/eye-ROUND.json"),
            r#"[{"path":"M0 1a1 1 0 101 1z","type":"eye","frame":0,"name":"ROUND","boundingBox":{"topLeft":{"x":0,"y":0},"bottomRight":{"x":2,"y":2}}}]"#,
        )
        .unwrap();

        let store = AssetStore::load_dir(&dir).unwrap();
        let body = store.random_body(&mut rng()).unwrap();
        assert_eq!(body[0].path.commands().len(), 4);
        let eye = store.random_part(PartType::Eye, &[], &mut rng()).unwrap();
        assert!(!eye[0].path.is_empty());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_dir_reports_missing_directory() {
        let err = AssetStore::load_dir("/definitely/not/here").err().unwrap();
        assert!(matches!(err, PetError::Io { .. }));
    }
}
