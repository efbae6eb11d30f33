//! Immutable keyframe data produced by the asset pipeline.
//!
//! A body variant is an ordered sequence of [`BodyFrame`]s; a part variant is
//! an ordered sequence of [`PartFrame`]s sharing `type` and `name`. Both are
//! loaded once and shared read-only (`Arc<[..]>`) between every pet.

use serde::{Deserialize, Serialize};

use crate::components::path::{PathData, Vec2};

/// Part-type tag carried by anchors and part frames.
///
/// Both eye slots use the single `eye` type, so a body frame normally has two
/// `eye` anchors. Unknown tags from newer asset files are kept as `Other` and
/// never match a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartType {
    Mouth,
    Leg1,
    Leg2,
    Arm1,
    Arm2,
    Eye,
    #[serde(other)]
    Other,
}

impl PartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartType::Mouth => "mouth",
            PartType::Leg1 => "leg1",
            PartType::Leg2 => "leg2",
            PartType::Arm1 => "arm1",
            PartType::Arm2 => "arm2",
            PartType::Eye => "eye",
            PartType::Other => "other",
        }
    }
}

/// Where (and at which rotation) a part of `part_type` attaches for one body frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorPoint {
    pub x: f32,
    pub y: f32,
    /// Rotation in degrees.
    #[serde(rename = "t", default)]
    pub rotation: f32,
    #[serde(rename = "type")]
    pub part_type: PartType,
}

/// Width/height pair. The asset files encode it as a point (`x`, `y`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameSize {
    #[serde(rename = "x")]
    pub width: f32,
    #[serde(rename = "y")]
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyFrame {
    pub path: PathData,
    #[serde(rename = "points", default)]
    pub anchors: Vec<AnchorPoint>,
    pub frame: usize,
    pub name: String,
    pub size: FrameSize,
}

/// Axis-aligned box of a part in its own unrotated local space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartBounds {
    pub top_left: Vec2,
    pub bottom_right: Vec2,
}

impl PartBounds {
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.top_left,
            Vec2::new(self.bottom_right.x, self.top_left.y),
            self.bottom_right,
            Vec2::new(self.top_left.x, self.bottom_right.y),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartFrame {
    pub path: PathData,
    #[serde(rename = "type")]
    pub part_type: PartType,
    pub frame: usize,
    /// Variant identity, e.g. `"CLOSED"`.
    pub name: String,
    pub bounding_box: PartBounds,
}
