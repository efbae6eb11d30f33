//! In-memory asset fixtures shared by unit tests.

use std::sync::Arc;

use crate::components::frame::{AnchorPoint, BodyFrame, FrameSize, PartBounds, PartFrame, PartType};
use crate::components::path::Vec2;
use crate::resources::assetstore::AssetStore;

pub fn anchor(x: f32, y: f32, rotation: f32, part_type: PartType) -> AnchorPoint {
    AnchorPoint {
        x,
        y,
        rotation,
        part_type,
    }
}

pub fn full_anchor_set() -> Vec<AnchorPoint> {
    vec![
        anchor(10.0, 12.0, 0.0, PartType::Mouth),
        anchor(6.0, 6.0, 0.0, PartType::Eye),
        anchor(14.0, 6.0, 0.0, PartType::Eye),
        anchor(5.0, 28.0, 0.0, PartType::Leg1),
        anchor(15.0, 28.0, 0.0, PartType::Leg2),
        anchor(0.0, 15.0, 180.0, PartType::Arm1),
        anchor(20.0, 15.0, 0.0, PartType::Arm2),
    ]
}

pub fn body_sequence(name: &str, frames: usize) -> Arc<[BodyFrame]> {
    (0..frames)
        .map(|frame| BodyFrame {
            path: "M 0 0 L 20 0 L 20 30 L 0 30 Z".parse().unwrap(),
            anchors: full_anchor_set(),
            frame,
            name: name.to_string(),
            size: FrameSize {
                width: 20.0,
                height: 30.0,
            },
        })
        .collect()
}

pub fn part_sequence(part_type: PartType, name: &str, frames: usize) -> Arc<[PartFrame]> {
    (0..frames)
        .map(|frame| {
            let w = 2.0 + frame as f32;
            PartFrame {
                path: format!("M 0 0 L {} 0 L {} 3 Z", w, w).parse().unwrap(),
                part_type,
                frame,
                name: name.to_string(),
                bounding_box: PartBounds {
                    top_left: Vec2::ZERO,
                    bottom_right: Vec2::new(w, 3.0),
                },
            }
        })
        .collect()
}

pub fn store() -> AssetStore {
    AssetStore::from_sequences(
        vec![body_sequence("blob", 3)],
        vec![
            part_sequence(PartType::Mouth, "SMILE", 3),
            part_sequence(PartType::Leg1, "STICK", 2),
            part_sequence(PartType::Leg2, "STICK", 2),
            part_sequence(PartType::Arm1, "NUB", 2),
            part_sequence(PartType::Arm2, "NUB", 2),
            part_sequence(PartType::Eye, "ROUND", 1),
            part_sequence(PartType::Eye, "CLOSED", 1),
        ],
    )
}
