//! Part pinning: assembling a drawable pet from one body frame and its parts.
//!
//! [`build_composite`] is a pure function of the body frame and the part frame
//! selected for each slot. Inner slots (mouth, eyes) go into one shape, outer
//! slots (legs, arms) into another, so the renderer can tuck the outer parts
//! behind the body silhouette.
//!
//! Each part looks up the first anchor of its own type in a working copy of
//! the body's anchors and consumes it. A part without an anchor left is
//! skipped for this frame.

use smallvec::SmallVec;

use crate::components::frame::{AnchorPoint, BodyFrame, PartFrame};
use crate::components::partslot::{PartSlot, PartSlots};
use crate::components::path::{Affine, Shape, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Running min/max accumulator.
#[derive(Debug, Clone, Copy)]
struct Extent {
    min: Vec2,
    max: Vec2,
}

impl Extent {
    fn include(&mut self, p: Vec2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    fn to_rect(self) -> Rect {
        Rect::new(
            self.min.x,
            self.min.y,
            self.max.x - self.min.x,
            self.max.y - self.min.y,
        )
    }
}

/// Output of one rebuild.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Composite {
    pub body: Shape,
    pub inner: Shape,
    pub outer: Shape,
    pub bounds: Rect,
    /// Slots that found an anchor this build.
    pub placed: PartSlots<bool>,
}

/// Transform that pins a part onto `anchor`: rotate in local space, then move
/// to the anchor position.
pub fn anchor_transform(anchor: &AnchorPoint) -> Affine {
    Affine::IDENTITY
        .translate(anchor.x, anchor.y)
        .rotate_degrees(anchor.rotation)
}

fn take_anchor(anchors: &mut SmallVec<[AnchorPoint; 8]>, part: &PartFrame) -> Option<AnchorPoint> {
    let index = anchors.iter().position(|a| a.part_type == part.part_type)?;
    Some(anchors.remove(index))
}

fn pin_part(
    shape: &mut Shape,
    anchors: &mut SmallVec<[AnchorPoint; 8]>,
    part: &PartFrame,
    extent: &mut Extent,
) -> bool {
    let Some(anchor) = take_anchor(anchors, part) else {
        return false;
    };
    shape.add_path(&part.path, &anchor_transform(&anchor));

    let offset = Vec2::new(anchor.x, anchor.y);
    for corner in part.bounding_box.corners() {
        extent.include(corner.rotated_degrees(anchor.rotation) + offset);
    }
    true
}

/// Build body, inner and outer shapes plus the aggregate bounding box.
///
/// The box always contains `(0, 0)..(size.width, size.height)` of the body.
pub fn build_composite(body: &BodyFrame, parts: &PartSlots<Option<&PartFrame>>) -> Composite {
    let mut anchors: SmallVec<[AnchorPoint; 8]> = body.anchors.iter().copied().collect();
    let mut extent = Extent {
        min: Vec2::ZERO,
        max: Vec2::new(body.size.width, body.size.height),
    };
    let mut placed = PartSlots::<bool>::default();

    let mut inner = Shape::new();
    for slot in PartSlot::INNER {
        if let Some(part) = parts[slot] {
            placed[slot] = pin_part(&mut inner, &mut anchors, part, &mut extent);
        }
    }
    let mut outer = Shape::new();
    for slot in PartSlot::OUTER {
        if let Some(part) = parts[slot] {
            placed[slot] = pin_part(&mut outer, &mut anchors, part, &mut extent);
        }
    }

    Composite {
        body: Shape::from_path(&body.path),
        inner,
        outer,
        bounds: extent.to_rect(),
        placed,
    }
}
