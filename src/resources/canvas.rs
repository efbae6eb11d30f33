//! Drawing collaborator boundary.
//!
//! Pets never read pixels back: they push draw calls through the write-only
//! [`Canvas`] trait. [`RecordingCanvas`] keeps every call as a
//! [`DrawCommand`], which is what the headless binary and the tests render
//! into.

use std::fmt;

use crate::components::composite::Rect;
use crate::components::path::{Affine, Shape};

/// Straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Build from `0xRRGGBB`.
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 0xff {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

/// Pet outline color.
pub const PET_STROKE: Color = Color::from_hex(0x004c84);
/// Body fill.
pub const PET_BODY_FILL: Color = Color::from_hex(0xfff79c);
/// Fill of legs, arms, mouth and eyes.
pub const PET_PARTS_FILL: Color = Color::from_hex(0x4192cd);
pub const PET_STROKE_WIDTH: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompositeMode {
    /// Paint over what is already there.
    #[default]
    SourceOver,
    /// Erase existing pixels where the shape is painted.
    DestinationOut,
}

pub trait Canvas {
    fn save(&mut self);
    fn restore(&mut self);
    /// Replace the current transform.
    fn set_transform(&mut self, transform: Affine);
    fn set_composite(&mut self, mode: CompositeMode);
    fn fill(&mut self, shape: &Shape, color: Color);
    fn stroke(&mut self, shape: &Shape, color: Color, width: f32);
    fn fill_rect(&mut self, rect: Rect, color: Color);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    SetTransform(Affine),
    SetComposite(CompositeMode),
    Fill { shape: Shape, color: Color },
    Stroke { shape: Shape, color: Color, width: f32 },
    FillRect { rect: Rect, color: Color },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
    depth: usize,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of `save` calls not yet matched by a `restore`.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.depth = 0;
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        self.depth = 0;
        std::mem::take(&mut self.commands)
    }
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) {
        self.depth += 1;
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        // Unbalanced restores are dropped like a 2D context does.
        if self.depth == 0 {
            return;
        }
        self.depth -= 1;
        self.commands.push(DrawCommand::Restore);
    }

    fn set_transform(&mut self, transform: Affine) {
        self.commands.push(DrawCommand::SetTransform(transform));
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        self.commands.push(DrawCommand::SetComposite(mode));
    }

    fn fill(&mut self, shape: &Shape, color: Color) {
        self.commands.push(DrawCommand::Fill {
            shape: shape.clone(),
            color,
        });
    }

    fn stroke(&mut self, shape: &Shape, color: Color, width: f32) {
        self.commands.push(DrawCommand::Stroke {
            shape: shape.clone(),
            color,
            width,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_hex() {
        assert_eq!(PET_STROKE.to_string(), "#004c84");
        assert_eq!(PET_BODY_FILL.to_string(), "#fff79c");
        assert_eq!(PET_PARTS_FILL, Color::rgb(0x41, 0x92, 0xcd));
    }

    #[test]
    fn test_recording_balances_save_restore() {
        let mut canvas = RecordingCanvas::new();
        canvas.restore();
        canvas.save();
        canvas.set_composite(CompositeMode::DestinationOut);
        canvas.restore();
        assert_eq!(
            canvas.commands(),
            &[
                DrawCommand::Save,
                DrawCommand::SetComposite(CompositeMode::DestinationOut),
                DrawCommand::Restore
            ]
        );
        assert_eq!(canvas.depth(), 0);
    }
}
