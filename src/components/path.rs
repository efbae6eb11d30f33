//! Vector path data and 2D affine transforms.
//!
//! Body and part outlines arrive as SVG path `d` strings. They are parsed once
//! at load time into absolute [`PathCommand`]s so that pinning a part onto a
//! body is a plain matrix application over points.
//!
//! Supported commands: `M L H V C S Q A Z` in absolute and relative form.
//! Relative commands are resolved while parsing, `H`/`V` become line segments
//! and `S` becomes a cubic with the reflected control point. Elliptical arcs
//! are split into cubics of at most a quarter turn each.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PetError;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Rotate around the origin using `(x·cosθ − y·sinθ, x·sinθ + y·cosθ)`.
    pub fn rotated_degrees(self, degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// 2x3 affine matrix laid out like a canvas transform:
///
/// ```text
/// | a c e |
/// | b d f |
/// ```
///
/// The chaining methods post-multiply, so
/// `Affine::IDENTITY.translate(x, y).rotate_degrees(t)` rotates a point first
/// and then moves it to `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    pub fn rotation_degrees(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn scaling(sx: f32, sy: f32) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// `self * rhs`: `rhs` is applied to points first.
    pub fn multiply(&self, rhs: &Affine) -> Self {
        Self {
            a: self.a * rhs.a + self.c * rhs.b,
            b: self.b * rhs.a + self.d * rhs.b,
            c: self.a * rhs.c + self.c * rhs.d,
            d: self.b * rhs.c + self.d * rhs.d,
            e: self.a * rhs.e + self.c * rhs.f + self.e,
            f: self.b * rhs.e + self.d * rhs.f + self.f,
        }
    }

    pub fn translate(self, tx: f32, ty: f32) -> Self {
        self.multiply(&Affine::translation(tx, ty))
    }

    pub fn rotate_degrees(self, degrees: f32) -> Self {
        self.multiply(&Affine::rotation_degrees(degrees))
    }

    pub fn scale(self, sx: f32, sy: f32) -> Self {
        self.multiply(&Affine::scaling(sx, sy))
    }

    /// Mirror along the vertical axis through the current origin.
    pub fn flip_x(self) -> Self {
        self.scale(-1.0, 1.0)
    }

    pub fn apply(&self, p: Vec2) -> Vec2 {
        Vec2 {
            x: self.a * p.x + self.c * p.y + self.e,
            y: self.b * p.x + self.d * p.y + self.f,
        }
    }
}

/// One absolute path segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo(Vec2, Vec2),
    CubicTo(Vec2, Vec2, Vec2),
    Close,
}

impl PathCommand {
    pub fn transformed(&self, m: &Affine) -> PathCommand {
        match *self {
            PathCommand::MoveTo(p) => PathCommand::MoveTo(m.apply(p)),
            PathCommand::LineTo(p) => PathCommand::LineTo(m.apply(p)),
            PathCommand::QuadTo(c, p) => PathCommand::QuadTo(m.apply(c), m.apply(p)),
            PathCommand::CubicTo(c1, c2, p) => {
                PathCommand::CubicTo(m.apply(c1), m.apply(c2), m.apply(p))
            }
            PathCommand::Close => PathCommand::Close,
        }
    }
}

/// Parsed outline of a body or part frame, in its own local space.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathData {
    commands: Vec<PathCommand>,
}

impl PathData {
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl FromStr for PathData {
    type Err = PetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_path(s).map(|commands| PathData { commands })
    }
}

impl TryFrom<String> for PathData {
    type Error = PetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PathData> for String {
    fn from(value: PathData) -> Self {
        value.to_string()
    }
}

impl fmt::Display for PathData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_commands(f, &self.commands)
    }
}

/// Drawable composite made of already-transformed commands.
///
/// Shapes are rebuilt from scratch whenever a frame selection changes, never
/// patched in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shape {
    commands: Vec<PathCommand>,
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path(path: &PathData) -> Self {
        Self {
            commands: path.commands.clone(),
        }
    }

    /// Append `path` with every point mapped through `m`.
    pub fn add_path(&mut self, path: &PathData, m: &Affine) {
        self.commands
            .extend(path.commands.iter().map(|cmd| cmd.transformed(m)));
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of sub-paths (one per `MoveTo`).
    pub fn subpath_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PathCommand::MoveTo(_)))
            .count()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_commands(f, &self.commands)
    }
}

fn write_commands(f: &mut fmt::Formatter<'_>, commands: &[PathCommand]) -> fmt::Result {
    for (i, cmd) in commands.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        match cmd {
            PathCommand::MoveTo(p) => write!(f, "M {} {}", p.x, p.y)?,
            PathCommand::LineTo(p) => write!(f, "L {} {}", p.x, p.y)?,
            PathCommand::QuadTo(c, p) => write!(f, "Q {} {} {} {}", c.x, c.y, p.x, p.y)?,
            PathCommand::CubicTo(c1, c2, p) => write!(
                f,
                "C {} {} {} {} {} {}",
                c1.x, c1.y, c2.x, c2.y, p.x, p.y
            )?,
            PathCommand::Close => f.write_str("Z")?,
        }
    }
    Ok(())
}

struct Tokenizer<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src: src.as_bytes(),
            pos: 0,
        }
    }

    fn skip_separators(&mut self) {
        while let Some(&c) = self.src.get(self.pos) {
            if c.is_ascii_whitespace() || c == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_separators();
        self.pos >= self.src.len()
    }

    fn command(&mut self) -> Option<u8> {
        self.skip_separators();
        match self.src.get(self.pos) {
            Some(&c) if c.is_ascii_alphabetic() => {
                self.pos += 1;
                Some(c)
            }
            _ => None,
        }
    }

    fn error(&self, reason: impl Into<String>) -> PetError {
        PetError::PathParse {
            position: self.pos,
            reason: reason.into(),
        }
    }

    fn number(&mut self) -> Result<f32, PetError> {
        self.skip_separators();
        let start = self.pos;
        let digits = |t: &mut Self| {
            let before = t.pos;
            while t.src.get(t.pos).is_some_and(u8::is_ascii_digit) {
                t.pos += 1;
            }
            t.pos > before
        };
        if matches!(self.src.get(self.pos), Some(b'+') | Some(b'-')) {
            self.pos += 1;
        }
        let mut seen = digits(self);
        if self.src.get(self.pos) == Some(&b'.') {
            self.pos += 1;
            seen |= digits(self);
        }
        if !seen {
            self.pos = start;
            return Err(self.error("expected a number"));
        }
        if matches!(self.src.get(self.pos), Some(b'e') | Some(b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.src.get(self.pos), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            if !digits(self) {
                self.pos = mark;
            }
        }
        // The slice is pure ASCII by construction.
        let text = std::str::from_utf8(&self.src[start..self.pos])
            .map_err(|_| self.error("non-ascii number"))?;
        text.parse::<f32>()
            .map_err(|e| self.error(format!("bad number '{}': {}", text, e)))
    }

    /// Arc flags are a single `0` or `1` and may be packed without separators.
    fn flag(&mut self) -> Result<bool, PetError> {
        self.skip_separators();
        match self.src.get(self.pos) {
            Some(b'0') => {
                self.pos += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(true)
            }
            _ => Err(self.error("expected an arc flag")),
        }
    }

    fn point(&mut self, relative: bool, current: Vec2) -> Result<Vec2, PetError> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(if relative {
            Vec2::new(current.x + x, current.y + y)
        } else {
            Vec2::new(x, y)
        })
    }
}

/// Endpoint form of an SVG elliptical arc.
struct EllipticalArc {
    from: Vec2,
    to: Vec2,
    radii: Vec2,
    rotation_degrees: f32,
    large_arc: bool,
    sweep: bool,
}

impl EllipticalArc {
    /// Append cubics approximating the arc, one per quarter turn or less.
    ///
    /// A zero radius degrades to a straight line, and an arc ending where it
    /// starts draws nothing. Radii too small to span the endpoints are scaled
    /// up uniformly until they do.
    fn to_cubics(&self, out: &mut Vec<PathCommand>) {
        if self.from == self.to {
            return;
        }
        let mut rx = f64::from(self.radii.x).abs();
        let mut ry = f64::from(self.radii.y).abs();
        if rx == 0.0 || ry == 0.0 {
            out.push(PathCommand::LineTo(self.to));
            return;
        }

        let (x0, y0) = (f64::from(self.from.x), f64::from(self.from.y));
        let (x1, y1) = (f64::from(self.to.x), f64::from(self.to.y));
        let (sin_phi, cos_phi) = f64::from(self.rotation_degrees).to_radians().sin_cos();

        let dx2 = (x0 - x1) / 2.0;
        let dy2 = (y0 - y1) / 2.0;
        let x1p = cos_phi * dx2 + sin_phi * dy2;
        let y1p = -sin_phi * dx2 + cos_phi * dy2;

        let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
        if lambda > 1.0 {
            let grow = lambda.sqrt();
            rx *= grow;
            ry *= grow;
        }

        let rx2 = rx * rx;
        let ry2 = ry * ry;
        let num = rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p;
        let den = rx2 * y1p * y1p + ry2 * x1p * x1p;
        let sign = if self.large_arc == self.sweep { -1.0 } else { 1.0 };
        let coef = sign * (num / den).max(0.0).sqrt();
        let cxp = coef * (rx * y1p / ry);
        let cyp = -coef * (ry * x1p / rx);

        let cx = cos_phi * cxp - sin_phi * cyp + (x0 + x1) / 2.0;
        let cy = sin_phi * cxp + cos_phi * cyp + (y0 + y1) / 2.0;

        let theta1 = ((y1p - cyp) / ry).atan2((x1p - cxp) / rx);
        let theta2 = ((-y1p - cyp) / ry).atan2((-x1p - cxp) / rx);
        let mut sweep_angle = theta2 - theta1;
        if !self.sweep && sweep_angle > 0.0 {
            sweep_angle -= std::f64::consts::TAU;
        } else if self.sweep && sweep_angle < 0.0 {
            sweep_angle += std::f64::consts::TAU;
        }

        let segments = (sweep_angle.abs() / std::f64::consts::FRAC_PI_2)
            .ceil()
            .max(1.0) as usize;
        let delta = sweep_angle / segments as f64;
        let alpha = delta.sin() * ((4.0 + 3.0 * (delta / 2.0).tan().powi(2)).sqrt() - 1.0) / 3.0;

        let on_ellipse = |t: f64| {
            let (sin_t, cos_t) = t.sin_cos();
            (
                cx + rx * cos_phi * cos_t - ry * sin_phi * sin_t,
                cy + rx * sin_phi * cos_t + ry * cos_phi * sin_t,
            )
        };
        let tangent = |t: f64| {
            let (sin_t, cos_t) = t.sin_cos();
            (
                -rx * cos_phi * sin_t - ry * sin_phi * cos_t,
                -rx * sin_phi * sin_t + ry * cos_phi * cos_t,
            )
        };
        let point = |x: f64, y: f64| Vec2::new(x as f32, y as f32);

        for i in 0..segments {
            let t1 = theta1 + i as f64 * delta;
            let t2 = t1 + delta;
            let (px, py) = on_ellipse(t1);
            let (qx, qy) = on_ellipse(t2);
            let (tx1, ty1) = tangent(t1);
            let (tx2, ty2) = tangent(t2);
            let end = if i + 1 == segments {
                self.to
            } else {
                point(qx, qy)
            };
            out.push(PathCommand::CubicTo(
                point(px + alpha * tx1, py + alpha * ty1),
                point(qx - alpha * tx2, qy - alpha * ty2),
                end,
            ));
        }
    }
}

fn parse_path(d: &str) -> Result<Vec<PathCommand>, PetError> {
    let mut tok = Tokenizer::new(d);
    let mut out = Vec::new();
    let mut command: Option<u8> = None;
    let mut current = Vec2::ZERO;
    let mut subpath_start = Vec2::ZERO;
    let mut last_cubic_control: Option<Vec2> = None;

    while !tok.at_end() {
        if let Some(letter) = tok.command() {
            command = Some(letter);
            if letter.eq_ignore_ascii_case(&b'z') {
                out.push(PathCommand::Close);
                current = subpath_start;
                last_cubic_control = None;
                continue;
            }
        }
        let Some(letter) = command else {
            return Err(tok.error("path data must start with a command"));
        };
        let relative = letter.is_ascii_lowercase();
        match letter.to_ascii_uppercase() {
            b'M' => {
                let p = tok.point(relative, current)?;
                out.push(PathCommand::MoveTo(p));
                current = p;
                subpath_start = p;
                last_cubic_control = None;
                // Extra coordinate pairs after a moveto are implicit linetos.
                command = Some(if relative { b'l' } else { b'L' });
            }
            b'L' => {
                let p = tok.point(relative, current)?;
                out.push(PathCommand::LineTo(p));
                current = p;
                last_cubic_control = None;
            }
            b'H' => {
                let x = tok.number()?;
                let p = Vec2::new(if relative { current.x + x } else { x }, current.y);
                out.push(PathCommand::LineTo(p));
                current = p;
                last_cubic_control = None;
            }
            b'V' => {
                let y = tok.number()?;
                let p = Vec2::new(current.x, if relative { current.y + y } else { y });
                out.push(PathCommand::LineTo(p));
                current = p;
                last_cubic_control = None;
            }
            b'C' => {
                let c1 = tok.point(relative, current)?;
                let c2 = tok.point(relative, current)?;
                let p = tok.point(relative, current)?;
                out.push(PathCommand::CubicTo(c1, c2, p));
                current = p;
                last_cubic_control = Some(c2);
            }
            b'S' => {
                let c1 = match last_cubic_control {
                    Some(prev) => current + (current - prev),
                    None => current,
                };
                let c2 = tok.point(relative, current)?;
                let p = tok.point(relative, current)?;
                out.push(PathCommand::CubicTo(c1, c2, p));
                current = p;
                last_cubic_control = Some(c2);
            }
            b'Q' => {
                let c = tok.point(relative, current)?;
                let p = tok.point(relative, current)?;
                out.push(PathCommand::QuadTo(c, p));
                current = p;
                last_cubic_control = None;
            }
            b'A' => {
                let rx = tok.number()?;
                let ry = tok.number()?;
                let rotation = tok.number()?;
                let large_arc = tok.flag()?;
                let sweep = tok.flag()?;
                let p = tok.point(relative, current)?;
                let arc = EllipticalArc {
                    from: current,
                    to: p,
                    radii: Vec2::new(rx, ry),
                    rotation_degrees: rotation,
                    large_arc,
                    sweep,
                };
                arc.to_cubics(&mut out);
                current = p;
                last_cubic_control = None;
            }
            b'Z' => return Err(tok.error("unexpected coordinates after close")),
            other => {
                return Err(tok.error(format!(
                    "unsupported path command '{}'",
                    other as char
                )));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn vec_approx_eq(a: Vec2, b: Vec2) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
    }

    #[test]
    fn test_parse_absolute_cubic_path() {
        let path: PathData = "M 0 0 C 1 2 3 4 5 6".parse().unwrap();
        assert_eq!(
            path.commands(),
            &[
                PathCommand::MoveTo(Vec2::new(0.0, 0.0)),
                PathCommand::CubicTo(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0), Vec2::new(5.0, 6.0)),
            ]
        );
    }

    #[test]
    fn test_parse_relative_and_implicit_lineto() {
        let path: PathData = "m10,10 5,0 0,5 z".parse().unwrap();
        assert_eq!(
            path.commands(),
            &[
                PathCommand::MoveTo(Vec2::new(10.0, 10.0)),
                PathCommand::LineTo(Vec2::new(15.0, 10.0)),
                PathCommand::LineTo(Vec2::new(15.0, 15.0)),
                PathCommand::Close,
            ]
        );
    }

    #[test]
    fn test_parse_horizontal_vertical_and_compact_numbers() {
        let path: PathData = "M1-2H4V-1.5e1h.5".parse().unwrap();
        assert_eq!(
            path.commands(),
            &[
                PathCommand::MoveTo(Vec2::new(1.0, -2.0)),
                PathCommand::LineTo(Vec2::new(4.0, -2.0)),
                PathCommand::LineTo(Vec2::new(4.0, -15.0)),
                PathCommand::LineTo(Vec2::new(4.5, -15.0)),
            ]
        );
    }

    #[test]
    fn test_parse_smooth_cubic_reflects_control() {
        let path: PathData = "M 0 0 C 0 1 1 1 2 0 S 4 -1 4 0".parse().unwrap();
        match path.commands()[2] {
            PathCommand::CubicTo(c1, _, p) => {
                assert!(vec_approx_eq(c1, Vec2::new(3.0, -1.0)));
                assert!(vec_approx_eq(p, Vec2::new(4.0, 0.0)));
            }
            other => panic!("expected cubic, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_close_resets_current_point() {
        let path: PathData = "M 5 5 l 1 0 z l 1 1".parse().unwrap();
        assert_eq!(path.commands()[3], PathCommand::LineTo(Vec2::new(6.0, 6.0)));
    }

    #[test]
    fn test_parse_rejects_missing_command() {
        assert!(matches!(
            "10 10".parse::<PathData>(),
            Err(PetError::PathParse { .. })
        ));
    }

    fn cubic_end(cmd: &PathCommand) -> Vec2 {
        match cmd {
            PathCommand::CubicTo(_, _, p) => *p,
            other => panic!("expected a cubic, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_absolute_arc_becomes_quarter_cubics() {
        // Half circle of radius 2 over the top of (2, 0).
        let path: PathData = "M 0 0 A 2 2 0 0 1 4 0 Z".parse().unwrap();
        let cmds = path.commands();
        assert_eq!(cmds.len(), 4);
        assert_eq!(cmds[0], PathCommand::MoveTo(Vec2::ZERO));
        assert!(vec_approx_eq(cubic_end(&cmds[1]), Vec2::new(2.0, -2.0)));
        assert!(vec_approx_eq(cubic_end(&cmds[2]), Vec2::new(4.0, 0.0)));
        assert_eq!(cmds[3], PathCommand::Close);

        // First control point leaves straight up along the tangent.
        let PathCommand::CubicTo(c1, _, _) = cmds[1] else {
            panic!("expected a cubic");
        };
        assert!(approx_eq(c1.x, 0.0));
        assert!(c1.y < 0.0);
    }

    #[test]
    fn test_parse_relative_arc_resolves_against_current_point() {
        let path: PathData = "M 10 10 a 5 5 0 0 0 10 0 l 1 0".parse().unwrap();
        let cmds = path.commands();
        assert_eq!(cmds.len(), 4);
        assert!(vec_approx_eq(cubic_end(&cmds[1]), Vec2::new(15.0, 15.0)));
        assert!(vec_approx_eq(cubic_end(&cmds[2]), Vec2::new(20.0, 10.0)));
        assert_eq!(cmds[3], PathCommand::LineTo(Vec2::new(21.0, 10.0)));
    }

    #[test]
    fn test_parse_arc_with_packed_flags() {
        let spaced: PathData = "M 0 0 A 2 2 0 0 1 4 0".parse().unwrap();
        let packed: PathData = "M0 0A2 2 0 014 0".parse().unwrap();
        assert_eq!(spaced, packed);
    }

    #[test]
    fn test_arc_degenerate_cases() {
        let flat: PathData = "M 0 0 A 0 3 0 0 1 4 0".parse().unwrap();
        assert_eq!(flat.commands()[1], PathCommand::LineTo(Vec2::new(4.0, 0.0)));

        let dot: PathData = "M 1 1 A 2 2 0 0 1 1 1".parse().unwrap();
        assert_eq!(dot.commands().len(), 1);

        // Radius 1 cannot span 4 units; it is scaled up to a half circle.
        let small: PathData = "M 0 0 A 1 1 0 0 1 4 0".parse().unwrap();
        assert_eq!(small.commands().len(), 3);
        assert!(vec_approx_eq(cubic_end(&small.commands()[1]), Vec2::new(2.0, -2.0)));
    }

    #[test]
    fn test_parse_rejects_bad_arc_flag() {
        let err = "M 0 0 A 1 1 0 2 1 2 2".parse::<PathData>().unwrap_err();
        assert!(err.to_string().contains("arc flag"));
    }

    #[test]
    fn test_parse_rejects_unsupported_command() {
        let err = "M 0 0 T 2 2".parse::<PathData>().unwrap_err();
        assert!(err.to_string().contains("unsupported"));
    }

    #[test]
    fn test_parse_rejects_truncated_pair() {
        assert!("M 0".parse::<PathData>().is_err());
    }

    #[test]
    fn test_empty_string_is_empty_path() {
        let path: PathData = "   ".parse().unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_display_round_trips_through_parser() {
        let path: PathData = "M 1 2 L 3 4 Q 5 6 7 8 Z".parse().unwrap();
        let again: PathData = path.to_string().parse().unwrap();
        assert_eq!(path, again);
    }

    #[test]
    fn test_affine_translate_then_rotate_rotates_first() {
        let m = Affine::IDENTITY.translate(10.0, 20.0).rotate_degrees(90.0);
        let p = m.apply(Vec2::new(1.0, 0.0));
        assert!(vec_approx_eq(p, Vec2::new(10.0, 21.0)));
    }

    #[test]
    fn test_affine_flip_x_mirrors() {
        let m = Affine::translation(50.0, 0.0).flip_x();
        assert!(vec_approx_eq(m.apply(Vec2::new(10.0, 3.0)), Vec2::new(40.0, 3.0)));
    }

    #[test]
    fn test_rotated_degrees_matches_matrix() {
        let p = Vec2::new(3.0, -2.0);
        let by_matrix = Affine::rotation_degrees(37.0).apply(p);
        assert!(vec_approx_eq(p.rotated_degrees(37.0), by_matrix));
    }

    #[test]
    fn test_shape_add_path_transforms_every_point() {
        let path: PathData = "M 0 0 L 1 0".parse().unwrap();
        let mut shape = Shape::new();
        shape.add_path(&path, &Affine::translation(2.0, 3.0));
        assert_eq!(
            shape.commands(),
            &[
                PathCommand::MoveTo(Vec2::new(2.0, 3.0)),
                PathCommand::LineTo(Vec2::new(3.0, 3.0)),
            ]
        );
        assert_eq!(shape.subpath_count(), 1);
    }

    #[test]
    fn test_path_data_deserializes_from_json_string() {
        let path: PathData = serde_json::from_str("\"M 1 1 L 2 2\"").unwrap();
        assert_eq!(path.commands().len(), 2);
        assert!(serde_json::from_str::<PathData>("\"X 1\"").is_err());
    }
}
