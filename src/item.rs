//! A single bouncing shape.
//!
//! Active items are outlined squares that glide along one axis at a time.
//! Once an item is too small to split it becomes complete: it slows down,
//! drifts diagonally and cycles its color until the next reset.

use std::fmt;

use rand::Rng;

use crate::config::{GameConfig, Viewport};

/// Axis-aligned hit box, inclusive on every edge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoundingBox {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// CSS color string, e.g. `rgb(255,52,52)`.
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub x: f64,
    pub y: f64,
    pub target_x: f64,
    pub target_y: f64,
    pub size: f64,
    pub stroke_width: f64,
    pub speed: f64,
    pub color: Rgb,
    /// Travel direction (+1 / -1) of each color channel while complete.
    color_dirs: [i8; 3],
    pub complete: bool,
    pub bbox: BoundingBox,
}

impl Item {
    /// Creates an active item. Missing coordinates are randomized within the
    /// viewport; a non-positive size falls back to `cfg.default_size`.
    pub fn new<R: Rng>(
        x: Option<f64>,
        y: Option<f64>,
        size: f64,
        cfg: &GameConfig,
        viewport: Viewport,
        rng: &mut R,
    ) -> Self {
        let size = if size > 0.0 { size } else { cfg.default_size };
        let x = x.unwrap_or_else(|| viewport.random_x(size, rng));
        let y = y.unwrap_or_else(|| viewport.random_y(size, rng));
        let target_x = viewport.random_x(size, rng);
        let target_y = viewport.random_y(size, rng);
        let color = Rgb::new(
            rng.random_range(cfg.channel_min..=u8::MAX),
            rng.random_range(cfg.channel_min..=u8::MAX),
            u8::MAX,
        );
        let mut item = Self {
            x,
            y,
            target_x,
            target_y,
            size,
            stroke_width: size * cfg.stroke_ratio,
            speed: cfg.speed_factor / size,
            color,
            color_dirs: [1; 3],
            complete: false,
            bbox: BoundingBox::default(),
        };
        item.update_bbox();
        item
    }

    pub fn at_target(&self) -> bool {
        self.x == self.target_x && self.y == self.target_y
    }

    /// Active items re-target a single axis (chosen by coin flip) so they
    /// move horizontally or vertically; complete items re-target both.
    pub fn pick_new_target<R: Rng>(&mut self, viewport: Viewport, rng: &mut R) {
        if self.complete {
            self.target_x = viewport.random_x(self.size, rng);
            self.target_y = viewport.random_y(self.size, rng);
        } else if rng.random_bool(0.5) {
            self.target_x = viewport.random_x(self.size, rng);
        } else {
            self.target_y = viewport.random_y(self.size, rng);
        }
    }

    /// Moves one frame toward the target, snapping when within `speed`.
    pub fn advance<R: Rng>(&mut self, viewport: Viewport, rng: &mut R) {
        if self.at_target() {
            self.pick_new_target(viewport, rng);
        }
        self.x = step_toward(self.x, self.target_x, self.speed);
        self.y = step_toward(self.y, self.target_y, self.speed);
        self.update_bbox();
    }

    pub fn update_bbox(&mut self) {
        self.bbox = BoundingBox {
            left: self.x - self.stroke_width,
            top: self.y - self.stroke_width,
            right: self.x + self.size + self.stroke_width,
            bottom: self.y + self.size + self.stroke_width,
        };
    }

    /// Whether a hit splits this item (as opposed to completing it).
    pub fn can_split(&self, threshold: f64) -> bool {
        !self.complete && self.size > threshold
    }

    /// The two children that replace this item on a split. Both start at the
    /// parent's position with fresh targets and colors.
    pub fn spawn_children<R: Rng>(
        &self,
        cfg: &GameConfig,
        viewport: Viewport,
        rng: &mut R,
    ) -> [Item; 2] {
        let size = self.size - cfg.size_step;
        [
            Item::new(Some(self.x), Some(self.y), size, cfg, viewport, rng),
            Item::new(Some(self.x), Some(self.y), size, cfg, viewport, rng),
        ]
    }

    pub fn mark_complete(&mut self, speed: f64) {
        self.speed = speed;
        self.complete = true;
    }

    /// Bounces each channel between `floor` and 255, one unit per call.
    pub fn update_color(&mut self, floor: u8) {
        let Rgb { r, g, b } = self.color;
        let [dr, dg, db] = &mut self.color_dirs;
        self.color = Rgb::new(
            oscillate(r, dr, floor),
            oscillate(g, dg, floor),
            oscillate(b, db, floor),
        );
    }

    /// One channel jumps to 255 and the other two drop to `low`.
    pub fn flash<R: Rng>(&mut self, low: u8, rng: &mut R) {
        let hi = u8::MAX;
        self.color = match rng.random_range(0..3) {
            0 => Rgb::new(hi, low, low),
            1 => Rgb::new(low, hi, low),
            _ => Rgb::new(low, low, hi),
        };
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.size / 2.0, self.y + self.size / 2.0)
    }
}

fn step_toward(pos: f64, target: f64, speed: f64) -> f64 {
    if (pos - target).abs() <= speed {
        target
    } else if pos > target {
        pos - speed
    } else {
        pos + speed
    }
}

fn oscillate(value: u8, dir: &mut i8, floor: u8) -> u8 {
    if value == u8::MAX {
        *dir = -1;
    } else if value <= floor {
        *dir = 1;
    }
    if *dir > 0 {
        value.saturating_add(1)
    } else {
        value.saturating_sub(1)
    }
}
