//! Tunable game constants and the drawing-surface size.
//!
//! Everything here is plain data so the simulation can be driven natively in
//! tests. With the `serde` feature the config can be (de)serialized; missing
//! fields fall back to [`GameConfig::default`].

use rand::Rng;

/// Size of the drawing surface in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Random x coordinate that keeps an item of `size` fully on screen.
    pub fn random_x<R: Rng>(&self, size: f64, rng: &mut R) -> f64 {
        random_offset(self.width, size, rng)
    }

    /// Random y coordinate that keeps an item of `size` fully on screen.
    pub fn random_y<R: Rng>(&self, size: f64, rng: &mut R) -> f64 {
        random_offset(self.height, size, rng)
    }
}

// Uniform in [0, dimension - size]; collapses to 0 when the item is wider than the axis.
fn random_offset<R: Rng>(dimension: f64, size: f64, rng: &mut R) -> f64 {
    let span = (dimension - size).max(0.0);
    rng.random::<f64>() * span
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Size of the seed item and fallback for a zero / negative size.
    pub default_size: f64,
    /// Items at or below this size complete instead of splitting.
    pub split_threshold: f64,
    /// How much smaller each child is than its parent.
    pub size_step: f64,
    /// Minimum time between two update/render passes.
    pub frame_interval_ms: f64,
    /// stroke width = stroke_ratio * size
    pub stroke_ratio: f64,
    /// speed = speed_factor / size
    pub speed_factor: f64,
    /// Speed of an item once it has completed.
    pub complete_speed: f64,
    /// Lower bound of the color oscillation of complete items.
    pub color_floor: u8,
    /// Lower bound for the random red / green channels of new items.
    pub channel_min: u8,
    /// Value of the two dimmed channels after a flash.
    pub flash_low: u8,
    /// DOM id of the drawing canvas.
    pub canvas_id: String,
    /// DOM id of the stats line element.
    pub stats_id: String,
    /// DOM id of the reset control; presses on it are not counted.
    pub reset_id: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            default_size: 100.0,
            split_threshold: 20.0,
            size_step: 10.0,
            frame_interval_ms: 16.0,
            stroke_ratio: 0.2,
            speed_factor: 100.0,
            complete_speed: 1.0,
            color_floor: 50,
            channel_min: 55,
            flash_low: 52,
            canvas_id: "canvas".to_string(),
            stats_id: "stats".to_string(),
            reset_id: "reset".to_string(),
        }
    }
}

impl GameConfig {
    /// Rules of the smaller variant: items keep splitting down to size 10.
    pub fn alternate() -> Self {
        Self {
            split_threshold: 10.0,
            ..Self::default()
        }
    }

    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
