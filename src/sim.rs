//! Game state independent of the browser: the item collection, counters,
//! frame throttle and the rules for presses and resets.

use std::fmt;

use log::debug;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::{GameConfig, Viewport};
use crate::item::Item;

/// Gates update/render passes to roughly one per `interval_ms`.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    interval_ms: f64,
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// True when a pass should run at `now_ms`; records the pass time if so.
    pub fn due(&mut self, now_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub clicks: u32,
    pub hits: u32,
    pub complete: u32,
}

impl Stats {
    /// Hit percentage, rounded and clamped to 0..=100; 0 before the first click.
    pub fn accuracy(&self) -> u32 {
        if self.clicks == 0 {
            return 0;
        }
        let pct = (self.hits as f64 / self.clicks as f64 * 100.0).round();
        pct.clamp(0.0, 100.0) as u32
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Clicks: {} | Hits: {} | Complete: {} | Accuracy: {}%",
            self.clicks,
            self.hits,
            self.complete,
            self.accuracy()
        )
    }
}

/// What a single press did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PressOutcome {
    /// Active items hit (split or completed).
    pub hits: u32,
    /// Complete items hit (flashed).
    pub flashed: u32,
}

/// Result of splitting one item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitResult {
    /// Parent removed, two children appended.
    Split,
    /// Too small to split; the item is now complete.
    Completed,
    /// Already complete or out of range; nothing changed.
    Ignored,
}

pub struct Simulation {
    config: GameConfig,
    viewport: Viewport,
    rng: SmallRng,
    items: Vec<Item>,
    stats: Stats,
    clock: FrameClock,
}

impl Simulation {
    /// Creates a seeded simulation already holding one fresh item.
    pub fn with_seed(config: GameConfig, viewport: Viewport, seed: u64) -> Self {
        let clock = FrameClock::new(config.frame_interval_ms);
        let mut sim = Self {
            config,
            viewport,
            rng: SmallRng::seed_from_u64(seed),
            items: Vec::new(),
            stats: Stats::default(),
            clock,
        };
        sim.reset();
        sim
    }

    /// Clears counters and items, then seeds one default-size item.
    pub fn reset(&mut self) {
        self.stats = Stats::default();
        self.items.clear();
        let seed_item = Item::new(
            None,
            None,
            self.config.default_size,
            &self.config,
            self.viewport,
            &mut self.rng,
        );
        self.items.push(seed_item);
    }

    /// Splits the item at `index`, or completes it when it is at or below the
    /// split threshold. Children are appended after the remaining items.
    pub fn split(&mut self, index: usize) -> SplitResult {
        match self.items.get(index) {
            Some(item) if !item.complete => {}
            _ => return SplitResult::Ignored,
        }
        match self.split_at(index) {
            Some(children) => {
                self.items.extend(children);
                SplitResult::Split
            }
            None => SplitResult::Completed,
        }
    }

    // The item at `index` must be active. Completes it in place, or removes it
    // and returns the children for the caller to append.
    fn split_at(&mut self, index: usize) -> Option<[Item; 2]> {
        let threshold = self.config.split_threshold;
        let item = &mut self.items[index];
        if !item.can_split(threshold) {
            item.mark_complete(self.config.complete_speed);
            self.stats.complete += 1;
            debug!("item {index} completed at size {}", item.size);
            return None;
        }
        let parent = self.items.remove(index);
        let children = parent.spawn_children(&self.config, self.viewport, &mut self.rng);
        debug!("item {index} split into two of size {}", children[0].size);
        Some(children)
    }

    /// Applies a press at canvas coordinates. Every item whose box contains
    /// the point reacts: active items split (counting a hit), complete items
    /// flash. Items are tested as they were before the press.
    pub fn press(&mut self, x: f64, y: f64) -> PressOutcome {
        self.stats.clicks += 1;
        let hit: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.bbox.contains(x, y))
            .map(|(i, _)| i)
            .collect();

        let mut outcome = PressOutcome::default();
        // Descending order keeps the remaining indices valid while parents are removed.
        let mut spawned = Vec::new();
        for &i in hit.iter().rev() {
            if self.items[i].complete {
                self.items[i].flash(self.config.flash_low, &mut self.rng);
                outcome.flashed += 1;
                continue;
            }
            outcome.hits += 1;
            self.stats.hits += 1;
            if let Some(children) = self.split_at(i) {
                spawned.push(children);
            }
        }
        // Children are appended in the order their parents appeared.
        for pair in spawned.into_iter().rev() {
            self.items.extend(pair);
        }
        if outcome.hits > 0 {
            debug!("press at ({x:.0},{y:.0}) hit {} item(s)", outcome.hits);
        }
        outcome
    }

    /// Whether an update/render pass should run at `now_ms`.
    pub fn frame_due(&mut self, now_ms: f64) -> bool {
        self.clock.due(now_ms)
    }

    /// Runs one pass in collection order: complete items cycle their color,
    /// each item is handed to `draw`, then moved one step.
    pub fn advance_frame<F: FnMut(&Item)>(&mut self, mut draw: F) {
        let floor = self.config.color_floor;
        for item in self.items.iter_mut() {
            if item.complete {
                item.update_color(floor);
            }
            draw(item);
            item.advance(self.viewport, &mut self.rng);
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        debug!("viewport resized to {}x{}", viewport.width, viewport.height);
        self.viewport = viewport;
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> Simulation {
        Simulation::with_seed(GameConfig::default(), Viewport::new(800.0, 600.0), 3)
    }

    // Places a single item of `size` at a known position.
    fn sim_with(size: f64) -> Simulation {
        let mut s = sim();
        let cfg = s.config.clone();
        let vp = s.viewport;
        let item = Item::new(Some(100.0), Some(100.0), size, &cfg, vp, &mut s.rng);
        s.items = vec![item];
        s
    }

    #[test]
    fn test_accuracy() {
        let mut st = Stats::default();
        assert_eq!(st.accuracy(), 0);
        st.hits = 5;
        assert_eq!(st.accuracy(), 0);
        st.clicks = 3;
        assert_eq!(st.accuracy(), 100);
        st.hits = 2;
        assert_eq!(st.accuracy(), 67);
        st.hits = 0;
        assert_eq!(st.accuracy(), 0);
    }

    #[test]
    fn test_stats_line() {
        let st = Stats {
            clicks: 4,
            hits: 1,
            complete: 2,
        };
        assert_eq!(
            st.to_string(),
            "Clicks: 4 | Hits: 1 | Complete: 2 | Accuracy: 25%"
        );
    }

    #[test]
    fn test_frame_clock_throttles() {
        let mut clock = FrameClock::new(16.0);
        assert!(clock.due(0.0));
        assert!(!clock.due(10.0));
        assert!(!clock.due(15.9));
        assert!(clock.due(16.0));
        assert!(!clock.due(20.0));
        assert!(clock.due(40.0));
    }

    #[test]
    fn test_reset_seeds_single_item() {
        let mut s = sim();
        s.press(-500.0, -500.0);
        s.reset();
        assert_eq!(s.stats(), Stats::default());
        assert_eq!(s.items().len(), 1);
        assert_eq!(s.items()[0].size, 100.0);
        assert!(!s.items()[0].complete);
    }

    #[test]
    fn test_split_size_30_yields_two_children() {
        let mut s = sim_with(30.0);
        assert_eq!(s.split(0), SplitResult::Split);
        assert_eq!(s.items().len(), 2);
        for child in s.items() {
            assert_eq!(child.size, 20.0);
            assert!(!child.complete);
        }
        assert_eq!(s.stats().complete, 0);
    }

    #[test]
    fn test_split_at_threshold_completes() {
        let mut s = sim_with(20.0);
        assert_eq!(s.split(0), SplitResult::Completed);
        assert_eq!(s.items().len(), 1);
        assert!(s.items()[0].complete);
        assert_eq!(s.items()[0].speed, 1.0);
        assert_eq!(s.stats().complete, 1);
        assert_eq!(s.split(0), SplitResult::Ignored);
        assert_eq!(s.stats().complete, 1);
        assert_eq!(s.split(9), SplitResult::Ignored);
    }

    #[test]
    fn test_split_moves_children_to_end() {
        let mut s = sim_with(50.0);
        let cfg = s.config.clone();
        let vp = s.viewport;
        let other = Item::new(Some(400.0), Some(400.0), 60.0, &cfg, vp, &mut s.rng);
        s.items.push(other);
        s.split(0);
        let sizes: Vec<f64> = s.items().iter().map(|i| i.size).collect();
        assert_eq!(sizes, vec![60.0, 40.0, 40.0]);
    }

    #[test]
    fn test_press_hits_and_misses() {
        let mut s = sim_with(50.0);
        let out = s.press(120.0, 120.0);
        assert_eq!(out, PressOutcome { hits: 1, flashed: 0 });
        assert_eq!(s.items().len(), 2);
        let out = s.press(-100.0, -100.0);
        assert_eq!(out, PressOutcome::default());
        assert_eq!(s.stats().clicks, 2);
        assert_eq!(s.stats().hits, 1);
        assert_eq!(s.stats().accuracy(), 50);
    }

    #[test]
    fn test_children_not_hit_by_same_press() {
        let mut s = sim_with(100.0);
        s.press(150.0, 150.0);
        assert_eq!(s.items().len(), 2);
        assert!(s.items().iter().all(|i| i.size == 90.0));
    }

    #[test]
    fn test_press_on_complete_flashes() {
        let mut s = sim_with(20.0);
        s.press(110.0, 110.0);
        assert!(s.items()[0].complete);
        let out = s.press(110.0, 110.0);
        assert_eq!(out, PressOutcome { hits: 0, flashed: 1 });
        let st = s.stats();
        assert_eq!((st.clicks, st.hits, st.complete), (2, 1, 1));
        let c = s.items()[0].color;
        let highs = [c.r, c.g, c.b].iter().filter(|&&v| v == 255).count();
        let lows = [c.r, c.g, c.b].iter().filter(|&&v| v == 52).count();
        assert_eq!((highs, lows), (1, 2));
    }

    #[test]
    fn test_overlapping_items_all_react() {
        let mut s = sim_with(40.0);
        let cfg = s.config.clone();
        let vp = s.viewport;
        let twin = Item::new(Some(100.0), Some(100.0), 30.0, &cfg, vp, &mut s.rng);
        let far = Item::new(Some(500.0), Some(500.0), 30.0, &cfg, vp, &mut s.rng);
        s.items.push(twin);
        s.items.push(far);
        let out = s.press(110.0, 110.0);
        assert_eq!(out.hits, 2);
        let sizes: Vec<f64> = s.items().iter().map(|i| i.size).collect();
        assert_eq!(sizes, vec![30.0, 30.0, 30.0, 20.0, 20.0]);
        assert_eq!(s.stats().hits, 2);
    }

    #[test]
    fn test_advance_frame_draws_then_moves_in_order() {
        let mut s = sim_with(50.0);
        let cfg = s.config.clone();
        let vp = s.viewport;
        let second = Item::new(Some(300.0), Some(300.0), 50.0, &cfg, vp, &mut s.rng);
        s.items.push(second);
        let mut drawn = Vec::new();
        s.advance_frame(|item| drawn.push((item.x, item.y)));
        assert_eq!(drawn, vec![(100.0, 100.0), (300.0, 300.0)]);
        for item in s.items() {
            assert_eq!(item.bbox.left, item.x - item.stroke_width);
        }
    }

    #[test]
    fn test_advance_frame_cycles_complete_color_before_draw() {
        let mut s = sim_with(20.0);
        s.split(0);
        let before = s.items()[0].color;
        let mut seen = None;
        s.advance_frame(|item| seen = Some(item.color));
        assert_ne!(seen, Some(before));
    }

    #[test]
    fn test_press_applies_same_rule_as_split() {
        for size in [30.0, 20.0] {
            let mut pressed = sim_with(size);
            let mut split = sim_with(size);
            pressed.press(110.0, 110.0);
            split.split(0);
            assert_eq!(pressed.items(), split.items());
            assert_eq!(pressed.stats().complete, split.stats().complete);
            assert_eq!(pressed.stats().hits, 1);
            assert_eq!(split.stats().hits, 0);
        }
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut a = sim();
        let mut b = sim();
        for _ in 0..50 {
            a.advance_frame(|_| {});
            b.advance_frame(|_| {});
        }
        assert_eq!(a.items(), b.items());
    }
}
