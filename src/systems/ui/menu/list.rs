use std::{f32::consts::FRAC_PI_2, ops::Range};

use bevy::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTuning {
    /// Rows kept visible above the selection.
    pub lookbehind: usize,
    /// Rows kept visible below the selection, counting the selection itself.
    pub lookahead: usize,
    pub max_ease_rows: f32,
    pub ease_rate: f32,
}

impl Default for ScrollTuning {
    fn default() -> Self {
        Self {
            lookbehind: 3,
            lookahead: 4,
            max_ease_rows: 10.0,
            ease_rate: 25.0,
        }
    }
}

/// Selection index plus an eased, fractional window start over `len` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollWindow {
    pub visible_rows: usize,
    pub tuning: ScrollTuning,
    selection: usize,
    len: usize,
    target: usize,
    position: f32,
}

impl ScrollWindow {
    pub fn new(visible_rows: usize, tuning: ScrollTuning) -> Self {
        assert!(visible_rows > 0, "a list needs at least one visible row");
        Self {
            visible_rows,
            tuning,
            selection: 0,
            len: 0,
            target: 0,
            position: 0.0,
        }
    }

    pub fn selection(&self) -> usize {
        self.selection
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    /// Tracks the size of the bound record sequence.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.selection >= len {
            self.selection = len.saturating_sub(1);
        }
    }

    /// Jumps the selection without easing, e.g. when restoring a saved index.
    pub fn select(&mut self, index: usize) {
        assert!(
            index < self.len,
            "list selection {index} out of range for {} record(s)",
            self.len
        );
        self.selection = index;
        self.retarget();
        self.position = self.target as f32;
    }

    /// Moves the selection by `step`, wrapping at both ends.
    pub fn step(&mut self, step: isize) {
        if self.len == 0 {
            return;
        }
        let len = self.len as isize;
        self.selection = (self.selection as isize + step).rem_euclid(len) as usize;
    }

    fn retarget(&mut self) {
        let selection = self.selection as isize;
        let rows = self.visible_rows as isize;
        let mut target = self.target as isize;
        if selection - (self.tuning.lookbehind as isize) < target {
            target = selection - self.tuning.lookbehind as isize;
        }
        if selection + (self.tuning.lookahead as isize) - rows > target {
            target = selection + self.tuning.lookahead as isize - rows;
        }
        target = target.min(self.len as isize - rows).max(0);
        self.target = target as usize;
    }

    /// Clamps the target window around the selection and eases toward it.
    pub fn update(&mut self, delta_seconds: f32) {
        self.retarget();

        let target = self.target as f32;
        let distance = target - self.position;
        if distance == 0.0 {
            return;
        }
        let direction = distance.signum();
        let cap = self.tuning.max_ease_rows;
        let span = distance.abs().min(cap);
        let speed = (FRAC_PI_2 * 0.9 * (1.0 - span / cap)).cos() * 2.0;
        self.position += speed * direction * delta_seconds * self.tuning.ease_rate;

        if (direction > 0.0 && self.position > target) || (direction < 0.0 && self.position < target) {
            self.position = target;
        }
    }

    /// Record indices that intersect the window.
    pub fn visible_range(&self) -> Range<usize> {
        let start = self.position.floor().max(0.0) as usize;
        let end = ((self.position + self.visible_rows as f32).ceil() as usize).min(self.len);
        start.min(end)..end
    }

    /// Opacity of a row partially scrolled out at either edge.
    pub fn row_fade(&self, index: usize) -> f32 {
        let offset = index as f32 - self.position;
        if offset < 0.0 {
            (1.0 + offset).max(0.0)
        } else if offset > self.visible_rows as f32 - 1.0 {
            (self.visible_rows as f32 - offset).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Scrollbar thumb as (start, length), both as fractions of the track.
    pub fn scrollbar(&self) -> (f32, f32) {
        if self.len <= self.visible_rows {
            return (0.0, 1.0);
        }
        let length = self.visible_rows as f32 / self.len as f32;
        let progress = self.target as f32 / (self.len - self.visible_rows) as f32;
        ((1.0 - length) * progress, length)
    }
}

/// A list item bound to an external record sequence.
///
/// Only the record count is mirrored here; labels are read from the source
/// at draw time.
#[derive(Debug, Clone)]
pub struct ListItem<C> {
    pub window: ScrollWindow,
    pub size: Vec2,
    pub on_choose: fn(usize) -> C,
}

impl<C> ListItem<C> {
    pub fn new(size: Vec2, row_height: f32, tuning: ScrollTuning, on_choose: fn(usize) -> C) -> Self {
        let rows = ((size.y / row_height).floor() as usize).max(1);
        Self {
            window: ScrollWindow::new(rows, tuning),
            size,
            on_choose,
        }
    }

    pub fn row_height(&self) -> f32 {
        self.size.y / self.window.visible_rows as f32
    }

    pub fn press_up(&mut self) -> bool {
        self.window.step(-1);
        true
    }

    pub fn press_down(&mut self) -> bool {
        self.window.step(1);
        true
    }

    /// `None` on an empty list; the press is still consumed.
    pub fn press_enter(&self) -> Option<C> {
        if self.window.is_empty() {
            None
        } else {
            Some((self.on_choose)(self.window.selection()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(len: usize) -> ScrollWindow {
        let mut window = ScrollWindow::new(8, ScrollTuning::default());
        window.set_len(len);
        window
    }

    #[test]
    fn target_keeps_selection_inside_lookahead_margin() {
        let mut list = window(40);
        for _ in 0..10 {
            list.step(1);
        }
        list.update(0.0);
        // selection 10 + 4 - 8
        assert_eq!(list.target(), 6);

        for _ in 0..3 {
            list.step(-1);
        }
        list.update(0.0);
        // selection 7 - 3 pulls the window back up
        assert_eq!(list.target(), 4);
    }

    #[test]
    fn target_is_clamped_to_record_count() {
        let mut list = window(10);
        list.step(-1);
        assert_eq!(list.selection(), 9);
        list.update(0.0);
        assert_eq!(list.target(), 2);

        let mut short = window(3);
        short.step(-1);
        short.update(0.0);
        assert_eq!(short.target(), 0);
    }

    #[test]
    fn easing_converges_without_overshoot() {
        let mut list = window(200);
        list.select(150);
        for _ in 0..150 {
            list.step(-1);
        }
        let target = {
            list.update(0.0);
            list.target() as f32
        };
        let mut last_distance = (list.position() - target).abs();
        for _ in 0..400 {
            list.update(1.0 / 60.0);
            assert!(list.position() >= target, "eased past the target");
            let distance = (list.position() - target).abs();
            assert!(distance <= last_distance);
            last_distance = distance;
        }
        assert_eq!(list.position(), target);
    }

    #[test]
    fn large_steps_snap_to_target() {
        let mut list = window(50);
        list.select(30);
        list.step(5);
        list.update(1.0);
        assert_eq!(list.position(), list.target() as f32);
    }

    #[test]
    fn empty_list_ignores_steps() {
        let mut list = window(0);
        list.step(1);
        list.step(-1);
        list.update(0.5);
        assert_eq!(list.selection(), 0);
        assert_eq!(list.position(), 0.0);
    }

    #[test]
    fn rows_fade_at_the_edges() {
        let mut list = window(30);
        list.select(20);
        list.position = 12.5;
        assert_eq!(list.row_fade(12), 0.5);
        assert_eq!(list.row_fade(15), 1.0);
        assert_eq!(list.row_fade(20), 0.5);
        assert_eq!(list.visible_range(), 12..21);
    }

    #[test]
    fn enter_on_empty_list_is_consumed_silently() {
        let mut item = ListItem::new(Vec2::new(300.0, 240.0), 30.0, ScrollTuning::default(), |index| index);
        assert_eq!(item.press_enter(), None);
        item.window.set_len(3);
        item.press_down();
        assert_eq!(item.press_enter(), Some(1));
    }
}
