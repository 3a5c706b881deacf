use std::f32::consts::FRAC_PI_2;

use bevy::math::Vec2;

fn ease(progress: f32) -> f32 {
    (progress.clamp(0.0, 1.0) * FRAC_PI_2).sin()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionTiming {
    pub duration: f32,
    /// Share of the timer the outgoing page has to itself before the
    /// incoming one starts moving.
    pub stagger: f32,
    pub slide_distance: f32,
}

impl Default for TransitionTiming {
    fn default() -> Self {
        Self {
            duration: 0.15,
            stagger: 0.35,
            slide_distance: 75.0,
        }
    }
}

/// Where and how opaque to draw one page this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayer {
    pub offset: Vec2,
    pub alpha: f32,
}

impl PageLayer {
    pub const SETTLED: PageLayer = PageLayer {
        offset: Vec2::ZERO,
        alpha: 1.0,
    };
}

/// Idle → Transitioning → Idle between two pages.
///
/// The timer runs from 1 down to 0; when it passes 0 the next page becomes
/// current and the timer resets to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct PageTransition<P> {
    pub timing: TransitionTiming,
    active: bool,
    direction: f32,
    timer: f32,
    current: P,
    next: P,
}

impl<P: Copy + PartialEq + std::fmt::Debug> PageTransition<P> {
    pub fn new(start: P, timing: TransitionTiming) -> Self {
        Self {
            timing,
            active: false,
            direction: 1.0,
            timer: 1.0,
            current: start,
            next: start,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current(&self) -> P {
        self.current
    }

    pub fn next(&self) -> P {
        self.next
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Returns `false` and changes nothing while a transition is running.
    pub fn start(&mut self, next: P, direction: i32) -> bool {
        if self.active {
            log::debug!("ignoring transition to {next:?}: already moving to {:?}", self.next);
            return false;
        }
        log::debug!("transition {:?} -> {next:?}", self.current);
        self.active = true;
        self.direction = direction.signum() as f32;
        self.next = next;
        true
    }

    /// Jumps straight to `page`, abandoning any running transition.
    pub fn jump(&mut self, page: P) {
        self.active = false;
        self.timer = 1.0;
        self.current = page;
        self.next = page;
    }

    /// Returns the new current page on the frame a transition completes.
    pub fn tick(&mut self, delta_seconds: f32) -> Option<P> {
        if !self.active {
            return None;
        }
        self.timer -= delta_seconds / self.timing.duration;
        if self.timer < 0.0 {
            self.timer = 1.0;
            self.active = false;
            self.current = self.next;
            return Some(self.current);
        }
        None
    }

    fn layer(&self, progress: f32, direction: f32) -> PageLayer {
        let linear = ((progress - self.timing.stagger) / (1.0 - self.timing.stagger)).clamp(0.0, 1.0);
        PageLayer {
            offset: Vec2::new(
                direction * (1.0 - ease(linear)) * self.timing.slide_distance,
                0.0,
            ),
            alpha: linear,
        }
    }

    pub fn outgoing(&self) -> PageLayer {
        self.layer(self.timer, -self.direction)
    }

    /// `None` while idle.
    pub fn incoming(&self) -> Option<PageLayer> {
        self.active
            .then(|| self.layer(1.0 - self.timer, self.direction))
    }
}

/// Linear 0..1 value moving toward open or closed, read through a sine ease.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    pub duration: f32,
    value: f32,
}

impl Fade {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            value: 0.0,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn eased(&self) -> f32 {
        ease(self.value)
    }

    pub fn is_visible(&self) -> bool {
        self.value > 0.0
    }

    pub fn tick(&mut self, open: bool, delta_seconds: f32) {
        let step = delta_seconds / self.duration;
        self.value = if open {
            (self.value + step).min(1.0)
        } else {
            (self.value - step).max(0.0)
        };
    }

    /// Layer that drops in from above as the fade opens.
    pub fn drop_in(&self, distance: f32) -> PageLayer {
        PageLayer {
            offset: Vec2::new(0.0, -(1.0 - self.eased()) * distance),
            alpha: self.value,
        }
    }
}
