//! "Press any button" capture of a new binding.
use crate::{
    data::{
        buttons::{ButtonId, Device},
        mapping::{BindingRef, Bindings},
    },
    systems::input::InputFrame,
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct RemapSession {
    target: BindingRef,
    remaining: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    Idle,
    Waiting,
    Bound {
        target: BindingRef,
        device: Device,
        button: ButtonId,
    },
    TimedOut {
        target: BindingRef,
    },
}

/// At most one capture session at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemapCapture {
    session: Option<RemapSession>,
}

impl RemapCapture {
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn target(&self) -> Option<BindingRef> {
        self.session.map(|session| session.target)
    }

    pub fn remaining_seconds(&self) -> Option<f32> {
        self.session.and_then(|session| session.remaining)
    }

    /// Whole seconds left, for the countdown label.
    pub fn countdown(&self) -> Option<i32> {
        self.remaining_seconds().map(|remaining| remaining.max(0.0) as i32)
    }

    /// Starts listening for `target`. A session already running is dropped
    /// without touching its binding.
    pub fn begin(&mut self, target: BindingRef, timeout: Option<f32>) {
        if let Some(previous) = self.session {
            log::debug!("capture for {:?} replaced by {target:?}", previous.target);
        }
        log::debug!("capturing binding for {target:?}");
        self.session = Some(RemapSession {
            target,
            remaining: timeout,
        });
    }

    pub fn cancel(&mut self) {
        self.session = None;
    }

    /// Advances the session by one frame. On a bind every working mask in
    /// `frame` is zeroed so the press does not also navigate.
    pub fn tick(&mut self, frame: &mut InputFrame, bindings: &mut Bindings, delta_seconds: f32) -> CaptureOutcome {
        let Some(session) = self.session.as_mut() else {
            return CaptureOutcome::Idle;
        };
        let target = session.target;

        if let Some(remaining) = session.remaining.as_mut() {
            *remaining -= delta_seconds;
            if *remaining <= 0.0 {
                bindings.get_mut(target).unbind();
                self.session = None;
                log::info!("capture for {target:?} timed out; binding cleared");
                return CaptureOutcome::TimedOut { target };
            }
        }

        let pressed = Device::ALL.into_iter().find_map(|device| {
            ButtonId::lowest_in(frame.newly_pressed(device)).map(|button| (device, button))
        });
        let Some((device, button)) = pressed else {
            return CaptureOutcome::Waiting;
        };

        bindings.get_mut(target).bind(device, button);
        self.session = None;
        frame.clear();
        log::info!("bound {target:?} to {device:?} button {}", button.bit());
        CaptureOutcome::Bound {
            target,
            device,
            button,
        }
    }
}
