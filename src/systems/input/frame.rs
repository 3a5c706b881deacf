use bevy::{math::Vec2, prelude::Resource};
use enum_map::EnumMap;

use crate::data::buttons::{ButtonId, Device, DeviceMasks};

/// One device's raw reading for a frame.
///
/// Stick axes are normalized so that `+y` is up on every device. For motion
/// controllers `stick` is the thumbstick, `trigger` the index trigger and
/// `second_trigger` the grip; `right_stick` is unused.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawDeviceState {
    pub buttons: u32,
    pub stick: Vec2,
    pub right_stick: Vec2,
    pub trigger: f32,
    pub second_trigger: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DeviceSample {
    Connected(RawDeviceState),
    #[default]
    Disconnected,
    /// The platform handed back a device it could not identify.
    Invalid,
}

impl DeviceSample {
    pub fn is_connected(&self) -> bool {
        matches!(self, DeviceSample::Connected(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisThresholds {
    pub stick: f32,
    pub trigger: f32,
}

impl Default for AxisThresholds {
    fn default() -> Self {
        Self {
            stick: 0.5,
            trigger: 0.25,
        }
    }
}

fn stick_bits(stick: Vec2, threshold: f32, [up, down, left, right]: [ButtonId; 4]) -> u32 {
    let mut bits = 0;
    if stick.x < -threshold {
        bits |= left.mask();
    }
    if stick.x > threshold {
        bits |= right.mask();
    }
    if stick.y > threshold {
        bits |= up.mask();
    }
    if stick.y < -threshold {
        bits |= down.mask();
    }
    bits
}

const LEFT_STICK: [ButtonId; 4] = [
    ButtonId::LEFT_STICK_UP,
    ButtonId::LEFT_STICK_DOWN,
    ButtonId::LEFT_STICK_LEFT,
    ButtonId::LEFT_STICK_RIGHT,
];
const RIGHT_STICK: [ButtonId; 4] = [
    ButtonId::RIGHT_STICK_UP,
    ButtonId::RIGHT_STICK_DOWN,
    ButtonId::RIGHT_STICK_LEFT,
    ButtonId::RIGHT_STICK_RIGHT,
];
const DPAD: [ButtonId; 4] = [ButtonId::UP, ButtonId::DOWN, ButtonId::LEFT, ButtonId::RIGHT];

/// Folds analog axes into the digital mask for `device`.
pub fn synthesize(device: Device, state: &RawDeviceState, thresholds: AxisThresholds) -> u32 {
    let mut mask = state.buttons;
    match device {
        Device::Gamepad => {
            mask |= stick_bits(state.stick, thresholds.stick, LEFT_STICK);
            mask |= stick_bits(state.right_stick, thresholds.stick, RIGHT_STICK);
            if state.trigger > thresholds.trigger {
                mask |= ButtonId::L2.mask();
            }
            if state.second_trigger > thresholds.trigger {
                mask |= ButtonId::R2.mask();
            }
        }
        Device::LeftController | Device::RightController => {
            // Controller thumbsticks share the d-pad bits.
            mask |= stick_bits(state.stick, thresholds.stick, DPAD);
            if state.trigger > thresholds.trigger {
                mask |= ButtonId::TRIGGER.mask();
            }
            if state.second_trigger > thresholds.trigger {
                mask |= ButtonId::GRIP_TRIGGER.mask();
            }
        }
    }
    mask
}

/// Turns per-device samples into masks, tracking connection changes.
#[derive(Resource, Debug, Clone, Default)]
pub struct InputAggregator {
    pub thresholds: AxisThresholds,
    connected: EnumMap<Device, bool>,
}

impl InputAggregator {
    pub fn new(thresholds: AxisThresholds) -> Self {
        Self {
            thresholds,
            connected: EnumMap::default(),
        }
    }

    pub fn is_connected(&self, device: Device) -> bool {
        self.connected[device]
    }

    /// Disconnected and invalid devices contribute an empty mask.
    pub fn aggregate(&mut self, samples: &EnumMap<Device, DeviceSample>) -> DeviceMasks {
        let mut masks = DeviceMasks::default();
        for device in Device::ALL {
            let sample = &samples[device];
            let connected = sample.is_connected();
            if connected != self.connected[device] {
                if connected {
                    log::info!("{device:?} connected");
                } else {
                    log::info!("{device:?} disconnected");
                }
                self.connected[device] = connected;
            }
            match sample {
                DeviceSample::Connected(state) => {
                    masks[device] = synthesize(device, state, self.thresholds);
                }
                DeviceSample::Invalid => {
                    log::debug!("ignoring invalid sample for {device:?}");
                }
                DeviceSample::Disconnected => {}
            }
        }
        masks
    }
}

/// Current and previous masks for every device.
///
/// `current` and `previous` are the working copies navigation reads and may
/// clear. The untouched sample of the last frame is kept apart so that
/// clearing never leaks into next frame's edge detection.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct InputFrame {
    pub current: DeviceMasks,
    pub previous: DeviceMasks,
    sampled: DeviceMasks,
}

impl InputFrame {
    /// Swaps buffers and installs a new sample. Call once per frame, before
    /// anything reads the masks.
    pub fn begin(&mut self, sampled: DeviceMasks) {
        self.previous = self.sampled;
        self.sampled = sampled;
        self.current = sampled;
    }

    pub fn sampled(&self) -> &DeviceMasks {
        &self.sampled
    }

    pub fn clear_current(&mut self) {
        self.current = DeviceMasks::default();
    }

    /// Zeroes both working copies on every device.
    pub fn clear(&mut self) {
        self.current = DeviceMasks::default();
        self.previous = DeviceMasks::default();
    }

    pub fn newly_pressed(&self, device: Device) -> u32 {
        self.current[device] & !self.previous[device]
    }
}

#[cfg(test)]
mod tests {
    use enum_map::enum_map;

    use super::*;

    fn connected(state: RawDeviceState) -> DeviceSample {
        DeviceSample::Connected(state)
    }

    #[test]
    fn gamepad_sticks_and_triggers_set_bits() {
        let state = RawDeviceState {
            buttons: ButtonId::A.mask(),
            stick: Vec2::new(-0.8, 0.9),
            right_stick: Vec2::new(0.6, -0.7),
            trigger: 0.3,
            second_trigger: 0.2,
        };
        let mask = synthesize(Device::Gamepad, &state, AxisThresholds::default());
        let expected = ButtonId::A.mask()
            | ButtonId::LEFT_STICK_LEFT.mask()
            | ButtonId::LEFT_STICK_UP.mask()
            | ButtonId::RIGHT_STICK_RIGHT.mask()
            | ButtonId::RIGHT_STICK_DOWN.mask()
            | ButtonId::L2.mask();
        assert_eq!(mask, expected);
    }

    #[test]
    fn thresholds_are_exclusive() {
        let state = RawDeviceState {
            stick: Vec2::new(0.5, -0.5),
            trigger: 0.25,
            ..default_state()
        };
        assert_eq!(synthesize(Device::Gamepad, &state, AxisThresholds::default()), 0);
    }

    fn default_state() -> RawDeviceState {
        RawDeviceState::default()
    }

    #[test]
    fn controller_stick_maps_to_dpad_and_grip_to_grip_trigger() {
        let state = RawDeviceState {
            stick: Vec2::new(0.0, -0.9),
            trigger: 0.9,
            second_trigger: 0.9,
            ..default_state()
        };
        let mask = synthesize(Device::RightController, &state, AxisThresholds::default());
        assert_eq!(
            mask,
            ButtonId::DOWN.mask() | ButtonId::TRIGGER.mask() | ButtonId::GRIP_TRIGGER.mask()
        );
    }

    #[test]
    fn disconnected_and_invalid_devices_fail_soft() {
        let mut aggregator = InputAggregator::default();
        let samples = enum_map! {
            Device::Gamepad => connected(RawDeviceState { buttons: 0b101, ..default_state() }),
            Device::LeftController => DeviceSample::Invalid,
            Device::RightController => DeviceSample::Disconnected,
        };
        let masks = aggregator.aggregate(&samples);
        assert_eq!(masks[Device::Gamepad], 0b101);
        assert_eq!(masks[Device::LeftController], 0);
        assert_eq!(masks[Device::RightController], 0);
        assert!(aggregator.is_connected(Device::Gamepad));
        assert!(!aggregator.is_connected(Device::LeftController));
    }

    #[test]
    fn begin_swaps_exactly_one_frame() {
        let mut frame = InputFrame::default();
        let first = enum_map! { Device::Gamepad => 0b01, _ => 0 };
        let second = enum_map! { Device::Gamepad => 0b11, _ => 0 };
        frame.begin(first);
        frame.begin(second);
        assert_eq!(frame.previous[Device::Gamepad], 0b01);
        assert_eq!(frame.newly_pressed(Device::Gamepad), 0b10);
    }

    #[test]
    fn clearing_working_copies_keeps_sampled_history() {
        let mut frame = InputFrame::default();
        let held = enum_map! { Device::LeftController => ButtonId::ENTER.mask(), _ => 0 };
        frame.begin(held);
        frame.clear();
        assert_eq!(frame.current[Device::LeftController], 0);

        frame.begin(held);
        assert_eq!(frame.previous[Device::LeftController], ButtonId::ENTER.mask());
        assert_eq!(frame.newly_pressed(Device::LeftController), 0);
    }
}
