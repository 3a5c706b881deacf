//! Per-frame device sampling.
//!
//! The gamepad is read from bevy's `Gamepad` components. Motion controllers
//! are fed by the host's XR layer through [`MotionControllerFeed`]; whatever
//! is there when sampling runs is what the frame sees.
use bevy::{input::InputSystem, prelude::*};
use enum_map::enum_map;

use crate::{data::buttons::{ButtonId, Device}, startup::config::MenuConfig};

pub mod frame;

pub use frame::{AxisThresholds, DeviceSample, InputAggregator, InputFrame, RawDeviceState};

/// Latest motion-controller readings, written by the host.
#[derive(Resource, Debug, Clone, Default)]
pub struct MotionControllerFeed {
    pub left: DeviceSample,
    pub right: DeviceSample,
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputSampling;

const GAMEPAD_BUTTONS: [(GamepadButton, ButtonId); 14] = [
    (GamepadButton::South, ButtonId::A),
    (GamepadButton::East, ButtonId::B),
    (GamepadButton::West, ButtonId::X),
    (GamepadButton::North, ButtonId::Y),
    (GamepadButton::RightThumb, ButtonId::RIGHT_THUMB),
    (GamepadButton::LeftThumb, ButtonId::LEFT_THUMB),
    (GamepadButton::RightTrigger, ButtonId::RIGHT_SHOULDER),
    (GamepadButton::LeftTrigger, ButtonId::LEFT_SHOULDER),
    (GamepadButton::DPadUp, ButtonId::UP),
    (GamepadButton::DPadDown, ButtonId::DOWN),
    (GamepadButton::DPadLeft, ButtonId::LEFT),
    (GamepadButton::DPadRight, ButtonId::RIGHT),
    (GamepadButton::Start, ButtonId::ENTER),
    (GamepadButton::Select, ButtonId::BACK),
];

fn read_gamepad(gamepad: &Gamepad) -> RawDeviceState {
    let buttons = GAMEPAD_BUTTONS
        .iter()
        .filter(|(button, _)| gamepad.pressed(*button))
        .fold(0, |mask, (_, id)| mask | id.mask());
    RawDeviceState {
        buttons,
        stick: gamepad.left_stick(),
        right_stick: gamepad.right_stick(),
        trigger: gamepad.get(GamepadButton::LeftTrigger2).unwrap_or(0.0),
        second_trigger: gamepad.get(GamepadButton::RightTrigger2).unwrap_or(0.0),
    }
}

/// Samples every device and swaps the frame buffers, once per frame.
pub fn sample_devices(
    gamepads: Query<&Gamepad>,
    feed: Res<MotionControllerFeed>,
    mut aggregator: ResMut<InputAggregator>,
    mut frame: ResMut<InputFrame>,
) {
    let gamepad = gamepads
        .iter()
        .next()
        .map_or(DeviceSample::Disconnected, |gamepad| {
            DeviceSample::Connected(read_gamepad(gamepad))
        });
    let samples = enum_map! {
        Device::Gamepad => gamepad,
        Device::LeftController => feed.left,
        Device::RightController => feed.right,
    };
    let masks = aggregator.aggregate(&samples);
    frame.begin(masks);
}

pub struct FrameInputPlugin;
impl Plugin for FrameInputPlugin {
    fn build(&self, app: &mut App) {
        let thresholds = app
            .world()
            .get_resource::<MenuConfig>()
            .map_or_else(AxisThresholds::default, |config| AxisThresholds {
                stick: config.input.stick_threshold,
                trigger: config.input.trigger_threshold,
            });
        app.insert_resource(InputAggregator::new(thresholds))
            .init_resource::<InputFrame>()
            .init_resource::<MotionControllerFeed>()
            .add_systems(
                PreUpdate,
                sample_devices.in_set(InputSampling).after(InputSystem),
            );
    }
}
