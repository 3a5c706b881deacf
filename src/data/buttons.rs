//! Device and button identifiers shared by every layer of the frontend.
//!
//! Each of the three input devices reports a 32-bit mask per frame; a button
//! is a bit position in that mask. Analog sticks and triggers are folded into
//! the same namespace by the aggregator, so the menu and the remapper only
//! ever see digital bits.
use std::fmt;

use enum_map::{Enum, EnumMap};
use serde::Deserialize;

/// Number of bit slots per device mask.
pub const BUTTON_SLOTS: u8 = 32;

#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    #[default]
    Gamepad,
    LeftController,
    RightController,
}

impl Device {
    /// Fixed arbitration order: gamepad first, then left, then right.
    pub const ALL: [Device; 3] = [Device::Gamepad, Device::LeftController, Device::RightController];

    pub const fn index(self) -> usize {
        match self {
            Device::Gamepad => 0,
            Device::LeftController => 1,
            Device::RightController => 2,
        }
    }

    pub fn from_index(index: i32) -> Option<Device> {
        match index {
            0 => Some(Device::Gamepad),
            1 => Some(Device::LeftController),
            2 => Some(Device::RightController),
            _ => None,
        }
    }
}

/// One bit position in a device mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ButtonId(u8);

impl ButtonId {
    pub const A: ButtonId = ButtonId(0);
    pub const B: ButtonId = ButtonId(1);
    pub const RIGHT_THUMB: ButtonId = ButtonId(2);
    pub const RIGHT_SHOULDER: ButtonId = ButtonId(3);
    pub const LEFT_STICK_UP: ButtonId = ButtonId(4);
    pub const LEFT_STICK_DOWN: ButtonId = ButtonId(5);
    pub const LEFT_STICK_LEFT: ButtonId = ButtonId(6);
    pub const LEFT_STICK_RIGHT: ButtonId = ButtonId(7);
    pub const X: ButtonId = ButtonId(8);
    pub const Y: ButtonId = ButtonId(9);
    pub const LEFT_THUMB: ButtonId = ButtonId(10);
    pub const LEFT_SHOULDER: ButtonId = ButtonId(11);
    pub const EXTRA_1: ButtonId = ButtonId(12);
    pub const EXTRA_2: ButtonId = ButtonId(13);
    pub const EXTRA_3: ButtonId = ButtonId(14);
    pub const EXTRA_4: ButtonId = ButtonId(15);
    pub const UP: ButtonId = ButtonId(16);
    pub const DOWN: ButtonId = ButtonId(17);
    pub const LEFT: ButtonId = ButtonId(18);
    pub const RIGHT: ButtonId = ButtonId(19);
    pub const ENTER: ButtonId = ButtonId(20);
    pub const BACK: ButtonId = ButtonId(21);
    pub const RIGHT_STICK_UP: ButtonId = ButtonId(22);
    pub const RIGHT_STICK_DOWN: ButtonId = ButtonId(23);
    pub const RIGHT_STICK_LEFT: ButtonId = ButtonId(24);
    pub const RIGHT_STICK_RIGHT: ButtonId = ButtonId(25);
    pub const GRIP_TRIGGER: ButtonId = ButtonId(26);
    pub const L2: ButtonId = ButtonId(27);
    pub const R2: ButtonId = ButtonId(28);
    pub const TRIGGER: ButtonId = ButtonId(29);
    pub const EXTRA_5: ButtonId = ButtonId(30);
    pub const JOYSTICK: ButtonId = ButtonId(31);

    /// Panics when `bit` is outside the 32-slot namespace.
    pub const fn new(bit: u8) -> ButtonId {
        assert!(bit < BUTTON_SLOTS, "button id out of range");
        ButtonId(bit)
    }

    pub const fn try_new(bit: i32) -> Option<ButtonId> {
        if bit >= 0 && bit < BUTTON_SLOTS as i32 {
            Some(ButtonId(bit as u8))
        } else {
            None
        }
    }

    pub const fn bit(self) -> u8 {
        self.0
    }

    pub const fn mask(self) -> u32 {
        1 << self.0
    }

    /// Lowest set bit of `mask`, scanning upward from bit 0.
    pub fn lowest_in(mask: u32) -> Option<ButtonId> {
        if mask == 0 {
            None
        } else {
            Some(ButtonId(mask.trailing_zeros() as u8))
        }
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(button_name(Device::Gamepad, *self))
    }
}

/// Per-device 32-bit masks.
pub type DeviceMasks = EnumMap<Device, u32>;

const GAMEPAD_NAMES: [&str; 32] = [
    "A", "B", "RThumb", "RBumper",
    "LStick-Up", "LStick-Down", "LStick-Left", "LStick-Right",
    "X", "Y", "LThumb", "LBumper",
    "B1", "B2", "B3", "B4",
    "Up", "Down", "Left", "Right",
    "Enter", "Back", "RStick-Up", "RStick-Down",
    "RStick-Left", "RStick-Right", "GripTrigger", "L2",
    "R2", "Trigger", "B5", "Joystick",
];

const LEFT_CONTROLLER_NAMES: [&str; 32] = [
    "LTouch-A", "LTouch-B", "LTouch-RThumb", "LTouch-RShoulder",
    "L1", "L2", "L3", "L4",
    "LTouch-X", "LTouch-Y", "LTouch-LThumb", "LTouch-LShoulder",
    "L5", "L6", "L7", "L8",
    "LTouch-Up", "LTouch-Down", "LTouch-Left", "LTouch-Right",
    "LTouch-Enter", "LTouch-Back", "L9", "L10",
    "L11", "L12", "LTouch-GripTrigger", "L13",
    "L14", "LTouch-Trigger", "L15", "LTouch-Joystick",
];

const RIGHT_CONTROLLER_NAMES: [&str; 32] = [
    "RTouch-A", "RTouch-B", "RTouch-RThumb", "RTouch-RShoulder",
    "R1", "R2", "R3", "R4",
    "RTouch-X", "RTouch-Y", "RTouch-LThumb", "RTouch-LShoulder",
    "R5", "R6", "R7", "R8",
    "RTouch-Up", "RTouch-Down", "RTouch-Left", "RTouch-Right",
    "RTouch-Enter", "RTouch-Back", "R9", "R10",
    "R11", "R12", "RTouch-GripTrigger", "R13",
    "R14", "RTouch-Trigger", "R15", "RTouch-Joystick",
];

/// Display name of a physical button, as shown on the mapping pages.
pub fn button_name(device: Device, button: ButtonId) -> &'static str {
    let table = match device {
        Device::Gamepad => &GAMEPAD_NAMES,
        Device::LeftController => &LEFT_CONTROLLER_NAMES,
        Device::RightController => &RIGHT_CONTROLLER_NAMES,
    };
    table[button.bit() as usize]
}

static BUTTONS_BY_NAME: phf::Map<&'static str, u8> = phf::phf_map! {
    "A" => 0,
    "B" => 1,
    "RThumb" => 2,
    "RShoulder" => 3,
    "LStick-Up" => 4,
    "LStick-Down" => 5,
    "LStick-Left" => 6,
    "LStick-Right" => 7,
    "X" => 8,
    "Y" => 9,
    "LThumb" => 10,
    "LShoulder" => 11,
    "B1" => 12,
    "B2" => 13,
    "B3" => 14,
    "B4" => 15,
    "Up" => 16,
    "Down" => 17,
    "Left" => 18,
    "Right" => 19,
    "Enter" => 20,
    "Back" => 21,
    "RStick-Up" => 22,
    "RStick-Down" => 23,
    "RStick-Left" => 24,
    "RStick-Right" => 25,
    "GripTrigger" => 26,
    "L2" => 27,
    "R2" => 28,
    "Trigger" => 29,
    "B5" => 30,
    "Joystick" => 31,
};

/// Resolves a device-neutral button name (as used in config files).
pub fn button_from_name(name: &str) -> Option<ButtonId> {
    BUTTONS_BY_NAME.get(name).copied().map(ButtonId)
}
