//! Boundary to the emulated-console core.
//!
//! The frontend never reaches into a core directly; everything it needs goes
//! through [`EmulatorCore`]. [`HeadlessCore`] is a stand-in that keeps enough
//! state to drive the menu without a real console attached.
use std::{collections::HashMap, path::PathBuf};

use bevy::prelude::*;

use crate::data::{
    buttons::{ButtonId, Device},
    catalog::RomEntry,
    mapping::{MappedAction, MappedButton},
    settings::{CoreSettings, SettingsError, SettingsReader, SettingsWriter},
};

/// One logical button of the emulated console, as shown on the mapping page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleButton {
    pub name: &'static str,
    pub icon: &'static str,
}

/// A settings-page row owned by the core. The frontend shows
/// [`EmulatorCore::option_label`] and routes left/right/enter back through
/// [`EmulatorCore::adjust_option`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreOption {
    pub id: usize,
    pub icon: &'static str,
}

pub trait EmulatorCore: CoreSettings + Send + Sync {
    fn title(&self) -> &str;
    fn version(&self) -> &str;
    /// File extensions the core can load, without the dot.
    fn rom_extensions(&self) -> &[&'static str];

    /// Logical buttons, indexed by console action. Fixed for the core's lifetime.
    fn button_layout(&self) -> &[ConsoleButton];
    /// Order in which the mapping page lists `button_layout` entries.
    fn button_order(&self) -> &[usize];
    fn default_bindings(&self) -> Vec<MappedAction>;

    /// Rows the core adds to the settings page, in display order.
    fn settings_options(&self) -> Vec<CoreOption> {
        Vec::new()
    }
    fn option_label(&self, _id: usize) -> String {
        String::new()
    }
    /// `step` is -1/+1 for left/right and 0 for enter.
    fn adjust_option(&mut self, _id: usize, _step: i32) {}

    fn load_rom(&mut self, rom: &RomEntry) -> bool;
    fn reset_game(&mut self);
    /// Slot-taking calls panic when `slot` is not below the frontend's
    /// configured slot count.
    fn save_state(&mut self, slot: usize);
    fn load_state(&mut self, slot: usize);
    fn update_state_image(&mut self, slot: usize);
    /// Flushes battery-backed RAM for the running game.
    fn save_ram(&mut self);
    /// `buttons` has bit `i` set while console action `i` is held.
    fn run_frame(&mut self, buttons: u32, delta_seconds: f32);
}

/// The frontend's handle on the active core.
#[derive(Resource)]
pub struct EmulatorHost(pub Box<dyn EmulatorCore>);

const VIRTUAL_BOY_BUTTONS: [ConsoleButton; 14] = [
    ConsoleButton { name: "A", icon: "button_a" },
    ConsoleButton { name: "B", icon: "button_b" },
    ConsoleButton { name: "R", icon: "trigger_right" },
    ConsoleButton { name: "L", icon: "trigger_left" },
    ConsoleButton { name: "Right D-Pad Up", icon: "right_pad_up" },
    ConsoleButton { name: "Right D-Pad Right", icon: "right_pad_right" },
    ConsoleButton { name: "Left D-Pad Right", icon: "left_pad_right" },
    ConsoleButton { name: "Left D-Pad Left", icon: "left_pad_left" },
    ConsoleButton { name: "Left D-Pad Down", icon: "left_pad_down" },
    ConsoleButton { name: "Left D-Pad Up", icon: "left_pad_up" },
    ConsoleButton { name: "Start", icon: "start" },
    ConsoleButton { name: "Select", icon: "select" },
    ConsoleButton { name: "Right D-Pad Left", icon: "right_pad_left" },
    ConsoleButton { name: "Right D-Pad Down", icon: "right_pad_down" },
];

const VIRTUAL_BOY_ORDER: [usize; 14] = [0, 1, 3, 2, 11, 10, 7, 6, 9, 8, 12, 5, 4, 13];

const fn pair(gamepad: ButtonId, device: Device, alternate: ButtonId) -> MappedAction {
    MappedAction::new(
        MappedButton::bound(Device::Gamepad, gamepad),
        MappedButton::bound(device, alternate),
    )
}

const VIRTUAL_BOY_DEFAULTS: [MappedAction; 14] = [
    pair(ButtonId::A, Device::RightController, ButtonId::A),
    pair(ButtonId::B, Device::RightController, ButtonId::B),
    pair(ButtonId::RIGHT_SHOULDER, Device::RightController, ButtonId::TRIGGER),
    pair(ButtonId::LEFT_SHOULDER, Device::LeftController, ButtonId::TRIGGER),
    pair(ButtonId::RIGHT_STICK_UP, Device::RightController, ButtonId::UP),
    pair(ButtonId::RIGHT_STICK_RIGHT, Device::RightController, ButtonId::RIGHT),
    pair(ButtonId::RIGHT, Device::LeftController, ButtonId::RIGHT),
    pair(ButtonId::LEFT, Device::LeftController, ButtonId::LEFT),
    pair(ButtonId::DOWN, Device::LeftController, ButtonId::DOWN),
    pair(ButtonId::UP, Device::LeftController, ButtonId::UP),
    pair(ButtonId::ENTER, Device::LeftController, ButtonId::X),
    pair(ButtonId::BACK, Device::LeftController, ButtonId::Y),
    pair(ButtonId::RIGHT_STICK_LEFT, Device::RightController, ButtonId::LEFT),
    pair(ButtonId::RIGHT_STICK_DOWN, Device::RightController, ButtonId::DOWN),
];

pub const PALETTE_OPTION: usize = 0;
pub const DEPTH_OFFSET_OPTION: usize = 1;

/// Screen tints selectable from the settings page.
pub const PALETTE_PRESETS: [[f32; 3]; 11] = [
    [1.0, 0.0, 0.0],
    [0.9, 0.3, 0.1],
    [1.0, 0.85, 0.1],
    [0.25, 1.0, 0.1],
    [0.0, 1.0, 0.45],
    [0.0, 1.0, 0.85],
    [0.0, 0.85, 1.0],
    [0.15, 1.0, 1.0],
    [0.75, 0.65, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, 0.3, 0.2],
];

const DEPTH_OFFSET_STEP: f32 = 0.001953125;
const MAX_DEPTH_OFFSET: f32 = 0.1953125;
const HEADLESS_SAVE_SLOTS: usize = 10;

/// Core without a console behind it: counts frames and keeps snapshots of
/// the frame counter per save slot.
#[derive(Debug)]
pub struct HeadlessCore {
    pub loaded_rom: Option<PathBuf>,
    pub frame: u64,
    pub held_buttons: u32,
    pub snapshots: HashMap<usize, u64>,
    pub previewed_slot: Option<usize>,
    pub ram_flushes: u32,
    /// Index into [`PALETTE_PRESETS`].
    pub palette: i32,
    pub depth_offset: f32,
    pub save_slots: usize,
}

impl Default for HeadlessCore {
    fn default() -> Self {
        Self {
            loaded_rom: None,
            frame: 0,
            held_buttons: 0,
            snapshots: HashMap::new(),
            previewed_slot: None,
            ram_flushes: 0,
            palette: PALETTE_PRESETS.len() as i32 - 2,
            depth_offset: 0.0,
            save_slots: HEADLESS_SAVE_SLOTS,
        }
    }
}

impl HeadlessCore {
    fn check_slot(&self, slot: usize) {
        assert!(
            slot < self.save_slots,
            "save slot {slot} out of range (0..{})",
            self.save_slots
        );
    }
}

impl CoreSettings for HeadlessCore {
    fn settings_len(&self) -> usize {
        8
    }

    fn write_settings(&self, out: &mut SettingsWriter) {
        out.put_i32(self.palette);
        out.put_f32(self.depth_offset);
    }

    fn read_settings(&mut self, input: &mut SettingsReader<'_>) -> Result<(), SettingsError> {
        let palette = input.get_i32()?;
        let depth_offset = input.get_f32()?;
        self.palette = palette.clamp(0, PALETTE_PRESETS.len() as i32 - 1);
        self.depth_offset = depth_offset.clamp(-MAX_DEPTH_OFFSET, MAX_DEPTH_OFFSET);
        Ok(())
    }
}

impl EmulatorCore for HeadlessCore {
    fn title(&self) -> &str {
        "VirtualBoyGo"
    }

    fn version(&self) -> &str {
        concat!("ver.", env!("CARGO_PKG_VERSION"))
    }

    fn rom_extensions(&self) -> &[&'static str] {
        &["vb", "vboy", "bin"]
    }

    fn button_layout(&self) -> &[ConsoleButton] {
        &VIRTUAL_BOY_BUTTONS
    }

    fn button_order(&self) -> &[usize] {
        &VIRTUAL_BOY_ORDER
    }

    fn default_bindings(&self) -> Vec<MappedAction> {
        VIRTUAL_BOY_DEFAULTS.to_vec()
    }

    fn settings_options(&self) -> Vec<CoreOption> {
        vec![
            CoreOption {
                id: DEPTH_OFFSET_OPTION,
                icon: "ipd",
            },
            CoreOption {
                id: PALETTE_OPTION,
                icon: "palette",
            },
        ]
    }

    fn option_label(&self, id: usize) -> String {
        match id {
            PALETTE_OPTION => format!("Palette: {}", self.palette + 1),
            DEPTH_OFFSET_OPTION => format!("Offset: {:.4}", self.depth_offset),
            _ => String::new(),
        }
    }

    fn adjust_option(&mut self, id: usize, step: i32) {
        match id {
            PALETTE_OPTION => {
                let step = if step == 0 { 1 } else { step };
                self.palette = (self.palette + step).rem_euclid(PALETTE_PRESETS.len() as i32);
            }
            DEPTH_OFFSET_OPTION if step == 0 => self.depth_offset = 0.0,
            DEPTH_OFFSET_OPTION => {
                self.depth_offset = (self.depth_offset + step as f32 * DEPTH_OFFSET_STEP)
                    .clamp(-MAX_DEPTH_OFFSET, MAX_DEPTH_OFFSET);
            }
            _ => log::warn!("unknown core option {id}"),
        }
    }

    fn load_rom(&mut self, rom: &RomEntry) -> bool {
        info!("loading rom {}", rom.path.display());
        self.loaded_rom = Some(rom.path.clone());
        self.frame = 0;
        self.snapshots.clear();
        true
    }

    fn reset_game(&mut self) {
        self.frame = 0;
    }

    fn save_state(&mut self, slot: usize) {
        self.check_slot(slot);
        self.snapshots.insert(slot, self.frame);
    }

    /// An empty slot leaves the running game alone.
    fn load_state(&mut self, slot: usize) {
        self.check_slot(slot);
        if let Some(frame) = self.snapshots.get(&slot) {
            self.frame = *frame;
        }
    }

    fn update_state_image(&mut self, slot: usize) {
        self.check_slot(slot);
        self.previewed_slot = Some(slot);
    }

    fn save_ram(&mut self) {
        self.ram_flushes += 1;
    }

    fn run_frame(&mut self, buttons: u32, _delta_seconds: f32) {
        if self.loaded_rom.is_some() {
            self.frame += 1;
        }
        self.held_buttons = buttons;
    }
}
