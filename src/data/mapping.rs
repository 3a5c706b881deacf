//! Logical actions and their physical bindings.
//!
//! Bindings live in flat owned arrays and are addressed by [`BindingRef`]
//! rather than by reference, so a capture session can hold its target across
//! frames without borrowing the table.
use std::ops::{Index, IndexMut};

use super::buttons::{button_name, ButtonId, Device, DeviceMasks};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MappedButton {
    pub is_bound: bool,
    pub device: Device,
    pub button: ButtonId,
}

impl MappedButton {
    pub const UNBOUND: MappedButton = MappedButton {
        is_bound: false,
        device: Device::Gamepad,
        button: ButtonId::A,
    };

    pub const fn bound(device: Device, button: ButtonId) -> Self {
        Self {
            is_bound: true,
            device,
            button,
        }
    }

    pub fn bind(&mut self, device: Device, button: ButtonId) {
        self.is_bound = true;
        self.device = device;
        self.button = button;
    }

    pub fn unbind(&mut self) {
        self.is_bound = false;
    }

    pub fn is_held(&self, masks: &DeviceMasks) -> bool {
        self.is_bound && masks[self.device] & self.button.mask() != 0
    }

    pub fn just_pressed(&self, current: &DeviceMasks, previous: &DeviceMasks) -> bool {
        self.is_held(current) && !self.is_held(previous)
    }

    /// Name shown on the mapping pages; unbound slots read "-".
    pub fn label(&self) -> &'static str {
        if self.is_bound {
            button_name(self.device, self.button)
        } else {
            "-"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSlot {
    Primary,
    Alternate,
}

impl BindingSlot {
    pub const fn index(self) -> usize {
        match self {
            BindingSlot::Primary => 0,
            BindingSlot::Alternate => 1,
        }
    }
}

/// Up to two physical bindings for one logical action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MappedAction {
    pub buttons: [MappedButton; 2],
}

impl MappedAction {
    pub const fn new(primary: MappedButton, alternate: MappedButton) -> Self {
        Self {
            buttons: [primary, alternate],
        }
    }

    pub fn is_held(&self, masks: &DeviceMasks) -> bool {
        self.buttons.iter().any(|button| button.is_held(masks))
    }

    pub fn just_pressed(&self, current: &DeviceMasks, previous: &DeviceMasks) -> bool {
        self.buttons
            .iter()
            .any(|button| button.just_pressed(current, previous))
    }
}

impl Index<BindingSlot> for MappedAction {
    type Output = MappedButton;

    fn index(&self, slot: BindingSlot) -> &MappedButton {
        &self.buttons[slot.index()]
    }
}

impl IndexMut<BindingSlot> for MappedAction {
    fn index_mut(&mut self, slot: BindingSlot) -> &mut MappedButton {
        &mut self.buttons[slot.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingTable {
    /// The single "open menu" action.
    Menu,
    /// One action per emulated-console button, in core order.
    Console,
}

/// Address of one binding slot: (table, action index, slot).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingRef {
    pub table: BindingTable,
    pub action: usize,
    pub slot: BindingSlot,
}

impl BindingRef {
    pub const fn menu(slot: BindingSlot) -> Self {
        Self {
            table: BindingTable::Menu,
            action: 0,
            slot,
        }
    }

    pub const fn console(action: usize, slot: BindingSlot) -> Self {
        Self {
            table: BindingTable::Console,
            action,
            slot,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bindings {
    pub menu: MappedAction,
    pub console: Vec<MappedAction>,
}

impl Bindings {
    pub fn new(menu: MappedAction, console: Vec<MappedAction>) -> Self {
        Self { menu, console }
    }

    /// Panics when `target` addresses a console action that does not exist.
    pub fn get(&self, target: BindingRef) -> &MappedButton {
        match target.table {
            BindingTable::Menu => &self.menu[target.slot],
            BindingTable::Console => &self.console[target.action][target.slot],
        }
    }

    /// Panics when `target` addresses a console action that does not exist.
    pub fn get_mut(&mut self, target: BindingRef) -> &mut MappedButton {
        match target.table {
            BindingTable::Menu => &mut self.menu[target.slot],
            BindingTable::Console => &mut self.console[target.action][target.slot],
        }
    }

    /// Bit `i` is set when console action `i` is held on either binding.
    pub fn console_mask(&self, masks: &DeviceMasks) -> u32 {
        self.console
            .iter()
            .enumerate()
            .filter(|(_, action)| action.is_held(masks))
            .fold(0, |mask, (index, _)| mask | (1 << index))
    }
}
