//! Menu navigation built from the item model in [`item`].
//!
//! A [`Menu`] is host-agnostic: it reads one [`InputFrame`] per call to
//! [`Menu::advance`] and reports what happened as [`MenuEvent`]s. The
//! frontend pages, page transitions and remap capture sit on top of it in
//! [`context`]; [`plugin`] wires all of that into bevy.
use smallvec::SmallVec;

use crate::{
    data::buttons::{ButtonId, Device},
    systems::input::InputFrame,
};

pub mod context;
pub mod draw;
pub mod item;
pub mod list;
pub mod pages;
pub mod plugin;
pub mod remap;
pub mod transition;

use item::{MenuItem, RepeatTiming, Response};

#[derive(Debug, Clone, PartialEq)]
pub enum MenuEvent<C> {
    /// An item handled a press by emitting its command.
    Command { item: usize, command: C },
    /// Back was pressed and the menu has a back command.
    Back(C),
    /// Up/down moved the selection onto `item`.
    Selected { item: usize, direction: isize },
}

pub type MenuEvents<C> = SmallVec<[MenuEvent<C>; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationOptions {
    /// Enter on B, back on A.
    pub swap_enter_back: bool,
}

const LEFT_SOURCES: [(Device, ButtonId); 4] = [
    (Device::Gamepad, ButtonId::LEFT),
    (Device::Gamepad, ButtonId::LEFT_STICK_LEFT),
    (Device::LeftController, ButtonId::LEFT),
    (Device::RightController, ButtonId::LEFT),
];
const RIGHT_SOURCES: [(Device, ButtonId); 4] = [
    (Device::Gamepad, ButtonId::RIGHT),
    (Device::Gamepad, ButtonId::LEFT_STICK_RIGHT),
    (Device::LeftController, ButtonId::RIGHT),
    (Device::RightController, ButtonId::RIGHT),
];
const UP_SOURCES: [(Device, ButtonId); 4] = [
    (Device::Gamepad, ButtonId::UP),
    (Device::Gamepad, ButtonId::LEFT_STICK_UP),
    (Device::LeftController, ButtonId::UP),
    (Device::RightController, ButtonId::UP),
];
const DOWN_SOURCES: [(Device, ButtonId); 4] = [
    (Device::Gamepad, ButtonId::DOWN),
    (Device::Gamepad, ButtonId::LEFT_STICK_DOWN),
    (Device::LeftController, ButtonId::DOWN),
    (Device::RightController, ButtonId::DOWN),
];

const DPAD_MASK: u32 =
    ButtonId::UP.mask() | ButtonId::DOWN.mask() | ButtonId::LEFT.mask() | ButtonId::RIGHT.mask();
const GAMEPAD_DIRECTION_MASK: u32 = DPAD_MASK
    | ButtonId::LEFT_STICK_UP.mask()
    | ButtonId::LEFT_STICK_DOWN.mask()
    | ButtonId::LEFT_STICK_LEFT.mask()
    | ButtonId::LEFT_STICK_RIGHT.mask();

fn direction_held(frame: &InputFrame) -> bool {
    frame.current[Device::Gamepad] & GAMEPAD_DIRECTION_MASK != 0
        || frame.current[Device::LeftController] & DPAD_MASK != 0
        || frame.current[Device::RightController] & DPAD_MASK != 0
}

fn activation_sources(button: ButtonId) -> [(Device, ButtonId); 2] {
    [(Device::Gamepad, button), (Device::RightController, button)]
}

/// An ordered set of items with one current selection.
#[derive(Debug, Clone)]
pub struct Menu<C> {
    items: Vec<MenuItem<C>>,
    current_selection: usize,
    held_duration: f32,
    pub back: Option<C>,
}

impl<C: Clone> Menu<C> {
    /// Panics when `items` has no selectable item.
    pub fn new(items: Vec<MenuItem<C>>) -> Self {
        assert!(
            items.iter().any(|item| item.selectable),
            "a menu needs at least one selectable item"
        );
        Self {
            items,
            current_selection: 0,
            held_duration: 0.0,
            back: None,
        }
    }

    pub fn with_back(mut self, back: C) -> Self {
        self.back = Some(back);
        self
    }

    pub fn items(&self) -> &[MenuItem<C>] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [MenuItem<C>] {
        &mut self.items
    }

    pub fn current_selection(&self) -> usize {
        self.current_selection
    }

    pub fn selected_item(&self) -> &MenuItem<C> {
        &self.items[self.current_selection]
    }

    pub fn held_duration(&self) -> f32 {
        self.held_duration
    }

    /// Settles the selection on a selectable item and marks it selected.
    pub fn init(&mut self) {
        if !self.items[self.current_selection].selectable {
            self.move_selection(1);
        }
        item::select(&mut self.items[self.current_selection]);
    }

    /// Panics when `index` is out of range or not selectable.
    pub fn set_selection(&mut self, index: usize) {
        assert!(
            self.items[index].selectable,
            "menu item {index} is not selectable"
        );
        item::unselect(&mut self.items[self.current_selection]);
        self.current_selection = index;
        item::select(&mut self.items[self.current_selection]);
    }

    /// Steps by `direction` with wrap-around until a selectable item is hit.
    pub fn move_selection(&mut self, direction: isize) {
        let len = self.items.len() as isize;
        let mut index = self.current_selection as isize;
        loop {
            index = (index + direction).rem_euclid(len);
            if self.items[index as usize].selectable {
                break;
            }
        }
        self.current_selection = index as usize;
    }

    /// Runs per-item update hooks only. Used while navigation is suspended.
    pub fn tick(&mut self, delta_seconds: f32) {
        for item in &mut self.items {
            item::update(item, delta_seconds);
        }
    }

    fn pressed(&self, frame: &InputFrame, timing: &RepeatTiming, sources: &[(Device, ButtonId)]) -> bool {
        sources.iter().any(|&(device, button)| {
            let mask = button.mask();
            frame.current[device] & mask != 0
                && (frame.previous[device] & mask == 0 || self.held_duration > timing.scroll_delay)
        })
    }

    fn dispatch(&mut self, response: Response<C>, frame: &mut InputFrame, events: &mut MenuEvents<C>) {
        match response {
            Response::Ignored => return,
            Response::Consumed => {}
            Response::Emit(command) => events.push(MenuEvent::Command {
                item: self.current_selection,
                command,
            }),
        }
        frame.clear_current();
    }

    /// One navigation step over `frame`. Handled left/right/enter presses
    /// clear the frame's current masks.
    pub fn advance(
        &mut self,
        frame: &mut InputFrame,
        delta_seconds: f32,
        options: NavigationOptions,
    ) -> MenuEvents<C> {
        assert!(!self.items.is_empty(), "advance on an empty menu");
        let mut events = MenuEvents::new();

        item::unselect(&mut self.items[self.current_selection]);

        if direction_held(frame) {
            self.held_duration += delta_seconds;
        } else {
            self.held_duration = 0.0;
        }

        self.tick(delta_seconds);

        let timing = self.items[self.current_selection].timing;
        if self.pressed(frame, &timing, &LEFT_SOURCES) {
            self.held_duration -= timing.scroll_time_h;
            let response = item::press_left(&mut self.items[self.current_selection]);
            self.dispatch(response, frame, &mut events);
        }

        let timing = self.items[self.current_selection].timing;
        if self.pressed(frame, &timing, &RIGHT_SOURCES) {
            self.held_duration -= timing.scroll_time_h;
            let response = item::press_right(&mut self.items[self.current_selection]);
            self.dispatch(response, frame, &mut events);
        }

        let (enter, back) = if options.swap_enter_back {
            (ButtonId::B, ButtonId::A)
        } else {
            (ButtonId::A, ButtonId::B)
        };
        let timing = self.items[self.current_selection].timing;
        if self.pressed(frame, &timing, &activation_sources(enter)) {
            self.held_duration -= timing.scroll_time_h;
            let response = item::press_enter(&mut self.items[self.current_selection]);
            self.dispatch(response, frame, &mut events);
        } else if self.pressed(frame, &timing, &activation_sources(back)) {
            if let Some(command) = self.back.clone() {
                events.push(MenuEvent::Back(command));
            }
        }

        let timing = self.items[self.current_selection].timing;
        if self.pressed(frame, &timing, &UP_SOURCES) {
            self.held_duration -= timing.scroll_time_v;
            if !item::press_up(&mut self.items[self.current_selection]) {
                self.move_selection(-1);
                events.push(MenuEvent::Selected {
                    item: self.current_selection,
                    direction: -1,
                });
            }
        }

        let timing = self.items[self.current_selection].timing;
        if self.pressed(frame, &timing, &DOWN_SOURCES) {
            self.held_duration -= timing.scroll_time_v;
            if !item::press_down(&mut self.items[self.current_selection]) {
                self.move_selection(1);
                events.push(MenuEvent::Selected {
                    item: self.current_selection,
                    direction: 1,
                });
            }
        }

        item::select(&mut self.items[self.current_selection]);
        events
    }
}
