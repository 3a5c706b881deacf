//! Menu items and their navigation hooks.
//!
//! Every item is one [`MenuItem`] with a [`ItemKind`] payload; hooks are free
//! functions that match on the kind, so adding a kind is a compile error at
//! every place that has to handle it.
use bevy::math::Vec2;

use super::list::ListItem;

/// Auto-repeat timing consulted while this item is selected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepeatTiming {
    pub scroll_delay: f32,
    pub scroll_time_h: f32,
    pub scroll_time_v: f32,
}

impl Default for RepeatTiming {
    fn default() -> Self {
        Self {
            scroll_delay: 0.3,
            scroll_time_h: 0.075,
            scroll_time_v: 0.075,
        }
    }
}

/// What a hook did with a press.
#[derive(Debug, Clone, PartialEq)]
pub enum Response<C> {
    Ignored,
    Consumed,
    Emit(C),
}

impl<C> Response<C> {
    pub fn is_handled(&self) -> bool {
        !matches!(self, Response::Ignored)
    }

    fn from_command(command: Option<&C>) -> Self
    where
        C: Clone,
    {
        command.map_or(Response::Ignored, |command| Response::Emit(command.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct ButtonItem<C> {
    pub text: String,
    pub icon: Option<&'static str>,
    pub on_press: Option<C>,
    pub on_left: Option<C>,
    pub on_right: Option<C>,
}

impl<C> ButtonItem<C> {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            icon: None,
            on_press: None,
            on_left: None,
            on_right: None,
        }
    }

    pub fn with_icon(mut self, icon: &'static str) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn on_press(mut self, command: C) -> Self {
        self.on_press = Some(command);
        self
    }

    pub fn on_left_right(mut self, left: C, right: C) -> Self {
        self.on_left = Some(left);
        self.on_right = Some(right);
        self
    }
}

#[derive(Debug, Clone)]
pub struct LabelItem {
    pub text: String,
    pub highlight: bool,
}

#[derive(Debug, Clone)]
pub struct ImageItem {
    pub glyph: &'static str,
    pub size: Vec2,
}

/// Groups children and forwards every hook to the active one.
///
/// Left/right move the active child between its selectable children.
#[derive(Debug, Clone)]
pub struct ContainerItem<C> {
    pub children: Vec<MenuItem<C>>,
    pub active: usize,
}

impl<C> ContainerItem<C> {
    pub fn new(children: Vec<MenuItem<C>>) -> Self {
        let active = children
            .iter()
            .position(|child| child.selectable)
            .expect("a container needs at least one selectable child");
        Self { children, active }
    }

    pub fn active_child(&self) -> &MenuItem<C> {
        &self.children[self.active]
    }

    pub fn active_child_mut(&mut self) -> &mut MenuItem<C> {
        &mut self.children[self.active]
    }

    fn shift_active(&mut self, step: isize) {
        let mut index = self.active as isize + step;
        while index >= 0 && (index as usize) < self.children.len() {
            if self.children[index as usize].selectable {
                let was_selected = self.children[self.active].selected;
                self.children[self.active].selected = false;
                self.active = index as usize;
                self.children[self.active].selected = was_selected;
                return;
            }
            index += step;
        }
    }
}

#[derive(Debug, Clone)]
pub enum ItemKind<C> {
    Button(ButtonItem<C>),
    Label(LabelItem),
    Image(ImageItem),
    Container(ContainerItem<C>),
    List(ListItem<C>),
}

#[derive(Debug, Clone)]
pub struct MenuItem<C> {
    pub selectable: bool,
    pub visible: bool,
    pub selected: bool,
    /// Top-left corner in menu pixels.
    pub position: Vec2,
    pub timing: RepeatTiming,
    pub kind: ItemKind<C>,
}

impl<C> MenuItem<C> {
    fn with_kind(kind: ItemKind<C>, position: Vec2, selectable: bool) -> Self {
        Self {
            selectable,
            visible: true,
            selected: false,
            position,
            timing: RepeatTiming::default(),
            kind,
        }
    }

    pub fn button(position: Vec2, button: ButtonItem<C>) -> Self {
        Self::with_kind(ItemKind::Button(button), position, true)
    }

    pub fn label(position: Vec2, text: impl Into<String>) -> Self {
        Self::with_kind(
            ItemKind::Label(LabelItem {
                text: text.into(),
                highlight: false,
            }),
            position,
            false,
        )
    }

    pub fn image(position: Vec2, glyph: &'static str, size: Vec2) -> Self {
        Self::with_kind(ItemKind::Image(ImageItem { glyph, size }), position, false)
    }

    pub fn container(position: Vec2, children: Vec<MenuItem<C>>) -> Self {
        Self::with_kind(
            ItemKind::Container(ContainerItem::new(children)),
            position,
            true,
        )
    }

    pub fn list(position: Vec2, list: ListItem<C>) -> Self {
        Self::with_kind(ItemKind::List(list), position, true)
    }

    pub fn with_timing(mut self, timing: RepeatTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn as_button_mut(&mut self) -> Option<&mut ButtonItem<C>> {
        match &mut self.kind {
            ItemKind::Button(button) => Some(button),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut ListItem<C>> {
        match &mut self.kind {
            ItemKind::List(list) => Some(list),
            _ => None,
        }
    }

    /// Visits this item and, for containers, every child.
    pub fn for_each_mut(&mut self, visit: &mut impl FnMut(&mut MenuItem<C>)) {
        visit(self);
        if let ItemKind::Container(container) = &mut self.kind {
            for child in &mut container.children {
                child.for_each_mut(visit);
            }
        }
    }
}

pub fn select<C>(item: &mut MenuItem<C>) {
    item.selected = true;
    if let ItemKind::Container(container) = &mut item.kind {
        container.active_child_mut().selected = true;
    }
}

pub fn unselect<C>(item: &mut MenuItem<C>) {
    item.selected = false;
    if let ItemKind::Container(container) = &mut item.kind {
        for child in &mut container.children {
            child.selected = false;
        }
    }
}

/// Per-frame hook, run for every item whether selected or not.
pub fn update<C>(item: &mut MenuItem<C>, delta_seconds: f32) {
    match &mut item.kind {
        ItemKind::List(list) => list.window.update(delta_seconds),
        ItemKind::Container(container) => {
            for child in &mut container.children {
                update(child, delta_seconds);
            }
        }
        ItemKind::Button(_) | ItemKind::Label(_) | ItemKind::Image(_) => {}
    }
}

pub fn press_left<C: Clone>(item: &mut MenuItem<C>) -> Response<C> {
    match &mut item.kind {
        ItemKind::Button(button) => Response::from_command(button.on_left.as_ref()),
        ItemKind::Container(container) => {
            container.shift_active(-1);
            Response::Consumed
        }
        ItemKind::Label(_) | ItemKind::Image(_) | ItemKind::List(_) => Response::Ignored,
    }
}

pub fn press_right<C: Clone>(item: &mut MenuItem<C>) -> Response<C> {
    match &mut item.kind {
        ItemKind::Button(button) => Response::from_command(button.on_right.as_ref()),
        ItemKind::Container(container) => {
            container.shift_active(1);
            Response::Consumed
        }
        ItemKind::Label(_) | ItemKind::Image(_) | ItemKind::List(_) => Response::Ignored,
    }
}

pub fn press_enter<C: Clone>(item: &mut MenuItem<C>) -> Response<C> {
    match &mut item.kind {
        ItemKind::Button(button) => Response::from_command(button.on_press.as_ref()),
        ItemKind::Container(container) => press_enter(container.active_child_mut()),
        ItemKind::List(list) => list.press_enter().map_or(Response::Consumed, Response::Emit),
        ItemKind::Label(_) | ItemKind::Image(_) => Response::Ignored,
    }
}

/// `true` when the item moved internally and the menu must not.
pub fn press_up<C>(item: &mut MenuItem<C>) -> bool {
    match &mut item.kind {
        ItemKind::List(list) => list.press_up(),
        ItemKind::Container(container) => press_up(container.active_child_mut()),
        ItemKind::Button(_) | ItemKind::Label(_) | ItemKind::Image(_) => false,
    }
}

pub fn press_down<C>(item: &mut MenuItem<C>) -> bool {
    match &mut item.kind {
        ItemKind::List(list) => list.press_down(),
        ItemKind::Container(container) => press_down(container.active_child_mut()),
        ItemKind::Button(_) | ItemKind::Label(_) | ItemKind::Image(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Cmd {
        Go,
        Bind(usize),
    }

    fn binding_row() -> MenuItem<Cmd> {
        MenuItem::container(
            Vec2::ZERO,
            vec![
                MenuItem::image(Vec2::ZERO, "icon", Vec2::splat(28.0)),
                MenuItem::button(Vec2::ZERO, ButtonItem::new("A").on_press(Cmd::Bind(0))),
                MenuItem::button(Vec2::ZERO, ButtonItem::new("B").on_press(Cmd::Bind(1))),
            ],
        )
    }

    #[test]
    fn buttons_without_handlers_ignore_presses() {
        let mut item = MenuItem::button(Vec2::ZERO, ButtonItem::<Cmd>::new("Resume"));
        assert_eq!(press_enter(&mut item), Response::Ignored);
        assert_eq!(press_left(&mut item), Response::Ignored);
        assert!(!press_up(&mut item));
    }

    #[test]
    fn button_press_emits_its_command() {
        let mut item = MenuItem::button(Vec2::ZERO, ButtonItem::new("Go").on_press(Cmd::Go));
        assert_eq!(press_enter(&mut item), Response::Emit(Cmd::Go));
    }

    #[test]
    fn container_starts_on_first_selectable_child_and_forwards_enter() {
        let mut row = binding_row();
        assert_eq!(press_enter(&mut row), Response::Emit(Cmd::Bind(0)));

        assert_eq!(press_right(&mut row), Response::Consumed);
        assert_eq!(press_enter(&mut row), Response::Emit(Cmd::Bind(1)));

        // already on the last child
        press_right(&mut row);
        assert_eq!(press_enter(&mut row), Response::Emit(Cmd::Bind(1)));

        // the image is skipped
        press_left(&mut row);
        press_left(&mut row);
        assert_eq!(press_enter(&mut row), Response::Emit(Cmd::Bind(0)));
    }

    #[test]
    fn selection_follows_the_active_child() {
        let mut row = binding_row();
        select(&mut row);
        press_right(&mut row);
        let ItemKind::Container(container) = &row.kind else {
            panic!("expected a container");
        };
        assert!(!container.children[1].selected);
        assert!(container.children[2].selected);

        unselect(&mut row);
        let ItemKind::Container(container) = &row.kind else {
            panic!("expected a container");
        };
        assert!(container.children.iter().all(|child| !child.selected));
    }
}
