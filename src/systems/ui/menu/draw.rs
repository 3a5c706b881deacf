//! Render hooks.
//!
//! Items never talk to a renderer; they append [`DrawCommand`]s in menu
//! pixel space and the host decides how to put them on screen.
use bevy::prelude::*;

use crate::data::catalog::RecordSource;

use super::{
    item::{ItemKind, MenuItem},
    list::ListItem,
    transition::PageLayer,
    Menu,
};

pub const TEXT_COLOR: Color = Color::srgb(0.8, 0.8, 0.8);
pub const SELECTION_COLOR: Color = Color::srgb(0.9, 0.1, 0.1);
pub const HEADER_COLOR: Color = Color::srgb(0.9, 0.1, 0.1);
pub const SLIDER_COLOR: Color = Color::Srgba(Srgba::new(0.8, 0.8, 0.8, 0.8));
pub const SLIDER_TRACK_COLOR: Color = Color::Srgba(Srgba::new(0.15, 0.15, 0.15, 0.6));
pub const OVERLAY_COLOR: Color = Color::Srgba(Srgba::new(0.05, 0.05, 0.05, 0.9));

/// Horizontal nudge applied to whatever is selected.
const SELECTED_NUDGE: f32 = 5.0;
const ICON_SIZE: f32 = 28.0;
const ICON_TEXT_GAP: f32 = 33.0;
const SCROLLBAR_WIDTH: f32 = 14.0;
const LIST_TEXT_INSET: f32 = 44.0;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Text {
        text: String,
        position: Vec2,
        color: Color,
        alpha: f32,
    },
    Quad {
        glyph: &'static str,
        position: Vec2,
        size: Vec2,
        color: Color,
        alpha: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
    /// Applied by the host on top of every command's own alpha.
    pub opacity: f32,
}

impl DrawList {
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn text(&mut self, text: impl Into<String>, position: Vec2, color: Color, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        self.commands.push(DrawCommand::Text {
            text: text.into(),
            position,
            color,
            alpha,
        });
    }

    pub fn quad(&mut self, glyph: &'static str, position: Vec2, size: Vec2, color: Color, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        self.commands.push(DrawCommand::Quad {
            glyph,
            position,
            size,
            color,
            alpha,
        });
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            DrawCommand::Quad { .. } => None,
        })
    }
}

fn nudge(selected: bool) -> Vec2 {
    Vec2::new(if selected { SELECTED_NUDGE } else { 0.0 }, 0.0)
}

fn item_color(selected: bool) -> Color {
    if selected {
        SELECTION_COLOR
    } else {
        TEXT_COLOR
    }
}

fn draw_list<C>(list: &ListItem<C>, origin: Vec2, alpha: f32, records: &dyn RecordSource, out: &mut DrawList) {
    let window = &list.window;
    let (thumb_start, thumb_length) = window.scrollbar();
    out.quad(
        "white",
        origin + Vec2::new(2.0, 2.0),
        Vec2::new(SCROLLBAR_WIDTH - 4.0, list.size.y - 4.0),
        SLIDER_TRACK_COLOR,
        alpha,
    );
    out.quad(
        "white",
        origin + Vec2::new(0.0, thumb_start * list.size.y),
        Vec2::new(SCROLLBAR_WIDTH, thumb_length * list.size.y),
        SLIDER_COLOR,
        alpha,
    );

    let row_height = list.row_height();
    for index in window.visible_range() {
        let Some(label) = records.record_label(index) else {
            break;
        };
        let selected = index == window.selection();
        let row = Vec2::new(
            SCROLLBAR_WIDTH + LIST_TEXT_INSET,
            row_height * (index as f32 - window.position()),
        );
        out.text(
            label,
            origin + row + nudge(selected),
            item_color(selected),
            alpha * window.row_fade(index),
        );
    }
}

pub fn draw_item<C>(item: &MenuItem<C>, layer: PageLayer, records: &dyn RecordSource, out: &mut DrawList) {
    if !item.visible {
        return;
    }
    let origin = item.position + layer.offset;
    match &item.kind {
        ItemKind::Button(button) => {
            let mut text_origin = origin + nudge(item.selected);
            if let Some(icon) = button.icon {
                out.quad(icon, text_origin, Vec2::splat(ICON_SIZE), item_color(item.selected), layer.alpha);
                text_origin.x += ICON_TEXT_GAP;
            }
            out.text(button.text.clone(), text_origin, item_color(item.selected), layer.alpha);
        }
        ItemKind::Label(label) => {
            let color = if label.highlight { HEADER_COLOR } else { TEXT_COLOR };
            out.text(label.text.clone(), origin + nudge(item.selected), color, layer.alpha);
        }
        ItemKind::Image(image) => {
            out.quad(image.glyph, origin + nudge(item.selected), image.size, Color::WHITE, layer.alpha);
        }
        ItemKind::Container(container) => {
            let inner = PageLayer {
                offset: origin,
                alpha: layer.alpha,
            };
            for child in &container.children {
                draw_item(child, inner, records, out);
            }
        }
        ItemKind::List(list) => draw_list(list, origin, layer.alpha, records, out),
    }
}

pub fn draw_menu<C: Clone>(menu: &Menu<C>, layer: PageLayer, records: &dyn RecordSource, out: &mut DrawList) {
    for item in menu.items() {
        draw_item(item, layer, records, out);
    }
}
