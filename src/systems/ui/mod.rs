//! Menu surfaces.
//!
//! `systems::ui::menu` holds the item model, navigation, page transitions
//! and binding capture, plus the plugin that runs them each frame.
pub mod menu;
