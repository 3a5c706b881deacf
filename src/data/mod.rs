pub mod buttons;
pub mod catalog;
pub mod mapping;
pub mod settings;
