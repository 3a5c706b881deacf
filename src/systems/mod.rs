pub mod input;
pub mod ui;
