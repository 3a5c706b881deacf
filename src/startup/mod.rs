use bevy::{color::palettes::css::BLACK, prelude::*};

pub mod config;
pub mod core;

use config::MenuConfig;

#[derive(Component)]
pub struct MainCamera;

/// Config and camera. Add before `FrontendPlugin` so the loaded config is
/// the one the frontend is built from.
pub struct StartupPlugin;
impl Plugin for StartupPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<MenuConfig>() {
            app.insert_resource(MenuConfig::load());
        }
        app.add_systems(Startup, setup_camera);
    }
}

fn setup_camera(mut commands: Commands, mut clear_color: ResMut<ClearColor>) {
    clear_color.0 = BLACK.into();
    commands.spawn((Camera2d, MainCamera));
}
