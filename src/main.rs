use std::path::PathBuf;

use bevy::prelude::*;

mod data;
mod startup;
mod systems;

use crate::{
    data::catalog::RomCatalog,
    startup::{
        core::{EmulatorHost, HeadlessCore},
        StartupPlugin,
    },
    systems::ui::menu::plugin::{FrontendPlugin, FrontendSetup, RomLibrary},
};

const ROM_DIR_ENV: &str = "VR_FRONTEND_ROMS";
const SETTINGS_PATH_ENV: &str = "VR_FRONTEND_SETTINGS";
const DEFAULT_ROM_DIR: &str = "roms";
const DEFAULT_SETTINGS_PATH: &str = "saves/settings.bin";

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var_os(key).map_or_else(|| PathBuf::from(default), PathBuf::from)
}

fn scan_roms(host: Res<EmulatorHost>, mut library: ResMut<RomLibrary>) {
    let dir = env_path(ROM_DIR_ENV, DEFAULT_ROM_DIR);
    match RomCatalog::scan(&dir, host.0.rom_extensions()) {
        Ok(catalog) => {
            info!("found {} rom(s) in {}", catalog.len(), dir.display());
            library.0 = catalog;
        }
        Err(error) => warn!("failed to scan {}: {error}", dir.display()),
    }
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(StartupPlugin)
        .insert_resource(EmulatorHost(Box::new(HeadlessCore::default())))
        .add_plugins(FrontendPlugin {
            settings_path: Some(env_path(SETTINGS_PATH_ENV, DEFAULT_SETTINGS_PATH)),
        })
        .add_systems(Startup, scan_roms.before(FrontendSetup))
        .run();
}
