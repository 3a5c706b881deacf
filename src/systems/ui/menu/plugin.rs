//! Runs the frontend inside a bevy app.
use std::path::PathBuf;

use bevy::{prelude::*, sprite::Anchor};

use crate::{
    data::catalog::RomCatalog,
    startup::{
        config::MenuConfig,
        core::{EmulatorHost, HeadlessCore},
    },
    systems::input::{FrameInputPlugin, InputFrame},
};

use super::{
    context::{FrontendEvent, MenuContext},
    draw::DrawCommand,
    pages::{MENU_HEIGHT, MENU_WIDTH},
};

const MENU_TEXT_Z: f32 = 1.0;

/// Games offered on the ROM list.
#[derive(Resource, Debug, Clone, Default)]
pub struct RomLibrary(pub RomCatalog);

/// One pooled text entity, mirroring the `n`th text command of the draw list.
#[derive(Component, Debug, Clone, Copy)]
pub struct MenuText(pub usize);

/// Startup work that reads the ROM library; fill the library before it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrontendSetup;

#[derive(Default)]
pub struct FrontendPlugin {
    pub settings_path: Option<PathBuf>,
}

impl Plugin for FrontendPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<MenuConfig>() {
            app.insert_resource(MenuConfig::load());
        }
        if !app.world().contains_resource::<EmulatorHost>() {
            app.insert_resource(EmulatorHost(Box::new(HeadlessCore::default())));
        }
        app.init_resource::<RomLibrary>();
        app.add_plugins(FrameInputPlugin);

        let world = app.world();
        let context = MenuContext::new(
            world.resource::<MenuConfig>().clone(),
            world.resource::<EmulatorHost>().0.as_ref(),
            world.resource::<RomLibrary>().0.len(),
            self.settings_path.clone(),
        );
        app.insert_resource(context)
            .add_event::<FrontendEvent>()
            .add_systems(Startup, load_frontend_settings.in_set(FrontendSetup))
            .add_systems(
                Update,
                (advance_frontend, sync_menu_text, exit_on_request).chain(),
            );
    }
}

fn load_frontend_settings(
    library: Res<RomLibrary>,
    mut context: ResMut<MenuContext>,
    mut host: ResMut<EmulatorHost>,
) {
    context.set_rom_count(library.0.len());
    match context.load_settings(host.0.as_mut()) {
        Ok(true) => info!("frontend settings restored"),
        Ok(false) => {}
        Err(error) => warn!("ignoring saved settings: {error}"),
    }
}

fn advance_frontend(
    time: Res<Time>,
    library: Res<RomLibrary>,
    mut context: ResMut<MenuContext>,
    mut frame: ResMut<InputFrame>,
    mut host: ResMut<EmulatorHost>,
    mut events: EventWriter<FrontendEvent>,
) {
    if library.is_changed() {
        context.set_rom_count(library.0.len());
    }
    for event in context.step(&mut frame, host.0.as_mut(), &library.0, time.delta_secs()) {
        debug!("frontend event {event:?}");
        events.write(event);
    }
}

fn menu_to_world(position: Vec2) -> Vec3 {
    Vec3::new(
        position.x - MENU_WIDTH / 2.0,
        MENU_HEIGHT / 2.0 - position.y,
        MENU_TEXT_Z,
    )
}

/// Mirrors the draw list's text commands into pooled `Text2d` entities.
fn sync_menu_text(
    mut commands: Commands,
    context: Res<MenuContext>,
    mut pool: Query<(
        &MenuText,
        &mut Text2d,
        &mut TextColor,
        &mut Transform,
        &mut Visibility,
    )>,
) {
    let draw = &context.draw;
    let lines: Vec<_> = draw
        .commands
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Text {
                text,
                position,
                color,
                alpha,
            } => Some((text, *position, color.with_alpha(alpha * draw.opacity))),
            DrawCommand::Quad { .. } => None,
        })
        .collect();

    let mut pooled = 0;
    for (slot, mut text, mut color, mut transform, mut visibility) in &mut pool {
        pooled = pooled.max(slot.0 + 1);
        let Some((line, position, tint)) = lines.get(slot.0) else {
            *visibility = Visibility::Hidden;
            continue;
        };
        if text.0 != **line {
            text.0 = (*line).clone();
        }
        color.0 = *tint;
        transform.translation = menu_to_world(*position);
        *visibility = Visibility::Inherited;
    }

    for (index, (line, position, tint)) in lines.iter().enumerate().skip(pooled) {
        commands.spawn((
            MenuText(index),
            Text2d::new((*line).clone()),
            TextColor(*tint),
            Anchor::TopLeft,
            Transform::from_translation(menu_to_world(*position)),
            Visibility::Inherited,
        ));
    }
}

fn exit_on_request(mut events: EventReader<FrontendEvent>, mut exit: EventWriter<AppExit>) {
    if events
        .read()
        .any(|event| *event == FrontendEvent::ExitRequested)
    {
        info!("exit requested from the menu");
        exit.write(AppExit::Success);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::time::TimeUpdateStrategy;

    use super::*;
    use crate::{
        data::{buttons::ButtonId, catalog::RomEntry},
        systems::{
            input::{DeviceSample, MotionControllerFeed, RawDeviceState},
            ui::menu::pages::PageId,
        },
    };

    fn make_frontend_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)));
        app.insert_resource(MenuConfig::fallback());
        app.insert_resource(RomLibrary(RomCatalog::new(vec![
            RomEntry::new("Galactic Pinball", "/roms/galactic_pinball.vb"),
            RomEntry::new("Teleroboxer", "/roms/teleroboxer.vb"),
        ])));
        app.add_plugins(FrontendPlugin::default());
        app
    }

    fn press_right_controller(app: &mut App, button: ButtonId) {
        app.world_mut().resource_mut::<MotionControllerFeed>().right =
            DeviceSample::Connected(RawDeviceState {
                buttons: button.mask(),
                ..default()
            });
        app.update();
        app.world_mut().resource_mut::<MotionControllerFeed>().right =
            DeviceSample::Connected(RawDeviceState::default());
        app.update();
    }

    #[test]
    fn motion_controller_picks_a_rom() {
        let mut app = make_frontend_test_app();
        app.update();
        press_right_controller(&mut app, ButtonId::A);

        let context = app.world().resource::<MenuContext>();
        assert!(context.rom_loaded);
        assert!(!context.menu_open);
        assert_eq!(context.current_page(), PageId::Main);
    }

    #[test]
    fn draw_list_text_is_mirrored_into_entities() {
        let mut app = make_frontend_test_app();
        for _ in 0..3 {
            app.update();
        }
        let mut texts = app.world_mut().query::<(&MenuText, &Text2d)>();
        let lines: Vec<_> = texts
            .iter(app.world())
            .map(|(_, text)| text.0.clone())
            .collect();
        assert!(lines.iter().any(|line| line == "Galactic Pinball"));
        assert!(lines.iter().any(|line| line == "VirtualBoyGo"));
    }

    #[test]
    fn exit_request_stops_the_app() {
        let mut app = make_frontend_test_app();
        app.update();
        app.world_mut().send_event(FrontendEvent::ExitRequested);
        app.update();
        assert_eq!(app.should_exit(), Some(AppExit::Success));
    }
}
