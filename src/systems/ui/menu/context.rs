//! Everything the frontend menu owns, threaded through one call per frame.
//!
//! Order inside [`MenuContext::step`]:
//! capture → page (navigation or transition) or core → menu toggle → fades →
//! labels → draw.
use std::path::PathBuf;

use bevy::prelude::*;
use enum_map::EnumMap;

use crate::{
    data::{
        catalog::RomCatalog,
        mapping::{BindingRef, BindingTable, Bindings},
        settings::{self, FrontendSettings, ScreenPlacement, SettingsError},
    },
    startup::{
        config::MenuConfig,
        core::{CoreOption, EmulatorCore},
    },
    systems::input::InputFrame,
};

use super::{
    draw::{draw_menu, DrawList, HEADER_COLOR, OVERLAY_COLOR, TEXT_COLOR},
    item::ItemKind,
    pages::{
        build_pages, refresh_labels, FrontendCommand, PageId, PageState, ScreenAxis, BOTTOM_HEIGHT,
        HEADER_HEIGHT, MENU_HEIGHT, MENU_WIDTH,
    },
    remap::{CaptureOutcome, RemapCapture},
    transition::{Fade, PageLayer, PageTransition, TransitionTiming},
    Menu, MenuEvent, NavigationOptions,
};

const OVERLAY_SIZE: Vec2 = Vec2::new(300.0, 120.0);
const HINT_ICON_SIZE: f32 = 22.0;
pub(super) const PRESS_BUTTON_TEXT: &str = "Press Button";
pub(super) const MENU_BUTTON_TEXT: &str = "Menu Button";
pub(super) const MENU_BUTTON_HINT_TEXT: &str = "(A, B, X, Y,...)";

/// Things the host has to act on.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontendEvent {
    MenuOpened,
    MenuClosed,
    PageChanged(PageId),
    RomLoaded(usize),
    BindingChanged(BindingRef),
    SettingsSaved,
    ResetViewRequested,
    ExitRequested,
}

#[derive(Resource, Debug)]
pub struct MenuContext {
    pub config: MenuConfig,
    pub pages: EnumMap<PageId, Menu<FrontendCommand>>,
    pub transition: PageTransition<PageId>,
    pub capture: RemapCapture,
    pub bindings: Bindings,
    pub follow_head: bool,
    pub screen: ScreenPlacement,
    pub swap_enter_back: bool,
    pub menu_open: bool,
    pub rom_loaded: bool,
    pub save_slot: usize,
    pub reset_view_requested: bool,
    pub exit_requested: bool,
    pub draw: DrawList,
    open_fade: Fade,
    overlay_fade: Fade,
    overlay_target: Option<BindingRef>,
    settings_path: Option<PathBuf>,
    title: String,
    console_names: Vec<&'static str>,
    core_options: Vec<CoreOption>,
}

pub fn default_screen(config: &MenuConfig) -> ScreenPlacement {
    ScreenPlacement {
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.0,
        distance: config.screen.default_distance,
        scale: config.screen.default_scale,
    }
}

impl MenuContext {
    /// Starts on the ROM list with the menu open and compiled-in bindings.
    pub fn new(
        config: MenuConfig,
        core: &dyn EmulatorCore,
        rom_count: usize,
        settings_path: Option<PathBuf>,
    ) -> Self {
        let mut pages = build_pages(&config, core);
        if let Some(list) = pages[PageId::RomList].items_mut()[0].as_list_mut() {
            list.window.set_len(rom_count);
        }
        let timing = TransitionTiming {
            duration: config.transition.duration,
            stagger: config.transition.stagger,
            slide_distance: config.transition.slide_distance,
        };
        Self {
            pages,
            transition: PageTransition::new(PageId::RomList, timing),
            capture: RemapCapture::default(),
            bindings: Bindings::new(config.default_menu_binding(), core.default_bindings()),
            follow_head: false,
            screen: default_screen(&config),
            swap_enter_back: false,
            menu_open: true,
            rom_loaded: false,
            save_slot: 0,
            reset_view_requested: false,
            exit_requested: false,
            draw: DrawList::default(),
            open_fade: Fade::new(config.overlay.open_menu_duration),
            overlay_fade: Fade::new(config.overlay.mapping_overlay_duration),
            overlay_target: None,
            settings_path,
            title: core.title().to_string(),
            console_names: core.button_layout().iter().map(|button| button.name).collect(),
            core_options: core.settings_options(),
            config,
        }
    }

    pub fn current_page(&self) -> PageId {
        self.transition.current()
    }

    pub fn navigation_options(&self) -> NavigationOptions {
        NavigationOptions {
            swap_enter_back: self.swap_enter_back,
        }
    }

    pub fn rom_selection(&self) -> usize {
        match &self.pages[PageId::RomList].items()[0].kind {
            ItemKind::List(list) => list.window.selection(),
            _ => 0,
        }
    }

    pub fn set_rom_count(&mut self, len: usize) {
        if let Some(list) = self.pages[PageId::RomList].items_mut()[0].as_list_mut() {
            list.window.set_len(len);
        }
    }

    /// One frame of the frontend. `frame` must already hold this frame's
    /// sample.
    pub fn step(
        &mut self,
        frame: &mut InputFrame,
        core: &mut dyn EmulatorCore,
        roms: &RomCatalog,
        delta_seconds: f32,
    ) -> Vec<FrontendEvent> {
        let mut events = Vec::new();

        match self.capture.tick(frame, &mut self.bindings, delta_seconds) {
            CaptureOutcome::Bound { target, .. } | CaptureOutcome::TimedOut { target } => {
                events.push(FrontendEvent::BindingChanged(target));
            }
            CaptureOutcome::Idle | CaptureOutcome::Waiting => {}
        }

        if self.menu_open {
            self.update_pages(frame, core, roms, delta_seconds, &mut events);
        } else {
            core.run_frame(self.bindings.console_mask(&frame.current), delta_seconds);
        }

        if self.rom_loaded
            && !self.capture.is_active()
            && self.bindings.menu.just_pressed(&frame.current, &frame.previous)
        {
            if self.menu_open {
                self.close_menu(&mut events);
            } else {
                self.menu_open = true;
                events.push(FrontendEvent::MenuOpened);
            }
        }

        self.open_fade.tick(self.menu_open, delta_seconds);
        self.overlay_fade.tick(self.capture.is_active(), delta_seconds);
        if let Some(target) = self.capture.target() {
            self.overlay_target = Some(target);
        }

        let core_labels: Vec<_> = self
            .core_options
            .iter()
            .map(|option| (option.id, core.option_label(option.id)))
            .collect();
        let state = PageState {
            bindings: &self.bindings,
            save_slot: self.save_slot,
            follow_head: self.follow_head,
            swap_enter_back: self.swap_enter_back,
            screen: self.screen,
            core_labels: &core_labels,
        };
        refresh_labels(&mut self.pages, &state);
        self.draw_frame(roms);
        events
    }

    fn update_pages(
        &mut self,
        frame: &mut InputFrame,
        core: &mut dyn EmulatorCore,
        roms: &RomCatalog,
        delta_seconds: f32,
        events: &mut Vec<FrontendEvent>,
    ) {
        if self.transition.is_active() {
            self.pages[self.transition.current()].tick(delta_seconds);
            self.pages[self.transition.next()].tick(delta_seconds);
            if let Some(page) = self.transition.tick(delta_seconds) {
                events.push(FrontendEvent::PageChanged(page));
            }
            return;
        }

        let page = self.transition.current();
        if self.capture.is_active() {
            self.pages[page].tick(delta_seconds);
            return;
        }

        let options = self.navigation_options();
        let menu_events = self.pages[page].advance(frame, delta_seconds, options);
        for event in menu_events {
            match event {
                MenuEvent::Command { command, .. } | MenuEvent::Back(command) => {
                    self.apply(command, core, roms, events);
                }
                MenuEvent::Selected { item, .. } => self.on_selected(page, item, core),
            }
        }
    }

    /// Landing on the save slot button refreshes the state preview.
    fn on_selected(&mut self, page: PageId, item: usize, core: &mut dyn EmulatorCore) {
        let ItemKind::Button(button) = &self.pages[page].items()[item].kind else {
            return;
        };
        if let Some(FrontendCommand::SlotStep(_)) = button.on_press {
            core.update_state_image(self.checked_slot());
        }
    }

    /// Panics when the save slot left the configured range.
    fn checked_slot(&self) -> usize {
        assert!(
            self.save_slot < self.config.save_slots,
            "save slot {} out of range (0..{})",
            self.save_slot,
            self.config.save_slots
        );
        self.save_slot
    }

    fn close_menu(&mut self, events: &mut Vec<FrontendEvent>) {
        self.menu_open = false;
        events.push(FrontendEvent::MenuClosed);
    }

    /// Carries out one page command.
    pub fn apply(
        &mut self,
        command: FrontendCommand,
        core: &mut dyn EmulatorCore,
        roms: &RomCatalog,
        events: &mut Vec<FrontendEvent>,
    ) {
        match command {
            FrontendCommand::OpenPage { page, direction } => {
                self.transition.start(page, direction);
            }
            FrontendCommand::Resume => {
                if self.rom_loaded {
                    self.close_menu(events);
                }
            }
            FrontendCommand::ResetGame => {
                if self.rom_loaded {
                    core.reset_game();
                    self.close_menu(events);
                }
            }
            FrontendCommand::SlotStep(step) => {
                self.change_save_slot(step, core);
                self.save_settings_logged(core, events);
            }
            FrontendCommand::SaveState => {
                if self.rom_loaded {
                    let slot = self.checked_slot();
                    core.save_state(slot);
                    core.update_state_image(slot);
                    self.close_menu(events);
                }
            }
            FrontendCommand::LoadState => {
                if self.rom_loaded {
                    core.load_state(self.checked_slot());
                    self.close_menu(events);
                }
            }
            FrontendCommand::LoadRom(index) => self.load_rom(index, core, roms, events),
            FrontendCommand::ResetView => {
                self.reset_view_requested = true;
                events.push(FrontendEvent::ResetViewRequested);
            }
            FrontendCommand::Exit => {
                core.save_ram();
                self.exit_requested = true;
                events.push(FrontendEvent::ExitRequested);
            }
            FrontendCommand::SaveAndBack => {
                self.transition.start(PageId::Main, -1);
                self.save_settings_logged(core, events);
            }
            FrontendCommand::ToggleFollowHead => self.follow_head = !self.follow_head,
            FrontendCommand::ToggleSwapEnterBack => self.swap_enter_back = !self.swap_enter_back,
            FrontendCommand::Remap(target) => {
                let timeout = match target.table {
                    BindingTable::Menu => None,
                    BindingTable::Console => Some(self.config.remap.timeout_seconds),
                };
                self.capture.begin(target, timeout);
            }
            FrontendCommand::ResetMapping => {
                self.bindings.console = core.default_bindings();
                log::info!("console bindings reset to core defaults");
            }
            FrontendCommand::Adjust { axis, step } => self.adjust_screen(axis, step),
            FrontendCommand::ResetScreen => self.screen = default_screen(&self.config),
            FrontendCommand::CoreOption { id, step } => core.adjust_option(id, step),
        }
    }

    fn load_rom(
        &mut self,
        index: usize,
        core: &mut dyn EmulatorCore,
        roms: &RomCatalog,
        events: &mut Vec<FrontendEvent>,
    ) {
        let Some(rom) = roms.get(index) else {
            log::warn!("rom list selection {index} is outside the catalog");
            return;
        };
        if core.load_rom(rom) {
            self.on_rom_loaded(core, events);
            events.push(FrontendEvent::RomLoaded(index));
        } else {
            log::warn!("core refused to load {}", rom.path.display());
        }
    }

    /// Called once a game is running: persist, reset the slot, close the menu.
    pub fn on_rom_loaded(&mut self, core: &mut dyn EmulatorCore, events: &mut Vec<FrontendEvent>) {
        self.save_settings_logged(core, events);
        self.save_slot = 0;
        core.update_state_image(self.save_slot);
        self.transition.jump(PageId::Main);
        self.rom_loaded = true;
        self.close_menu(events);
    }

    /// Moves the save slot by `step`, wrapping over the configured slot count.
    pub fn change_save_slot(&mut self, step: i32, core: &mut dyn EmulatorCore) {
        let slots = self.config.save_slots as i32;
        self.save_slot = (self.save_slot as i32 + step).rem_euclid(slots) as usize;
        core.update_state_image(self.checked_slot());
    }

    pub fn adjust_screen(&mut self, axis: ScreenAxis, step: i32) {
        let limits = self.config.screen;
        let defaults = default_screen(&self.config);
        let step = step as f32;
        let screen = &mut self.screen;
        match axis {
            ScreenAxis::Yaw if step == 0.0 => screen.yaw = defaults.yaw,
            ScreenAxis::Yaw => screen.yaw += step * limits.rotate_step,
            ScreenAxis::Pitch if step == 0.0 => screen.pitch = defaults.pitch,
            ScreenAxis::Pitch => screen.pitch += step * limits.rotate_step,
            ScreenAxis::Roll if step == 0.0 => screen.roll = defaults.roll,
            ScreenAxis::Roll => screen.roll += step * limits.rotate_step,
            ScreenAxis::Distance if step == 0.0 => screen.distance = defaults.distance,
            ScreenAxis::Distance => {
                screen.distance = (screen.distance + step * limits.distance_step)
                    .clamp(limits.min_distance, limits.max_distance);
            }
            ScreenAxis::Scale if step == 0.0 => screen.scale = defaults.scale,
            ScreenAxis::Scale => {
                screen.scale =
                    (screen.scale + step * limits.scale_step).clamp(limits.min_scale, limits.max_scale);
            }
        }
    }

    pub fn frontend_settings(&self) -> FrontendSettings {
        FrontendSettings {
            rom_selection: self.rom_selection(),
            console_bindings: self.bindings.console.clone(),
            follow_head: self.follow_head,
            screen: self.screen,
            menu_binding: self.bindings.menu,
            swap_enter_back: self.swap_enter_back,
        }
    }

    /// Commits a decoded settings blob.
    pub fn apply_settings(&mut self, loaded: FrontendSettings) {
        self.bindings.console = loaded.console_bindings;
        self.bindings.menu = loaded.menu_binding;
        self.follow_head = loaded.follow_head;
        self.screen = loaded.screen;
        self.swap_enter_back = loaded.swap_enter_back;
        if let Some(list) = self.pages[PageId::RomList].items_mut()[0].as_list_mut() {
            if loaded.rom_selection < list.window.len() {
                list.window.select(loaded.rom_selection);
            }
        }
    }

    /// Writes the settings file. Without a settings path this does nothing.
    pub fn save_settings(&self, core: &dyn EmulatorCore) -> Result<bool, SettingsError> {
        let Some(path) = &self.settings_path else {
            return Ok(false);
        };
        let bytes = settings::encode(&self.frontend_settings(), self.config.settings_version, core);
        settings::write_file(path, &bytes)?;
        log::info!("saved settings to {}", path.display());
        Ok(true)
    }

    fn save_settings_logged(&self, core: &dyn EmulatorCore, events: &mut Vec<FrontendEvent>) {
        match self.save_settings(core) {
            Ok(true) => events.push(FrontendEvent::SettingsSaved),
            Ok(false) => {}
            Err(error) => log::warn!("failed to save settings: {error}"),
        }
    }

    /// Reads the settings file. `Ok(false)` when there is nothing to load;
    /// on error nothing is changed.
    pub fn load_settings(&mut self, core: &mut dyn EmulatorCore) -> Result<bool, SettingsError> {
        let Some(path) = self.settings_path.clone() else {
            return Ok(false);
        };
        let Some(bytes) = settings::read_file(&path)? else {
            log::info!("no settings at {}; using defaults", path.display());
            return Ok(false);
        };
        let loaded = settings::decode(
            &bytes,
            self.config.settings_version,
            self.bindings.console.len(),
            core,
        )?;
        self.apply_settings(loaded);
        log::info!("loaded settings from {}", path.display());
        Ok(true)
    }

    fn overlay_title(&self, target: BindingRef) -> &str {
        match target.table {
            BindingTable::Menu => MENU_BUTTON_TEXT,
            BindingTable::Console => self.console_names[target.action],
        }
    }

    fn draw_frame(&mut self, roms: &RomCatalog) {
        self.draw.clear();
        self.draw.opacity = self.open_fade.eased();
        if !self.open_fade.is_visible() {
            return;
        }

        self.draw.quad(
            "white",
            Vec2::ZERO,
            Vec2::new(MENU_WIDTH, HEADER_HEIGHT),
            HEADER_COLOR,
            1.0,
        );
        self.draw.text(self.title.clone(), Vec2::new(20.0, 22.0), TEXT_COLOR, 1.0);

        draw_menu(
            &self.pages[self.transition.current()],
            self.transition.outgoing(),
            roms,
            &mut self.draw,
        );
        if let Some(layer) = self.transition.incoming() {
            draw_menu(&self.pages[self.transition.next()], layer, roms, &mut self.draw);
        }

        self.draw_hints();
        self.draw_overlay();
    }

    fn draw_hints(&mut self) {
        let (enter, back) = if self.swap_enter_back {
            ("button_b", "button_a")
        } else {
            ("button_a", "button_b")
        };
        let y = MENU_HEIGHT - BOTTOM_HEIGHT + 4.0;
        let icon = Vec2::splat(HINT_ICON_SIZE);
        self.draw.quad(enter, Vec2::new(MENU_WIDTH - 220.0, y), icon, Color::WHITE, 1.0);
        self.draw.text("Select", Vec2::new(MENU_WIDTH - 192.0, y), TEXT_COLOR, 1.0);
        self.draw.quad(back, Vec2::new(MENU_WIDTH - 110.0, y), icon, Color::WHITE, 1.0);
        self.draw.text("Back", Vec2::new(MENU_WIDTH - 82.0, y), TEXT_COLOR, 1.0);
    }

    fn draw_overlay(&mut self) {
        if !self.overlay_fade.is_visible() {
            return;
        }
        let Some(target) = self.overlay_target else {
            return;
        };
        let PageLayer { offset, alpha } = self.overlay_fade.drop_in(self.config.transition.slide_distance);
        let origin = Vec2::new(MENU_WIDTH, MENU_HEIGHT) / 2.0 - OVERLAY_SIZE / 2.0 + offset;
        self.draw.quad("white", origin, OVERLAY_SIZE, OVERLAY_COLOR, alpha);

        let title = self.overlay_title(target).to_string();
        let detail = match self.capture.countdown() {
            Some(seconds) => seconds.to_string(),
            None if target.table == BindingTable::Menu => MENU_BUTTON_HINT_TEXT.to_string(),
            None => String::new(),
        };
        self.draw.text(title, origin + Vec2::new(20.0, 12.0), HEADER_COLOR, alpha);
        self.draw.text(detail, origin + Vec2::new(20.0, 48.0), TEXT_COLOR, alpha);
        self.draw.text(PRESS_BUTTON_TEXT, origin + Vec2::new(20.0, 84.0), TEXT_COLOR, alpha);
    }
}

#[cfg(test)]
mod tests {
    use std::{any::Any, fs, process};

    use enum_map::enum_map;

    use super::*;
    use crate::{
        data::{
            buttons::{ButtonId, Device, DeviceMasks},
            catalog::RomEntry,
            mapping::{BindingSlot, MappedButton},
        },
        startup::core::{HeadlessCore, PALETTE_OPTION},
    };

    const DT: f32 = 1.0 / 60.0;

    fn panic_message(payload: &(dyn Any + Send)) -> String {
        if let Some(msg) = payload.downcast_ref::<String>() {
            return msg.clone();
        }
        if let Some(msg) = payload.downcast_ref::<&'static str>() {
            return (*msg).to_string();
        }
        String::new()
    }

    struct Rig {
        context: MenuContext,
        core: HeadlessCore,
        roms: RomCatalog,
        frame: InputFrame,
    }

    impl Rig {
        fn new() -> Self {
            Self::with_path(None)
        }

        fn with_path(path: Option<PathBuf>) -> Self {
            let core = HeadlessCore::default();
            let roms = RomCatalog::new(vec![
                RomEntry::new("Mario Clash", "/roms/mario_clash.vb"),
                RomEntry::new("Wario Land", "/roms/wario_land.vb"),
            ]);
            let context = MenuContext::new(MenuConfig::fallback(), &core, roms.len(), path);
            Self {
                context,
                core,
                roms,
                frame: InputFrame::default(),
            }
        }

        fn frame(&mut self, masks: DeviceMasks) -> Vec<FrontendEvent> {
            self.frame.begin(masks);
            self.context.step(&mut self.frame, &mut self.core, &self.roms, DT)
        }

        fn idle(&mut self) -> Vec<FrontendEvent> {
            self.frame(DeviceMasks::default())
        }

        /// Press and release on the gamepad.
        fn tap(&mut self, button: ButtonId) -> Vec<FrontendEvent> {
            let mut events = self.frame(enum_map! { Device::Gamepad => button.mask(), _ => 0 });
            events.extend(self.idle());
            events
        }

        fn apply(&mut self, command: FrontendCommand) -> Vec<FrontendEvent> {
            let mut events = Vec::new();
            self.context.apply(command, &mut self.core, &self.roms, &mut events);
            events
        }

        fn settle(&mut self) {
            for _ in 0..30 {
                self.idle();
            }
        }
    }

    fn temp_settings(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vr_frontend_{name}_{}.bin", process::id()))
    }

    #[test]
    fn choosing_a_rom_loads_it_and_closes_the_menu() {
        let mut rig = Rig::new();
        assert_eq!(rig.context.current_page(), PageId::RomList);
        rig.tap(ButtonId::DOWN);
        let events = rig.tap(ButtonId::A);

        assert!(events.contains(&FrontendEvent::RomLoaded(1)));
        assert!(events.contains(&FrontendEvent::MenuClosed));
        assert_eq!(rig.core.loaded_rom, Some(PathBuf::from("/roms/wario_land.vb")));
        assert!(rig.context.rom_loaded);
        assert!(!rig.context.menu_open);
        assert_eq!(rig.context.current_page(), PageId::Main);
        assert_eq!(rig.core.previewed_slot, Some(0));
    }

    #[test]
    fn menu_toggle_needs_a_loaded_rom() {
        let mut rig = Rig::new();
        let events = rig.tap(ButtonId::Y);
        assert!(events.is_empty());
        assert!(rig.context.menu_open);

        rig.tap(ButtonId::A);
        assert!(!rig.context.menu_open);
        let events = rig.tap(ButtonId::Y);
        assert_eq!(events, vec![FrontendEvent::MenuOpened]);
        assert!(rig.context.menu_open);
    }

    #[test]
    fn closed_menu_forwards_console_buttons_to_the_core() {
        let mut rig = Rig::new();
        rig.tap(ButtonId::A);
        rig.frame(enum_map! {
            Device::Gamepad => ButtonId::B.mask(),
            Device::RightController => ButtonId::A.mask(),
            _ => 0,
        });
        assert_eq!(rig.core.held_buttons, 0b11);
    }

    #[test]
    fn back_on_main_resumes_the_game() {
        let mut rig = Rig::new();
        rig.tap(ButtonId::A);
        rig.tap(ButtonId::Y);
        rig.settle();
        let events = rig.tap(ButtonId::B);
        assert!(events.contains(&FrontendEvent::MenuClosed));
    }

    #[test]
    fn page_changes_only_after_the_transition() {
        let mut rig = Rig::new();
        rig.tap(ButtonId::A);
        rig.tap(ButtonId::Y);
        rig.apply(FrontendCommand::OpenPage {
            page: PageId::Settings,
            direction: 1,
        });
        assert_eq!(rig.context.current_page(), PageId::Main);

        // navigation is held off while sliding
        let before = rig.context.pages[PageId::Main].current_selection();
        rig.tap(ButtonId::DOWN);
        assert_eq!(rig.context.pages[PageId::Main].current_selection(), before);

        let mut events = Vec::new();
        for _ in 0..20 {
            events.extend(rig.idle());
        }
        assert!(events.contains(&FrontendEvent::PageChanged(PageId::Settings)));
        assert_eq!(rig.context.current_page(), PageId::Settings);
    }

    #[test]
    fn remap_binds_next_press_and_blocks_navigation() {
        let mut rig = Rig::new();
        let target = BindingRef::console(0, BindingSlot::Alternate);
        rig.apply(FrontendCommand::Remap(target));
        rig.idle();
        let texts: Vec<_> = rig.context.draw.texts().map(str::to_string).collect();
        assert!(texts.contains(&PRESS_BUTTON_TEXT.to_string()));
        assert!(texts.contains(&"A".to_string()));

        let events = rig.tap(ButtonId::DOWN);
        assert!(events.contains(&FrontendEvent::BindingChanged(target)));
        assert_eq!(
            *rig.context.bindings.get(target),
            MappedButton::bound(Device::Gamepad, ButtonId::DOWN)
        );
        // the press was swallowed by the capture
        assert_eq!(rig.context.rom_selection(), 0);
        assert!(!rig.context.capture.is_active());
    }

    #[test]
    fn console_remap_times_out_and_unbinds() {
        let mut rig = Rig::new();
        let target = BindingRef::console(3, BindingSlot::Primary);
        rig.apply(FrontendCommand::Remap(target));
        let mut events = Vec::new();
        for _ in 0..(4.2 / DT) as usize {
            events.extend(rig.idle());
        }
        assert!(events.contains(&FrontendEvent::BindingChanged(target)));
        assert!(!rig.context.bindings.get(target).is_bound);
    }

    #[test]
    fn menu_remap_has_no_timeout() {
        let mut rig = Rig::new();
        rig.apply(FrontendCommand::Remap(BindingRef::menu(BindingSlot::Primary)));
        assert_eq!(rig.context.capture.remaining_seconds(), None);
        for _ in 0..300 {
            rig.idle();
        }
        assert!(rig.context.capture.is_active());
        let texts: Vec<_> = rig.context.draw.texts().map(str::to_string).collect();
        assert!(texts.contains(&MENU_BUTTON_HINT_TEXT.to_string()));
    }

    #[test]
    fn save_slot_wraps_and_refreshes_preview() {
        let mut rig = Rig::new();
        rig.apply(FrontendCommand::SlotStep(-1));
        assert_eq!(rig.context.save_slot, 9);
        assert_eq!(rig.core.previewed_slot, Some(9));
        rig.apply(FrontendCommand::SlotStep(1));
        assert_eq!(rig.context.save_slot, 0);
    }

    #[test]
    fn state_commands_need_a_loaded_rom() {
        let mut rig = Rig::new();
        let events = rig.apply(FrontendCommand::SaveState);
        assert!(events.is_empty());
        assert!(rig.core.snapshots.is_empty());

        rig.tap(ButtonId::A);
        rig.tap(ButtonId::Y);
        let events = rig.apply(FrontendCommand::SaveState);
        assert_eq!(events, vec![FrontendEvent::MenuClosed]);
        assert!(rig.core.snapshots.contains_key(&0));
    }

    #[test]
    fn screen_adjustments_clamp_and_reset() {
        let mut rig = Rig::new();
        for _ in 0..500 {
            rig.apply(FrontendCommand::Adjust {
                axis: ScreenAxis::Distance,
                step: 1,
            });
        }
        assert_eq!(rig.context.screen.distance, 10.0);
        rig.apply(FrontendCommand::Adjust {
            axis: ScreenAxis::Yaw,
            step: -1,
        });
        assert_eq!(rig.context.screen.yaw, -0.5);
        rig.apply(FrontendCommand::Adjust {
            axis: ScreenAxis::Distance,
            step: 0,
        });
        assert_eq!(rig.context.screen.distance, 5.5);
        rig.apply(FrontendCommand::ResetScreen);
        assert_eq!(rig.context.screen, default_screen(&MenuConfig::fallback()));
    }

    #[test]
    fn exit_flushes_ram_and_raises_request() {
        let mut rig = Rig::new();
        let events = rig.apply(FrontendCommand::Exit);
        assert_eq!(events, vec![FrontendEvent::ExitRequested]);
        assert_eq!(rig.core.ram_flushes, 1);
        assert!(rig.context.exit_requested);
    }

    #[test]
    fn settings_survive_a_restart() {
        let path = temp_settings("roundtrip");
        let mut rig = Rig::with_path(Some(path.clone()));
        rig.context.follow_head = true;
        rig.context.swap_enter_back = true;
        rig.context.screen.yaw = 12.5;
        rig.context.bindings.menu[BindingSlot::Alternate] =
            MappedButton::bound(Device::RightController, ButtonId::GRIP_TRIGGER);
        rig.core.palette = 4;
        assert!(rig.context.save_settings(&rig.core).expect("settings written"));

        let mut restarted = Rig::with_path(Some(path.clone()));
        assert!(restarted
            .context
            .load_settings(&mut restarted.core)
            .expect("settings read"));
        assert!(restarted.context.follow_head);
        assert!(restarted.context.swap_enter_back);
        assert_eq!(restarted.context.screen.yaw, 12.5);
        assert_eq!(restarted.context.bindings, rig.context.bindings);
        assert_eq!(restarted.core.palette, 4);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn stale_settings_leave_defaults_in_place() {
        let path = temp_settings("stale");
        let mut old = Rig::with_path(Some(path.clone()));
        old.context.config.settings_version = 26;
        old.context.follow_head = true;
        old.context.save_settings(&old.core).expect("settings written");

        let mut rig = Rig::with_path(Some(path.clone()));
        let defaults = rig.context.bindings.clone();
        let result = rig.context.load_settings(&mut rig.core);
        assert!(matches!(result, Err(SettingsError::VersionMismatch { found: 26, .. })));
        assert!(!rig.context.follow_head);
        assert_eq!(rig.context.bindings, defaults);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn closed_menu_draws_nothing() {
        let mut rig = Rig::new();
        rig.idle();
        assert!(rig.context.draw.texts().any(|text| text == "VirtualBoyGo"));
        rig.tap(ButtonId::A);
        rig.settle();
        assert!(rig.context.draw.commands.is_empty());
    }

    #[test]
    fn slot_outside_the_configured_range_panics() {
        let mut rig = Rig::new();
        rig.tap(ButtonId::A);
        rig.tap(ButtonId::Y);
        rig.context.save_slot = rig.context.config.save_slots;
        for command in [FrontendCommand::SaveState, FrontendCommand::LoadState] {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| rig.apply(command)));
            let payload = result.expect_err("out-of-range slot should panic");
            assert!(panic_message(payload.as_ref()).contains("out of range"));
        }
        assert!(rig.core.snapshots.is_empty());
    }

    #[test]
    fn landing_on_the_slot_button_refreshes_the_preview() {
        let mut rig = Rig::new();
        rig.tap(ButtonId::A);
        rig.tap(ButtonId::Y);
        rig.settle();
        rig.context.save_slot = 4;
        rig.core.previewed_slot = None;

        rig.tap(ButtonId::DOWN);
        assert_eq!(rig.core.previewed_slot, None);
        rig.tap(ButtonId::DOWN);
        assert_eq!(rig.context.pages[PageId::Main].current_selection(), 2);
        assert_eq!(rig.core.previewed_slot, Some(4));
    }

    #[test]
    fn core_option_changes_are_saved_with_the_settings() {
        let path = temp_settings("core_option");
        let mut rig = Rig::with_path(Some(path.clone()));
        rig.apply(FrontendCommand::OpenPage {
            page: PageId::Settings,
            direction: 1,
        });
        rig.settle();
        assert_eq!(rig.context.current_page(), PageId::Settings);

        let palette_row = rig.context.pages[PageId::Settings]
            .items()
            .iter()
            .position(|item| match &item.kind {
                ItemKind::Button(button) => {
                    button.on_press == Some(FrontendCommand::CoreOption { id: PALETTE_OPTION, step: 0 })
                }
                _ => false,
            })
            .expect("core adds a palette row");
        rig.context.pages[PageId::Settings].set_selection(palette_row);
        let before = rig.core.palette;
        rig.tap(ButtonId::RIGHT);
        let changed = rig.core.palette;
        assert_ne!(changed, before);
        let label = rig.core.option_label(PALETTE_OPTION);
        assert!(rig.context.draw.texts().any(|text| text == label));

        rig.tap(ButtonId::B);
        let mut restarted = Rig::with_path(Some(path.clone()));
        assert!(restarted
            .context
            .load_settings(&mut restarted.core)
            .expect("settings read"));
        assert_eq!(restarted.core.palette, changed);
        let _ = fs::remove_file(path);
    }
}
