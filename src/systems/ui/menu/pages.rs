//! The frontend's page graph.
//!
//! Pages are plain [`Menu`]s whose items carry [`FrontendCommand`]s; the
//! [`context`](super::context) interprets those commands. Labels that show
//! live state are rewritten by [`refresh_labels`] before every draw.
use bevy::math::Vec2;
use enum_map::{enum_map, Enum, EnumMap};

use crate::{
    data::{
        mapping::{BindingRef, BindingSlot, Bindings},
        settings::ScreenPlacement,
    },
    startup::{
        config::MenuConfig,
        core::{CoreOption, EmulatorCore},
    },
};

use super::{
    item::{ButtonItem, ItemKind, MenuItem, RepeatTiming},
    list::{ListItem, ScrollTuning},
    Menu,
};

pub const MENU_WIDTH: f32 = 640.0;
pub const MENU_HEIGHT: f32 = 576.0;
pub const HEADER_HEIGHT: f32 = 75.0;
pub const BOTTOM_HEIGHT: f32 = 30.0;

const ITEM_X: f32 = 40.0;
const FIRST_ROW_Y: f32 = HEADER_HEIGHT + 20.0;
const ROW_SPACING: f32 = 36.0;
const MAPPING_ROW_SPACING: f32 = 28.0;
const LIST_ROW_HEIGHT: f32 = 30.0;
const ICON_SIZE: f32 = 28.0;
const MAPPING_PRIMARY_X: f32 = 250.0;
const MAPPING_ALTERNATE_X: f32 = 420.0;

pub(super) const RESUME_TEXT: &str = "Resume Game";
pub(super) const RESET_GAME_TEXT: &str = "Reset Game";
pub(super) const SAVE_TEXT: &str = "Save";
pub(super) const LOAD_TEXT: &str = "Load";
pub(super) const LOAD_ROM_TEXT: &str = "Load Rom";
pub(super) const RESET_VIEW_TEXT: &str = "Reset View";
pub(super) const SETTINGS_TEXT: &str = "Settings";
pub(super) const EXIT_TEXT: &str = "Exit";
pub(super) const MENU_MAPPING_TEXT: &str = "Menu Button Mapping";
pub(super) const EMULATOR_MAPPING_TEXT: &str = "Emulator Button Mapping";
pub(super) const MOVE_SCREEN_TEXT: &str = "Move Screen";
pub(super) const SAVE_AND_BACK_TEXT: &str = "Save and Back";
pub(super) const MENU_MAPPED_TO_TEXT: &str = "menu mapped to:";
pub(super) const RESET_MAPPING_TEXT: &str = "Reset Mapping";
pub(super) const RESET_SCREEN_TEXT: &str = "Reset View Settings";
pub(super) const BACK_TEXT: &str = "Back";

#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageId {
    RomList,
    Main,
    Settings,
    MenuMapping,
    EmulatorMapping,
    MoveScreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAxis {
    Yaw,
    Pitch,
    Roll,
    Distance,
    Scale,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrontendCommand {
    /// Slide to `page`; `direction` is the sign of the slide.
    OpenPage { page: PageId, direction: i32 },
    Resume,
    ResetGame,
    SlotStep(i32),
    SaveState,
    LoadState,
    LoadRom(usize),
    ResetView,
    Exit,
    SaveAndBack,
    ToggleFollowHead,
    ToggleSwapEnterBack,
    Remap(BindingRef),
    ResetMapping,
    /// `step` of 0 resets the axis to its default.
    Adjust { axis: ScreenAxis, step: i32 },
    ResetScreen,
    /// Routed to [`EmulatorCore::adjust_option`].
    CoreOption { id: usize, step: i32 },
}

fn open(page: PageId, direction: i32) -> FrontendCommand {
    FrontendCommand::OpenPage { page, direction }
}

fn row(index: usize) -> Vec2 {
    Vec2::new(ITEM_X, FIRST_ROW_Y + index as f32 * ROW_SPACING)
}

fn button(index: usize, text: &str, icon: &'static str, command: FrontendCommand) -> MenuItem<FrontendCommand> {
    MenuItem::button(row(index), ButtonItem::new(text).with_icon(icon).on_press(command))
}

fn repeat_timing(config: &MenuConfig) -> RepeatTiming {
    RepeatTiming {
        scroll_delay: config.repeat.scroll_delay,
        scroll_time_h: config.repeat.scroll_time_h,
        scroll_time_v: config.repeat.scroll_time_v,
    }
}

fn horizontal_timing(config: &MenuConfig, scroll_time_h: f32) -> RepeatTiming {
    RepeatTiming {
        scroll_time_h,
        ..repeat_timing(config)
    }
}

fn with_config_timing(mut menu: Menu<FrontendCommand>, timing: RepeatTiming) -> Menu<FrontendCommand> {
    for item in menu.items_mut() {
        item.for_each_mut(&mut |item| item.timing = timing);
    }
    menu
}

fn rom_list(config: &MenuConfig) -> Menu<FrontendCommand> {
    let tuning = ScrollTuning {
        lookbehind: config.list.lookbehind_rows,
        lookahead: config.list.lookahead_rows,
        max_ease_rows: config.list.max_ease_rows,
        ease_rate: config.list.ease_rate,
    };
    let size = Vec2::new(
        MENU_WIDTH - 2.0 * 20.0,
        MENU_HEIGHT - HEADER_HEIGHT - BOTTOM_HEIGHT - 20.0,
    );
    let list = ListItem::new(size, LIST_ROW_HEIGHT, tuning, FrontendCommand::LoadRom);
    let items = vec![MenuItem::list(Vec2::new(20.0, HEADER_HEIGHT + 10.0), list)];
    with_config_timing(Menu::new(items), repeat_timing(config)).with_back(open(PageId::Main, 1))
}

fn main_page(config: &MenuConfig) -> Menu<FrontendCommand> {
    let slot = MenuItem::button(
        row(2),
        ButtonItem::new("")
            .with_icon("save_slot")
            .on_press(FrontendCommand::SlotStep(1))
            .on_left_right(FrontendCommand::SlotStep(-1), FrontendCommand::SlotStep(1)),
    );
    let items = vec![
        button(0, RESUME_TEXT, "resume", FrontendCommand::Resume),
        button(1, RESET_GAME_TEXT, "reset", FrontendCommand::ResetGame),
        slot,
        button(3, SAVE_TEXT, "save", FrontendCommand::SaveState),
        button(4, LOAD_TEXT, "load", FrontendCommand::LoadState),
        button(5, LOAD_ROM_TEXT, "load_rom", open(PageId::RomList, -1)),
        button(6, RESET_VIEW_TEXT, "reset_view", FrontendCommand::ResetView),
        button(7, SETTINGS_TEXT, "settings", open(PageId::Settings, 1)),
        button(8, EXIT_TEXT, "exit", FrontendCommand::Exit),
        MenuItem::image(Vec2::new(330.0, FIRST_ROW_Y), "state_preview", Vec2::new(270.0, 180.0)),
    ];
    let mut menu = with_config_timing(Menu::new(items), repeat_timing(config)).with_back(FrontendCommand::Resume);
    menu.items_mut()[2].timing = horizontal_timing(config, config.repeat.slot_time_h);
    menu
}

/// Left, right and enter all flip the setting.
fn toggle(index: usize, icon: &'static str, command: FrontendCommand) -> MenuItem<FrontendCommand> {
    MenuItem::button(
        row(index),
        ButtonItem::new("")
            .with_icon(icon)
            .on_press(command.clone())
            .on_left_right(command.clone(), command),
    )
}

fn core_option_button(index: usize, option: CoreOption) -> MenuItem<FrontendCommand> {
    let CoreOption { id, icon } = option;
    MenuItem::button(
        row(index),
        ButtonItem::new("")
            .with_icon(icon)
            .on_press(FrontendCommand::CoreOption { id, step: 0 })
            .on_left_right(
                FrontendCommand::CoreOption { id, step: -1 },
                FrontendCommand::CoreOption { id, step: 1 },
            ),
    )
}

fn settings_page(config: &MenuConfig, core: &dyn EmulatorCore) -> Menu<FrontendCommand> {
    let mut items = vec![
        button(0, MENU_MAPPING_TEXT, "mapping", open(PageId::MenuMapping, 1)),
        button(1, EMULATOR_MAPPING_TEXT, "mapping", open(PageId::EmulatorMapping, 1)),
        button(2, MOVE_SCREEN_TEXT, "move_screen", open(PageId::MoveScreen, 1)),
        toggle(3, "follow_head", FrontendCommand::ToggleFollowHead),
    ];
    for option in core.settings_options() {
        items.push(core_option_button(items.len(), option));
    }
    items.push(button(items.len(), SAVE_AND_BACK_TEXT, "back", FrontendCommand::SaveAndBack));
    items.push(MenuItem::label(
        Vec2::new(ITEM_X, MENU_HEIGHT - BOTTOM_HEIGHT - ROW_SPACING),
        core.version(),
    ));
    with_config_timing(Menu::new(items), repeat_timing(config)).with_back(FrontendCommand::SaveAndBack)
}

fn binding_button(x: f32, target: BindingRef) -> MenuItem<FrontendCommand> {
    MenuItem::button(
        Vec2::new(x, 0.0),
        ButtonItem::new("").on_press(FrontendCommand::Remap(target)),
    )
}

fn menu_mapping_page(config: &MenuConfig) -> Menu<FrontendCommand> {
    let back = open(PageId::Settings, -1);
    let items = vec![
        toggle(0, "swap", FrontendCommand::ToggleSwapEnterBack),
        MenuItem::container(
            row(1),
            vec![
                MenuItem::label(Vec2::ZERO, MENU_MAPPED_TO_TEXT),
                binding_button(MAPPING_PRIMARY_X - ITEM_X, BindingRef::menu(BindingSlot::Primary)),
                binding_button(MAPPING_ALTERNATE_X - ITEM_X, BindingRef::menu(BindingSlot::Alternate)),
            ],
        ),
        button(2, BACK_TEXT, "back", back.clone()),
    ];
    with_config_timing(Menu::new(items), repeat_timing(config)).with_back(back)
}

fn emulator_mapping_page(config: &MenuConfig, core: &dyn EmulatorCore) -> Menu<FrontendCommand> {
    let back = open(PageId::Settings, -1);
    let layout = core.button_layout();
    let mut items: Vec<_> = core
        .button_order()
        .iter()
        .enumerate()
        .map(|(display_row, &action)| {
            let console_button = layout[action];
            MenuItem::container(
                Vec2::new(ITEM_X, HEADER_HEIGHT + 10.0 + display_row as f32 * MAPPING_ROW_SPACING),
                vec![
                    MenuItem::image(Vec2::ZERO, console_button.icon, Vec2::splat(ICON_SIZE)),
                    MenuItem::label(Vec2::new(ICON_SIZE + 8.0, 0.0), console_button.name),
                    binding_button(
                        MAPPING_PRIMARY_X - ITEM_X,
                        BindingRef::console(action, BindingSlot::Primary),
                    ),
                    binding_button(
                        MAPPING_ALTERNATE_X - ITEM_X,
                        BindingRef::console(action, BindingSlot::Alternate),
                    ),
                ],
            )
        })
        .collect();

    let footer_y = HEADER_HEIGHT + 20.0 + layout.len() as f32 * MAPPING_ROW_SPACING;
    items.push(MenuItem::button(
        Vec2::new(ITEM_X, footer_y),
        ButtonItem::new(RESET_MAPPING_TEXT)
            .with_icon("reset_view")
            .on_press(FrontendCommand::ResetMapping),
    ));
    items.push(MenuItem::button(
        Vec2::new(ITEM_X, footer_y + MAPPING_ROW_SPACING),
        ButtonItem::new(BACK_TEXT).with_icon("back").on_press(back.clone()),
    ));
    with_config_timing(Menu::new(items), repeat_timing(config)).with_back(back)
}

fn adjust_button(index: usize, axis: ScreenAxis) -> MenuItem<FrontendCommand> {
    MenuItem::button(
        row(index),
        ButtonItem::new("")
            .with_icon("move_screen")
            .on_press(FrontendCommand::Adjust { axis, step: 0 })
            .on_left_right(
                FrontendCommand::Adjust { axis, step: -1 },
                FrontendCommand::Adjust { axis, step: 1 },
            ),
    )
}

fn move_screen_page(config: &MenuConfig) -> Menu<FrontendCommand> {
    let back = open(PageId::Settings, -1);
    let axes = [
        ScreenAxis::Yaw,
        ScreenAxis::Pitch,
        ScreenAxis::Roll,
        ScreenAxis::Distance,
        ScreenAxis::Scale,
    ];
    let mut items: Vec<_> = axes
        .iter()
        .enumerate()
        .map(|(index, &axis)| adjust_button(index, axis))
        .collect();
    items.push(button(axes.len(), RESET_SCREEN_TEXT, "reset_view", FrontendCommand::ResetScreen));
    items.push(button(axes.len() + 1, BACK_TEXT, "back", back.clone()));

    let mut menu = with_config_timing(Menu::new(items), repeat_timing(config)).with_back(back);
    let adjust_timing = horizontal_timing(config, config.repeat.adjust_time_h);
    for item in &mut menu.items_mut()[..axes.len()] {
        item.timing = adjust_timing;
    }
    menu
}

/// Builds every page. The ROM list starts empty; size it with
/// `set_len` once the catalog is known.
pub fn build_pages(config: &MenuConfig, core: &dyn EmulatorCore) -> EnumMap<PageId, Menu<FrontendCommand>> {
    let mut pages = enum_map! {
        PageId::RomList => rom_list(config),
        PageId::Main => main_page(config),
        PageId::Settings => settings_page(config, core),
        PageId::MenuMapping => menu_mapping_page(config),
        PageId::EmulatorMapping => emulator_mapping_page(config, core),
        PageId::MoveScreen => move_screen_page(config),
    };
    for (_, page) in pages.iter_mut() {
        page.init();
    }
    pages
}

/// Live values shown in button labels.
#[derive(Debug, Clone, Copy)]
pub struct PageState<'a> {
    pub bindings: &'a Bindings,
    pub save_slot: usize,
    pub follow_head: bool,
    pub swap_enter_back: bool,
    pub screen: ScreenPlacement,
    /// `(option id, label)` for every core-owned settings row.
    pub core_labels: &'a [(usize, String)],
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

pub fn axis_label(axis: ScreenAxis, screen: &ScreenPlacement) -> String {
    match axis {
        ScreenAxis::Yaw => format!("Yaw: {:.1}°", screen.yaw),
        ScreenAxis::Pitch => format!("Pitch: {:.1}°", screen.pitch),
        ScreenAxis::Roll => format!("Roll: {:.1}°", screen.roll),
        ScreenAxis::Distance => format!("Distance: {:.2}", screen.distance),
        ScreenAxis::Scale => format!("Scale: {:.3}", screen.scale),
    }
}

fn label_for(command: &FrontendCommand, state: &PageState<'_>) -> Option<String> {
    match command {
        FrontendCommand::SlotStep(_) => Some(format!("Save Slot: {}", state.save_slot)),
        FrontendCommand::ToggleFollowHead => Some(format!("Follow Head: {}", yes_no(state.follow_head))),
        FrontendCommand::ToggleSwapEnterBack => Some(format!(
            "Swap Select and Back: {}",
            yes_no(state.swap_enter_back)
        )),
        FrontendCommand::Remap(target) => Some(state.bindings.get(*target).label().to_string()),
        FrontendCommand::Adjust { axis, .. } => Some(axis_label(*axis, &state.screen)),
        FrontendCommand::CoreOption { id, .. } => state
            .core_labels
            .iter()
            .find(|(option, _)| option == id)
            .map(|(_, label)| label.clone()),
        _ => None,
    }
}

/// Rewrites every label derived from live state.
pub fn refresh_labels(pages: &mut EnumMap<PageId, Menu<FrontendCommand>>, state: &PageState<'_>) {
    for (_, page) in pages.iter_mut() {
        for item in page.items_mut() {
            item.for_each_mut(&mut |item| {
                let ItemKind::Button(button) = &mut item.kind else {
                    return;
                };
                let Some(text) = button.on_press.as_ref().and_then(|command| label_for(command, state)) else {
                    return;
                };
                if button.text != text {
                    button.text = text;
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{
            buttons::{ButtonId, Device},
            mapping::MappedButton,
        },
        startup::core::{HeadlessCore, DEPTH_OFFSET_OPTION, PALETTE_OPTION},
        systems::input::InputFrame,
    };
    use enum_map::enum_map;

    use super::super::{MenuEvent, NavigationOptions};

    fn hold_right(menu: &mut Menu<FrontendCommand>, frames: usize, delta_seconds: f32) -> Vec<FrontendCommand> {
        let mut frame = InputFrame::default();
        let mut commands = Vec::new();
        for _ in 0..frames {
            frame.begin(enum_map! { Device::Gamepad => ButtonId::RIGHT.mask(), _ => 0 });
            for event in menu.advance(&mut frame, delta_seconds, NavigationOptions::default()) {
                if let MenuEvent::Command { command, .. } = event {
                    commands.push(command);
                }
            }
        }
        commands
    }

    fn pages() -> EnumMap<PageId, Menu<FrontendCommand>> {
        build_pages(&MenuConfig::fallback(), &HeadlessCore::default())
    }

    fn press_commands(menu: &Menu<FrontendCommand>) -> Vec<FrontendCommand> {
        menu.items()
            .iter()
            .filter_map(|item| match &item.kind {
                ItemKind::Button(button) => button.on_press.clone(),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn every_page_starts_on_a_selectable_item() {
        for (page, menu) in pages().iter() {
            assert!(menu.selected_item().selectable, "{page:?}");
            assert!(menu.selected_item().selected, "{page:?}");
        }
    }

    #[test]
    fn page_graph_follows_slide_directions() {
        let pages = pages();
        let main = press_commands(&pages[PageId::Main]);
        assert!(main.contains(&open(PageId::RomList, -1)));
        assert!(main.contains(&open(PageId::Settings, 1)));
        assert_eq!(pages[PageId::RomList].back, Some(open(PageId::Main, 1)));
        assert_eq!(pages[PageId::Settings].back, Some(FrontendCommand::SaveAndBack));
        assert_eq!(pages[PageId::MoveScreen].back, Some(open(PageId::Settings, -1)));
        assert_eq!(pages[PageId::Main].back, Some(FrontendCommand::Resume));
    }

    #[test]
    fn emulator_mapping_lists_core_buttons_in_display_order() {
        let pages = pages();
        let core = HeadlessCore::default();
        let rows = &pages[PageId::EmulatorMapping].items()[..core.button_layout().len()];
        let first_targets: Vec<_> = rows
            .iter()
            .map(|row| match &row.kind {
                ItemKind::Container(container) => match &container.active_child().kind {
                    ItemKind::Button(button) => button.on_press.clone(),
                    _ => None,
                },
                _ => None,
            })
            .collect();
        for (target, &action) in first_targets.iter().zip(core.button_order()) {
            assert_eq!(
                *target,
                Some(FrontendCommand::Remap(BindingRef::console(action, BindingSlot::Primary)))
            );
        }
    }

    #[test]
    fn labels_follow_live_state() {
        let mut pages = pages();
        let mut bindings = Bindings::new(Default::default(), HeadlessCore::default().default_bindings());
        bindings.menu[BindingSlot::Primary] = MappedButton::bound(Device::Gamepad, ButtonId::Y);
        let state = PageState {
            bindings: &bindings,
            save_slot: 3,
            follow_head: false,
            swap_enter_back: true,
            screen: ScreenPlacement {
                pitch: 0.0,
                yaw: -2.5,
                roll: 0.0,
                distance: 5.5,
                scale: 1.0,
            },
            core_labels: &[(PALETTE_OPTION, "Palette: 2".to_string())],
        };
        refresh_labels(&mut pages, &state);

        let texts = |page: PageId| -> Vec<String> {
            let mut texts = Vec::new();
            for item in pages[page].items() {
                let mut item = item.clone();
                item.for_each_mut(&mut |item| {
                    if let ItemKind::Button(button) = &item.kind {
                        texts.push(button.text.clone());
                    }
                });
            }
            texts
        };
        assert!(texts(PageId::Main).contains(&"Save Slot: 3".to_string()));
        assert!(texts(PageId::Settings).contains(&"Follow Head: No".to_string()));
        assert!(texts(PageId::Settings).contains(&"Palette: 2".to_string()));
        let mapping = texts(PageId::MenuMapping);
        assert_eq!(mapping[0], "Swap Select and Back: Yes");
        assert_eq!(mapping[1], "Y");
        assert_eq!(mapping[2], "-");
        assert_eq!(texts(PageId::MoveScreen)[0], "Yaw: -2.5°");
    }

    #[test]
    fn settings_page_lists_core_options_before_save_and_back() {
        let pages = pages();
        let commands = press_commands(&pages[PageId::Settings]);
        let core_rows: Vec<_> = commands
            .iter()
            .filter_map(|command| match command {
                FrontendCommand::CoreOption { id, step: 0 } => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(core_rows, [DEPTH_OFFSET_OPTION, PALETTE_OPTION]);
        assert_eq!(commands.last(), Some(&FrontendCommand::SaveAndBack));
    }

    #[test]
    fn toggles_flip_on_left_and_right() {
        let mut pages = pages();
        let settings = &mut pages[PageId::Settings];
        settings.set_selection(3);
        let commands = hold_right(settings, 1, 0.016);
        assert_eq!(commands, [FrontendCommand::ToggleFollowHead]);

        let commands = hold_right(&mut pages[PageId::MenuMapping], 1, 0.016);
        assert_eq!(commands, [FrontendCommand::ToggleSwapEnterBack]);
    }

    #[test]
    fn holding_right_on_yaw_repeats_faster_than_the_slot_button() {
        let mut pages = pages();
        let yaw_steps = hold_right(&mut pages[PageId::MoveScreen], 100, 0.01)
            .into_iter()
            .filter(|command| {
                *command
                    == FrontendCommand::Adjust {
                        axis: ScreenAxis::Yaw,
                        step: 1,
                    }
            })
            .count();
        // one edge, the 0.3 s delay, then a step every 0.025 s
        assert!((25..=30).contains(&yaw_steps), "{yaw_steps}");

        let main = &mut pages[PageId::Main];
        main.set_selection(2);
        let slot_steps = hold_right(main, 100, 0.01).len();
        assert!(slot_steps < 10, "{slot_steps}");
    }
}
