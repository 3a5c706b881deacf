//! Flat binary settings blob.
//!
//! Layout (little-endian, fixed field order, no tolerance beyond an exact
//! version match):
//!
//! ```text
//! i32   format version
//! --- emulator settings ---
//! i32   last selected ROM index
//! N x ( i32 device | -1, i32 button ) x 2     console bindings
//! ..    core-defined fields (CoreSettings::settings_len bytes)
//! --- frontend settings ---
//! bool  follow head
//! f32   pitch, yaw, roll, distance, scale
//! 2 x ( i32 device | -1, i32 button )         open-menu bindings
//! bool  swap enter/back
//! ```
//!
//! Decoding goes into a staging value that is only handed back once the whole
//! blob has been read, so a bad file never leaves a half-loaded state behind.
use std::{error::Error, fmt, fs, io, path::Path};

use super::{
    buttons::{ButtonId, Device},
    mapping::{MappedAction, MappedButton},
};

#[derive(Debug)]
pub enum SettingsError {
    Io(io::Error),
    Truncated { needed: usize, remaining: usize },
    VersionMismatch { found: i32, expected: i32 },
    InvalidBinding { device: i32, button: i32 },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "settings i/o error: {err}"),
            Self::Truncated { needed, remaining } => write!(
                f,
                "settings blob truncated: needed {needed} byte(s), {remaining} left"
            ),
            Self::VersionMismatch { found, expected } => write!(
                f,
                "settings version {found} does not match expected version {expected}"
            ),
            Self::InvalidBinding { device, button } => {
                write!(f, "invalid stored binding (device {device}, button {button})")
            }
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for SettingsError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

#[derive(Debug, Default)]
pub struct SettingsWriter {
    bytes: Vec<u8>,
}

impl SettingsWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_i32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_f32(&mut self, value: f32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_bool(&mut self, value: bool) {
        self.bytes.push(u8::from(value));
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[derive(Debug)]
pub struct SettingsReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> SettingsReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], SettingsError> {
        let chunk = self.take_slice(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(chunk);
        Ok(out)
    }

    pub fn take_slice(&mut self, len: usize) -> Result<&'a [u8], SettingsError> {
        let remaining = self.bytes.len() - self.position;
        if remaining < len {
            return Err(SettingsError::Truncated {
                needed: len,
                remaining,
            });
        }
        let chunk = &self.bytes[self.position..self.position + len];
        self.position += len;
        Ok(chunk)
    }

    pub fn get_i32(&mut self) -> Result<i32, SettingsError> {
        self.take::<4>().map(i32::from_le_bytes)
    }

    pub fn get_f32(&mut self) -> Result<f32, SettingsError> {
        self.take::<4>().map(f32::from_le_bytes)
    }

    pub fn get_bool(&mut self) -> Result<bool, SettingsError> {
        self.take::<1>().map(|[byte]| byte != 0)
    }
}

/// The collaborator-defined part of the emulator settings section.
///
/// The section has a fixed size so the frontend can stage the rest of the
/// blob before handing these bytes over. `read_settings` must leave the core
/// untouched when it returns an error.
pub trait CoreSettings {
    fn settings_len(&self) -> usize;
    fn write_settings(&self, out: &mut SettingsWriter);
    fn read_settings(&mut self, input: &mut SettingsReader<'_>) -> Result<(), SettingsError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPlacement {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
    pub distance: f32,
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrontendSettings {
    pub rom_selection: usize,
    pub console_bindings: Vec<MappedAction>,
    pub follow_head: bool,
    pub screen: ScreenPlacement,
    pub menu_binding: MappedAction,
    pub swap_enter_back: bool,
}

fn put_binding(out: &mut SettingsWriter, button: &MappedButton) {
    out.put_i32(if button.is_bound {
        button.device.index() as i32
    } else {
        -1
    });
    out.put_i32(button.button.bit() as i32);
}

fn get_binding(input: &mut SettingsReader<'_>) -> Result<MappedButton, SettingsError> {
    let device = input.get_i32()?;
    let button = input.get_i32()?;
    if device < 0 {
        return Ok(MappedButton {
            is_bound: false,
            device: Device::Gamepad,
            button: ButtonId::try_new(button).unwrap_or_default(),
        });
    }
    match (Device::from_index(device), ButtonId::try_new(button)) {
        (Some(device), Some(button)) => Ok(MappedButton::bound(device, button)),
        _ => Err(SettingsError::InvalidBinding { device, button }),
    }
}

fn get_action(input: &mut SettingsReader<'_>) -> Result<MappedAction, SettingsError> {
    let primary = get_binding(input)?;
    let alternate = get_binding(input)?;
    Ok(MappedAction::new(primary, alternate))
}

pub fn encode<C: CoreSettings + ?Sized>(settings: &FrontendSettings, version: i32, core: &C) -> Vec<u8> {
    let mut out = SettingsWriter::new();
    out.put_i32(version);

    out.put_i32(settings.rom_selection as i32);
    for action in &settings.console_bindings {
        for button in &action.buttons {
            put_binding(&mut out, button);
        }
    }
    core.write_settings(&mut out);

    out.put_bool(settings.follow_head);
    out.put_f32(settings.screen.pitch);
    out.put_f32(settings.screen.yaw);
    out.put_f32(settings.screen.roll);
    out.put_f32(settings.screen.distance);
    out.put_f32(settings.screen.scale);
    for button in &settings.menu_binding.buttons {
        put_binding(&mut out, button);
    }
    out.put_bool(settings.swap_enter_back);

    out.into_bytes()
}

/// Decodes a blob written by [`encode`]. `console_actions` is the number of
/// console binding rows the current core expects.
pub fn decode<C: CoreSettings + ?Sized>(
    bytes: &[u8],
    version: i32,
    console_actions: usize,
    core: &mut C,
) -> Result<FrontendSettings, SettingsError> {
    let mut input = SettingsReader::new(bytes);
    let found = input.get_i32()?;
    if found != version {
        return Err(SettingsError::VersionMismatch {
            found,
            expected: version,
        });
    }

    let rom_selection = input.get_i32()?.max(0) as usize;
    let console_bindings = (0..console_actions)
        .map(|_| get_action(&mut input))
        .collect::<Result<Vec<_>, _>>()?;
    let core_bytes = input.take_slice(core.settings_len())?;

    let follow_head = input.get_bool()?;
    let screen = ScreenPlacement {
        pitch: input.get_f32()?,
        yaw: input.get_f32()?,
        roll: input.get_f32()?,
        distance: input.get_f32()?,
        scale: input.get_f32()?,
    };
    let menu_binding = get_action(&mut input)?;
    let swap_enter_back = input.get_bool()?;

    core.read_settings(&mut SettingsReader::new(core_bytes))?;

    Ok(FrontendSettings {
        rom_selection,
        console_bindings,
        follow_head,
        screen,
        menu_binding,
        swap_enter_back,
    })
}

/// Returns `Ok(None)` when no settings file exists yet.
pub fn read_file(path: &Path) -> Result<Option<Vec<u8>>, SettingsError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}
