// SPDX-License-Identifier: GPL-3.0-only

//! Display modes and keyboard mode selection

use serde::{Deserialize, Serialize};
use tracing::debug;

/// What the viewer shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Full-resolution color image
    #[default]
    Color,
    /// Grayscale depth banding
    Depth,
    /// Grayscale infrared
    Infrared,
    /// Colored 3D point cloud
    PointCloud,
    /// Arm segments of the tracked body
    Skeleton,
    /// Surface reconstruction placeholder; renders nothing
    Mesh,
}

impl DisplayMode {
    /// All modes in key order
    pub const ALL: [DisplayMode; 6] = [
        DisplayMode::Color,
        DisplayMode::Depth,
        DisplayMode::Infrared,
        DisplayMode::PointCloud,
        DisplayMode::Skeleton,
        DisplayMode::Mesh,
    ];

    /// Key that selects this mode
    pub fn key(&self) -> char {
        match self {
            DisplayMode::Color => '1',
            DisplayMode::Depth => '2',
            DisplayMode::Infrared => '3',
            DisplayMode::PointCloud => '4',
            DisplayMode::Skeleton => '5',
            DisplayMode::Mesh => '6',
        }
    }

    pub fn from_key(key: char) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.key() == key)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DisplayMode::Color => "Color",
            DisplayMode::Depth => "Depth",
            DisplayMode::Infrared => "Infrared",
            DisplayMode::PointCloud => "Point cloud",
            DisplayMode::Skeleton => "Skeleton",
            DisplayMode::Mesh => "Mesh",
        }
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Keys the viewer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
    Other,
}

/// Edge of a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    /// Auto-repeat while the key is held
    Repeat,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub action: KeyAction,
}

impl KeyInput {
    pub fn press(key: Key) -> Self {
        Self {
            key,
            action: KeyAction::Press,
        }
    }
}

/// Events delivered by a display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyInput),
    /// Window closed or interrupt received
    CloseRequested,
    /// Surface size changed (surface-specific units)
    Resized { width: u16, height: u16 },
}

/// Outcome of feeding one key event to the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeCommand {
    None,
    Switched(DisplayMode),
    Exit,
}

/// Current mode plus the key-to-mode mapping
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeSelector {
    mode: DisplayMode,
}

impl ModeSelector {
    pub fn new(mode: DisplayMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Apply a key event; only press edges act
    pub fn handle_key(&mut self, input: KeyInput) -> ModeCommand {
        if input.action != KeyAction::Press {
            return ModeCommand::None;
        }

        match input.key {
            Key::Escape | Key::Char('q') => ModeCommand::Exit,
            Key::Char(c) => match DisplayMode::from_key(c) {
                Some(mode) => {
                    if mode != self.mode {
                        debug!(from = %self.mode, to = %mode, "Display mode changed");
                    }
                    self.mode = mode;
                    ModeCommand::Switched(mode)
                }
                None => ModeCommand::None,
            },
            Key::Other => ModeCommand::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mode_reachable_from_every_mode() {
        for from in DisplayMode::ALL {
            for to in DisplayMode::ALL {
                let mut selector = ModeSelector::new(from);
                let command = selector.handle_key(KeyInput::press(Key::Char(to.key())));
                assert_eq!(command, ModeCommand::Switched(to));
                assert_eq!(selector.mode(), to);
            }
        }
    }

    #[test]
    fn test_repeat_and_release_do_not_switch() {
        let mut selector = ModeSelector::new(DisplayMode::Depth);
        for action in [KeyAction::Repeat, KeyAction::Release] {
            let command = selector.handle_key(KeyInput {
                key: Key::Char('4'),
                action,
            });
            assert_eq!(command, ModeCommand::None);
            assert_eq!(selector.mode(), DisplayMode::Depth);
        }
    }

    #[test]
    fn test_mesh_is_reachable() {
        let mut selector = ModeSelector::default();
        selector.handle_key(KeyInput::press(Key::Char('6')));
        assert_eq!(selector.mode(), DisplayMode::Mesh);
    }

    #[test]
    fn test_escape_exits_without_changing_mode() {
        let mut selector = ModeSelector::new(DisplayMode::Skeleton);
        assert_eq!(selector.handle_key(KeyInput::press(Key::Escape)), ModeCommand::Exit);
        assert_eq!(selector.mode(), DisplayMode::Skeleton);
    }

    #[test]
    fn test_unmapped_key_ignored() {
        let mut selector = ModeSelector::default();
        assert_eq!(selector.handle_key(KeyInput::press(Key::Char('9'))), ModeCommand::None);
        assert_eq!(selector.mode(), DisplayMode::Color);
    }
}
