//! Rofi's script-mode environment
//!
//! Rofi re-runs the script with `ROFI_RETV` set to the way the row was
//! chosen and `ROFI_INFO` set to the chosen row's info field.

use super::Command;

/// Custom keybinding `kb-custom-1` arrives as this `ROFI_RETV`
const CUSTOM_KEY_BASE: i32 = 10;

/// Action bound to one of rofi's custom keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    TogglePin,
    SwitchBuffer(u8),
    Delete,
    PreviousBuffer,
    NextBuffer,
}

impl KeyAction {
    /// Map a `ROFI_RETV` value; anything outside 10-18 is not a custom key
    pub fn from_retv(retv: i32) -> Option<Self> {
        match retv - CUSTOM_KEY_BASE {
            0 => Some(Self::TogglePin),
            n @ 1..=5 => Some(Self::SwitchBuffer(n as u8)),
            6 => Some(Self::Delete),
            7 => Some(Self::PreviousBuffer),
            8 => Some(Self::NextBuffer),
            _ => None,
        }
    }

    /// Command for this key given the selected row's id
    ///
    /// Row actions without a recoverable id fall back to listing.
    pub fn into_command(self, selected: Option<i64>) -> Command {
        match (self, selected) {
            (Self::TogglePin, Some(id)) => Command::TogglePin(id),
            (Self::Delete, Some(id)) => Command::Delete(id),
            (Self::TogglePin | Self::Delete, None) => Command::List(None),
            (Self::SwitchBuffer(n), _) => Command::SwitchBuffer(i64::from(n)),
            (Self::PreviousBuffer, _) => Command::PreviousBuffer,
            (Self::NextBuffer, _) => Command::NextBuffer,
        }
    }
}

/// Snapshot of the variables rofi sets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LauncherEnv {
    pub retv: Option<i32>,
    pub info: Option<String>,
}

impl LauncherEnv {
    pub fn from_env() -> Self {
        Self {
            retv: std::env::var("ROFI_RETV")
                .ok()
                .and_then(|v| v.trim().parse().ok()),
            info: std::env::var("ROFI_INFO").ok().filter(|v| !v.is_empty()),
        }
    }

    pub fn key_action(&self) -> Option<KeyAction> {
        self.retv.and_then(KeyAction::from_retv)
    }
}
