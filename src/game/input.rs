//! Input commands
//!
//! The window layer reports a `RawInput` snapshot per tick; `translate`
//! turns it into the command bitmask the control system reads from an
//! input channel. Keeping the translation pure means it can be tested
//! without a window.

use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr, BitOrAssign, BitXorAssign};

use super::components::ControlType;
use crate::rasterizer::Vec2;

/// Number of independent input channels
pub const NUM_INPUT_CHANNELS: usize = 1;

/// Command bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Commands(pub u16);

impl Commands {
    pub const NONE: Commands = Commands(0);
    pub const MOVE_UP: Commands = Commands(1 << 0);
    pub const MOVE_DOWN: Commands = Commands(1 << 1);
    pub const MOVE_LEFT: Commands = Commands(1 << 2);
    pub const MOVE_RIGHT: Commands = Commands(1 << 3);
    pub const TURN_UP: Commands = Commands(1 << 4);
    pub const TURN_DOWN: Commands = Commands(1 << 5);
    pub const TURN_LEFT: Commands = Commands(1 << 6);
    pub const TURN_RIGHT: Commands = Commands(1 << 7);
    pub const MOVE_RUN: Commands = Commands(1 << 8);
    /// Every movement bit; cleared after each control pass
    pub const MOVE_MASK: Commands = Commands(0b1_1111_1111);
    /// Persists until the fire system reads it
    pub const FIRE: Commands = Commands(1 << 9);

    #[inline]
    pub const fn has(self, other: Commands) -> bool {
        self.0 & other.0 != 0
    }

    /// Exactly one of the two commands is set
    #[inline]
    pub const fn either(self, a: Commands, b: Commands) -> bool {
        self.has(a) != self.has(b)
    }

    #[inline]
    pub fn insert(&mut self, other: Commands) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: Commands) {
        self.0 &= !other.0;
    }
}

impl BitOr for Commands {
    type Output = Commands;
    fn bitor(self, rhs: Commands) -> Commands {
        Commands(self.0 | rhs.0)
    }
}

impl BitOrAssign for Commands {
    fn bitor_assign(&mut self, rhs: Commands) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Commands {
    type Output = Commands;
    fn bitand(self, rhs: Commands) -> Commands {
        Commands(self.0 & rhs.0)
    }
}

impl BitXorAssign for Commands {
    fn bitxor_assign(&mut self, rhs: Commands) {
        self.0 ^= rhs.0;
    }
}

/// Key and pointer state sampled once per tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub run: bool,
    pub strafe: bool,
    pub fire: bool,
    pub quit: bool,
    /// Pointer in logical screen coordinates (already divided by the
    /// resolution scale)
    pub pointer: Option<Vec2>,
}

/// Build the command bitmask for an entity with the given control type.
///
/// Rotational entities turn with left/right unless they use mouselook or
/// the strafe modifier is held, in which case they strafe.
pub fn translate(raw: &RawInput, control: ControlType) -> Commands {
    let mut commands = Commands::NONE;

    if !control.has(ControlType::KEYBOARD) {
        return commands;
    }

    if raw.up {
        commands |= Commands::MOVE_UP;
    }
    if raw.down {
        commands |= Commands::MOVE_DOWN;
    }
    if raw.run {
        commands |= Commands::MOVE_RUN;
    }

    let turns = control.has(ControlType::ROTATIONAL)
        && !control.has(ControlType::MOUSELOOK)
        && !raw.strafe;

    let (left, right) = if turns {
        (Commands::TURN_LEFT, Commands::TURN_RIGHT)
    } else {
        (Commands::MOVE_LEFT, Commands::MOVE_RIGHT)
    };
    if raw.left {
        commands |= left;
    }
    if raw.right {
        commands |= right;
    }

    if raw.fire {
        commands |= Commands::FIRE;
    }

    commands
}

/// Per-channel command bitmasks written by the input layer
#[derive(Debug, Clone, PartialEq)]
pub struct InputChannels {
    channels: [Commands; NUM_INPUT_CHANNELS],
    /// Last pointer position, for mouselook and the crosshair
    pub pointer: Vec2,
}

impl Default for InputChannels {
    fn default() -> Self {
        Self { channels: [Commands::NONE; NUM_INPUT_CHANNELS], pointer: Vec2::ZERO }
    }
}

impl InputChannels {
    /// Commands on `channel`; unknown channels read as empty
    pub fn get(&self, channel: usize) -> Commands {
        self.channels.get(channel).copied().unwrap_or_default()
    }

    pub fn set(&mut self, channel: usize, commands: Commands) {
        if let Some(slot) = self.channels.get_mut(channel) {
            *slot = commands;
        }
    }

    /// Replace `channel` with the translation of `raw`
    pub fn apply(&mut self, channel: usize, raw: &RawInput, control: ControlType) {
        self.set(channel, translate(raw, control));
        if let Some(pointer) = raw.pointer {
            self.pointer = pointer;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> ControlType {
        ControlType::KEYBOARD.with(ControlType::ROTATIONAL)
    }

    #[test]
    fn test_rotational_left_right_turn() {
        let raw = RawInput { left: true, up: true, ..Default::default() };
        let cmds = translate(&raw, player());
        assert!(cmds.has(Commands::TURN_LEFT));
        assert!(cmds.has(Commands::MOVE_UP));
        assert!(!cmds.has(Commands::MOVE_LEFT));
    }

    #[test]
    fn test_strafe_modifier_moves_sideways() {
        let raw = RawInput { right: true, strafe: true, ..Default::default() };
        let cmds = translate(&raw, player());
        assert_eq!(cmds, Commands::MOVE_RIGHT);
    }

    #[test]
    fn test_mouselook_always_strafes() {
        let raw = RawInput { left: true, ..Default::default() };
        let cmds = translate(&raw, player().with(ControlType::MOUSELOOK));
        assert_eq!(cmds, Commands::MOVE_LEFT);
    }

    #[test]
    fn test_non_keyboard_control_ignores_keys() {
        let raw = RawInput { up: true, fire: true, ..Default::default() };
        assert_eq!(translate(&raw, ControlType::AI), Commands::NONE);
    }

    #[test]
    fn test_fire_is_outside_move_mask() {
        assert!(!Commands::MOVE_MASK.has(Commands::FIRE));
        assert!(Commands::MOVE_MASK.has(Commands::MOVE_RUN));
    }

    #[test]
    fn test_unknown_channel_reads_empty() {
        let mut channels = InputChannels::default();
        channels.set(5, Commands::FIRE);
        assert_eq!(channels.get(5), Commands::NONE);
    }
}
