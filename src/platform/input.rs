//! Keyboard and pointer input
//!
//! Held keys are sampled every tick; one-shot actions (confirm, pause, ...)
//! stay latched until the host has run a tick with them.

use glam::Vec2;

use crate::consts::{GAME_DEPTH, GAME_WIDTH};
use crate::settings::ControlMode;
use crate::sim::TickInput;

/// Game actions a key can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Forward,
    Back,
    Confirm,
    Pause,
    Restart,
    ToggleControl,
    SkipLevel,
    Autopilot,
    Trajectory,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Option<Self> {
        let key = match key {
            "ArrowLeft" | "a" | "A" => Key::Left,
            "ArrowRight" | "d" | "D" => Key::Right,
            "ArrowUp" | "w" | "W" => Key::Forward,
            "ArrowDown" | "s" | "S" => Key::Back,
            "Enter" | " " => Key::Confirm,
            "Escape" | "p" | "P" => Key::Pause,
            "r" | "R" => Key::Restart,
            "m" | "M" => Key::ToggleControl,
            "+" | "=" | "n" | "N" => Key::SkipLevel,
            "i" | "I" => Key::Autopilot,
            "t" | "T" => Key::Trajectory,
            _ => return None,
        };
        Some(key)
    }
}

/// Accumulated input between ticks
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub control: ControlMode,
    left: bool,
    right: bool,
    forward: bool,
    back: bool,
    /// Last pointer position in play coordinates
    pointer: Option<Vec2>,
    /// Demo mode stays on until toggled off
    pub autopilot: bool,
    confirm: bool,
    pause: bool,
    restart: bool,
    skip_level: bool,
    toggle_trajectory: bool,
}

impl InputState {
    pub fn new(control: ControlMode) -> Self {
        Self {
            control,
            ..Self::default()
        }
    }

    /// Returns true when the key was bound (so the host can swallow the event)
    pub fn key_down(&mut self, key: &str) -> bool {
        let Some(key) = Key::from_dom(key) else {
            return false;
        };
        match key {
            Key::Left => self.left = true,
            Key::Right => self.right = true,
            Key::Forward => self.forward = true,
            Key::Back => self.back = true,
            Key::Confirm => self.confirm = true,
            Key::Pause => self.pause = true,
            Key::Restart => self.restart = true,
            Key::SkipLevel => self.skip_level = true,
            Key::Trajectory => self.toggle_trajectory = true,
            Key::Autopilot => {
                self.autopilot = !self.autopilot;
                log::info!("Autopilot: {}", self.autopilot);
            }
            Key::ToggleControl => {
                self.control = self.control.toggled();
                self.pointer = None;
                log::info!("Control mode: {:?}", self.control);
            }
        }
        true
    }

    pub fn key_up(&mut self, key: &str) {
        match Key::from_dom(key) {
            Some(Key::Left) => self.left = false,
            Some(Key::Right) => self.right = false,
            Some(Key::Forward) => self.forward = false,
            Some(Key::Back) => self.back = false,
            _ => {}
        }
    }

    /// Pointer in normalized canvas coordinates (-1..1, y down)
    ///
    /// The canvas spans the full arena width and the middle two thirds of
    /// its depth.
    pub fn pointer_moved(&mut self, nx: f32, ny: f32) {
        if self.control != ControlMode::Mouse {
            return;
        }
        let nx = nx.clamp(-1.0, 1.0);
        let ny = ny.clamp(-1.0, 1.0);
        self.pointer = Some(Vec2::new(nx * GAME_WIDTH / 2.0, ny * GAME_DEPTH / 3.0));
    }

    pub fn pointer_pressed(&mut self) {
        self.confirm = true;
    }

    /// Latch a pause (used for auto-pause on focus loss)
    pub fn request_pause(&mut self) {
        self.pause = true;
    }

    /// Snapshot for the next tick
    pub fn to_tick_input(&self) -> TickInput {
        TickInput {
            left: self.left,
            right: self.right,
            forward: self.forward,
            back: self.back,
            target: match self.control {
                ControlMode::Mouse => self.pointer,
                ControlMode::Keyboard => None,
            },
            confirm: self.confirm,
            pause: self.pause,
            restart: self.restart,
            skip_level: self.skip_level,
            autopilot: self.autopilot,
            toggle_trajectory: self.toggle_trajectory,
        }
    }

    /// Clear one-shot actions after a tick consumed them
    pub fn clear_one_shots(&mut self) {
        self.confirm = false;
        self.pause = false;
        self.restart = false;
        self.skip_level = false;
        self.toggle_trajectory = false;
    }
}
