use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rts_engine::{InputAction, InputSnapshot, InputSource, MenuKey, MouseButton, Position};
use serde::Deserialize;
use thiserror::Error;

/// Recorded input played back by the headless runner.
///
/// ```json
/// { "frames": [
///     { "repeat": 3, "click": { "button": "left", "x": 100.0, "y": 100.0 } },
///     { "menu_key": 1, "delta_millis": 50, "camera": ["up", "left"] }
/// ] }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputScript {
    #[serde(default)]
    pub frames: Vec<ScriptFrame>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptFrame {
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    #[serde(default)]
    pub delta_millis: Option<u32>,
    #[serde(default)]
    pub click: Option<ScriptClick>,
    #[serde(default)]
    pub menu_key: Option<u8>,
    #[serde(default)]
    pub camera: Vec<PanDirection>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptClick {
    pub button: MouseButton,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanDirection {
    Up,
    Down,
    Left,
    Right,
}

impl PanDirection {
    fn action(self) -> InputAction {
        match self {
            PanDirection::Up => InputAction::CameraUp,
            PanDirection::Down => InputAction::CameraDown,
            PanDirection::Left => InputAction::CameraLeft,
            PanDirection::Right => InputAction::CameraRight,
        }
    }
}

fn default_repeat() -> u32 {
    1
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read input script {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse input script {origin} at {json_path}: {source}")]
    Parse {
        origin: String,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("input script {origin}: frame {frame} uses menu key {key}; expected 1, 2 or 3")]
    InvalidMenuKey { origin: String, frame: usize, key: u8 },
}

impl InputScript {
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let raw = fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw, &path.display().to_string())
    }

    /// `origin` names the script in error messages.
    pub fn parse(raw: &str, origin: &str) -> Result<Self, ScriptError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let script: InputScript = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|error| {
                let json_path = error.path().to_string();
                ScriptError::Parse {
                    origin: origin.to_string(),
                    json_path,
                    source: error.into_inner(),
                }
            })?;

        for (frame, entry) in script.frames.iter().enumerate() {
            if let Some(key) = entry.menu_key {
                if MenuKey::from_number(key).is_none() {
                    return Err(ScriptError::InvalidMenuKey {
                        origin: origin.to_string(),
                        frame,
                        key,
                    });
                }
            }
        }
        Ok(script)
    }

    /// Ticks covered by the script before it falls back to idle input.
    pub fn total_ticks(&self) -> u64 {
        self.frames
            .iter()
            .map(|frame| u64::from(frame.repeat))
            .sum()
    }
}

impl ScriptFrame {
    fn to_snapshot(&self, default_delta_millis: u32) -> InputSnapshot {
        let mut snapshot = InputSnapshot::idle(self.delta_millis.unwrap_or(default_delta_millis));
        for direction in &self.camera {
            snapshot = snapshot.with_action_down(direction.action(), true);
        }
        if let Some(click) = self.click {
            snapshot = snapshot.with_click(click.button, Position::new(click.x, click.y));
        }
        snapshot.with_menu_key(self.menu_key.and_then(MenuKey::from_number))
    }
}

/// Feeds an [`InputScript`] frame by frame, then idle ticks once it runs out.
#[derive(Debug)]
pub struct ScriptPlayer {
    script: InputScript,
    frame: usize,
    repeats_left: u32,
}

impl ScriptPlayer {
    pub fn new(script: InputScript) -> Self {
        let repeats_left = script.frames.first().map_or(0, |frame| frame.repeat);
        Self {
            script,
            frame: 0,
            repeats_left,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.frame >= self.script.frames.len()
    }

    fn advance_to_playable_frame(&mut self) {
        while self.repeats_left == 0 && !self.is_finished() {
            self.frame += 1;
            self.repeats_left = self
                .script
                .frames
                .get(self.frame)
                .map_or(0, |frame| frame.repeat);
        }
    }
}

impl InputSource for ScriptPlayer {
    fn next_input(&mut self, _tick: u64, default_delta_millis: u32) -> InputSnapshot {
        self.advance_to_playable_frame();
        let Some(frame) = self.script.frames.get(self.frame) else {
            return InputSnapshot::idle(default_delta_millis);
        };
        self.repeats_left -= 1;
        frame.to_snapshot(default_delta_millis)
    }
}
