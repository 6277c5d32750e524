use serde::{Deserialize, Serialize};

use super::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputAction {
    CameraUp,
    CameraDown,
    CameraLeft,
    CameraRight,
}

const ACTION_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::CameraUp => 0,
            InputAction::CameraDown => 1,
            InputAction::CameraLeft => 2,
            InputAction::CameraRight => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
}

/// A single mouse press, already translated into map space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Click {
    pub button: MouseButton,
    pub position: Position,
}

/// Numbered menu keys. The index doubles as the menu slot number shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MenuKey {
    One,
    Two,
    Three,
}

impl MenuKey {
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            _ => None,
        }
    }

    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Zero-based slot into a menu list.
    pub const fn slot(self) -> usize {
        self.number() as usize - 1
    }
}

/// Everything the simulation consumes for one tick.
///
/// Camera actions are "held" state; the click and menu key are edge-triggered and
/// hold at most one event per tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    delta_millis: u32,
    actions: ActionStates,
    click: Option<Click>,
    menu_key: Option<MenuKey>,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn idle(delta_millis: u32) -> Self {
        Self::default().with_delta_millis(delta_millis)
    }

    pub fn with_delta_millis(mut self, delta_millis: u32) -> Self {
        self.delta_millis = delta_millis;
        self
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_click(mut self, button: MouseButton, position: Position) -> Self {
        self.click = Some(Click { button, position });
        self
    }

    pub fn with_left_click(self, position: Position) -> Self {
        self.with_click(MouseButton::Left, position)
    }

    pub fn with_right_click(self, position: Position) -> Self {
        self.with_click(MouseButton::Right, position)
    }

    pub fn with_menu_key(mut self, menu_key: Option<MenuKey>) -> Self {
        self.menu_key = menu_key;
        self
    }

    pub fn delta_millis(&self) -> u32 {
        self.delta_millis
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn click(&self) -> Option<Click> {
        self.click
    }

    pub fn left_click(&self) -> Option<Position> {
        self.click_of(MouseButton::Left)
    }

    pub fn right_click(&self) -> Option<Position> {
        self.click_of(MouseButton::Right)
    }

    pub fn menu_key(&self) -> Option<MenuKey> {
        self.menu_key
    }

    fn click_of(&self, button: MouseButton) -> Option<Position> {
        self.click
            .filter(|click| click.button == button)
            .map(|click| click.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_key_numbers_round_trip_only_for_known_keys() {
        assert_eq!(MenuKey::from_number(2), Some(MenuKey::Two));
        assert_eq!(MenuKey::Three.slot(), 2);
        assert_eq!(MenuKey::from_number(0), None);
        assert_eq!(MenuKey::from_number(4), None);
    }

    #[test]
    fn click_accessors_filter_by_button() {
        let snapshot = InputSnapshot::idle(16).with_right_click(Position::new(3.0, 4.0));
        assert_eq!(snapshot.left_click(), None);
        assert_eq!(snapshot.right_click(), Some(Position::new(3.0, 4.0)));
        assert_eq!(snapshot.delta_millis(), 16);
    }

    #[test]
    fn held_actions_are_tracked_independently() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::CameraLeft, true)
            .with_action_down(InputAction::CameraUp, true)
            .with_action_down(InputAction::CameraUp, false);
        assert!(snapshot.is_down(InputAction::CameraLeft));
        assert!(!snapshot.is_down(InputAction::CameraUp));
    }
}
