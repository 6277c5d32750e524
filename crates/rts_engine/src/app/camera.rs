use super::geometry::Position;
use super::input::{InputAction, InputSnapshot};
use super::rendering::{map_to_screen, screen_to_map, Viewport};
use super::scene::EntityId;

pub const CAMERA_MANUAL_SPEED_PX_PER_MS: f64 = 0.4;

/// Manual pan directions in priority order; only the first held one applies per tick.
const PAN_PRIORITY: [InputAction; 4] = [
    InputAction::CameraUp,
    InputAction::CameraDown,
    InputAction::CameraLeft,
    InputAction::CameraRight,
];

/// Viewport offset tracker.
///
/// `left`/`top` is the map position of the viewport's top-left corner and always stays
/// inside `[0, map_extent - viewport_extent]` (collapsed to 0 when the map is smaller
/// than the viewport).
#[derive(Debug, Clone)]
pub struct Camera {
    left: f64,
    top: f64,
    viewport: Viewport,
    map_width: f64,
    map_height: f64,
    following: Option<EntityId>,
}

impl Camera {
    pub fn new(viewport: Viewport, map_width: f64, map_height: f64) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            viewport,
            map_width,
            map_height,
            following: None,
        }
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn offset(&self) -> Position {
        Position::new(self.left, self.top)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn following(&self) -> Option<EntityId> {
        self.following
    }

    pub fn follow(&mut self, id: EntityId) {
        self.following = Some(id);
    }

    pub fn stop_following(&mut self) {
        self.following = None;
    }

    /// Applies held pan keys, then re-centres on the followed entity.
    ///
    /// `followed_position` is the current position of [`Camera::following`], resolved by
    /// the caller; `None` while following means the entity is gone and following stops.
    /// Returns `true` when the camera was moved manually this tick.
    pub fn update(&mut self, input: &InputSnapshot, followed_position: Option<Position>) -> bool {
        let step = f64::from(input.delta_millis()) * CAMERA_MANUAL_SPEED_PX_PER_MS;
        let pan = PAN_PRIORITY
            .into_iter()
            .find(|action| input.is_down(*action));

        if let Some(action) = pan {
            match action {
                InputAction::CameraUp => self.top -= step,
                InputAction::CameraDown => self.top += step,
                InputAction::CameraLeft => self.left -= step,
                InputAction::CameraRight => self.left += step,
            }
            self.clamp();
            self.following = None;
            return true;
        }

        if self.following.is_some() {
            match followed_position {
                Some(position) => self.center_on(position),
                None => self.following = None,
            }
        }
        false
    }

    /// Centres the viewport on `position`, pinning against the nearer map edge.
    pub fn center_on(&mut self, position: Position) {
        self.left = position.x - self.viewport.half_width();
        self.top = position.y - self.viewport.half_height();
        self.clamp();
    }

    pub fn screen_to_map(&self, screen: Position) -> Position {
        screen_to_map(screen, self.offset())
    }

    pub fn map_to_screen(&self, map: Position) -> Position {
        map_to_screen(map, self.offset())
    }

    fn max_left(&self) -> f64 {
        (self.map_width - f64::from(self.viewport.width)).max(0.0)
    }

    fn max_top(&self) -> f64 {
        (self.map_height - f64::from(self.viewport.height)).max(0.0)
    }

    fn clamp(&mut self) {
        self.left = self.left.clamp(0.0, self.max_left());
        self.top = self.top.clamp(0.0, self.max_top());
    }
}
