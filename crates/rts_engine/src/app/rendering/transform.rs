use crate::app::Position;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn half_width(&self) -> f64 {
        f64::from(self.width) / 2.0
    }

    pub fn half_height(&self) -> f64 {
        f64::from(self.height) / 2.0
    }
}

/// Map space to screen space for a viewport whose top-left corner sits at `offset`.
/// No scaling or rotation is involved.
pub fn map_to_screen(map: Position, offset: Position) -> Position {
    Position::new(map.x - offset.x, map.y - offset.y)
}

pub fn screen_to_map(screen: Position, offset: Position) -> Position {
    Position::new(screen.x + offset.x, screen.y + offset.y)
}
