mod transform;

pub use transform::{map_to_screen, screen_to_map, Viewport};
