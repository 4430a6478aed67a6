pub mod map_view;
pub mod markers;
pub mod recording;
pub mod renderer;

pub use map_view::*;
pub use markers::*;
pub use renderer::*;
