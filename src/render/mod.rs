pub mod canvas;
pub mod skeleton;

pub use canvas::Canvas;
pub use skeleton::{Overlay, SKELETON_CONNECTIONS};
