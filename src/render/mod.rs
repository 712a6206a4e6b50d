//! Text previews of resolved layouts.

mod core;

pub use self::core::{FramePreview, PreviewSettings};
