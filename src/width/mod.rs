//! Display width helpers shared by the preview renderer.

mod utils;

pub use utils::{display_width, truncate_to_width};
