//! Frame bookkeeping across resolution passes.

mod core;

pub use self::core::{FrameRegistry, FrameState};
