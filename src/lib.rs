//! Relative-positioning layout engine.
//!
//! Elements declare rules against the parent container or against siblings
//! (`Below`, `AlignParentBottom`, `CenterInParent`, ...). The resolver orders
//! elements by their anchor dependencies and computes one [`Frame`] per
//! element, or reports a [`LayoutError::DanglingReference`] /
//! [`LayoutError::CyclicConstraint`] naming the offending elements.

pub mod error;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod render;
pub mod width;

pub use error::{LayoutError, Result};
pub use geometry::{Frame, Insets, Size};
pub use layout::{
    Anchor, Dimension, Element, ElementId, LayoutDirection, LayoutDocument, LayoutParams,
    ParentVerb, RelativeLayout, RelativeVerb, ResolvedLayout, Resolver, ResolverConfig, Rule, Verb,
    Visibility,
};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink, NullSink, WriterSink,
};
pub use metrics::{MetricSnapshot, ResolverMetrics};
pub use registry::{FrameRegistry, FrameState};
pub use render::{FramePreview, PreviewSettings};
pub use width::display_width;
