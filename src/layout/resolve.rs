//! Constraint resolution.
//!
//! Elements are visited in dependency order. Each rule writes one edge (or
//! marks an axis as centered); whatever an axis still lacks afterwards is
//! derived from the element's intrinsic size:
//!
//! * both edges anchored: the element spans them, never with negative size;
//! * one edge anchored: the other edge is `anchored ± size`, and a
//!   `MatchParent` size reaches the container's inner edge minus margin;
//! * no edge anchored, centered: `start = (extent - size) / 2` with integer
//!   division truncating toward zero; a `MatchParent` size is the inner
//!   extent minus margins, centered the same way;
//! * no edge anchored: `start = padding + margin`.
//!
//! When several rules write the same edge, the later one wins.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::json;

use crate::error::{LayoutError, Result};
use crate::geometry::{Frame, Insets, Size};
use crate::logging::{LogLevel, Logger, LoggingResult, event_with_fields, json_kv, json_str};
use crate::metrics::ResolverMetrics;

use super::core::{Dimension, Element, ElementId, RelativeLayout, Visibility};
use super::graph::DependencyGraph;
use super::rules::{ParentVerb, RelativeVerb, Rule};

/// Knobs for a resolver instance.
#[derive(Clone)]
pub struct ResolverConfig {
    /// Optional structured logger receiving one event per pass.
    pub logger: Option<Logger>,
    /// Shared metrics accumulator.
    pub metrics: Option<Arc<Mutex<ResolverMetrics>>>,
    /// Target field used for emitted log events.
    pub log_target: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            logger: None,
            metrics: None,
            log_target: "relative_layout::resolver".to_string(),
        }
    }
}

impl ResolverConfig {
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(ResolverMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<ResolverMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }

    /// Emit the current metrics snapshot through the logger. Does nothing
    /// unless both a logger and metrics are configured.
    pub fn log_metrics(&self) -> LoggingResult<()> {
        let (Some(logger), Some(metrics)) = (&self.logger, &self.metrics) else {
            return Ok(());
        };
        let snapshot = match metrics.lock() {
            Ok(guard) => guard.snapshot(),
            Err(poisoned) => poisoned.into_inner().snapshot(),
        };
        logger.log_event(snapshot.to_log_event(&self.log_target))
    }
}

/// Resolves a [`RelativeLayout`] into frames. Holds no per-pass state, so
/// one resolver may serve any number of containers.
#[derive(Clone, Default)]
pub struct Resolver {
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn resolve(&self, layout: &RelativeLayout) -> Result<ResolvedLayout> {
        self.log(
            LogLevel::Debug,
            "resolve.start",
            vec![
                json_kv("elements", json!(layout.len())),
                json_kv("width", json!(layout.size().width)),
                json_kv("height", json!(layout.size().height)),
            ],
        );

        let outcome = solve(layout);

        match &outcome {
            Ok(resolved) => {
                self.record(|m| m.record_pass(layout.len(), layout.rule_count()));
                self.log(
                    LogLevel::Info,
                    "resolve.ok",
                    vec![
                        json_kv("elements", json!(layout.len())),
                        json_kv("rules", json!(layout.rule_count())),
                        json_str("digest", resolved.digest().to_hex().to_string()),
                    ],
                );
            }
            Err(err) => {
                self.record(|m| m.record_failure());
                self.log(
                    LogLevel::Warn,
                    "resolve.failed",
                    vec![
                        json_str("error", err.to_string()),
                        json_kv("offenders", json!(err.offenders())),
                    ],
                );
            }
        }

        outcome
    }

    fn record(&self, update: impl FnOnce(&mut ResolverMetrics)) {
        if let Some(metrics) = &self.config.metrics {
            if let Ok(mut guard) = metrics.lock() {
                update(&mut guard);
            }
        }
    }

    fn log(&self, level: LogLevel, message: &str, fields: Vec<(String, serde_json::Value)>) {
        if let Some(logger) = &self.config.logger {
            let event = event_with_fields(level, &self.config.log_target, message, fields);
            let _ = logger.log_event(event);
        }
    }
}

fn solve(layout: &RelativeLayout) -> Result<ResolvedLayout> {
    let graph = DependencyGraph::build(layout)?;
    let order = graph.topological_order().map_err(|members| {
        LayoutError::CyclicConstraint {
            members: members
                .into_iter()
                .map(|idx| layout.label(ElementId::from_index(idx)))
                .collect(),
        }
    })?;

    let bounds = Bounds {
        size: layout.size(),
        padding: layout.padding(),
    };
    let mut frames = vec![Frame::EMPTY; layout.len()];

    for &idx in &order {
        let frame = place(layout, &layout.elements()[idx], bounds, &frames);
        frames[idx] = frame;
    }

    let elements = layout.elements();
    let reported = frames
        .iter()
        .zip(elements)
        .map(|(frame, element)| match element.params.visibility {
            Visibility::Gone => Frame::EMPTY,
            _ => *frame,
        })
        .collect();

    Ok(ResolvedLayout {
        frames: reported,
        names: elements.iter().map(|e| e.name.clone()).collect(),
        visibility: elements.iter().map(|e| e.params.visibility).collect(),
        order: order.into_iter().map(ElementId::from_index).collect(),
    })
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    size: Size,
    padding: Insets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Left,
    Top,
    Right,
    Bottom,
}

impl Bounds {
    /// Inner container edge offset by the element's margin on that side.
    fn parent_edge(&self, edge: Edge, margin: Insets) -> i32 {
        match edge {
            Edge::Left => self.padding.left.saturating_add(margin.left),
            Edge::Top => self.padding.top.saturating_add(margin.top),
            Edge::Right => self
                .size
                .width
                .saturating_sub(self.padding.right)
                .saturating_sub(margin.right),
            Edge::Bottom => self
                .size
                .height
                .saturating_sub(self.padding.bottom)
                .saturating_sub(margin.bottom),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct AxisSpan {
    start: Option<i32>,
    end: Option<i32>,
    centered: bool,
}

#[derive(Debug, Default)]
struct Spans {
    horizontal: AxisSpan,
    vertical: AxisSpan,
}

impl Spans {
    fn set(&mut self, edge: Edge, value: i32) {
        match edge {
            Edge::Left => self.horizontal.start = Some(value),
            Edge::Right => self.horizontal.end = Some(value),
            Edge::Top => self.vertical.start = Some(value),
            Edge::Bottom => self.vertical.end = Some(value),
        }
    }
}

fn place(layout: &RelativeLayout, element: &Element, bounds: Bounds, frames: &[Frame]) -> Frame {
    let params = &element.params;
    let margin = params.margin;
    let direction = layout.direction();
    let mut spans = Spans::default();

    for rule in params.rules() {
        match *rule {
            Rule::Relative(verb, anchor) => {
                let verb = verb.absolute(direction);
                let edge = written_edge(verb);
                match visible_anchor(layout, verb, anchor) {
                    Some(anchor) => {
                        spans.set(edge, relative_edge(verb, frames[anchor.index()], margin));
                    }
                    None if params.align_with_parent_if_missing => {
                        spans.set(edge, bounds.parent_edge(edge, margin));
                    }
                    None => {}
                }
            }
            // Start/end parent verbs arrive already mapped by `absolute`.
            Rule::Parent(verb) => match verb.absolute(direction) {
                ParentVerb::AlignParentLeft | ParentVerb::AlignParentStart => {
                    spans.set(Edge::Left, bounds.parent_edge(Edge::Left, margin))
                }
                ParentVerb::AlignParentTop => {
                    spans.set(Edge::Top, bounds.parent_edge(Edge::Top, margin))
                }
                ParentVerb::AlignParentRight | ParentVerb::AlignParentEnd => {
                    spans.set(Edge::Right, bounds.parent_edge(Edge::Right, margin))
                }
                ParentVerb::AlignParentBottom => {
                    spans.set(Edge::Bottom, bounds.parent_edge(Edge::Bottom, margin))
                }
                ParentVerb::CenterInParent => {
                    spans.horizontal.centered = true;
                    spans.vertical.centered = true;
                }
                ParentVerb::CenterHorizontal => spans.horizontal.centered = true,
                ParentVerb::CenterVertical => spans.vertical.centered = true,
            },
        }
    }

    let (left, right) = settle(
        spans.horizontal,
        params.width,
        bounds.size.width,
        (bounds.padding.left, bounds.padding.right),
        (margin.left, margin.right),
    );
    let (top, bottom) = settle(
        spans.vertical,
        params.height,
        bounds.size.height,
        (bounds.padding.top, bounds.padding.bottom),
        (margin.top, margin.bottom),
    );

    Frame::new(left, top, right, bottom)
}

/// Start/end verbs are expected to be mapped by `absolute` already; they
/// are grouped with their left-to-right counterparts.
fn written_edge(verb: RelativeVerb) -> Edge {
    match verb {
        RelativeVerb::Below | RelativeVerb::AlignTop => Edge::Top,
        RelativeVerb::Above | RelativeVerb::AlignBottom => Edge::Bottom,
        RelativeVerb::RightOf
        | RelativeVerb::EndOf
        | RelativeVerb::AlignLeft
        | RelativeVerb::AlignStart => Edge::Left,
        RelativeVerb::LeftOf
        | RelativeVerb::StartOf
        | RelativeVerb::AlignRight
        | RelativeVerb::AlignEnd => Edge::Right,
    }
}

/// Directional verbs face the anchor's opposite edge, alignment verbs its
/// same edge. Both are pushed inward by this element's margin.
fn relative_edge(verb: RelativeVerb, anchor: Frame, margin: Insets) -> i32 {
    match verb {
        RelativeVerb::Below => anchor.bottom.saturating_add(margin.top),
        RelativeVerb::Above => anchor.top.saturating_sub(margin.bottom),
        RelativeVerb::RightOf | RelativeVerb::EndOf => anchor.right.saturating_add(margin.left),
        RelativeVerb::LeftOf | RelativeVerb::StartOf => anchor.left.saturating_sub(margin.right),
        RelativeVerb::AlignTop => anchor.top.saturating_add(margin.top),
        RelativeVerb::AlignBottom => anchor.bottom.saturating_sub(margin.bottom),
        RelativeVerb::AlignLeft | RelativeVerb::AlignStart => {
            anchor.left.saturating_add(margin.left)
        }
        RelativeVerb::AlignRight | RelativeVerb::AlignEnd => {
            anchor.right.saturating_sub(margin.right)
        }
    }
}

/// Follow gone anchors through their own rule with the same verb until a
/// laid-out element is found. The graph is acyclic by now, so the walk ends
/// within `layout.len()` steps.
fn visible_anchor(layout: &RelativeLayout, verb: RelativeVerb, anchor: ElementId) -> Option<ElementId> {
    let direction = layout.direction();
    let mut current = anchor;

    for _ in 0..=layout.len() {
        let element = layout.element(current)?;
        if element.params.visibility != Visibility::Gone {
            return Some(current);
        }
        current = element.params.rules().iter().rev().find_map(|rule| match *rule {
            Rule::Relative(next_verb, next) if next_verb.absolute(direction) == verb => {
                Some(next)
            }
            _ => None,
        })?;
    }

    None
}

fn settle(
    span: AxisSpan,
    size: Dimension,
    extent: i32,
    padding: (i32, i32),
    margin: (i32, i32),
) -> (i32, i32) {
    let inner_start = padding.0.saturating_add(margin.0);
    let inner_end = extent.saturating_sub(padding.1).saturating_sub(margin.1);

    match (span.start, span.end) {
        (Some(start), Some(end)) => (start, end.max(start)),
        (Some(start), None) => match size {
            Dimension::Exact(len) => (start, start.saturating_add(len)),
            Dimension::MatchParent => (start, inner_end.max(start)),
        },
        (None, Some(end)) => match size {
            Dimension::Exact(len) => (end.saturating_sub(len), end),
            Dimension::MatchParent => (inner_start.min(end), end),
        },
        (None, None) if span.centered => match size {
            Dimension::Exact(len) => {
                let start = extent.saturating_sub(len) / 2;
                (start, start.saturating_add(len))
            }
            Dimension::MatchParent => {
                let len = inner_end.saturating_sub(inner_start).max(0);
                let start = extent.saturating_sub(len) / 2;
                (start, start.saturating_add(len))
            }
        },
        (None, None) => match size {
            Dimension::Exact(len) => (inner_start, inner_start.saturating_add(len)),
            Dimension::MatchParent => (inner_start, inner_end.max(inner_start)),
        },
    }
}

/// Output of one resolution pass: one frame per element, indexed by
/// [`ElementId`]. Gone elements report [`Frame::EMPTY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLayout {
    frames: Vec<Frame>,
    names: Vec<Option<String>>,
    visibility: Vec<Visibility>,
    order: Vec<ElementId>,
}

#[derive(Serialize)]
struct FrameRecord<'a> {
    id: ElementId,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(flatten)]
    frame: Frame,
}

impl ResolvedLayout {
    pub fn frame(&self, id: ElementId) -> Option<Frame> {
        self.frames.get(id.index()).copied()
    }

    pub fn frame_by_name(&self, name: &str) -> Option<Frame> {
        self.names
            .iter()
            .position(|n| n.as_deref() == Some(name))
            .map(|idx| self.frames[idx])
    }

    pub fn name(&self, id: ElementId) -> Option<&str> {
        self.names.get(id.index()).and_then(|n| n.as_deref())
    }

    /// Label used in diagnostics: the name, or `#index` for unnamed elements.
    pub fn label(&self, id: ElementId) -> String {
        self.name(id)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }

    pub fn visibility(&self, id: ElementId) -> Option<Visibility> {
        self.visibility.get(id.index()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, Frame)> + '_ {
        self.frames
            .iter()
            .enumerate()
            .map(|(idx, frame)| (ElementId::from_index(idx), *frame))
    }

    /// Order in which the elements were resolved.
    pub fn resolution_order(&self) -> &[ElementId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Topmost visible element containing the point. Later elements are
    /// stacked above earlier ones.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<ElementId> {
        self.frames
            .iter()
            .enumerate()
            .rev()
            .find(|(idx, frame)| {
                self.visibility[*idx] == Visibility::Visible && frame.contains(x, y)
            })
            .map(|(idx, _)| ElementId::from_index(idx))
    }

    /// blake3 digest of the frame set in element order.
    pub fn digest(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.frames.len() as u64).to_le_bytes());
        for frame in &self.frames {
            hasher.update(&frame.to_le_bytes());
        }
        hasher.finalize()
    }

    pub fn to_json(&self) -> Result<String> {
        let records: Vec<FrameRecord<'_>> = self
            .frames
            .iter()
            .enumerate()
            .map(|(idx, frame)| FrameRecord {
                id: ElementId::from_index(idx),
                name: self.names[idx].as_deref(),
                frame: *frame,
            })
            .collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }
}
