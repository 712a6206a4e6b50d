use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::geometry::{Insets, Size};

use super::resolve::{ResolvedLayout, Resolver, ResolverConfig};
use super::rules::{LayoutDirection, Rule, Verb};

/// Arena index of an element inside its [`RelativeLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(usize);

impl ElementId {
    pub const fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Intrinsic extent of an element along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDimension", into = "RawDimension")]
pub enum Dimension {
    Exact(i32),
    /// Fill whatever the container leaves available.
    MatchParent,
}

impl Dimension {
    pub const MATCH_PARENT: i32 = -1;
    pub const WRAP_CONTENT: i32 = -2;

    /// Convert a raw toolkit dimension. Content wrapping needs the
    /// measurement pass, so it is rejected here.
    pub fn from_raw(raw: i32) -> Result<Self> {
        match raw {
            Self::MATCH_PARENT => Ok(Dimension::MatchParent),
            value if value >= 0 => Ok(Dimension::Exact(value)),
            other => Err(LayoutError::InvalidDimension(other)),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawDimension {
    Units(i32),
    Keyword(String),
}

impl TryFrom<RawDimension> for Dimension {
    type Error = String;

    fn try_from(raw: RawDimension) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawDimension::Units(value) => Dimension::from_raw(value).map_err(|e| e.to_string()),
            RawDimension::Keyword(word) => match word.as_str() {
                "match_parent" | "fill_parent" => Ok(Dimension::MatchParent),
                other => Err(format!("unknown dimension keyword `{other}`")),
            },
        }
    }
}

impl From<Dimension> for RawDimension {
    fn from(value: Dimension) -> Self {
        match value {
            Dimension::Exact(units) => RawDimension::Units(units),
            Dimension::MatchParent => RawDimension::Keyword("match_parent".to_string()),
        }
    }
}

/// Whether an element is drawn and whether it takes part in anchoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Visible,
    /// Laid out but not drawn.
    Invisible,
    /// Not laid out; siblings anchored on it fall through to its own anchors.
    Gone,
}

/// Per-element sizing, margins and rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutParams {
    pub width: Dimension,
    pub height: Dimension,
    pub margin: Insets,
    pub visibility: Visibility,
    /// Treat a rule whose anchor is missing (gone) as anchored on the parent.
    pub align_with_parent_if_missing: bool,
    rules: Vec<Rule>,
}

impl LayoutParams {
    pub fn new(width: Dimension, height: Dimension) -> Self {
        Self {
            width,
            height,
            margin: Insets::ZERO,
            visibility: Visibility::Visible,
            align_with_parent_if_missing: false,
            rules: Vec::new(),
        }
    }

    pub fn exact(width: i32, height: i32) -> Self {
        Self::new(Dimension::Exact(width), Dimension::Exact(height))
    }

    pub fn from_raw(width: i32, height: i32) -> Result<Self> {
        Ok(Self::new(
            Dimension::from_raw(width)?,
            Dimension::from_raw(height)?,
        ))
    }

    pub fn with_margin(mut self, margin: Insets) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn align_with_parent_if_missing(mut self, enabled: bool) -> Self {
        self.align_with_parent_if_missing = enabled;
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.add_rule(rule);
        self
    }

    /// Attach a rule. A verb is kept at most once: re-adding it replaces the
    /// old rule and moves it to the end of the declaration order.
    pub fn add_rule(&mut self, rule: Rule) {
        self.remove_rule(rule.verb());
        self.rules.push(rule);
    }

    /// Apply a toolkit-style `(verb code, anchor)` pair. A parent verb with
    /// anchor `0` removes that verb instead of adding it.
    pub fn add_rule_code(&mut self, code: i32, anchor: i32) -> Result<()> {
        match Rule::from_code(code, anchor)? {
            Some(rule) => self.add_rule(rule),
            None => {
                self.remove_rule(Verb::from_code(code)?);
            }
        }
        Ok(())
    }

    /// Drop the rule using `verb`, returning it if one was present.
    pub fn remove_rule(&mut self, verb: Verb) -> Option<Rule> {
        let pos = self.rules.iter().position(|r| r.verb() == verb)?;
        Some(self.rules.remove(pos))
    }

    pub fn rule(&self, verb: Verb) -> Option<&Rule> {
        self.rules.iter().find(|r| r.verb() == verb)
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// A positionable child of a [`RelativeLayout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: Option<String>,
    pub params: LayoutParams,
}

/// Container owning an ordered list of elements and their rules.
#[derive(Debug, Clone)]
pub struct RelativeLayout {
    size: Size,
    padding: Insets,
    direction: LayoutDirection,
    elements: Vec<Element>,
}

impl RelativeLayout {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            padding: Insets::ZERO,
            direction: LayoutDirection::Ltr,
            elements: Vec::new(),
        }
    }

    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_direction(mut self, direction: LayoutDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn padding(&self) -> Insets {
        self.padding
    }

    pub fn direction(&self) -> LayoutDirection {
        self.direction
    }

    /// Append an unnamed element.
    pub fn add(&mut self, params: LayoutParams) -> ElementId {
        self.elements.push(Element { name: None, params });
        ElementId(self.elements.len() - 1)
    }

    /// Append a named element. Names must be unique within the container.
    pub fn add_named(&mut self, name: impl Into<String>, params: LayoutParams) -> Result<ElementId> {
        let name = name.into();
        if self.find(&name).is_some() {
            return Err(LayoutError::DuplicateElement(name));
        }
        self.elements.push(Element {
            name: Some(name),
            params,
        });
        Ok(ElementId(self.elements.len() - 1))
    }

    pub fn add_rule(&mut self, id: ElementId, rule: Rule) -> Result<()> {
        self.params_mut(id)?.add_rule(rule);
        Ok(())
    }

    pub fn remove_rule(&mut self, id: ElementId, verb: Verb) -> Result<Option<Rule>> {
        Ok(self.params_mut(id)?.remove_rule(verb))
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    pub fn params_mut(&mut self, id: ElementId) -> Result<&mut LayoutParams> {
        self.elements
            .get_mut(id.0)
            .map(|element| &mut element.params)
            .ok_or(LayoutError::UnknownElement(id))
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        (0..self.elements.len()).map(ElementId)
    }

    pub fn find(&self, name: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .position(|e| e.name.as_deref() == Some(name))
            .map(ElementId)
    }

    /// Human-readable label used in diagnostics.
    pub fn label(&self, id: ElementId) -> String {
        self.element(id)
            .and_then(|e| e.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn rule_count(&self) -> usize {
        self.elements.iter().map(|e| e.params.rules().len()).sum()
    }

    /// Resolve every element's frame with the default resolver settings.
    pub fn resolve(&self) -> Result<ResolvedLayout> {
        Resolver::default().resolve(self)
    }

    pub fn resolve_with(&self, config: &ResolverConfig) -> Result<ResolvedLayout> {
        Resolver::new(config.clone()).resolve(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::rules::{codes, ParentVerb, RelativeVerb};

    #[test]
    fn dimension_from_raw_maps_toolkit_constants() {
        assert_eq!(Dimension::from_raw(-1).unwrap(), Dimension::MatchParent);
        assert_eq!(Dimension::from_raw(40).unwrap(), Dimension::Exact(40));
        assert!(matches!(
            Dimension::from_raw(Dimension::WRAP_CONTENT),
            Err(LayoutError::InvalidDimension(-2))
        ));
    }

    #[test]
    fn dimension_deserializes_from_units_or_keyword() {
        let exact: Dimension = serde_json::from_str("12").unwrap();
        assert_eq!(exact, Dimension::Exact(12));
        let fill: Dimension = serde_json::from_str("\"match_parent\"").unwrap();
        assert_eq!(fill, Dimension::MatchParent);
        assert!(serde_json::from_str::<Dimension>("\"wrap_content\"").is_err());
    }

    #[test]
    fn add_rule_replaces_same_verb_and_moves_it_last() {
        let a = ElementId::from_index(0);
        let b = ElementId::from_index(1);
        let mut params = LayoutParams::exact(10, 10)
            .with_rule(Rule::Relative(RelativeVerb::Below, a))
            .with_rule(Rule::Parent(ParentVerb::CenterHorizontal));

        params.add_rule(Rule::Relative(RelativeVerb::Below, b));

        assert_eq!(
            params.rules(),
            &[
                Rule::Parent(ParentVerb::CenterHorizontal),
                Rule::Relative(RelativeVerb::Below, b),
            ]
        );
    }

    #[test]
    fn remove_rule_returns_removed_rule() {
        let mut params =
            LayoutParams::exact(1, 1).with_rule(Rule::Parent(ParentVerb::AlignParentTop));
        let removed = params.remove_rule(Verb::Parent(ParentVerb::AlignParentTop));
        assert_eq!(removed, Some(Rule::Parent(ParentVerb::AlignParentTop)));
        assert!(params.rules().is_empty());
        assert_eq!(params.remove_rule(Verb::Parent(ParentVerb::AlignParentTop)), None);
    }

    #[test]
    fn rule_codes_add_and_unset_like_the_toolkit() {
        let mut params = LayoutParams::exact(1, 1);
        params.add_rule_code(codes::CENTER_IN_PARENT, codes::TRUE).unwrap();
        params.add_rule_code(codes::BELOW, 0).unwrap();
        assert_eq!(params.rules().len(), 2);

        params.add_rule_code(codes::CENTER_IN_PARENT, codes::FALSE).unwrap();
        assert_eq!(
            params.rules(),
            &[Rule::Relative(RelativeVerb::Below, ElementId::from_index(0))]
        );
        assert!(params.add_rule_code(codes::BELOW, codes::TRUE).is_err());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut layout = RelativeLayout::new(Size::new(10, 10));
        layout.add_named("title", LayoutParams::exact(1, 1)).unwrap();
        let err = layout
            .add_named("title", LayoutParams::exact(1, 1))
            .unwrap_err();
        assert!(matches!(err, LayoutError::DuplicateElement(name) if name == "title"));
    }

    #[test]
    fn add_rule_on_foreign_id_fails() {
        let mut layout = RelativeLayout::new(Size::new(10, 10));
        let err = layout
            .add_rule(
                ElementId::from_index(3),
                Rule::Parent(ParentVerb::CenterInParent),
            )
            .unwrap_err();
        assert!(matches!(err, LayoutError::UnknownElement(id) if id.index() == 3));
    }

    #[test]
    fn labels_fall_back_to_index() {
        let mut layout = RelativeLayout::new(Size::new(10, 10));
        let anon = layout.add(LayoutParams::exact(1, 1));
        let named = layout.add_named("ok", LayoutParams::exact(1, 1)).unwrap();
        assert_eq!(layout.label(anon), "#0");
        assert_eq!(layout.label(named), "ok");
        assert_eq!(layout.rule_count(), 0);
    }
}
