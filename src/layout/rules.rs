//! Rule vocabulary for relative positioning.
//!
//! A [`Rule`] is either anchored on a sibling element or on the parent
//! container. The two verb families are separate types so a sibling verb can
//! never be built without an anchor, and a parent verb never carries one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

use super::core::ElementId;

/// Integer verb codes used by the toolkit's `LayoutParams.addRule` API.
pub mod codes {
    pub const LEFT_OF: i32 = 0;
    pub const RIGHT_OF: i32 = 1;
    pub const ABOVE: i32 = 2;
    pub const BELOW: i32 = 3;
    pub const ALIGN_BASELINE: i32 = 4;
    pub const ALIGN_LEFT: i32 = 5;
    pub const ALIGN_TOP: i32 = 6;
    pub const ALIGN_RIGHT: i32 = 7;
    pub const ALIGN_BOTTOM: i32 = 8;
    pub const ALIGN_PARENT_LEFT: i32 = 9;
    pub const ALIGN_PARENT_TOP: i32 = 10;
    pub const ALIGN_PARENT_RIGHT: i32 = 11;
    pub const ALIGN_PARENT_BOTTOM: i32 = 12;
    pub const CENTER_IN_PARENT: i32 = 13;
    pub const CENTER_HORIZONTAL: i32 = 14;
    pub const CENTER_VERTICAL: i32 = 15;
    pub const START_OF: i32 = 16;
    pub const END_OF: i32 = 17;
    pub const ALIGN_START: i32 = 18;
    pub const ALIGN_END: i32 = 19;
    pub const ALIGN_PARENT_START: i32 = 20;
    pub const ALIGN_PARENT_END: i32 = 21;

    /// Anchor value the toolkit passes for parent verbs.
    pub const TRUE: i32 = -1;
    /// Anchor value that unsets a parent verb.
    pub const FALSE: i32 = 0;
}

/// Horizontal reading direction of a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutDirection {
    #[default]
    Ltr,
    Rtl,
}

/// Verbs that position an element against a sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeVerb {
    /// Top edge below the anchor's bottom edge.
    Below,
    /// Bottom edge above the anchor's top edge.
    Above,
    /// Right edge left of the anchor's left edge.
    LeftOf,
    /// Left edge right of the anchor's right edge.
    RightOf,
    StartOf,
    EndOf,
    AlignTop,
    AlignBottom,
    AlignLeft,
    AlignRight,
    AlignStart,
    AlignEnd,
}

impl RelativeVerb {
    pub fn code(self) -> i32 {
        match self {
            RelativeVerb::LeftOf => codes::LEFT_OF,
            RelativeVerb::RightOf => codes::RIGHT_OF,
            RelativeVerb::Above => codes::ABOVE,
            RelativeVerb::Below => codes::BELOW,
            RelativeVerb::AlignLeft => codes::ALIGN_LEFT,
            RelativeVerb::AlignTop => codes::ALIGN_TOP,
            RelativeVerb::AlignRight => codes::ALIGN_RIGHT,
            RelativeVerb::AlignBottom => codes::ALIGN_BOTTOM,
            RelativeVerb::StartOf => codes::START_OF,
            RelativeVerb::EndOf => codes::END_OF,
            RelativeVerb::AlignStart => codes::ALIGN_START,
            RelativeVerb::AlignEnd => codes::ALIGN_END,
        }
    }

    /// Map start/end verbs onto left/right for the given direction.
    pub fn absolute(self, direction: LayoutDirection) -> RelativeVerb {
        let rtl = direction == LayoutDirection::Rtl;
        match self {
            RelativeVerb::StartOf if rtl => RelativeVerb::RightOf,
            RelativeVerb::StartOf => RelativeVerb::LeftOf,
            RelativeVerb::EndOf if rtl => RelativeVerb::LeftOf,
            RelativeVerb::EndOf => RelativeVerb::RightOf,
            RelativeVerb::AlignStart if rtl => RelativeVerb::AlignRight,
            RelativeVerb::AlignStart => RelativeVerb::AlignLeft,
            RelativeVerb::AlignEnd if rtl => RelativeVerb::AlignLeft,
            RelativeVerb::AlignEnd => RelativeVerb::AlignRight,
            other => other,
        }
    }
}

/// Verbs that position an element against the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentVerb {
    AlignParentLeft,
    AlignParentTop,
    AlignParentRight,
    AlignParentBottom,
    AlignParentStart,
    AlignParentEnd,
    CenterInParent,
    CenterHorizontal,
    CenterVertical,
}

impl ParentVerb {
    pub fn code(self) -> i32 {
        match self {
            ParentVerb::AlignParentLeft => codes::ALIGN_PARENT_LEFT,
            ParentVerb::AlignParentTop => codes::ALIGN_PARENT_TOP,
            ParentVerb::AlignParentRight => codes::ALIGN_PARENT_RIGHT,
            ParentVerb::AlignParentBottom => codes::ALIGN_PARENT_BOTTOM,
            ParentVerb::CenterInParent => codes::CENTER_IN_PARENT,
            ParentVerb::CenterHorizontal => codes::CENTER_HORIZONTAL,
            ParentVerb::CenterVertical => codes::CENTER_VERTICAL,
            ParentVerb::AlignParentStart => codes::ALIGN_PARENT_START,
            ParentVerb::AlignParentEnd => codes::ALIGN_PARENT_END,
        }
    }

    pub fn absolute(self, direction: LayoutDirection) -> ParentVerb {
        let rtl = direction == LayoutDirection::Rtl;
        match self {
            ParentVerb::AlignParentStart if rtl => ParentVerb::AlignParentRight,
            ParentVerb::AlignParentStart => ParentVerb::AlignParentLeft,
            ParentVerb::AlignParentEnd if rtl => ParentVerb::AlignParentLeft,
            ParentVerb::AlignParentEnd => ParentVerb::AlignParentRight,
            other => other,
        }
    }
}

/// Either verb family, used where only the verb matters (removal, codes,
/// layout documents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Verb {
    Relative(RelativeVerb),
    Parent(ParentVerb),
}

impl Verb {
    pub fn from_code(code: i32) -> Result<Verb> {
        let verb = match code {
            codes::LEFT_OF => Verb::Relative(RelativeVerb::LeftOf),
            codes::RIGHT_OF => Verb::Relative(RelativeVerb::RightOf),
            codes::ABOVE => Verb::Relative(RelativeVerb::Above),
            codes::BELOW => Verb::Relative(RelativeVerb::Below),
            codes::ALIGN_BASELINE => return Err(LayoutError::UnsupportedVerb("align_baseline")),
            codes::ALIGN_LEFT => Verb::Relative(RelativeVerb::AlignLeft),
            codes::ALIGN_TOP => Verb::Relative(RelativeVerb::AlignTop),
            codes::ALIGN_RIGHT => Verb::Relative(RelativeVerb::AlignRight),
            codes::ALIGN_BOTTOM => Verb::Relative(RelativeVerb::AlignBottom),
            codes::ALIGN_PARENT_LEFT => Verb::Parent(ParentVerb::AlignParentLeft),
            codes::ALIGN_PARENT_TOP => Verb::Parent(ParentVerb::AlignParentTop),
            codes::ALIGN_PARENT_RIGHT => Verb::Parent(ParentVerb::AlignParentRight),
            codes::ALIGN_PARENT_BOTTOM => Verb::Parent(ParentVerb::AlignParentBottom),
            codes::CENTER_IN_PARENT => Verb::Parent(ParentVerb::CenterInParent),
            codes::CENTER_HORIZONTAL => Verb::Parent(ParentVerb::CenterHorizontal),
            codes::CENTER_VERTICAL => Verb::Parent(ParentVerb::CenterVertical),
            codes::START_OF => Verb::Relative(RelativeVerb::StartOf),
            codes::END_OF => Verb::Relative(RelativeVerb::EndOf),
            codes::ALIGN_START => Verb::Relative(RelativeVerb::AlignStart),
            codes::ALIGN_END => Verb::Relative(RelativeVerb::AlignEnd),
            codes::ALIGN_PARENT_START => Verb::Parent(ParentVerb::AlignParentStart),
            codes::ALIGN_PARENT_END => Verb::Parent(ParentVerb::AlignParentEnd),
            other => return Err(LayoutError::UnknownVerb(other)),
        };
        Ok(verb)
    }

    pub fn code(self) -> i32 {
        match self {
            Verb::Relative(verb) => verb.code(),
            Verb::Parent(verb) => verb.code(),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verb::Relative(verb) => format!("{verb:?}"),
            Verb::Parent(verb) => format!("{verb:?}"),
        };
        f.write_str(&name)
    }
}

/// What a rule is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    Parent,
    Element(ElementId),
}

/// A single positioning constraint attached to one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Relative(RelativeVerb, ElementId),
    Parent(ParentVerb),
}

impl Rule {
    /// Build a rule from a verb and an optional sibling anchor.
    ///
    /// Sibling verbs require an anchor. Parent verbs ignore it, the same way
    /// the toolkit treats any non-zero anchor as `TRUE`.
    pub fn new(verb: Verb, anchor: Option<ElementId>) -> Result<Rule> {
        match (verb, anchor) {
            (Verb::Relative(verb), Some(anchor)) => Ok(Rule::Relative(verb, anchor)),
            (Verb::Relative(verb), None) => Err(LayoutError::MissingAnchor(Verb::Relative(verb))),
            (Verb::Parent(verb), _) => Ok(Rule::Parent(verb)),
        }
    }

    /// Equivalent of `addRule(int verb, int anchor)`: sibling anchors are
    /// arena indices, negative values denote the parent.
    ///
    /// A parent verb with anchor [`codes::FALSE`] means "not set" and yields
    /// `None`. Index 0 stays a valid sibling anchor.
    pub fn from_code(code: i32, anchor: i32) -> Result<Option<Rule>> {
        let verb = Verb::from_code(code)?;
        if matches!(verb, Verb::Parent(_)) && anchor == codes::FALSE {
            return Ok(None);
        }
        let anchor = usize::try_from(anchor).ok().map(ElementId::from_index);
        Rule::new(verb, anchor).map(Some)
    }

    pub fn verb(&self) -> Verb {
        match self {
            Rule::Relative(verb, _) => Verb::Relative(*verb),
            Rule::Parent(verb) => Verb::Parent(*verb),
        }
    }

    pub fn anchor(&self) -> Anchor {
        match self {
            Rule::Relative(_, id) => Anchor::Element(*id),
            Rule::Parent(_) => Anchor::Parent,
        }
    }

    pub fn anchor_element(&self) -> Option<ElementId> {
        match self {
            Rule::Relative(_, id) => Some(*id),
            Rule::Parent(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_for_every_supported_verb() {
        for code in 0..=21 {
            if code == codes::ALIGN_BASELINE {
                continue;
            }
            let verb = Verb::from_code(code).unwrap();
            assert_eq!(verb.code(), code);
        }
    }

    #[test]
    fn baseline_and_unknown_codes_are_rejected() {
        assert!(matches!(
            Verb::from_code(codes::ALIGN_BASELINE),
            Err(LayoutError::UnsupportedVerb("align_baseline"))
        ));
        assert!(matches!(
            Verb::from_code(42),
            Err(LayoutError::UnknownVerb(42))
        ));
    }

    #[test]
    fn sibling_verb_without_anchor_is_rejected() {
        let err = Rule::from_code(codes::BELOW, codes::TRUE).unwrap_err();
        assert!(matches!(err, LayoutError::MissingAnchor(_)));
    }

    #[test]
    fn parent_verb_ignores_anchor() {
        let rule = Rule::from_code(codes::ALIGN_PARENT_BOTTOM, codes::TRUE)
            .unwrap()
            .unwrap();
        assert_eq!(rule, Rule::Parent(ParentVerb::AlignParentBottom));
        assert_eq!(rule.anchor(), Anchor::Parent);
    }

    #[test]
    fn parent_verb_with_false_anchor_is_unset() {
        assert_eq!(
            Rule::from_code(codes::CENTER_IN_PARENT, codes::FALSE).unwrap(),
            None
        );
        assert_eq!(
            Rule::from_code(codes::BELOW, 0).unwrap(),
            Some(Rule::Relative(RelativeVerb::Below, ElementId::from_index(0)))
        );
    }

    #[test]
    fn start_end_verbs_follow_direction() {
        assert_eq!(
            RelativeVerb::StartOf.absolute(LayoutDirection::Ltr),
            RelativeVerb::LeftOf
        );
        assert_eq!(
            RelativeVerb::StartOf.absolute(LayoutDirection::Rtl),
            RelativeVerb::RightOf
        );
        assert_eq!(
            ParentVerb::AlignParentEnd.absolute(LayoutDirection::Rtl),
            ParentVerb::AlignParentLeft
        );
        assert_eq!(
            RelativeVerb::Below.absolute(LayoutDirection::Rtl),
            RelativeVerb::Below
        );
    }

    #[test]
    fn verbs_deserialize_from_snake_case() {
        let verb: Verb = serde_json::from_str("\"align_parent_bottom\"").unwrap();
        assert_eq!(verb, Verb::Parent(ParentVerb::AlignParentBottom));
        let verb: Verb = serde_json::from_str("\"below\"").unwrap();
        assert_eq!(verb, Verb::Relative(RelativeVerb::Below));
    }
}
