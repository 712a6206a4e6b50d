//! Declarative layout documents.
//!
//! A document describes one container and its elements in JSON, with anchors
//! referenced by element name instead of index:
//!
//! ```
//! use relative_layout::layout::LayoutDocument;
//!
//! let doc = LayoutDocument::from_json_str(r#"{
//!     "width": 320,
//!     "height": 200,
//!     "elements": [
//!         { "name": "title", "width": 120, "height": 20,
//!           "rules": [{ "verb": "center_horizontal" }] },
//!         { "name": "body", "width": "match_parent", "height": 100,
//!           "rules": [{ "verb": "below", "anchor": "title" }] }
//!     ]
//! }"#)?;
//! let frames = doc.into_layout()?.resolve()?;
//! assert_eq!(frames.frame_by_name("body").map(|f| f.top), Some(20));
//! # Ok::<(), relative_layout::LayoutError>(())
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::geometry::{Insets, Size};

use super::core::{Dimension, ElementId, LayoutParams, RelativeLayout, Visibility};
use super::rules::{LayoutDirection, Rule, Verb};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub padding: Insets,
    #[serde(default)]
    pub direction: LayoutDirection,
    #[serde(default)]
    pub elements: Vec<ElementDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDocument {
    pub name: String,
    pub width: Dimension,
    pub height: Dimension,
    #[serde(default)]
    pub margin: Insets,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub align_with_parent_if_missing: bool,
    #[serde(default)]
    pub rules: Vec<RuleDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDocument {
    pub verb: Verb,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

impl LayoutDocument {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the container. Elements are declared first so rules may anchor
    /// on elements that appear later in the document.
    pub fn into_layout(self) -> Result<RelativeLayout> {
        let mut layout = RelativeLayout::new(Size::new(self.width, self.height))
            .with_padding(self.padding)
            .with_direction(self.direction);

        let mut ids: HashMap<String, ElementId> = HashMap::new();
        for element in &self.elements {
            let params = LayoutParams::new(element.width, element.height)
                .with_margin(element.margin)
                .with_visibility(element.visibility)
                .align_with_parent_if_missing(element.align_with_parent_if_missing);
            let id = layout.add_named(element.name.clone(), params)?;
            ids.insert(element.name.clone(), id);
        }

        for element in self.elements {
            let id = ids[&element.name];
            for rule in element.rules {
                let anchor = match (rule.verb, rule.anchor) {
                    (Verb::Relative(_), Some(name)) => match ids.get(&name) {
                        Some(anchor) => Some(*anchor),
                        None => {
                            return Err(LayoutError::DanglingReference {
                                element: element.name,
                                anchor: name,
                            });
                        }
                    },
                    _ => None,
                };
                layout.add_rule(id, Rule::new(rule.verb, anchor)?)?;
            }
        }

        Ok(layout)
    }
}
