use thiserror::Error;

use crate::layout::{ElementId, Verb};

/// Unified result type for the relative layout crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors surfaced while building or resolving a relative layout.
///
/// Elements are identified by name when they have one and by `#index`
/// otherwise.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("element `{element}` references unknown anchor `{anchor}`")]
    DanglingReference { element: String, anchor: String },
    #[error("cyclic constraint between {}", format_members(.members))]
    CyclicConstraint { members: Vec<String> },
    #[error("element {0} does not belong to this layout")]
    UnknownElement(ElementId),
    #[error("element name `{0}` is declared more than once")]
    DuplicateElement(String),
    #[error("unknown rule verb code {0}")]
    UnknownVerb(i32),
    #[error("rule verb `{0}` needs a sibling anchor")]
    MissingAnchor(Verb),
    #[error("rule verb `{0}` is not supported")]
    UnsupportedVerb(&'static str),
    #[error("invalid dimension {0}: expected a size >= 0 or MATCH_PARENT (-1)")]
    InvalidDimension(i32),
    #[error("layout document error: {0}")]
    Document(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LayoutError {
    /// Names of the elements implicated by a configuration error.
    pub fn offenders(&self) -> Vec<&str> {
        match self {
            LayoutError::DanglingReference { element, .. } => vec![element.as_str()],
            LayoutError::CyclicConstraint { members } => {
                members.iter().map(String::as_str).collect()
            }
            LayoutError::DuplicateElement(name) => vec![name.as_str()],
            _ => Vec::new(),
        }
    }
}

fn format_members(members: &[String]) -> String {
    members
        .iter()
        .map(|m| format!("`{m}`"))
        .collect::<Vec<_>>()
        .join(" -> ")
}
