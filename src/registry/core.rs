use std::collections::{HashMap, HashSet};

use blake3::Hash;

use crate::geometry::Frame;
use crate::layout::ResolvedLayout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameState {
    pub frame: Frame,
    pub is_dirty: bool,
}

/// Last known frame per element label, used to tell consumers which
/// elements moved between two layout passes.
#[derive(Debug, Default)]
pub struct FrameRegistry {
    entries: HashMap<String, FrameState>,
    dirty: HashSet<String>,
    last_digest: Option<Hash>,
}

impl FrameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pass and return the labels whose frames changed, sorted.
    /// New elements count as changed; elements no longer present are dropped.
    pub fn sync(&mut self, resolved: &ResolvedLayout) -> Vec<String> {
        use std::collections::hash_map::Entry;

        let digest = pass_digest(resolved);
        if self.last_digest == Some(digest) {
            return Vec::new();
        }
        self.last_digest = Some(digest);

        let mut seen = HashSet::with_capacity(resolved.len());
        let mut changed = Vec::new();

        for (id, frame) in resolved.iter() {
            let label = resolved.label(id);
            seen.insert(label.clone());
            match self.entries.entry(label.clone()) {
                Entry::Occupied(mut entry) => {
                    let state = entry.get_mut();
                    if state.frame != frame {
                        state.frame = frame;
                        state.is_dirty = true;
                        changed.push(label);
                    }
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(FrameState {
                        frame,
                        is_dirty: true,
                    });
                    changed.push(label);
                }
            }
        }

        self.entries.retain(|label, _| seen.contains(label));
        self.dirty.retain(|label| seen.contains(label));
        self.dirty.extend(changed.iter().cloned());

        changed.sort();
        changed
    }

    /// Drain dirty entries, sorted by label.
    pub fn take_dirty(&mut self) -> Vec<(String, FrameState)> {
        let mut ids: Vec<_> = self.dirty.drain().collect();
        ids.sort();
        ids.into_iter()
            .filter_map(|id| {
                self.entries.get_mut(&id).map(|state| {
                    state.is_dirty = false;
                    (id, state.clone())
                })
            })
            .collect()
    }

    pub fn frame_of(&self, label: &str) -> Option<Frame> {
        self.entries.get(label).map(|state| state.frame)
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Frame digest extended with element labels, so a pass that only renames
/// elements still counts as a change.
fn pass_digest(resolved: &ResolvedLayout) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(resolved.digest().as_bytes());
    for (id, _) in resolved.iter() {
        hasher.update(resolved.label(id).as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::layout::{LayoutParams, ParentVerb, RelativeLayout, RelativeVerb, Rule};

    fn sample(width: i32) -> RelativeLayout {
        let mut layout = RelativeLayout::new(Size::new(width, 40));
        let header = layout
            .add_named("header", LayoutParams::exact(20, 5))
            .unwrap();
        layout
            .add_named(
                "badge",
                LayoutParams::exact(4, 2).with_rule(Rule::Parent(ParentVerb::AlignParentRight)),
            )
            .unwrap();
        layout
            .add_named(
                "body",
                LayoutParams::exact(20, 10).with_rule(Rule::Relative(RelativeVerb::Below, header)),
            )
            .unwrap();
        layout
    }

    #[test]
    fn first_sync_marks_everything_changed() {
        let mut registry = FrameRegistry::new();
        let changed = registry.sync(&sample(80).resolve().unwrap());
        assert_eq!(changed, vec!["badge", "body", "header"]);
        assert_eq!(registry.take_dirty().len(), 3);
        assert!(!registry.has_dirty());
    }

    #[test]
    fn identical_pass_is_a_no_op() {
        let mut registry = FrameRegistry::new();
        registry.sync(&sample(80).resolve().unwrap());
        registry.take_dirty();

        assert!(registry.sync(&sample(80).resolve().unwrap()).is_empty());
        assert!(!registry.has_dirty());
    }

    #[test]
    fn resize_only_flags_moved_elements() {
        let mut registry = FrameRegistry::new();
        registry.sync(&sample(80).resolve().unwrap());
        registry.take_dirty();

        let changed = registry.sync(&sample(100).resolve().unwrap());
        assert_eq!(changed, vec!["badge"]);
        assert_eq!(registry.frame_of("badge"), Some(Frame::new(96, 0, 100, 2)));

        let dirty = registry.take_dirty();
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty[0].0, "badge");
    }

    #[test]
    fn removed_elements_are_dropped() {
        let mut registry = FrameRegistry::new();
        registry.sync(&sample(80).resolve().unwrap());

        let mut smaller = RelativeLayout::new(Size::new(80, 40));
        smaller
            .add_named("header", LayoutParams::exact(20, 5))
            .unwrap();
        let changed = registry.sync(&smaller.resolve().unwrap());

        assert!(changed.is_empty());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.frame_of("body"), None);
    }
}
