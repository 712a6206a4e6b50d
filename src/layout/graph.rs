//! Anchor dependency graph.
//!
//! Nodes are element indices. An edge `a -> b` means `a` has a rule anchored
//! on `b`, so `b` must be resolved first. Parent rules add no edges.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::{LayoutError, Result};

use super::core::{ElementId, RelativeLayout};

#[derive(Debug, Clone)]
pub(crate) struct DependencyGraph {
    /// `deps[a]` lists the anchors of `a`, one entry per rule.
    deps: Vec<Vec<usize>>,
    /// `dependents[b]` lists the elements anchored on `b`.
    dependents: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Build the graph, failing on the first anchor that is not an element
    /// of `layout` (in declaration order).
    pub(crate) fn build(layout: &RelativeLayout) -> Result<Self> {
        let count = layout.len();
        let mut deps = vec![Vec::new(); count];
        let mut dependents = vec![Vec::new(); count];

        for (idx, element) in layout.elements().iter().enumerate() {
            for rule in element.params.rules() {
                let Some(anchor) = rule.anchor_element() else {
                    continue;
                };
                if anchor.index() >= count {
                    return Err(LayoutError::DanglingReference {
                        element: layout.label(ElementId::from_index(idx)),
                        anchor: anchor.to_string(),
                    });
                }
                deps[idx].push(anchor.index());
                dependents[anchor.index()].push(idx);
            }
        }

        Ok(Self { deps, dependents })
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.deps.iter().map(Vec::len).sum()
    }

    /// Kahn's algorithm. Among ready nodes the earliest declared goes first,
    /// so the result is stable for identical input. On failure returns the
    /// members of one cycle, sorted by index.
    pub(crate) fn topological_order(&self) -> std::result::Result<Vec<usize>, Vec<usize>> {
        let count = self.deps.len();
        let mut pending: Vec<usize> = self.deps.iter().map(Vec::len).collect();
        let mut ready: BinaryHeap<Reverse<usize>> = (0..count)
            .filter(|&i| pending[i] == 0)
            .map(Reverse)
            .collect();
        let mut order = Vec::with_capacity(count);

        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for &dependent in &self.dependents[node] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        if order.len() == count {
            return Ok(order);
        }

        Err(self.find_cycle(&pending))
    }

    /// Every node left with unresolved dependencies has at least one
    /// dependency that is also unresolved, so walking those edges from any
    /// such node must revisit a node.
    fn find_cycle(&self, pending: &[usize]) -> Vec<usize> {
        let Some(start) = pending.iter().position(|&p| p > 0) else {
            return Vec::new();
        };

        let mut position_on_path = vec![None; self.deps.len()];
        let mut path = Vec::new();
        let mut node = start;

        loop {
            if let Some(pos) = position_on_path[node] {
                let mut cycle = path[pos..].to_vec();
                cycle.sort_unstable();
                return cycle;
            }
            position_on_path[node] = Some(path.len());
            path.push(node);

            match self.deps[node].iter().find(|&&dep| pending[dep] > 0) {
                Some(&next) => node = next,
                None => return path,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::layout::core::LayoutParams;
    use crate::layout::rules::{ParentVerb, RelativeVerb, Rule};

    fn id(index: usize) -> ElementId {
        ElementId::from_index(index)
    }

    #[test]
    fn order_puts_anchors_first() {
        let mut layout = RelativeLayout::new(Size::new(100, 100));
        let a = layout.add(LayoutParams::exact(10, 10));
        let b = layout.add(LayoutParams::exact(10, 10));
        let c = layout.add(LayoutParams::exact(10, 10));
        layout.add_rule(a, Rule::Relative(RelativeVerb::Below, c)).unwrap();
        layout.add_rule(b, Rule::Relative(RelativeVerb::Below, a)).unwrap();
        layout
            .add_rule(c, Rule::Parent(ParentVerb::AlignParentTop))
            .unwrap();

        let graph = DependencyGraph::build(&layout).unwrap();
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.topological_order().unwrap(), vec![2, 0, 1]);
    }

    #[test]
    fn independent_elements_keep_declaration_order() {
        let mut layout = RelativeLayout::new(Size::new(100, 100));
        for _ in 0..4 {
            layout.add(LayoutParams::exact(1, 1));
        }
        let graph = DependencyGraph::build(&layout).unwrap();
        assert_eq!(graph.topological_order().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn ready_ties_go_to_the_earliest_declared() {
        let mut layout = RelativeLayout::new(Size::new(100, 100));
        for _ in 0..4 {
            layout.add(LayoutParams::exact(1, 1));
        }
        layout.add_rule(id(1), Rule::Relative(RelativeVerb::Below, id(2))).unwrap();
        layout.add_rule(id(3), Rule::Relative(RelativeVerb::Below, id(0))).unwrap();

        let graph = DependencyGraph::build(&layout).unwrap();
        assert_eq!(graph.topological_order().unwrap(), vec![0, 2, 1, 3]);
    }

    #[test]
    fn cycle_reports_only_its_members() {
        let mut layout = RelativeLayout::new(Size::new(100, 100));
        let a = layout.add(LayoutParams::exact(1, 1));
        let b = layout.add(LayoutParams::exact(1, 1));
        let c = layout.add(LayoutParams::exact(1, 1));
        layout.add_rule(a, Rule::Relative(RelativeVerb::Below, b)).unwrap();
        layout.add_rule(b, Rule::Relative(RelativeVerb::Below, c)).unwrap();
        layout.add_rule(c, Rule::Relative(RelativeVerb::Below, b)).unwrap();

        let graph = DependencyGraph::build(&layout).unwrap();
        assert_eq!(graph.topological_order().unwrap_err(), vec![1, 2]);
    }

    #[test]
    fn self_anchor_is_a_cycle_of_one() {
        let mut layout = RelativeLayout::new(Size::new(100, 100));
        let a = layout.add(LayoutParams::exact(1, 1));
        layout.add_rule(a, Rule::Relative(RelativeVerb::AlignTop, a)).unwrap();

        let graph = DependencyGraph::build(&layout).unwrap();
        assert_eq!(graph.topological_order().unwrap_err(), vec![0]);
    }

    #[test]
    fn out_of_range_anchor_is_dangling() {
        let mut layout = RelativeLayout::new(Size::new(100, 100));
        let a = layout
            .add_named("header", LayoutParams::exact(1, 1))
            .unwrap();
        layout.add_rule(a, Rule::Relative(RelativeVerb::Below, id(7))).unwrap();

        let err = DependencyGraph::build(&layout).unwrap_err();
        match err {
            LayoutError::DanglingReference { element, anchor } => {
                assert_eq!(element, "header");
                assert_eq!(anchor, "#7");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
