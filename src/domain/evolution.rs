//! Evolution chains and stage resolution.
//!
//! A chain is a rooted tree of species; the root is the base form. Nodes are
//! shared via `Rc<RefCell<_>>` so that malformed input (a child list pointing
//! back at an ancestor) can be represented and rejected instead of looping.

use std::cell::RefCell;
use std::collections::HashSet;
use std::ops::ControlFlow;
use std::rc::Rc;

use termtree::Tree;
use tracing::{instrument, trace};

use crate::domain::error::DomainError;

pub type EvolutionNodeRef = Rc<RefCell<EvolutionNode>>;

/// One species' position in an evolution tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvolutionNode {
    /// Unique within a well-formed tree
    pub species_name: String,
    /// Direct evolutions, in upstream order
    pub children: Vec<EvolutionNodeRef>,
}

/// Position of a species within its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageInfo {
    /// 1 for the base form, +1 per evolution step
    pub stage: u32,
    /// No further evolutions
    pub is_fully_evolved: bool,
}

/// Flattened view of one chain member, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEntry {
    pub species_name: String,
    pub info: StageInfo,
}

impl EvolutionNode {
    pub fn new(species_name: impl Into<String>) -> Self {
        Self {
            species_name: species_name.into(),
            children: Vec::new(),
        }
    }

    pub fn leaf(species_name: impl Into<String>) -> EvolutionNodeRef {
        Rc::new(RefCell::new(Self::new(species_name)))
    }

    pub fn with_children(
        species_name: impl Into<String>,
        children: Vec<EvolutionNodeRef>,
    ) -> EvolutionNodeRef {
        Rc::new(RefCell::new(Self {
            species_name: species_name.into(),
            children,
        }))
    }

    /// Builds a linear chain `names[0] -> names[1] -> ...` and returns its root.
    pub fn chain(names: &[&str]) -> Option<EvolutionNodeRef> {
        let mut next: Option<EvolutionNodeRef> = None;
        for name in names.iter().rev() {
            let children = next.take().into_iter().collect();
            next = Some(Self::with_children(*name, children));
        }
        next
    }

    pub fn add_child(parent: &EvolutionNodeRef, child: EvolutionNodeRef) {
        parent.borrow_mut().children.push(child);
    }

    fn stage_info(&self, stage: u32) -> StageInfo {
        StageInfo {
            stage,
            is_fully_evolved: self.children.is_empty(),
        }
    }
}

/// Depth-first pre-order walk over `(node, depth)` pairs using an explicit stack.
///
/// Children pop in their stored order. Every node identity may be seen once;
/// a second visit means the input is not a tree and ends the walk with
/// `MalformedChain`.
fn walk<T>(
    root: &EvolutionNodeRef,
    mut visit: impl FnMut(&EvolutionNode, u32) -> ControlFlow<T>,
) -> Result<Option<T>, DomainError> {
    let mut visited: HashSet<*const RefCell<EvolutionNode>> = HashSet::new();
    let mut stack: Vec<(EvolutionNodeRef, u32)> = vec![(Rc::clone(root), 1)];

    while let Some((node_rc, depth)) = stack.pop() {
        if !visited.insert(Rc::as_ptr(&node_rc)) {
            return Err(DomainError::MalformedChain {
                species: node_rc.borrow().species_name.clone(),
                reason: "node reached more than once (cycle or shared node)".to_string(),
            });
        }

        let node = node_rc.borrow();
        trace!(species = %node.species_name, depth, "visit");
        if let ControlFlow::Break(found) = visit(&node, depth) {
            return Ok(Some(found));
        }

        // Reverse push keeps left-to-right order on pop
        for child_rc in node.children.iter().rev() {
            stack.push((Rc::clone(child_rc), depth + 1));
        }
    }

    Ok(None)
}

/// Finds `target_name` in the chain rooted at `root`.
///
/// Returns `Ok(None)` when no node carries the name. With duplicate names the
/// first node in pre-order, child order, wins.
///
/// Traversal stops at the first match, so a cycle or shared node reached only
/// after the match goes undetected and the match is returned. Use `entries` to
/// validate a whole chain.
///
/// # Errors
/// * `InvalidTarget` if `target_name` is empty.
/// * `MalformedChain` if the traversal reaches a node twice before a match.
#[instrument(level = "debug", skip(root), fields(root = %root.borrow().species_name))]
pub fn resolve(
    root: &EvolutionNodeRef,
    target_name: &str,
) -> Result<Option<StageInfo>, DomainError> {
    if target_name.is_empty() {
        return Err(DomainError::InvalidTarget);
    }

    walk(root, |node, depth| {
        if node.species_name == target_name {
            ControlFlow::Break(node.stage_info(depth))
        } else {
            ControlFlow::Continue(())
        }
    })
}

/// Lists every chain member with its stage, in pre-order.
pub fn entries(root: &EvolutionNodeRef) -> Result<Vec<ChainEntry>, DomainError> {
    let mut out = Vec::new();
    walk::<()>(root, |node, depth| {
        out.push(ChainEntry {
            species_name: node.species_name.clone(),
            info: node.stage_info(depth),
        });
        ControlFlow::Continue(())
    })?;
    Ok(out)
}

/// Renders the chain for terminal display.
///
/// The chain is validated first, so the recursive rendering cannot loop.
pub fn to_tree(root: &EvolutionNodeRef) -> Result<Tree<String>, DomainError> {
    entries(root)?;

    fn build(node_rc: &EvolutionNodeRef) -> Tree<String> {
        let node = node_rc.borrow();
        let leaves: Vec<_> = node.children.iter().map(build).collect();
        Tree::new(node.species_name.clone()).with_leaves(leaves)
    }

    Ok(build(root))
}
