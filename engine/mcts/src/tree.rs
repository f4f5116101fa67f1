//! MCTS tree structure with arena allocation.
//!
//! The tree uses arena allocation for efficient node storage and
//! cache-friendly traversal. Nodes are stored in a contiguous Vec
//! and referenced by NodeId indices; parent links are plain indices,
//! so the tree never holds shared ownership or cycles.

use std::cmp::Ordering;

use engine_core::Game;
use serde::Serialize;

use crate::node::{MctsNode, NodeId};

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree<G: Game> {
    /// Arena storing all nodes
    nodes: Vec<MctsNode<G>>,

    /// Root node index (always 0 after initialization)
    root: NodeId,
}

/// Pick the maximum by an `f64` key, preferring the LATER element on ties.
///
/// `Iterator::max_by` already returns the last of several equal maxima.
fn max_by_score<I, F>(ids: I, score: F) -> Option<NodeId>
where
    I: Iterator<Item = NodeId>,
    F: Fn(NodeId) -> f64,
{
    ids.map(|id| (id, score(id)))
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .map(|(id, _)| id)
}

impl<G: Game> MctsTree<G> {
    /// Create a new tree rooted at `root_state`.
    pub fn new(root_state: G) -> Self {
        Self {
            nodes: vec![MctsNode::new_root(root_state)],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode<G> {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode<G> {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a new node and return its ID.
    fn allocate(&mut self, node: MctsNode<G>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        debug_assert!(id.is_some(), "node ids exhausted");
        self.nodes.push(node);
        id
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (should never be true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Select the child of `node_id` with the highest UCT score.
    pub fn select_child(&self, node_id: NodeId) -> Option<NodeId> {
        let node = self.get(node_id);
        // Pre-compute ln once instead of per-child comparison
        let parent_visits_ln = (node.visit_count.max(1) as f64).ln();

        max_by_score(node.children.iter().copied(), |id| {
            self.get(id).uct_score(parent_visits_ln)
        })
    }

    /// Add a child reached by `move_taken`, whose post-move state is `state`.
    /// Returns the new child's NodeId.
    pub fn add_child(&mut self, parent_id: NodeId, move_taken: G::Move, state: G) -> NodeId {
        let child_id = self.allocate(MctsNode::new_child(parent_id, move_taken, state));
        self.get_mut(parent_id).children.push(child_id);
        child_id
    }

    /// Walk from `leaf_id` to the root, letting `value_for` decide the value
    /// credited at each node, and bump every visit count by one.
    pub fn backpropagate_with<F>(&mut self, leaf_id: NodeId, mut value_for: F)
    where
        F: FnMut(&MctsNode<G>) -> f64,
    {
        let mut current_id = leaf_id;
        while current_id.is_some() {
            let value = value_for(self.get(current_id));
            let node = self.get_mut(current_id);
            node.visit_count += 1;
            node.value_sum += value;
            current_id = node.parent;
        }
    }

    /// Backpropagate the same value to every node from `leaf_id` to the root.
    pub fn backpropagate(&mut self, leaf_id: NodeId, value: f64) {
        self.backpropagate_with(leaf_id, |_| value);
    }

    /// Root child with the highest mean value (no exploration term).
    pub fn best_child(&self) -> Option<NodeId> {
        let root = self.get(self.root);
        max_by_score(root.children.iter().copied(), |id| {
            self.get(id).mean_value()
        })
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visit_count,
            root_value: root.mean_value(),
            max_depth: self.compute_max_depth(self.root, 0),
        }
    }

    fn compute_max_depth(&self, node_id: NodeId, current_depth: u32) -> u32 {
        let node = self.get(node_id);
        if node.children.is_empty() {
            return current_depth;
        }

        node.children
            .iter()
            .map(|id| self.compute_max_depth(*id, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_value: f64,
    pub max_depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_connect4::{Connect4, Game, Player};

    fn after(state: &Connect4, column: usize) -> Connect4 {
        let mut next = state.clone();
        next.apply_move(column).unwrap();
        next
    }

    #[test]
    fn test_new_tree() {
        let tree = MctsTree::new(Connect4::standard());

        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.root(), NodeId(0));
        assert!(tree.get(tree.root()).parent.is_none());
    }

    #[test]
    fn test_add_child() {
        let root_state = Connect4::standard();
        let mut tree = MctsTree::new(root_state.clone());

        let child_id = tree.add_child(tree.root(), 3, after(&root_state, 3));

        assert_eq!(tree.len(), 2);
        assert_eq!(child_id, NodeId(1));
        assert_eq!(tree.get(tree.root()).children, vec![NodeId(1)]);

        let child = tree.get(child_id);
        assert_eq!(child.parent, tree.root());
        assert_eq!(child.move_taken, Some(3));
        assert_eq!(child.mover, Player::First);
    }

    #[test]
    fn test_backpropagate_adds_same_value_everywhere() {
        let root_state = Connect4::standard();
        let mut tree = MctsTree::new(root_state.clone());

        // Create a chain: root -> child -> grandchild
        let child_state = after(&root_state, 3);
        let child_id = tree.add_child(tree.root(), 3, child_state.clone());
        let grandchild_id = tree.add_child(child_id, 4, after(&child_state, 4));

        tree.backpropagate(grandchild_id, 1.0);

        for id in [grandchild_id, child_id, tree.root()] {
            assert_eq!(tree.get(id).visit_count, 1);
            assert!((tree.get(id).value_sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_backpropagate_with_per_node_value() {
        let root_state = Connect4::standard();
        let mut tree = MctsTree::new(root_state.clone());
        let child_id = tree.add_child(tree.root(), 3, after(&root_state, 3));

        tree.backpropagate_with(child_id, |node| match node.mover {
            Player::First => 1.0,
            Player::Second => 0.0,
        });

        assert!((tree.get(child_id).value_sum - 1.0).abs() < 1e-12);
        assert!(tree.get(tree.root()).value_sum.abs() < 1e-12);
        assert_eq!(tree.get(tree.root()).visit_count, 1);
    }

    #[test]
    fn test_select_child_prefers_higher_uct() {
        let root_state = Connect4::standard();
        let mut tree = MctsTree::new(root_state.clone());
        let a = tree.add_child(tree.root(), 0, after(&root_state, 0));
        let b = tree.add_child(tree.root(), 1, after(&root_state, 1));

        tree.backpropagate(a, 0.0);
        tree.backpropagate(b, 1.0);

        assert_eq!(tree.select_child(tree.root()), Some(b));
    }

    #[test]
    fn test_ties_prefer_later_child() {
        let root_state = Connect4::standard();
        let mut tree = MctsTree::new(root_state.clone());
        let children: Vec<_> = (0..3)
            .map(|column| tree.add_child(tree.root(), column, after(&root_state, column)))
            .collect();
        for &id in &children {
            tree.backpropagate(id, 0.5);
        }

        assert_eq!(tree.select_child(tree.root()), Some(children[2]));
        assert_eq!(tree.best_child(), Some(children[2]));
    }

    #[test]
    fn test_best_child_uses_mean_value() {
        let root_state = Connect4::standard();
        let mut tree = MctsTree::new(root_state.clone());
        let a = tree.add_child(tree.root(), 0, after(&root_state, 0));
        let b = tree.add_child(tree.root(), 1, after(&root_state, 1));

        // a: 3 / 4 = 0.75, b: 2 / 2 = 1.0
        for value in [1.0, 1.0, 1.0, 0.0] {
            tree.backpropagate(a, value);
        }
        for value in [1.0, 1.0] {
            tree.backpropagate(b, value);
        }

        assert_eq!(tree.best_child(), Some(b));
    }

    #[test]
    fn test_tree_stats() {
        let root_state = Connect4::standard();
        let mut tree = MctsTree::new(root_state.clone());
        let child_state = after(&root_state, 3);
        let child_id = tree.add_child(tree.root(), 3, child_state.clone());
        let leaf = tree.add_child(child_id, 3, after(&child_state, 3));
        tree.backpropagate(leaf, 0.5);

        let stats = tree.stats();
        assert_eq!(stats.total_nodes, 3);
        assert_eq!(stats.root_visits, 1);
        assert_eq!(stats.max_depth, 2);
        assert!((stats.root_value - 0.5).abs() < 1e-12);
    }
}
