//! MCTS tree node representation.
//!
//! Each node represents a game state reached by taking a move from the parent.
//! Nodes store visit statistics used for UCT selection and the final choice.

use engine_core::{Game, Player};

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct MctsNode<G: Game> {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Move that led to this node from parent (None for root)
    pub move_taken: Option<G::Move>,

    /// Player who made `move_taken`; values at this node are scored for them
    pub mover: Player,

    /// Game state after `move_taken`
    pub state: G,

    /// Legal moves not yet expanded into children
    pub untried_moves: Vec<G::Move>,

    /// Children in expansion order
    pub children: Vec<NodeId>,

    /// Number of rollouts backpropagated through this node
    pub visit_count: u32,

    /// Sum of rollout values backpropagated through this node
    pub value_sum: f64,
}

impl<G: Game> MctsNode<G> {
    /// Create a new root node. The mover is whoever produced the root position.
    pub fn new_root(state: G) -> Self {
        Self {
            parent: NodeId::NONE,
            move_taken: None,
            mover: state.last_mover(),
            untried_moves: state.legal_moves(),
            state,
            children: Vec::new(),
            visit_count: 0,
            value_sum: 0.0,
        }
    }

    /// Create a new child node from the post-move state.
    pub fn new_child(parent: NodeId, move_taken: G::Move, state: G) -> Self {
        Self {
            parent,
            move_taken: Some(move_taken),
            mover: state.last_mover(),
            untried_moves: state.legal_moves(),
            state,
            children: Vec::new(),
            visit_count: 0,
            value_sum: 0.0,
        }
    }

    /// Mean value `value_sum / visit_count`. Returns 0.0 if never visited.
    #[inline]
    pub fn mean_value(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f64
        }
    }

    /// UCT score used during selection:
    /// `mean + sqrt(2 * ln(N_parent) / N)`.
    ///
    /// Takes pre-computed `ln(N_parent)` to avoid redundant logs when comparing
    /// siblings. Unvisited nodes score +inf so they are never starved.
    #[inline]
    pub fn uct_score(&self, parent_visits_ln: f64) -> f64 {
        if self.visit_count == 0 {
            return f64::INFINITY;
        }
        let n = self.visit_count as f64;
        self.mean_value() + (2.0 * parent_visits_ln / n).sqrt()
    }

    /// Whether every legal move has been expanded.
    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        self.untried_moves.is_empty()
    }

    /// Check if this is a leaf node (no children yet).
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_connect4::Connect4;

    #[test]
    fn test_node_id_none() {
        assert!(NodeId::NONE.is_none());
        assert!(!NodeId::NONE.is_some());
        assert!(!NodeId(0).is_none());
        assert!(NodeId(0).is_some());
    }

    #[test]
    fn test_new_root() {
        let node = MctsNode::new_root(Connect4::standard());

        assert!(node.parent.is_none());
        assert_eq!(node.move_taken, None);
        assert_eq!(node.mover, Player::Second);
        assert_eq!(node.untried_moves, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(node.visit_count, 0);
        assert!(node.is_leaf());
        assert!(!node.is_fully_expanded());
    }

    #[test]
    fn test_new_child_records_mover() {
        let mut state = Connect4::standard();
        state.apply_move(3).unwrap();
        let node = MctsNode::new_child(NodeId(0), 3, state);

        assert_eq!(node.parent, NodeId(0));
        assert_eq!(node.move_taken, Some(3));
        assert_eq!(node.mover, Player::First);
        assert_eq!(node.untried_moves.len(), 7);
    }

    #[test]
    fn test_mean_value() {
        let mut node = MctsNode::new_root(Connect4::standard());

        // Unvisited
        assert!(node.mean_value().abs() < 1e-12);

        node.visit_count = 4;
        node.value_sum = 2.0;
        assert!((node.mean_value() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_uct_score() {
        let mut node = MctsNode::new_root(Connect4::standard());
        assert_eq!(node.uct_score(1.0), f64::INFINITY);

        node.visit_count = 10;
        node.value_sum = 5.0;

        // UCT = 0.5 + sqrt(2 * ln(100) / 10) = 0.5 + 0.9597...
        let ucb = node.uct_score((100f64).ln());
        assert!((ucb - 1.4597).abs() < 1e-3);
    }
}
