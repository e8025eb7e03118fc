//! Disk packing input: leaf positions in the unit square plus a scale factor.

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackingNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

impl PackingNode {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Packed leaves in insertion order. A tree distance `d` becomes the planar
/// distance `scale_factor * d`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Packing {
    pub scale_factor: f64,
    pub nodes: Vec<PackingNode>,
}

impl Packing {
    pub fn new(scale_factor: f64) -> Self {
        Self {
            scale_factor,
            nodes: Vec::new(),
        }
    }

    pub fn with_node(mut self, id: impl Into<String>, x: f64, y: f64) -> Self {
        self.nodes.push(PackingNode { id: id.into(), x, y });
        self
    }

    pub fn position(&self, id: &str) -> Option<Vec2> {
        self.nodes.iter().find(|n| n.id == id).map(PackingNode::position)
    }

    /// Overwrite a node's position; returns false for unknown ids.
    pub fn set_position(&mut self, id: &str, p: Vec2) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.x = p.x;
                n.y = p.y;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_round_trip_through_setters() {
        let mut p = Packing::new(0.5).with_node("a", 0.0, 1.0);
        assert_eq!(p.position("a"), Some(Vec2::new(0.0, 1.0)));
        assert!(p.set_position("a", Vec2::new(0.25, 1.0)));
        assert!(!p.set_position("b", Vec2::new(0.0, 0.0)));
        assert_eq!(p.nodes[0].x, 0.25);
    }
}
