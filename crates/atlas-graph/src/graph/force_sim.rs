//! Force Simulation for the force layout mode
//!
//! A fixed-iteration spring model seeded from the grid layout. Not a physical
//! simulation: every iteration computes all forces from the previous positions,
//! then moves each free node by `force * step`.
//!
//! Forces per free node:
//! - Repulsion from every other node, magnitude `repulsion / distance²`
//! - Attraction toward the target of every edge the node is the source of,
//!   constant magnitude
//!
//! Pinned nodes (manually positioned) never move but still repel others.
//!
//! # Usage
//! ```ignore
//! let mut sim = ForceSimulation::new(config.layout.force.clone());
//! sim.add_node("L1.a", Pos2::new(0.0, 0.0), false);
//! sim.add_node("L1.b", Pos2::new(300.0, 0.0), true);
//! sim.add_edge("L1.a", "L1.b");
//! sim.run();
//! let positions = sim.into_positions();
//! ```

use super::layout::PositionMap;
use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    pub iterations: usize,
    /// Numerator of the inverse-square repulsion
    pub repulsion: f32,
    /// Constant pull toward an edge target
    pub attraction: f32,
    /// Fraction of the force applied per iteration
    pub step: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            iterations: 50,
            repulsion: 50_000.0,
            attraction: 0.5,
            step: 0.1,
        }
    }
}

// =============================================================================
// SIMULATION
// =============================================================================

#[derive(Debug, Clone)]
struct SimNode {
    key: String,
    position: Pos2,
    pinned: bool,
}

#[derive(Debug, Clone)]
pub struct ForceSimulation {
    config: ForceConfig,
    nodes: Vec<SimNode>,
    index: HashMap<String, usize>,
    /// (source, target) node indices
    edges: Vec<(usize, usize)>,
}

impl ForceSimulation {
    pub fn new(config: ForceConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
        }
    }

    /// Add a node at its seed position. Re-adding a key replaces it.
    pub fn add_node(&mut self, key: impl Into<String>, position: Pos2, pinned: bool) {
        let key = key.into();
        if let Some(&i) = self.index.get(&key) {
            self.nodes[i].position = position;
            self.nodes[i].pinned = pinned;
            return;
        }
        self.index.insert(key.clone(), self.nodes.len());
        self.nodes.push(SimNode {
            key,
            position,
            pinned,
        });
    }

    /// Add a directed edge. Edges to unknown nodes and self-loops are skipped.
    pub fn add_edge(&mut self, source: &str, target: &str) {
        let (Some(&s), Some(&t)) = (self.index.get(source), self.index.get(target)) else {
            return;
        };
        if s != t {
            self.edges.push((s, t));
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn position(&self, key: &str) -> Option<Pos2> {
        self.index.get(key).map(|&i| self.nodes[i].position)
    }

    /// Run the configured number of iterations
    pub fn run(&mut self) {
        for _ in 0..self.config.iterations {
            self.tick();
        }
    }

    /// One iteration: compute all forces, then move free nodes
    pub fn tick(&mut self) {
        let forces = self.calculate_forces();
        for (node, force) in self.nodes.iter_mut().zip(forces) {
            if node.pinned {
                continue;
            }
            let next = node.position + force * self.config.step;
            node.position = Pos2::new(next.x.max(0.0), next.y.max(0.0));
        }
    }

    fn calculate_forces(&self) -> Vec<Vec2> {
        let n = self.nodes.len();
        let mut forces = vec![Vec2::ZERO; n];

        for i in 0..n {
            if self.nodes[i].pinned {
                continue;
            }
            let pos_i = self.nodes[i].position;

            for j in 0..n {
                if i == j {
                    continue;
                }
                let delta = pos_i - self.nodes[j].position;
                let length = delta.length();
                // Coincident nodes count as distance 1 and split along x by index
                let (direction, distance) = if length > 0.0 {
                    (delta / length, length)
                } else if i > j {
                    (Vec2::new(1.0, 0.0), 1.0)
                } else {
                    (Vec2::new(-1.0, 0.0), 1.0)
                };
                forces[i] += direction * (self.config.repulsion / (distance * distance));
            }
        }

        for &(s, t) in &self.edges {
            if self.nodes[s].pinned {
                continue;
            }
            let delta = self.nodes[t].position - self.nodes[s].position;
            let length = delta.length();
            if length > 0.0 {
                forces[s] += delta / length * self.config.attraction;
            }
        }

        forces
    }

    pub fn into_positions(self) -> PositionMap {
        self.nodes
            .into_iter()
            .map(|node| (node.key, node.position))
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
