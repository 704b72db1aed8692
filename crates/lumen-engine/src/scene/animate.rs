use glam::DVec3;

use super::{NodeId, SceneGraph, Transform};

/// Time-driven placement of a node, evaluated in absolute scene time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Motion {
    /// `translate(origin) * rotate_z(t * z) * rotate_x(t * x)`.
    Spin {
        origin: DVec3,
        z_deg_per_sec: f64,
        x_deg_per_sec: f64,
    },
    /// Circle of `radius` around `center` in the XY plane, facing outward.
    Orbit {
        center: DVec3,
        radius: f64,
        deg_per_sec: f64,
    },
}

impl Motion {
    pub fn spin(z_deg_per_sec: f64, x_deg_per_sec: f64) -> Self {
        Motion::Spin {
            origin: DVec3::ZERO,
            z_deg_per_sec,
            x_deg_per_sec,
        }
    }

    pub fn evaluate(&self, time: f64) -> Transform {
        match *self {
            Motion::Spin {
                origin,
                z_deg_per_sec,
                x_deg_per_sec,
            } => {
                Transform::from_translation(origin)
                    * Transform::rotation_z(time * z_deg_per_sec)
                    * Transform::rotation_x(time * x_deg_per_sec)
            }
            Motion::Orbit {
                center,
                radius,
                deg_per_sec,
            } => {
                let angle = time * deg_per_sec;
                let (s, c) = angle.to_radians().sin_cos();
                Transform {
                    translation: center + DVec3::new(c, s, 0.0) * radius,
                    ..Transform::rotation_z(angle)
                }
            }
        }
    }
}

/// Set of animated nodes. Motions are written as global transforms, so they
/// hold regardless of where the node sits in the tree.
#[derive(Debug, Default)]
pub struct Animator {
    tracks: Vec<(NodeId, Motion)>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any motion already attached to `node`.
    pub fn attach(&mut self, node: NodeId, motion: Motion) {
        self.detach(node);
        self.tracks.push((node, motion));
    }

    pub fn detach(&mut self, node: NodeId) {
        self.tracks.retain(|(n, _)| *n != node);
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Writes every motion at `time`. Tracks of removed nodes are dropped.
    /// Returns the number of nodes moved.
    pub fn apply(&mut self, graph: &mut SceneGraph, time: f64) -> usize {
        self.tracks.retain(|(node, _)| graph.get(*node).is_some());
        let mut moved = 0;
        for (node, motion) in &self.tracks {
            if graph.set_global_transform(*node, motion.evaluate(time)).is_ok() {
                moved += 1;
            }
        }
        moved
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}
