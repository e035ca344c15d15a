//! Iterative force simulation core. Physics only: nothing in here knows
//! about screens, painters, or tooltips.

mod forces;
mod quadtree;

use eframe::egui::Vec2;

pub(in crate::app) use forces::{
    SpringLink, apply_cluster, apply_collide, apply_links, apply_many_body, apply_positional,
    spring_links,
};

const ALPHA_MIN: f32 = 0.001;
const ALPHA_DECAY_STEPS: f32 = 300.0;
const VELOCITY_DECAY: f32 = 0.4;

/// Alpha schedule of one simulation: heat decays toward zero each step and
/// the simulation goes inactive once it falls below `ALPHA_MIN`. `restart`
/// re-heats to full alpha without touching body state.
pub(in crate::app) struct Simulation {
    alpha: f32,
    alpha_target: f32,
    alpha_decay: f32,
    velocity_decay: f32,
}

impl Simulation {
    pub(in crate::app) fn new() -> Self {
        Self {
            alpha: 1.0,
            alpha_target: 0.0,
            alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / ALPHA_DECAY_STEPS),
            velocity_decay: VELOCITY_DECAY,
        }
    }

    pub(in crate::app) fn active(&self) -> bool {
        self.alpha >= ALPHA_MIN
    }

    /// Advances the heat schedule one tick and returns the alpha to use for
    /// this tick's forces.
    pub(in crate::app) fn step_alpha(&mut self) -> f32 {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        self.alpha
    }

    pub(in crate::app) fn restart(&mut self) {
        self.alpha = 1.0;
    }

    pub(in crate::app) fn stop(&mut self) {
        self.alpha = 0.0;
    }

    /// Applies velocity decay and advances positions.
    pub(in crate::app) fn integrate(&self, bodies: &mut BodySet) {
        let keep = 1.0 - self.velocity_decay;
        for (position, velocity) in bodies
            .positions
            .iter_mut()
            .zip(bodies.velocities.iter_mut())
        {
            *velocity *= keep;
            *position += *velocity;
        }
    }
}

/// Position/velocity state for one simulation's bodies, stored as parallel
/// arrays. The engine owns identity (which body is which) separately.
#[derive(Clone, Debug, Default)]
pub(in crate::app) struct BodySet {
    pub(in crate::app) positions: Vec<Vec2>,
    pub(in crate::app) velocities: Vec<Vec2>,
}

impl BodySet {
    pub(in crate::app) fn new() -> Self {
        Self::default()
    }

    pub(in crate::app) fn len(&self) -> usize {
        self.positions.len()
    }

    pub(in crate::app) fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub(in crate::app) fn push(&mut self, position: Vec2, velocity: Vec2) {
        self.positions.push(position);
        self.velocities.push(velocity);
    }

    pub(in crate::app) fn clear(&mut self) {
        self.positions.clear();
        self.velocities.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::vec2;

    #[test]
    fn alpha_decays_below_min_in_about_three_hundred_steps() {
        let mut sim = Simulation::new();
        let mut steps = 0;
        while sim.active() && steps < 400 {
            sim.step_alpha();
            steps += 1;
        }
        assert!(!sim.active());
        assert!((295..=305).contains(&steps), "settled after {steps} steps");
    }

    #[test]
    fn restart_reheats_a_settled_simulation() {
        let mut sim = Simulation::new();
        sim.stop();
        assert!(!sim.active());
        sim.restart();
        assert!(sim.active());
        assert_eq!(sim.alpha, 1.0);
    }

    #[test]
    fn integrate_decays_velocity_then_moves() {
        let sim = Simulation::new();
        let mut bodies = BodySet::new();
        bodies.push(vec2(0.0, 0.0), vec2(10.0, 0.0));
        sim.integrate(&mut bodies);
        // velocity decay 0.4: v becomes 6.0 and the position advances by it.
        assert!((bodies.velocities[0].x - 6.0).abs() < 1e-4);
        assert!((bodies.positions[0].x - 6.0).abs() < 1e-4);
    }
}
