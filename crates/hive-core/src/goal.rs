//! Mother brain: colony statistics in, goal signals for offspring out.
//!
//! Inputs:  hunger, points, live offspring count, average offspring hunger (all normalised)
//! Outputs: food priority, exploration, safety (tanh range)

use crate::constants::{GOAL_HIDDEN, GOAL_INPUTS, GOAL_SIGNALS, OFFSPRING_NORM, POINTS_NORM};
use crate::nn::{FeedforwardNet, ShapeError};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalNet {
    net: FeedforwardNet,
}

impl GoalNet {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            net: FeedforwardNet::new(GOAL_INPUTS, &GOAL_HIDDEN, GOAL_SIGNALS, rng),
        }
    }

    /// Wrap an existing network, which must have the 4→[8,6]→3 topology.
    pub fn from_net(net: FeedforwardNet) -> Result<Self, ShapeError> {
        net.validate()?;
        if !net.has_topology(GOAL_INPUTS, &GOAL_HIDDEN, GOAL_SIGNALS) {
            return Err(ShapeError::Topology {
                expected: format!("{GOAL_INPUTS}->{GOAL_HIDDEN:?}->{GOAL_SIGNALS}"),
                actual: net.topology(),
            });
        }
        Ok(Self { net })
    }

    pub fn net(&self) -> &FeedforwardNet {
        &self.net
    }

    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R, rate: f32, strength: f32) {
        self.net.mutate(rng, rate, strength);
    }

    pub fn get_goals(
        &self,
        mother_hunger: u32,
        mother_points: u32,
        live_offspring: usize,
        avg_offspring_hunger: f32,
        max_hunger: u32,
    ) -> Result<[f32; GOAL_SIGNALS], ShapeError> {
        let inputs = goal_inputs(
            mother_hunger,
            mother_points,
            live_offspring,
            avg_offspring_hunger,
            max_hunger,
        );
        let out = self.net.forward(&inputs)?;
        Ok([out[0], out[1], out[2]])
    }
}

pub(crate) fn goal_inputs(
    mother_hunger: u32,
    mother_points: u32,
    live_offspring: usize,
    avg_offspring_hunger: f32,
    max_hunger: u32,
) -> [f32; GOAL_INPUTS] {
    let max = max_hunger.max(1) as f32;
    [
        mother_hunger as f32 / max,
        (mother_points as f32 / POINTS_NORM).min(1.0),
        (live_offspring as f32 / OFFSPRING_NORM).min(1.0),
        if live_offspring > 0 {
            avg_offspring_hunger / max
        } else {
            0.0
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;

    #[test]
    fn inputs_are_normalised_and_capped() {
        let inputs = goal_inputs(250, 1_000, 40, 100.0, 500);
        assert_eq!(inputs, [0.5, 1.0, 1.0, 0.2]);
        let inputs = goal_inputs(0, 50, 5, 100.0, 500);
        assert_eq!(inputs, [0.0, 0.5, 0.5, 0.2]);
    }

    #[test]
    fn average_hunger_ignored_without_offspring() {
        let inputs = goal_inputs(100, 10, 0, 480.0, 500);
        assert_eq!(inputs[3], 0.0);
    }

    #[test]
    fn goals_are_bounded() {
        let mut rng = create_rng(21);
        let goals = GoalNet::new(&mut rng);
        for hunger in [0, 250, 500] {
            let g = goals.get_goals(hunger, 300, 12, 321.0, 500).unwrap();
            assert!(g.iter().all(|v| (-1.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn from_net_rejects_other_topologies() {
        let mut rng = create_rng(22);
        let wrong = FeedforwardNet::new(4, &[8], 3, &mut rng);
        assert!(matches!(
            GoalNet::from_net(wrong),
            Err(ShapeError::Topology { .. })
        ));
        let right = FeedforwardNet::new(4, &[8, 6], 3, &mut rng);
        assert!(GoalNet::from_net(right).is_ok());
    }
}
