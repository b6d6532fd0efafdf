//! Dense feedforward network: ReLU hidden layers, tanh output.
//!
//! Weights are stored row-major as `[inputs][outputs]`, so `x·W` walks each
//! input row once. Networks never change shape after construction; mutation
//! and crossover only touch values.

use crate::rng::gaussian;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("expected {expected} inputs, got {actual}")]
    InputSize { expected: usize, actual: usize },
    #[error("parents have different layer shapes")]
    ParentMismatch,
    #[error("layer {layer} declares {inputs}x{outputs} but holds {weights} weights and {biases} biases")]
    LayerData {
        layer: usize,
        inputs: usize,
        outputs: usize,
        weights: usize,
        biases: usize,
    },
    #[error("layer {layer} takes {actual} inputs but the previous layer produces {expected}")]
    LayerChain {
        layer: usize,
        expected: usize,
        actual: usize,
    },
    #[error("network must have at least one layer")]
    NoLayers,
    #[error("layer {layer} has zero width")]
    EmptyLayer { layer: usize },
    #[error("expected topology {expected}, found {actual}")]
    Topology { expected: String, actual: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    inputs: usize,
    outputs: usize,
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl Layer {
    pub fn new(
        inputs: usize,
        outputs: usize,
        weights: Vec<f32>,
        biases: Vec<f32>,
    ) -> Result<Self, ShapeError> {
        let layer = Self {
            inputs,
            outputs,
            weights,
            biases,
        };
        layer.check(0)?;
        Ok(layer)
    }

    pub fn zeros(inputs: usize, outputs: usize) -> Self {
        Self {
            inputs,
            outputs,
            weights: vec![0.0; inputs * outputs],
            biases: vec![0.0; outputs],
        }
    }

    /// He-scaled normal weights, zero biases.
    fn random<R: Rng + ?Sized>(inputs: usize, outputs: usize, rng: &mut R) -> Self {
        let scale = (2.0 / inputs.max(1) as f32).sqrt();
        let weights = (0..inputs * outputs)
            .map(|_| gaussian(rng) * scale)
            .collect();
        Self {
            inputs,
            outputs,
            weights,
            biases: vec![0.0; outputs],
        }
    }

    fn check(&self, index: usize) -> Result<(), ShapeError> {
        if self.inputs == 0 || self.outputs == 0 {
            return Err(ShapeError::EmptyLayer { layer: index });
        }
        if self.weights.len() != self.inputs * self.outputs || self.biases.len() != self.outputs {
            return Err(ShapeError::LayerData {
                layer: index,
                inputs: self.inputs,
                outputs: self.outputs,
                weights: self.weights.len(),
                biases: self.biases.len(),
            });
        }
        Ok(())
    }

    fn same_shape(&self, other: &Layer) -> bool {
        self.inputs == other.inputs && self.outputs == other.outputs
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    pub fn biases_mut(&mut self) -> &mut [f32] {
        &mut self.biases
    }

    fn apply(&self, input: &[f32]) -> Vec<f32> {
        let mut out = self.biases.clone();
        for (row, &x) in self.weights.chunks_exact(self.outputs).zip(input) {
            for (o, &w) in out.iter_mut().zip(row) {
                *o += x * w;
            }
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedforwardNet {
    input_size: usize,
    hidden_sizes: Vec<usize>,
    output_size: usize,
    layers: Vec<Layer>,
}

impl FeedforwardNet {
    /// Random He-initialised network. Zero widths are not rejected here; the
    /// result fails `validate` and `forward` with [`ShapeError::EmptyLayer`].
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        hidden_sizes: &[usize],
        output_size: usize,
        rng: &mut R,
    ) -> Self {
        let widths: Vec<usize> = std::iter::once(input_size)
            .chain(hidden_sizes.iter().copied())
            .chain(std::iter::once(output_size))
            .collect();
        let layers = widths
            .windows(2)
            .map(|pair| Layer::random(pair[0], pair[1], rng))
            .collect();
        Self {
            input_size,
            hidden_sizes: hidden_sizes.to_vec(),
            output_size,
            layers,
        }
    }

    /// Assemble a network from explicit layers, checking that widths chain.
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self, ShapeError> {
        let (first, last) = match (layers.first(), layers.last()) {
            (Some(first), Some(last)) => (first.inputs, last.outputs),
            _ => return Err(ShapeError::NoLayers),
        };
        let hidden_sizes = layers[..layers.len() - 1]
            .iter()
            .map(|l| l.outputs)
            .collect();
        let net = Self {
            input_size: first,
            hidden_sizes,
            output_size: last,
            layers,
        };
        net.validate()?;
        Ok(net)
    }

    /// Re-check every shape invariant. Deserialised networks must pass this
    /// before use.
    pub fn validate(&self) -> Result<(), ShapeError> {
        if self.layers.is_empty() {
            return Err(ShapeError::NoLayers);
        }
        let mut expected = self.input_size;
        for (i, layer) in self.layers.iter().enumerate() {
            layer.check(i)?;
            if layer.inputs != expected {
                return Err(ShapeError::LayerChain {
                    layer: i,
                    expected,
                    actual: layer.inputs,
                });
            }
            if i + 1 < self.layers.len() && self.hidden_sizes.get(i) != Some(&layer.outputs) {
                return Err(ShapeError::Topology {
                    expected: format!("{:?}", self.hidden_sizes),
                    actual: format!("hidden width {} at layer {i}", layer.outputs),
                });
            }
            expected = layer.outputs;
        }
        if expected != self.output_size || self.hidden_sizes.len() + 1 != self.layers.len() {
            return Err(ShapeError::Topology {
                expected: self.topology(),
                actual: format!("{} layers ending at width {expected}", self.layers.len()),
            });
        }
        Ok(())
    }

    /// `"in->[h1, h2]->out"`, used in error messages and topology checks.
    pub fn topology(&self) -> String {
        format!(
            "{}->{:?}->{}",
            self.input_size, self.hidden_sizes, self.output_size
        )
    }

    pub fn has_topology(&self, input_size: usize, hidden_sizes: &[usize], output_size: usize) -> bool {
        self.input_size == input_size
            && self.hidden_sizes == hidden_sizes
            && self.output_size == output_size
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_sizes(&self) -> &[usize] {
        &self.hidden_sizes
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weights.len() + l.biases.len())
            .sum()
    }

    pub fn forward(&self, inputs: &[f32]) -> Result<Vec<f32>, ShapeError> {
        if inputs.len() != self.input_size {
            return Err(ShapeError::InputSize {
                expected: self.input_size,
                actual: inputs.len(),
            });
        }
        let (last, hidden) = self.layers.split_last().ok_or(ShapeError::NoLayers)?;
        if let Some(layer) = self.layers.iter().position(|l| l.outputs == 0) {
            return Err(ShapeError::EmptyLayer { layer });
        }
        let mut x = inputs.to_vec();
        for layer in hidden {
            x = layer.apply(&x);
            for v in &mut x {
                *v = v.max(0.0);
            }
        }
        let mut out = last.apply(&x);
        for v in &mut out {
            *v = v.tanh();
        }
        Ok(out)
    }

    /// Index of the strongest output; the first one wins ties.
    pub fn decide(&self, inputs: &[f32]) -> Result<usize, ShapeError> {
        let outputs = self.forward(inputs)?;
        let mut best = 0;
        for (i, &v) in outputs.iter().enumerate().skip(1) {
            if v > outputs[best] {
                best = i;
            }
        }
        Ok(best)
    }

    /// Each weight and bias independently receives `N(0,1)·strength` with
    /// probability `rate`.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R, rate: f32, strength: f32) {
        for layer in &mut self.layers {
            for v in layer.weights.iter_mut().chain(layer.biases.iter_mut()) {
                if rng.random::<f32>() < rate {
                    *v += gaussian(rng) * strength;
                }
            }
        }
    }

    /// Uniform per-gene crossover: every weight and bias comes from `self` or
    /// `other` with equal probability.
    pub fn crossover<R: Rng + ?Sized>(
        &self,
        other: &FeedforwardNet,
        rng: &mut R,
    ) -> Result<FeedforwardNet, ShapeError> {
        if self.layers.len() != other.layers.len()
            || !self
                .layers
                .iter()
                .zip(&other.layers)
                .all(|(a, b)| a.same_shape(b))
        {
            return Err(ShapeError::ParentMismatch);
        }
        let mut child = self.clone();
        for (layer, theirs) in child.layers.iter_mut().zip(&other.layers) {
            for (v, &t) in layer.weights.iter_mut().zip(&theirs.weights) {
                if !rng.random_bool(0.5) {
                    *v = t;
                }
            }
            for (v, &t) in layer.biases.iter_mut().zip(&theirs.biases) {
                if !rng.random_bool(0.5) {
                    *v = t;
                }
            }
        }
        Ok(child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;
    use proptest::prelude::*;

    fn flat(net: &FeedforwardNet) -> Vec<f32> {
        net.layers()
            .iter()
            .flat_map(|l| l.weights().iter().chain(l.biases()).copied())
            .collect()
    }

    #[test]
    fn new_builds_chained_layers_with_zero_biases() {
        let mut rng = create_rng(1);
        let net = FeedforwardNet::new(33, &[20, 14], 7, &mut rng);
        assert!(net.validate().is_ok());
        assert_eq!(net.layers().len(), 3);
        assert_eq!(net.parameter_count(), 33 * 20 + 20 + 20 * 14 + 14 + 14 * 7 + 7);
        assert!(net.layers().iter().all(|l| l.biases().iter().all(|&b| b == 0.0)));
        assert!(net.layers()[0].weights().iter().any(|&w| w != 0.0));
    }

    #[test]
    fn forward_rejects_wrong_input_length() {
        let mut rng = create_rng(2);
        let net = FeedforwardNet::new(4, &[3], 2, &mut rng);
        assert_eq!(
            net.forward(&[0.0; 5]),
            Err(ShapeError::InputSize {
                expected: 4,
                actual: 5
            })
        );
        assert!(net.decide(&[0.0; 3]).is_err());
    }

    #[test]
    fn forward_applies_relu_then_tanh() {
        // 1 -> [1] -> 1 with w1 = -1 (relu clamps), w2 = 1, b2 = 0.5
        let hidden = Layer::new(1, 1, vec![-1.0], vec![0.0]).unwrap();
        let out = Layer::new(1, 1, vec![1.0], vec![0.5]).unwrap();
        let net = FeedforwardNet::from_layers(vec![hidden, out]).unwrap();
        let y = net.forward(&[2.0]).unwrap();
        assert!((y[0] - 0.5f32.tanh()).abs() < 1e-6);
    }

    #[test]
    fn decide_breaks_ties_towards_lowest_index() {
        let out = Layer::new(1, 4, vec![0.0; 4], vec![0.2, 0.7, 0.7, 0.1]).unwrap();
        let net = FeedforwardNet::from_layers(vec![out]).unwrap();
        assert_eq!(net.decide(&[1.0]).unwrap(), 1);
    }

    #[test]
    fn mutate_with_zero_rate_is_noop() {
        let mut rng = create_rng(3);
        let mut net = FeedforwardNet::new(6, &[5], 3, &mut rng);
        let before = net.clone();
        net.mutate(&mut rng, 0.0, 10.0);
        assert_eq!(net, before);
    }

    #[test]
    fn mutate_with_zero_strength_is_noop() {
        let mut rng = create_rng(4);
        let mut net = FeedforwardNet::new(6, &[5], 3, &mut rng);
        let before = net.clone();
        net.mutate(&mut rng, 1.0, 0.0);
        assert_eq!(flat(&net), flat(&before));
    }

    #[test]
    fn mutate_does_not_touch_the_clone_source() {
        let mut rng = create_rng(5);
        let parent = FeedforwardNet::new(6, &[5], 3, &mut rng);
        let snapshot = parent.clone();
        let mut child = parent.clone();
        child.mutate(&mut rng, 1.0, 1.0);
        assert_eq!(parent, snapshot);
        assert_ne!(flat(&child), flat(&parent));
    }

    #[test]
    fn self_crossover_is_identity() {
        let mut rng = create_rng(6);
        let a = FeedforwardNet::new(8, &[6, 4], 3, &mut rng);
        for _ in 0..5 {
            let child = a.crossover(&a, &mut rng).unwrap();
            assert_eq!(child, a);
        }
    }

    #[test]
    fn crossover_picks_every_gene_from_a_parent() {
        let mut rng = create_rng(7);
        let a = FeedforwardNet::new(8, &[6], 3, &mut rng);
        let b = FeedforwardNet::new(8, &[6], 3, &mut rng);
        let child = a.crossover(&b, &mut rng).unwrap();
        let (fa, fb, fc) = (flat(&a), flat(&b), flat(&child));
        assert!(fc
            .iter()
            .zip(fa.iter().zip(&fb))
            .all(|(c, (x, y))| c == x || c == y));
        // With ~100 weights both parents contribute.
        assert!(fc.iter().zip(&fa).any(|(c, x)| c != x));
        assert!(fc.iter().zip(&fb).any(|(c, y)| c != y));
    }

    #[test]
    fn crossover_rejects_shape_mismatch() {
        let mut rng = create_rng(8);
        let a = FeedforwardNet::new(8, &[6], 3, &mut rng);
        let b = FeedforwardNet::new(8, &[5], 3, &mut rng);
        assert_eq!(a.crossover(&b, &mut rng), Err(ShapeError::ParentMismatch));
    }

    #[test]
    fn from_layers_rejects_broken_chain() {
        let l1 = Layer::zeros(3, 4);
        let l2 = Layer::zeros(5, 2);
        assert!(matches!(
            FeedforwardNet::from_layers(vec![l1, l2]),
            Err(ShapeError::LayerChain { layer: 1, .. })
        ));
        assert_eq!(FeedforwardNet::from_layers(vec![]), Err(ShapeError::NoLayers));
        assert!(Layer::new(2, 2, vec![0.0; 3], vec![0.0; 2]).is_err());
    }

    #[test]
    fn zero_width_layers_are_shape_errors() {
        assert_eq!(
            FeedforwardNet::from_layers(vec![Layer::zeros(2, 0), Layer::zeros(0, 3)]),
            Err(ShapeError::EmptyLayer { layer: 0 })
        );
        assert_eq!(
            Layer::new(2, 0, vec![], vec![]),
            Err(ShapeError::EmptyLayer { layer: 0 })
        );

        let mut rng = create_rng(10);
        let net = FeedforwardNet::new(2, &[0], 3, &mut rng);
        assert_eq!(net.validate(), Err(ShapeError::EmptyLayer { layer: 0 }));
        assert_eq!(
            net.forward(&[1.0, 1.0]),
            Err(ShapeError::EmptyLayer { layer: 0 })
        );
        let mute = FeedforwardNet::new(2, &[], 0, &mut rng);
        assert_eq!(mute.decide(&[1.0, 1.0]), Err(ShapeError::EmptyLayer { layer: 0 }));
    }

    #[test]
    fn json_round_trip_is_exact() {
        let mut rng = create_rng(9);
        let net = FeedforwardNet::new(33, &[20, 14], 7, &mut rng);
        let json = serde_json::to_string(&net).unwrap();
        let back: FeedforwardNet = serde_json::from_str(&json).unwrap();
        let bits = |n: &FeedforwardNet| flat(n).iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&back), bits(&net));
        assert!(back.validate().is_ok());
    }

    proptest! {
        #[test]
        fn proptest_forward_length_and_range(
            input_size in 1usize..12,
            hidden in proptest::collection::vec(1usize..10, 0..3),
            output_size in 1usize..8,
            seed in any::<u64>(),
            scale in 0.0f32..50.0,
        ) {
            let mut rng = create_rng(seed);
            let net = FeedforwardNet::new(input_size, &hidden, output_size, &mut rng);
            let inputs: Vec<f32> = (0..input_size).map(|i| (i as f32 - 3.0) * scale).collect();
            let out = net.forward(&inputs).unwrap();
            prop_assert_eq!(out.len(), output_size);
            prop_assert!(out.iter().all(|v| v.is_finite() && (-1.0..=1.0).contains(v)));
        }
    }
}
