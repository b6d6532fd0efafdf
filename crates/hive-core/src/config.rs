use crate::layout::HexLayout;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Deterministic seed for reproducible simulation runs.
    pub seed: u64,
    /// World width in pixels.
    pub world_width: f64,
    /// World height in pixels.
    pub world_height: f64,
    /// Hex circumradius in pixels.
    pub hex_size: f64,
    /// Hunger at which a creature dies.
    pub max_hunger: u32,
    /// Highest hunger at which a creature may still reproduce.
    pub reproduction_threshold: u32,
    /// Hunger added to a parent whose reproduction roll succeeds.
    pub reproduction_cost: u32,
    /// Per-tick chance that a creature attempts reproduction.
    pub reproduction_probability: f64,
    /// Per-gene mutation probability for offspring brains.
    pub mutation_rate: f32,
    /// Standard deviation scale of offspring mutations.
    pub mutation_strength: f32,
    /// Per-gene mutation probability for elite spawns.
    pub elite_mutation_rate: f32,
    /// Standard deviation scale of elite mutations.
    pub elite_mutation_strength: f32,
    /// Ticks between elite spawn attempts.
    pub evolution_spawn_interval: u64,
    /// Chance that an elite spawn attempt places a creature.
    pub evolution_spawn_probability: f64,
    /// Hunger added when a creature steps onto a toxin.
    pub toxin_damage: u32,
    /// Per-empty-cell chance of toxin seeding on a toxin tick.
    pub toxin_spawn_probability: f64,
    /// Ticks between toxin seeding passes.
    pub toxin_spawn_interval: u64,
    /// Initial wall density before cellular-automaton smoothing.
    pub terrain_wall_probability: f64,
    /// Cellular-automaton smoothing passes.
    pub terrain_iterations: usize,
    /// Root creatures placed by `World::new`.
    pub initial_colonies: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            world_width: 1800.0,
            world_height: 900.0,
            hex_size: 10.0,
            max_hunger: 500,
            reproduction_threshold: 250,
            reproduction_cost: 5,
            reproduction_probability: 0.15,
            mutation_rate: 0.15,
            mutation_strength: 0.4,
            elite_mutation_rate: 0.3,
            elite_mutation_strength: 0.6,
            evolution_spawn_interval: 1,
            evolution_spawn_probability: 0.5,
            toxin_damage: 100,
            toxin_spawn_probability: 0.01,
            toxin_spawn_interval: 10,
            terrain_wall_probability: 0.42,
            terrain_iterations: 4,
            initial_colonies: 12,
        }
    }
}

macro_rules! define_sim_config_error {
    (
        $(
            $variant:ident $( { $($field:ident : $type:ty),* } )? => $fmt:literal $(, $arg:expr)*
        );* $(;)?
    ) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum SimConfigError {
            $(
                $variant $( { $($field : $type),* } )?,
            )*
        }

        impl std::fmt::Display for SimConfigError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$variant $( { $($field),* } )? => write!(f, $fmt $(, $arg)*),
                    )*
                }
            }
        }
    };
}

define_sim_config_error! {
    InvalidWorldDimensions => "world_width and world_height must be positive and finite";
    InvalidHexSize => "hex_size must be positive and finite";
    EmptyWorld => "world dimensions leave no room for a single hex";
    WorldTooLarge { max: usize, actual: usize } => "world holds {} cells, more than the supported {}", actual, max;
    InvalidMaxHunger => "max_hunger must be positive";
    InvalidReproductionThreshold => "reproduction_threshold must not exceed max_hunger";
    InvalidReproductionProbability => "reproduction_probability must be finite and within [0,1]";
    InvalidMutationRate => "mutation_rate must be finite and within [0,1]";
    InvalidMutationStrength => "mutation_strength must be finite and non-negative";
    InvalidEliteMutationRate => "elite_mutation_rate must be finite and within [0,1]";
    InvalidEliteMutationStrength => "elite_mutation_strength must be finite and non-negative";
    InvalidEvolutionSpawnInterval => "evolution_spawn_interval must be positive";
    InvalidEvolutionSpawnProbability => "evolution_spawn_probability must be finite and within [0,1]";
    InvalidToxinSpawnInterval => "toxin_spawn_interval must be positive";
    InvalidToxinSpawnProbability => "toxin_spawn_probability must be finite and within [0,1]";
    InvalidTerrainWallProbability => "terrain_wall_probability must be finite and within [0,1]";
    TooManyInitialColonies { max: usize, actual: usize } => "initial_colonies ({}) exceeds the cell count ({})", actual, max;
}

impl std::error::Error for SimConfigError {}

fn is_probability(p: f64) -> bool {
    p.is_finite() && (0.0..=1.0).contains(&p)
}

impl SimConfig {
    pub const MAX_WORLD_CELLS: usize = 1_000_000;

    pub fn validate(&self) -> Result<(), SimConfigError> {
        self.validate_world()?;
        self.validate_lifecycle()?;
        self.validate_mutation()?;
        self.validate_schedules()?;
        Ok(())
    }

    fn validate_world(&self) -> Result<(), SimConfigError> {
        if !(self.world_width.is_finite()
            && self.world_width > 0.0
            && self.world_height.is_finite()
            && self.world_height > 0.0)
        {
            return Err(SimConfigError::InvalidWorldDimensions);
        }
        if !(self.hex_size.is_finite() && self.hex_size > 0.0) {
            return Err(SimConfigError::InvalidHexSize);
        }
        let layout = HexLayout::from_config(self);
        let rows = layout.row_count();
        if rows == 0 || layout.columns_in_row(0) == 0 {
            return Err(SimConfigError::EmptyWorld);
        }
        // Rows alternate between two lengths.
        let cells = layout
            .columns_in_row(0)
            .saturating_mul(rows.div_ceil(2))
            .saturating_add(layout.columns_in_row(1).saturating_mul(rows / 2));
        if cells > Self::MAX_WORLD_CELLS {
            return Err(SimConfigError::WorldTooLarge {
                max: Self::MAX_WORLD_CELLS,
                actual: cells,
            });
        }
        if self.initial_colonies > cells {
            return Err(SimConfigError::TooManyInitialColonies {
                max: cells,
                actual: self.initial_colonies,
            });
        }
        if !is_probability(self.terrain_wall_probability) {
            return Err(SimConfigError::InvalidTerrainWallProbability);
        }
        Ok(())
    }

    fn validate_lifecycle(&self) -> Result<(), SimConfigError> {
        if self.max_hunger == 0 {
            return Err(SimConfigError::InvalidMaxHunger);
        }
        if self.reproduction_threshold > self.max_hunger {
            return Err(SimConfigError::InvalidReproductionThreshold);
        }
        if !is_probability(self.reproduction_probability) {
            return Err(SimConfigError::InvalidReproductionProbability);
        }
        Ok(())
    }

    fn validate_mutation(&self) -> Result<(), SimConfigError> {
        if !is_probability(self.mutation_rate as f64) {
            return Err(SimConfigError::InvalidMutationRate);
        }
        if !(self.mutation_strength.is_finite() && self.mutation_strength >= 0.0) {
            return Err(SimConfigError::InvalidMutationStrength);
        }
        if !is_probability(self.elite_mutation_rate as f64) {
            return Err(SimConfigError::InvalidEliteMutationRate);
        }
        if !(self.elite_mutation_strength.is_finite() && self.elite_mutation_strength >= 0.0) {
            return Err(SimConfigError::InvalidEliteMutationStrength);
        }
        Ok(())
    }

    fn validate_schedules(&self) -> Result<(), SimConfigError> {
        if self.evolution_spawn_interval == 0 {
            return Err(SimConfigError::InvalidEvolutionSpawnInterval);
        }
        if !is_probability(self.evolution_spawn_probability) {
            return Err(SimConfigError::InvalidEvolutionSpawnProbability);
        }
        if self.toxin_spawn_interval == 0 {
            return Err(SimConfigError::InvalidToxinSpawnInterval);
        }
        if !is_probability(self.toxin_spawn_probability) {
            return Err(SimConfigError::InvalidToxinSpawnProbability);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_json_deserializes_with_defaults() {
        let json = r#"{ "seed": 7, "max_hunger": 300, "toxin_damage": 40 }"#;
        let cfg: SimConfig = serde_json::from_str(json).expect("partial config should parse");
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.max_hunger, 300);
        assert_eq!(cfg.toxin_damage, 40);
        assert_eq!(cfg.reproduction_threshold, 250);
        assert_eq!(cfg.world_width, 1800.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_bad_world_geometry() {
        let cfg = SimConfig {
            world_width: f64::NAN,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(SimConfigError::InvalidWorldDimensions));

        let cfg = SimConfig {
            hex_size: 0.0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(SimConfigError::InvalidHexSize));

        let cfg = SimConfig {
            world_width: 5.0,
            world_height: 5.0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(SimConfigError::EmptyWorld));

        let cfg = SimConfig {
            hex_size: 0.1,
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SimConfigError::WorldTooLarge { .. })
        ));
    }

    #[test]
    fn rejects_threshold_above_max_hunger() {
        let cfg = SimConfig {
            max_hunger: 100,
            ..SimConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(SimConfigError::InvalidReproductionThreshold)
        );
    }

    #[test]
    fn rejects_out_of_range_probabilities_and_zero_intervals() {
        let cases = [
            (
                SimConfig {
                    reproduction_probability: 1.5,
                    ..SimConfig::default()
                },
                SimConfigError::InvalidReproductionProbability,
            ),
            (
                SimConfig {
                    mutation_rate: -0.1,
                    ..SimConfig::default()
                },
                SimConfigError::InvalidMutationRate,
            ),
            (
                SimConfig {
                    elite_mutation_strength: f32::INFINITY,
                    ..SimConfig::default()
                },
                SimConfigError::InvalidEliteMutationStrength,
            ),
            (
                SimConfig {
                    toxin_spawn_interval: 0,
                    ..SimConfig::default()
                },
                SimConfigError::InvalidToxinSpawnInterval,
            ),
            (
                SimConfig {
                    evolution_spawn_interval: 0,
                    ..SimConfig::default()
                },
                SimConfigError::InvalidEvolutionSpawnInterval,
            ),
        ];
        for (cfg, expected) in cases {
            assert_eq!(cfg.validate(), Err(expected));
        }
    }

    #[test]
    fn error_messages_name_the_field() {
        let msg = SimConfigError::TooManyInitialColonies { max: 4, actual: 9 }.to_string();
        assert!(msg.contains("initial_colonies (9)"));
        assert!(msg.contains("(4)"));
    }
}
