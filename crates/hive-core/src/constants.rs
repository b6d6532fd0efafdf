//! Fixed behavioural constants. Tunable run parameters live in [`crate::config::SimConfig`].

/// Features encoded per neighbour slot: content class, edibility, danger, enemy.
pub const SLOT_FEATURES: usize = 4;
/// Neighbour slots around a hex cell.
pub const NEIGHBOR_SLOTS: usize = 6;
/// Colony-context inputs: kin density, mother distance, novelty, is-mother flag.
pub const CONTEXT_INPUTS: usize = 4;
/// Goal signals produced by a mother's goal net.
pub const GOAL_SIGNALS: usize = 3;

/// Brain inputs: 6 slots × 4 features + hunger + points + context + goals = 33.
pub const BRAIN_INPUTS: usize =
    NEIGHBOR_SLOTS * SLOT_FEATURES + 2 + CONTEXT_INPUTS + GOAL_SIGNALS;
pub const BRAIN_HIDDEN: [usize; 2] = [20, 14];
/// Six directions plus "stay".
pub const BRAIN_OUTPUTS: usize = 7;
pub const STAY_ACTION: usize = 6;

pub const GOAL_INPUTS: usize = 4;
pub const GOAL_HIDDEN: [usize; 2] = [8, 6];

/// Recent positions remembered per creature.
pub const HISTORY_CAPACITY: usize = 6;

/// A creature becomes prey once its hunger reaches this fraction of `max_hunger`.
pub const EATABLE_HUNGER_FRACTION: f32 = 0.8;
/// Victim points are divided by this to compute transferred fat.
pub const FAT_DIVISOR: u32 = 10;
/// Percentage of transferred fat that feeds a living mother's hunger.
pub const MOTHER_FAT_SHARE_PERCENT: u64 = 30;
/// Hunger relieved by plain food.
pub const FOOD_HUNGER_RELIEF: u32 = 20;

pub const STAY_POINT_PENALTY: u32 = 5;
pub const STAY_HUNGER_PENALTY: u32 = 5;
pub const REVISIT_POINT_PENALTY: u32 = 10;
pub const REVISIT_HUNGER_PENALTY: u32 = 3;
pub const ENEMY_POINT_PENALTY: u32 = 8;
pub const ENEMY_HUNGER_PENALTY: u32 = 2;
pub const FOOD_REWARD: u32 = 2;
/// Upper bound of the bonus a mother's food-priority signal adds to `FOOD_REWARD`.
pub const FOOD_PRIORITY_BONUS_SCALE: f32 = 5.0;

/// Points normalisation for sensor and goal inputs.
pub const POINTS_NORM: f32 = 100.0;
/// Offspring-count normalisation for goal inputs.
pub const OFFSPRING_NORM: f32 = 10.0;
/// Hex distance at which the mother-distance input saturates.
pub const MOTHER_DISTANCE_NORM: f32 = 20.0;

/// Chance that an empty cell becomes food after terrain generation.
pub const FOOD_SEED_PROBABILITY: f64 = 0.1;
/// A wall with fewer wall neighbours than this erodes to empty.
pub const WALL_SURVIVAL_MIN: usize = 3;
/// An empty cell with at least this many wall neighbours fills in.
pub const WALL_BIRTH_MIN: usize = 5;

/// Random picks from the empty-cell cache before falling back to probing.
pub const EMPTY_SAMPLE_ATTEMPTS: usize = 8;
/// Random whole-grid probes before falling back to a full scan.
pub const RANDOM_PROBE_ATTEMPTS: usize = 64;

/// Mutation rounds applied to an elite spawn.
pub const ELITE_MUTATION_ROUNDS: usize = 2;

pub const COLOR_ATTEMPTS: usize = 1000;
pub const COLOR_MIN_BRIGHTNESS: f32 = 100.0;

/// Default champion save file.
pub const DEFAULT_BEST_FILE: &str = "best_mother.json";
