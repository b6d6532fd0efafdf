pub mod color;
pub mod colony;
pub mod config;
pub mod constants;
pub mod creature;
pub mod goal;
pub mod grid;
pub mod layout;
pub mod metrics;
pub mod nn;
pub mod persistence;
pub mod rng;
pub mod world;

pub use colony::Population;
pub use config::{SimConfig, SimConfigError};
pub use creature::{Creature, CreatureId, PointsHandle};
pub use goal::GoalNet;
pub use grid::{Cell, Direction, HexGrid, Position, RowKey};
pub use layout::HexLayout;
pub use metrics::{PopulationStats, RunSummary, StepMetrics, StepReport};
pub use nn::{FeedforwardNet, Layer, ShapeError};
pub use persistence::{Champion, PersistError};
pub use world::{CellView, ExperimentError, StepError, World, WorldInitError};
