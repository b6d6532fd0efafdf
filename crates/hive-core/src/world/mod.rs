use crate::color::{content_color, fallback_color, ColorRegistry, Rgb};
use crate::colony::Population;
use crate::config::{SimConfig, SimConfigError};
use crate::constants::{BRAIN_HIDDEN, BRAIN_INPUTS, BRAIN_OUTPUTS};
use crate::creature::{Creature, CreatureId};
use crate::goal::GoalNet;
use crate::grid::{Cell, HexGrid, Position};
use crate::layout::HexLayout;
use crate::metrics::{PopulationStats, RunSummary, StepReport};
use crate::nn::{FeedforwardNet, ShapeError};
use crate::persistence::{Champion, PersistError};
use crate::rng::create_rng;
use rand_chacha::ChaCha12Rng;
use std::path::Path;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldInitError {
    #[error(transparent)]
    Config(#[from] SimConfigError),
    #[error("grid has no cells")]
    EmptyGrid,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    #[error("creature {id:?} could not think: {source}")]
    Shape {
        id: CreatureId,
        #[source]
        source: ShapeError,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExperimentError {
    #[error("sample_every must be positive")]
    InvalidSampleEvery,
    #[error("steps ({actual}) exceed supported maximum ({max})")]
    TooManySteps { max: usize, actual: usize },
    #[error(transparent)]
    Step(#[from] StepError),
}

/// One cell as the presentation layer sees it.
#[derive(Clone, Copy, Debug)]
pub struct CellView<'a> {
    pub position: Position,
    pub row_index: usize,
    /// Pixel centre.
    pub center: [f64; 2],
    pub cell: Cell,
    pub creature: Option<&'a Creature>,
}

impl CellView<'_> {
    pub fn color(&self) -> Rgb {
        match self.creature {
            Some(c) => c.color,
            None => content_color(self.cell).unwrap_or(crate::color::EMPTY_COLOR),
        }
    }
}

pub struct World {
    config: SimConfig,
    layout: HexLayout,
    grid: HexGrid,
    population: Population,
    colors: ColorRegistry,
    rng: ChaCha12Rng,
    champion: Option<Champion>,
    tick: u64,
    total_births: usize,
    total_removed: usize,
    elite_spawns: usize,
}

impl World {
    pub const MAX_EXPERIMENT_STEPS: usize = 10_000_000;

    /// Build the configured world: layout grid, generated terrain and
    /// `initial_colonies` root creatures on random empty cells.
    pub fn new(config: SimConfig) -> Result<Self, WorldInitError> {
        config.validate()?;
        let layout = HexLayout::from_config(&config);
        let grid = HexGrid::from_layout(&layout);
        let rng = create_rng(config.seed);
        let mut world = Self::assemble(config, layout, grid, rng)?;

        world.grid.generate_terrain(
            world.config.terrain_wall_probability,
            world.config.terrain_iterations,
            &mut world.rng,
        );
        for _ in 0..world.config.initial_colonies {
            let Some(pos) = world.grid.sample_empty_cell(&mut world.rng) else {
                break;
            };
            world.spawn_root(pos, None);
        }
        Ok(world)
    }

    /// Wrap a hand-built grid. No terrain is generated and no creatures are
    /// placed.
    pub fn with_grid(config: SimConfig, grid: HexGrid) -> Result<Self, WorldInitError> {
        let rng = create_rng(config.seed);
        Self::with_grid_and_rng(config, grid, rng)
    }

    pub fn with_grid_and_rng(
        config: SimConfig,
        grid: HexGrid,
        rng: ChaCha12Rng,
    ) -> Result<Self, WorldInitError> {
        config.validate()?;
        let widest = (0..grid.row_count())
            .filter_map(|i| grid.row_key(i).and_then(|k| grid.row_len(k)))
            .max()
            .unwrap_or(0);
        let layout = HexLayout::with_dimensions(widest, grid.row_count(), config.hex_size);
        Self::assemble(config, layout, grid, rng)
    }

    fn assemble(
        config: SimConfig,
        layout: HexLayout,
        grid: HexGrid,
        rng: ChaCha12Rng,
    ) -> Result<Self, WorldInitError> {
        if grid.cell_count() == 0 {
            return Err(WorldInitError::EmptyGrid);
        }
        Ok(Self {
            population: Population::new(config.max_hunger),
            config,
            layout,
            grid,
            colors: ColorRegistry::new(),
            rng,
            champion: None,
            tick: 0,
            total_births: 0,
            total_removed: 0,
            elite_spawns: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn layout(&self) -> &HexLayout {
        &self.layout
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn colors(&self) -> &ColorRegistry {
        &self.colors
    }

    pub fn champion(&self) -> Option<&Champion> {
        self.champion.as_ref()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn population_stats(&self) -> PopulationStats {
        PopulationStats::collect(&self.population)
    }

    /// Every cell in row-major order with its pixel centre and occupant.
    pub fn cells(&self) -> impl Iterator<Item = CellView<'_>> + '_ {
        self.grid.cells().map(move |(position, cell)| {
            let row_index = self.grid.row_index(position.row).unwrap_or(0);
            CellView {
                position,
                row_index,
                center: self.layout.center(position.column, row_index),
                cell,
                creature: cell.creature().and_then(|id| self.population.get(id)),
            }
        })
    }

    /// Place a fresh mother on an empty cell. Returns `None` if the cell is
    /// missing or not empty.
    pub fn place_root_creature(&mut self, pos: Position) -> Option<CreatureId> {
        if self.grid.get(pos) != Some(Cell::Empty) {
            return None;
        }
        Some(self.spawn_root(pos, None))
    }

    /// Flip a cell between wall and empty. Any other content is left alone.
    pub fn toggle_wall(&mut self, pos: Position) -> bool {
        let next = match self.grid.get(pos) {
            Some(Cell::Wall) => Cell::Empty,
            Some(Cell::Empty) => Cell::Wall,
            _ => return false,
        };
        self.grid.set(pos, next);
        true
    }

    pub fn position_at(&self, x: f64, y: f64) -> Option<Position> {
        let (column, row_index) = self.layout.locate(x, y)?;
        let pos = Position::new(column, self.grid.row_key(row_index)?);
        self.grid.contains(pos).then_some(pos)
    }

    pub fn place_root_creature_at(&mut self, x: f64, y: f64) -> Option<CreatureId> {
        let pos = self.position_at(x, y)?;
        self.place_root_creature(pos)
    }

    pub fn toggle_wall_at(&mut self, x: f64, y: f64) -> bool {
        self.position_at(x, y)
            .is_some_and(|pos| self.toggle_wall(pos))
    }

    /// Insert a mother at `pos`, seeded from `nets` or fresh random networks.
    fn spawn_root(&mut self, pos: Position, nets: Option<(FeedforwardNet, GoalNet)>) -> CreatureId {
        let (brain, goal_net) = nets.unwrap_or_else(|| {
            (
                FeedforwardNet::new(BRAIN_INPUTS, &BRAIN_HIDDEN, BRAIN_OUTPUTS, &mut self.rng),
                GoalNet::new(&mut self.rng),
            )
        });
        let reserved = self.colors.reserve(&mut self.rng);
        let color = reserved.unwrap_or_else(|| fallback_color(&mut self.rng));
        let mut creature = Creature::mother(pos, brain, goal_net, color, self.tick);
        creature.color_reserved = reserved.is_some();
        creature.remember(pos);
        let id = self.population.insert(creature);
        self.grid.set(pos, Cell::Occupied(id));
        id
    }

    pub fn save_best(&self, path: &Path) -> Result<(), PersistError> {
        self.champion
            .as_ref()
            .ok_or(PersistError::NoChampion)?
            .save(path)
    }

    /// Adopt the champion stored at `path`. Failures are logged and leave
    /// the world without a champion.
    pub fn load_best(&mut self, path: &Path) -> bool {
        match Champion::load(path) {
            Ok(champion) => {
                self.champion = Some(champion);
                true
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not load champion; starting fresh");
                self.champion = None;
                false
            }
        }
    }

    pub fn run_experiment(
        &mut self,
        steps: usize,
        sample_every: usize,
    ) -> Result<RunSummary, ExperimentError> {
        if sample_every == 0 {
            return Err(ExperimentError::InvalidSampleEvery);
        }
        if steps > Self::MAX_EXPERIMENT_STEPS {
            return Err(ExperimentError::TooManySteps {
                max: Self::MAX_EXPERIMENT_STEPS,
                actual: steps,
            });
        }
        let births_before = self.total_births;
        let removed_before = self.total_removed;
        let elites_before = self.elite_spawns;
        let mut samples = Vec::new();
        for step in 1..=steps {
            let report = self.step()?;
            if step % sample_every == 0 || step == steps {
                samples.push(crate::metrics::collect_step_metrics(
                    step,
                    &report,
                    &self.population,
                    &self.grid,
                    self.champion.as_ref().map(|c| c.points),
                ));
            }
        }
        let stats = self.population_stats();
        Ok(RunSummary {
            schema_version: 1,
            steps,
            sample_every,
            final_alive: stats.alive_count,
            final_mothers: stats.mother_count,
            champion_points: self.champion.as_ref().map(|c| c.points),
            total_births: self.total_births - births_before,
            total_removed: self.total_removed - removed_before,
            elite_spawns: self.elite_spawns - elites_before,
            samples,
        })
    }

    /// Advance one tick: think, prune, reproduce, elite spawn, toxins.
    pub fn step(&mut self) -> Result<StepReport, StepError> {
        let total_start = Instant::now();
        self.tick = self.tick.saturating_add(1);

        self.step_think_phase()?;
        let pruned = self.step_prune_phase();
        let births = self.step_reproduction_phase();
        let elite_spawned = self.step_evolution_phase();
        let toxins_seeded = self.step_toxin_phase();

        self.total_births += births;
        self.total_removed += pruned.removed;
        if elite_spawned {
            self.elite_spawns += 1;
        }
        let stats = self.population_stats();
        debug!(
            tick = self.tick,
            alive = stats.alive_count,
            births,
            removed = pruned.removed,
            "tick complete"
        );
        Ok(StepReport {
            tick: self.tick,
            births,
            removed: pruned.removed,
            dissolved_colonies: pruned.dissolutions.len(),
            elite_spawned,
            toxins_seeded,
            alive: stats.alive_count,
            mothers: stats.mother_count,
            total_us: total_start.elapsed().as_micros() as u64,
        })
    }
}

mod phases;
