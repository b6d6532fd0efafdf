use crate::colony::Population;
use crate::grid::{Cell, HexGrid};
use serde::{Deserialize, Serialize};

/// What a single [`crate::World::step`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub tick: u64,
    pub births: usize,
    pub removed: usize,
    pub dissolved_colonies: usize,
    pub elite_spawned: bool,
    pub toxins_seeded: usize,
    pub alive: usize,
    pub mothers: usize,
    pub total_us: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    /// Entries on the live list, corpses included.
    pub population_size: usize,
    pub alive_count: usize,
    pub mother_count: usize,
    pub retired_mothers: usize,
    pub mean_hunger: f32,
    pub mean_generation: f32,
    pub max_generation: u32,
}

impl PopulationStats {
    pub fn collect(population: &Population) -> Self {
        let mut stats = PopulationStats {
            population_size: population.len(),
            retired_mothers: population.arena_len() - population.len(),
            ..Self::default()
        };
        let mut hunger_sum = 0u64;
        let mut generation_sum = 0u64;
        for (_, c) in population.iter_live().filter(|(_, c)| c.is_alive()) {
            stats.alive_count += 1;
            if c.is_mother() {
                stats.mother_count += 1;
            }
            hunger_sum += c.hunger as u64;
            generation_sum += c.generation as u64;
            stats.max_generation = stats.max_generation.max(c.generation);
        }
        if stats.alive_count > 0 {
            stats.mean_hunger = hunger_sum as f32 / stats.alive_count as f32;
            stats.mean_generation = generation_sum as f32 / stats.alive_count as f32;
        }
        stats
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepMetrics {
    pub step: usize,
    pub tick: u64,
    pub alive_count: usize,
    pub mother_count: usize,
    pub birth_count: usize,
    pub removed_count: usize,
    pub mean_hunger: f32,
    pub mean_generation: f32,
    pub max_generation: u32,
    pub food_cells: usize,
    pub toxin_cells: usize,
    pub wall_cells: usize,
    pub champion_points: Option<u32>,
}

pub(crate) fn collect_step_metrics(
    step: usize,
    report: &StepReport,
    population: &Population,
    grid: &HexGrid,
    champion_points: Option<u32>,
) -> StepMetrics {
    let stats = PopulationStats::collect(population);
    let mut m = StepMetrics {
        step,
        tick: report.tick,
        alive_count: stats.alive_count,
        mother_count: stats.mother_count,
        birth_count: report.births,
        removed_count: report.removed,
        mean_hunger: stats.mean_hunger,
        mean_generation: stats.mean_generation,
        max_generation: stats.max_generation,
        champion_points,
        ..StepMetrics::default()
    };
    for (_, cell) in grid.cells() {
        match cell {
            Cell::Food => m.food_cells += 1,
            Cell::Toxin => m.toxin_cells += 1,
            Cell::Wall => m.wall_cells += 1,
            Cell::Empty | Cell::Occupied(_) => {}
        }
    }
    m
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub steps: usize,
    pub sample_every: usize,
    pub final_alive: usize,
    pub final_mothers: usize,
    pub champion_points: Option<u32>,
    #[serde(default)]
    pub total_births: usize,
    #[serde(default)]
    pub total_removed: usize,
    #[serde(default)]
    pub elite_spawns: usize,
    pub samples: Vec<StepMetrics>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_population_has_zeroed_stats() {
        let stats = PopulationStats::collect(&Population::new(500));
        assert_eq!(stats, PopulationStats::default());
    }

    #[test]
    fn legacy_summary_json_fills_defaults() {
        let json = r#"{
            "steps": 10,
            "sample_every": 5,
            "final_alive": 3,
            "final_mothers": 1,
            "champion_points": null,
            "samples": [{ "step": 5, "alive_count": 4 }]
        }"#;
        let summary: RunSummary = serde_json::from_str(json).expect("summary should parse");
        assert_eq!(summary.schema_version, 1);
        assert_eq!(summary.total_births, 0);
        assert_eq!(summary.samples[0].alive_count, 4);
        assert_eq!(summary.samples[0].food_cells, 0);
    }

    #[test]
    fn step_metrics_count_cell_contents() {
        let mut grid = HexGrid::rectangular(4, 2);
        let pos = |c| crate::grid::Position::new(c, crate::grid::RowKey(0));
        grid.set(pos(0), Cell::Food);
        grid.set(pos(1), Cell::Food);
        grid.set(pos(2), Cell::Toxin);
        grid.set(pos(3), Cell::Wall);
        let report = StepReport {
            tick: 9,
            births: 2,
            ..StepReport::default()
        };
        let m = collect_step_metrics(1, &report, &Population::new(500), &grid, Some(40));
        assert_eq!((m.food_cells, m.toxin_cells, m.wall_cells), (2, 1, 1));
        assert_eq!(m.tick, 9);
        assert_eq!(m.birth_count, 2);
        assert_eq!(m.champion_points, Some(40));
    }
}
