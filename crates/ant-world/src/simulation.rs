//! Simulation engine: owns the grid and the population and resolves ticks.

use crate::grid::Grid;
use crate::organism::{Occupancy, Organism};
use ant_brain::{validate_genome, Action, Genome, MutationConfig, Mutator, SENSOR_INPUTS};
use ant_core::{
    Cell, EventCounters, OrganismId, PopulationStats, Position, Result, SimulationConfig, Stage,
    Viewport,
};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, event, info, trace, warn, Level};

/// Attempts at finding non-terrain ground for an initial organism before
/// accepting whatever was rolled last
const SPAWN_ATTEMPTS: usize = 100;

pub struct Simulation {
    grid: Grid,
    organisms: Vec<Organism>,
    mutator: Mutator,
    config: SimulationConfig,
    rng: ChaCha8Rng,
    tick: u64,
    counters: EventCounters,
}

impl Simulation {
    /// Build a simulation with a randomly initialized population
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let mut sim = Self::empty(config)?;
        for _ in 0..sim.config.population.ant_density {
            let genome = Genome::random(&mut sim.rng);
            sim.spawn_initial(genome);
        }
        Ok(sim)
    }

    /// Build a simulation whose initial population carries noisy copies of
    /// `seed`. The genome must read the standard sensor vector.
    pub fn with_seed_genome(config: SimulationConfig, seed: Genome) -> Result<Self> {
        validate_genome(&seed, SENSOR_INPUTS)?;
        let mut sim = Self::empty(config)?;
        for _ in 0..sim.config.population.ant_density {
            let mut genome = seed.clone();
            sim.mutator.mutate(&mut genome, &mut sim.rng);
            sim.spawn_initial(genome);
        }
        info!(
            population = sim.organisms.len(),
            parameters = seed.parameter_count(),
            "Seeded initial population from imported genome"
        );
        Ok(sim)
    }

    fn empty(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let grid = Grid::from_config(&config.world, rng.gen());
        let mutator = Mutator::new(MutationConfig {
            noise: config.genome_noise,
        });

        Ok(Self {
            grid,
            organisms: Vec::new(),
            mutator,
            config,
            rng,
            tick: 0,
            counters: EventCounters::default(),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Number of ticks resolved so far
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Live organisms in population order
    pub fn organisms(&self) -> &[Organism] {
        &self.organisms
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn counters(&self) -> &EventCounters {
        &self.counters
    }

    /// Classify a coordinate, generating it on first access
    pub fn classify(&mut self, pos: Position) -> Cell {
        self.grid.classify(pos)
    }

    /// Eat the food at `pos`, if any
    pub fn consume_food(&mut self, pos: Position) -> bool {
        self.grid.consume_food(pos)
    }

    /// First organism in population order standing at `pos`
    pub fn organism_at(&self, pos: Position) -> Option<&Organism> {
        self.organisms.iter().find(|o| o.position == pos)
    }

    pub fn organism(&self, id: OrganismId) -> Option<&Organism> {
        self.organisms.iter().find(|o| o.id == id)
    }

    /// Place a new organism. The genome is checked against the sensor width.
    pub fn place_organism(
        &mut self,
        position: Position,
        stage: Stage,
        genome: Genome,
    ) -> Result<OrganismId> {
        validate_genome(&genome, SENSOR_INPUTS)?;
        let health = match stage {
            Stage::Egg => self.config.health.egg_health,
            _ => self.config.health.max_ant_health,
        };
        let organism = self.create_organism(position, stage, health, genome);
        let id = organism.id;
        self.organisms.push(organism);
        Ok(id)
    }

    /// Replace an organism's genome with a noisy copy of `genome`.
    /// Returns `false` when no organism has that id.
    pub fn adopt_genome(&mut self, id: OrganismId, genome: &Genome) -> Result<bool> {
        validate_genome(genome, SENSOR_INPUTS)?;
        let Some(idx) = self.organisms.iter().position(|o| o.id == id) else {
            return Ok(false);
        };
        let mut adopted = genome.clone();
        self.mutator.mutate(&mut adopted, &mut self.rng);
        self.organisms[idx].set_genome(adopted);
        Ok(true)
    }

    /// Force `count` random cells inside `viewport` to hold food
    pub fn spawn_food(&mut self, viewport: Viewport, count: u32) {
        if viewport.is_empty() {
            return;
        }
        for _ in 0..count {
            let pos = viewport.random_position(&mut self.rng);
            self.grid.set_food(pos);
        }
        trace!(tick = self.tick, count, "Spawned food");
    }

    /// Advance the world by one tick
    pub fn tick(&mut self) {
        let decisions = self.decide();
        self.resolve(decisions);
    }

    /// Phase 1: every organism proposes an action against the positions as
    /// they stand at tick start
    fn decide(&mut self) -> Vec<Action> {
        let occupancy = Occupancy::from_organisms(&self.organisms);
        let Self {
            grid,
            organisms,
            rng,
            ..
        } = self;
        organisms
            .iter()
            .map(|organism| organism.decide_action(grid, &occupancy, rng))
            .collect()
    }

    /// Phases 2 to 4 for a set of proposals, one per organism present at
    /// tick start
    fn resolve(&mut self, decisions: Vec<Action>) {
        debug_assert_eq!(decisions.len(), self.organisms.len());
        let starting = decisions.len();

        self.resolve_mating(&decisions);
        self.act_and_age(&decisions);
        self.cull();

        self.tick += 1;
        trace!(
            tick = self.tick,
            starting_population = starting,
            population = self.organisms.len(),
            "Tick resolved"
        );
    }

    /// Phase 2: greedy first-come pairing of adjacent adults proposing to mate
    fn resolve_mating(&mut self, decisions: &[Action]) {
        let occupancy = Occupancy::from_organisms(&self.organisms);
        let mut paired = vec![false; decisions.len()];

        let eligible = |idx: usize, organisms: &[Organism], paired: &[bool]| {
            decisions[idx] == Action::Mate
                && organisms[idx].stage == Stage::Adult
                && !paired[idx]
        };

        for idx in 0..decisions.len() {
            if !eligible(idx, &self.organisms, &paired) {
                continue;
            }

            let partner = self.organisms[idx]
                .position
                .orthogonal()
                .into_iter()
                .find_map(|pos| {
                    occupancy
                        .at(pos)
                        .iter()
                        .copied()
                        .find(|&other| other != idx && eligible(other, &self.organisms, &paired))
                });

            if let Some(other) = partner {
                paired[idx] = true;
                paired[other] = true;
                trace!(
                    tick = self.tick,
                    initiator = %self.organisms[idx].id,
                    partner = %self.organisms[other].id,
                    "Paired for mating"
                );
                self.breed(idx, other);
            }
        }
    }

    fn breed(&mut self, idx: usize, other: usize) {
        if !self.below_cap() {
            trace!(tick = self.tick, "Mating produced no egg: population at cap");
            return;
        }

        let child_genome = match self.mutator.crossover(
            self.organisms[idx].genome(),
            self.organisms[other].genome(),
            &mut self.rng,
        ) {
            Ok(genome) => genome,
            Err(e) => {
                warn!(tick = self.tick, "Crossover failed: {}", e);
                return;
            }
        };

        let position = self.organisms[idx].position;
        let generation = self.organisms[idx]
            .generation
            .max(self.organisms[other].generation)
            + 1;
        let egg = self.lay_egg(position, generation, child_genome);

        self.organisms[idx].offspring += 1;
        self.organisms[other].offspring += 1;
        self.counters.sexual_births += 1;

        debug!(
            event = "sexual_birth",
            tick = self.tick,
            egg_id = %egg,
            generation,
            position = %position,
            population = self.organisms.len(),
            "Egg laid by mating pair"
        );
    }

    /// Phase 3: every non-mating proposal executes, then every organism
    /// present at tick start ages
    fn act_and_age(&mut self, decisions: &[Action]) {
        let mut occupancy = Occupancy::from_organisms(&self.organisms);
        for (idx, &action) in decisions.iter().enumerate() {
            if action != Action::Mate {
                self.process_action(idx, action, &mut occupancy);
            }
        }

        let population = &self.config.population;
        let health = &self.config.health;
        for organism in self.organisms.iter_mut().take(decisions.len()) {
            if let Some(stage) = organism.tick(population, health) {
                trace!(
                    tick = self.tick,
                    organism_id = %organism.id,
                    stage = %stage,
                    age = organism.age,
                    "Stage transition"
                );
            }
        }
    }

    /// Execute one action. `occupancy` tracks live positions and is kept in
    /// step with moves and births.
    fn process_action(&mut self, idx: usize, action: Action, occupancy: &mut Occupancy) {
        let max_health = self.config.health.max_ant_health;

        match action {
            Action::Up | Action::Down | Action::Left | Action::Right => {
                if let Some(direction) = action.direction() {
                    let target = self.organisms[idx].position.step(direction);
                    if self.grid.classify(target).is_passable() {
                        occupancy.relocate(idx, self.organisms[idx].position, target);
                        self.organisms[idx].move_to(target);
                    }
                }
            }

            Action::Attack => self.attack(idx, occupancy),

            Action::Eat => {
                let pos = self.organisms[idx].position;
                if self.grid.consume_food(pos) {
                    self.organisms[idx].heal(self.config.health.eat_gain, max_health);
                    self.counters.food_eaten += 1;
                }
            }

            Action::Sleep => {
                self.organisms[idx].heal(self.config.health.sleep_gain, max_health);
            }

            Action::Asexual => {
                if let Some(egg) = self.reproduce_asexually(idx) {
                    occupancy.insert(self.organisms[egg].position, egg);
                }
            }

            Action::Mate | Action::None => {}
        }
    }

    fn attack(&mut self, idx: usize, occupancy: &Occupancy) {
        let neighbors = self.organisms[idx].position.orthogonal();
        let Some(target) = neighbors
            .into_iter()
            .find_map(|pos| occupancy.at(pos).first().copied())
        else {
            return;
        };

        let health = &self.config.health;
        if self.organisms[target].stage == Stage::Egg {
            self.organisms[target].damage(health.egg_attack_damage);
            self.organisms[idx].heal(health.egg_attack_gain, health.max_ant_health);
        } else {
            self.organisms[target].damage(health.attack_damage);
        }
        self.counters.attacks += 1;

        trace!(
            tick = self.tick,
            attacker = %self.organisms[idx].id,
            target = %self.organisms[target].id,
            target_stage = %self.organisms[target].stage,
            target_health = self.organisms[target].health,
            "Attack"
        );
    }

    /// Returns the population slot of the new egg
    fn reproduce_asexually(&mut self, idx: usize) -> Option<usize> {
        if !self.below_cap() {
            return None;
        }

        let parent = &mut self.organisms[idx];
        parent.health /= 2;
        parent.offspring += 1;
        let position = parent.position;
        let generation = parent.generation + 1;
        let genome = parent.genome().clone();

        let egg = self.lay_egg(position, generation, genome);
        self.counters.asexual_births += 1;

        debug!(
            event = "asexual_birth",
            tick = self.tick,
            egg_id = %egg,
            generation,
            position = %position,
            population = self.organisms.len(),
            "Egg laid asexually"
        );
        Some(self.organisms.len() - 1)
    }

    /// Phase 4: drop organisms out of health, then organisms that turned old
    fn cull(&mut self) {
        let tick = self.tick;
        let before = self.organisms.len();

        self.organisms.retain(|o| {
            if !o.is_alive() {
                debug!(
                    event = "organism_death",
                    cause = "health",
                    tick,
                    organism_id = %o.id,
                    stage = %o.stage,
                    age = o.age,
                    offspring = o.offspring,
                    "Organism died"
                );
            }
            o.is_alive()
        });
        let after_health = self.organisms.len();

        self.organisms.retain(|o| {
            if o.stage == Stage::Old {
                debug!(
                    event = "organism_death",
                    cause = "age",
                    tick,
                    organism_id = %o.id,
                    age = o.age,
                    offspring = o.offspring,
                    "Organism died of old age"
                );
            }
            o.stage != Stage::Old
        });

        self.counters.starved_or_killed += (before - after_health) as u64;
        self.counters.died_of_age += (after_health - self.organisms.len()) as u64;
    }

    fn below_cap(&self) -> bool {
        self.organisms.len() < self.config.population.max_ants
    }

    fn lay_egg(&mut self, position: Position, generation: u32, genome: Genome) -> OrganismId {
        let mut egg = self.create_organism(
            position,
            Stage::Egg,
            self.config.health.egg_health,
            genome,
        );
        egg.generation = generation;
        let id = egg.id;
        self.organisms.push(egg);
        id
    }

    fn spawn_initial(&mut self, genome: Genome) {
        let area = self.config.spawn_area;
        let mut position = area.random_position(&mut self.rng);
        for _ in 1..SPAWN_ATTEMPTS {
            if self.grid.classify(position).is_passable() {
                break;
            }
            position = area.random_position(&mut self.rng);
        }

        let health = self.config.health.max_ant_health;
        let organism = self.create_organism(position, Stage::Adult, health, genome);
        self.organisms.push(organism);
    }

    fn create_organism(
        &mut self,
        position: Position,
        stage: Stage,
        health: i32,
        genome: Genome,
    ) -> Organism {
        let id = OrganismId::from_rng(&mut self.rng);
        let lifespan = self.roll_lifespan();
        Organism::new(id, position, stage, health, lifespan, genome)
    }

    /// Base lifespan shifted uniformly by at most `lifespan_jitter` either
    /// way, saturating at the ends of the range and never below 1
    fn roll_lifespan(&mut self) -> u64 {
        let base = self.config.population.ant_lifespan;
        let jitter = self.config.population.lifespan_jitter;
        if jitter == 0 {
            return base;
        }
        let offset = self.rng.gen_range(0..=jitter.saturating_mul(2));
        let lifespan = if offset >= jitter {
            base.saturating_add(offset - jitter)
        } else {
            base.saturating_sub(jitter - offset)
        };
        lifespan.max(1)
    }

    /// Snapshot of the live population
    pub fn stats(&self) -> PopulationStats {
        let mut stats = PopulationStats::new(self.tick);
        for organism in &self.organisms {
            stats.record(organism.stage, organism.health, organism.age);
        }
        stats.materialized_cells = self.grid.materialized();
        stats.counters = self.counters;
        stats
    }

    /// Emit population metrics as structured log events
    pub fn emit_population_metrics(&self) {
        let stats = self.stats();

        info!(
            event = "population_metrics",
            tick = stats.tick,
            total_population = stats.population,
            eggs = stats.eggs,
            adults = stats.adults,
            mean_health = format!("{:.1}", stats.mean_health),
            mean_age = format!("{:.1}", stats.mean_age),
            oldest_age = stats.oldest_age,
            births = stats.counters.births(),
            deaths = stats.counters.deaths(),
            food_eaten = stats.counters.food_eaten,
            materialized_cells = stats.materialized_cells,
            "Population metrics snapshot"
        );

        event!(
            Level::INFO,
            gauge_name = "population_total",
            gauge_value = stats.population,
            tick = stats.tick,
            "Population gauge"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ant_core::{HealthConfig, PopulationConfig, WorldConfig};
    use proptest::prelude::*;

    /// Flat, empty world with no initial population and no lifespan jitter
    fn bare_config() -> SimulationConfig {
        SimulationConfig {
            seed: 42,
            world: WorldConfig {
                food_density: 0.0,
                terrain_density: 0.0,
                ..Default::default()
            },
            population: PopulationConfig {
                ant_density: 0,
                lifespan_jitter: 0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn place(sim: &mut Simulation, x: i32, y: i32, stage: Stage) -> usize {
        let genome = Genome::random(&mut sim.rng);
        sim.place_organism(Position::new(x, y), stage, genome).unwrap();
        sim.organisms.len() - 1
    }

    #[test]
    fn test_simulation_creation() {
        let config = SimulationConfig {
            seed: 42,
            ..Default::default()
        };
        let sim = Simulation::new(config.clone()).unwrap();

        assert_eq!(sim.organisms().len(), config.population.ant_density);
        for organism in sim.organisms() {
            assert_eq!(organism.stage, Stage::Adult);
            assert_eq!(organism.health, config.health.max_ant_health);
            assert!(config.spawn_area.contains(organism.position));
        }
        assert_eq!(sim.current_tick(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SimulationConfig::default();
        config.world.food_density = 2.0;
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn test_seed_genome_shape_checked() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let bad = Genome::random_with_layers(10, &[10, 9], &mut rng);
        assert!(Simulation::with_seed_genome(SimulationConfig::default(), bad).is_err());

        let good = Genome::random(&mut rng);
        let config = SimulationConfig {
            genome_noise: 0.0,
            ..Default::default()
        };
        let sim = Simulation::with_seed_genome(config, good.clone()).unwrap();
        assert!(sim.organisms().iter().all(|o| o.genome() == &good));
    }

    #[test]
    fn test_same_seed_same_history() {
        let config = SimulationConfig {
            seed: 11,
            ..Default::default()
        };
        let mut a = Simulation::new(config.clone()).unwrap();
        let mut b = Simulation::new(config).unwrap();
        for _ in 0..30 {
            a.tick();
            b.tick();
        }
        let summary = |sim: &Simulation| {
            sim.organisms()
                .iter()
                .map(|o| (o.id, o.position, o.health, o.stage))
                .collect::<Vec<_>>()
        };
        assert_eq!(summary(&a), summary(&b));
        assert_eq!(a.counters(), b.counters());
    }

    #[test]
    fn test_mating_pair_lays_one_egg() {
        let mut sim = Simulation::empty(bare_config()).unwrap();
        let a = place(&mut sim, 0, 0, Stage::Adult);
        let b = place(&mut sim, 1, 0, Stage::Adult);
        let health_before = sim.organisms[a].health;

        sim.resolve(vec![Action::Mate, Action::Mate]);

        assert_eq!(sim.organisms().len(), 3);
        let egg = &sim.organisms()[2];
        assert_eq!(egg.stage, Stage::Egg);
        assert_eq!(egg.position, Position::new(0, 0));
        assert_eq!(egg.generation, 1);
        // Parents did not move or act; they only paid upkeep
        assert_eq!(sim.organisms[a].position, Position::new(0, 0));
        assert_eq!(sim.organisms[b].position, Position::new(1, 0));
        assert_eq!(sim.organisms[a].health, health_before - 1);
        assert_eq!(sim.organisms[a].offspring, 1);
        assert_eq!(sim.counters().sexual_births, 1);
    }

    #[test]
    fn test_mating_is_first_come() {
        // Three adults in a row all proposing to mate: the middle one is
        // taken by the first, the third finds nobody
        let mut sim = Simulation::empty(bare_config()).unwrap();
        place(&mut sim, 0, 0, Stage::Adult);
        place(&mut sim, 1, 0, Stage::Adult);
        place(&mut sim, 2, 0, Stage::Adult);

        sim.resolve(vec![Action::Mate; 3]);

        assert_eq!(sim.organisms().len(), 4);
        assert_eq!(sim.counters().sexual_births, 1);
        assert_eq!(sim.organisms[3].position, Position::new(0, 0));
        assert_eq!(sim.organisms[2].offspring, 0);
    }

    #[test]
    fn test_mating_needs_both_partners() {
        let mut sim = Simulation::empty(bare_config()).unwrap();
        place(&mut sim, 0, 0, Stage::Adult);
        place(&mut sim, 0, 1, Stage::Adult);
        place(&mut sim, 5, 5, Stage::Adult);
        place(&mut sim, 5, 6, Stage::Egg);

        sim.resolve(vec![Action::Mate, Action::Sleep, Action::Mate, Action::None]);
        assert_eq!(sim.organisms().len(), 4);
        assert_eq!(sim.counters().births(), 0);
    }

    #[test]
    fn test_mating_respects_cap() {
        let mut config = bare_config();
        config.population.max_ants = 2;
        let mut sim = Simulation::empty(config).unwrap();
        place(&mut sim, 0, 0, Stage::Adult);
        place(&mut sim, 0, -1, Stage::Adult);

        sim.resolve(vec![Action::Mate, Action::Mate]);
        assert_eq!(sim.organisms().len(), 2);
    }

    #[test]
    fn test_movement_blocked_by_terrain() {
        let mut config = bare_config();
        config.world.terrain_density = 1.0;
        let mut sim = Simulation::empty(config).unwrap();
        let idx = place(&mut sim, 0, 0, Stage::Adult);

        sim.resolve(vec![Action::Up]);
        assert_eq!(sim.organisms[idx].position, Position::new(0, 0));
    }

    #[test]
    fn test_movement_into_open_ground_and_stacking() {
        let mut sim = Simulation::empty(bare_config()).unwrap();
        let a = place(&mut sim, 0, 0, Stage::Adult);
        let b = place(&mut sim, 1, 1, Stage::Adult);
        sim.grid.set_food(Position::new(-1, 0));

        sim.resolve(vec![Action::Left, Action::Up]);
        assert_eq!(sim.organisms[a].position, Position::new(-1, 0));
        assert_eq!(sim.organisms[b].position, Position::new(1, 0));

        sim.resolve(vec![Action::Right, Action::Left]);
        assert_eq!(sim.organisms[a].position, Position::new(0, 0));
        assert_eq!(sim.organisms[b].position, Position::new(0, 0));
    }

    #[test]
    fn test_eat_food() {
        let mut sim = Simulation::empty(bare_config()).unwrap();
        let idx = place(&mut sim, 0, 0, Stage::Adult);
        sim.grid.set_food(Position::new(0, 0));
        sim.organisms[idx].health = 40;

        sim.resolve(vec![Action::Eat]);
        let eat_gain = sim.config().health.eat_gain;
        assert_eq!(sim.organisms[idx].health, 40 + eat_gain - 1);
        assert_eq!(sim.classify(Position::new(0, 0)), Cell::Empty);

        sim.resolve(vec![Action::Eat]);
        assert_eq!(sim.organisms[idx].health, 40 + eat_gain - 2);
        assert_eq!(sim.counters().food_eaten, 1);
    }

    #[test]
    fn test_eat_caps_health() {
        let mut sim = Simulation::empty(bare_config()).unwrap();
        let idx = place(&mut sim, 0, 0, Stage::Adult);
        sim.grid.set_food(Position::new(0, 0));
        sim.organisms[idx].health = 95;

        sim.resolve(vec![Action::Eat]);
        assert_eq!(sim.organisms[idx].health, sim.config().health.max_ant_health - 1);
    }

    #[test]
    fn test_sleep_restores_health() {
        let mut sim = Simulation::empty(bare_config()).unwrap();
        let idx = place(&mut sim, 0, 0, Stage::Adult);
        sim.organisms[idx].health = 50;

        sim.resolve(vec![Action::Sleep]);
        let sleep_gain = sim.config().health.sleep_gain;
        assert_eq!(sim.organisms[idx].health, 50 + sleep_gain - 1);
    }

    #[test]
    fn test_attack_scan_order_and_damage() {
        let mut sim = Simulation::empty(bare_config()).unwrap();
        let attacker = place(&mut sim, 0, 0, Stage::Adult);
        let below = place(&mut sim, 0, 1, Stage::Adult);
        let above = place(&mut sim, 0, -1, Stage::Adult);

        sim.resolve(vec![Action::Attack, Action::None, Action::None]);

        let health = HealthConfig::default();
        // Up is scanned before down
        assert_eq!(
            sim.organisms[above].health,
            health.max_ant_health - health.attack_damage - 1
        );
        assert_eq!(sim.organisms[below].health, health.max_ant_health - 1);
        assert_eq!(sim.organisms[attacker].health, health.max_ant_health - 1);
    }

    #[test]
    fn test_attacking_egg_feeds_attacker() {
        let mut sim = Simulation::empty(bare_config()).unwrap();
        let attacker = place(&mut sim, 0, 0, Stage::Adult);
        let egg = place(&mut sim, 1, 0, Stage::Egg);
        sim.organisms[attacker].health = 50;

        sim.resolve(vec![Action::Attack, Action::None]);

        let health = HealthConfig::default();
        assert_eq!(
            sim.organisms[attacker].health,
            50 + health.egg_attack_gain - 1
        );
        assert_eq!(
            sim.organisms[egg].health,
            health.egg_health - health.egg_attack_damage - 1
        );
    }

    #[test]
    fn test_attack_follows_moves_within_tick() {
        let mut sim = Simulation::empty(bare_config()).unwrap();
        let mover = place(&mut sim, 0, 2, Stage::Adult);
        place(&mut sim, 0, 0, Stage::Adult);

        // The mover steps next to the attacker before the attack resolves
        sim.resolve(vec![Action::Up, Action::Attack]);
        let health = HealthConfig::default();
        assert_eq!(sim.organisms[mover].position, Position::new(0, 1));
        assert_eq!(
            sim.organisms[mover].health,
            health.max_ant_health - health.attack_damage - 1
        );

        // And steps away again, so the next attack finds nobody
        sim.resolve(vec![Action::Down, Action::Attack]);
        assert_eq!(
            sim.organisms[mover].health,
            health.max_ant_health - health.attack_damage - 2
        );
    }

    #[test]
    fn test_attack_prefers_earlier_slot_over_new_egg() {
        let mut sim = Simulation::empty(bare_config()).unwrap();
        let parent = place(&mut sim, 1, 0, Stage::Adult);
        place(&mut sim, 0, 0, Stage::Adult);

        sim.resolve(vec![Action::Asexual, Action::Attack]);
        let health = HealthConfig::default();
        // Eggs are appended, so the parent is still first at its cell
        assert_eq!(
            sim.organisms[parent].health,
            health.max_ant_health / 2 - health.attack_damage - 1
        );
        assert_eq!(sim.organisms[2].health, health.egg_health);
    }

    #[test]
    fn test_attack_kills_and_culls() {
        let mut sim = Simulation::empty(bare_config()).unwrap();
        place(&mut sim, 0, 0, Stage::Adult);
        let victim = place(&mut sim, -1, 0, Stage::Adult);
        sim.organisms[victim].health = 5;

        sim.resolve(vec![Action::Attack, Action::Sleep]);
        assert_eq!(sim.organisms().len(), 1);
        assert_eq!(sim.counters().starved_or_killed, 1);
    }

    #[test]
    fn test_asexual_reproduction() {
        let mut sim = Simulation::empty(bare_config()).unwrap();
        let idx = place(&mut sim, 3, 4, Stage::Adult);
        sim.organisms[idx].health = 81;

        sim.resolve(vec![Action::Asexual]);

        assert_eq!(sim.organisms().len(), 2);
        assert_eq!(sim.organisms[idx].health, 40 - 1);
        let egg = &sim.organisms()[1];
        assert_eq!(egg.stage, Stage::Egg);
        assert_eq!(egg.position, Position::new(3, 4));
        assert_eq!(egg.health, sim.config().health.egg_health);
        assert_eq!(egg.age, 0);
        assert_eq!(egg.genome(), sim.organisms[idx].genome());
        assert_ne!(egg.id, sim.organisms[idx].id);
    }

    #[test]
    fn test_asexual_refused_at_cap() {
        let mut config = bare_config();
        config.population.max_ants = 1;
        let mut sim = Simulation::empty(config).unwrap();
        let idx = place(&mut sim, 0, 0, Stage::Adult);

        sim.resolve(vec![Action::Asexual]);
        assert_eq!(sim.organisms().len(), 1);
        assert_eq!(sim.organisms[idx].health, sim.config().health.max_ant_health - 1);
    }

    #[test]
    fn test_old_age_removed_same_tick() {
        let mut sim = Simulation::empty(bare_config()).unwrap();
        let idx = place(&mut sim, 0, 0, Stage::Adult);
        let lifespan = sim.config().population.ant_lifespan;
        assert_eq!(sim.organisms[idx].lifespan, lifespan);
        sim.organisms[idx].age = lifespan - 1;

        sim.resolve(vec![Action::Sleep]);
        assert!(sim.organisms().is_empty());
        assert_eq!(sim.counters().died_of_age, 1);
    }

    #[test]
    fn test_egg_hatches() {
        let mut config = bare_config();
        config.population.egg_to_adult_ticks = 2;
        let mut sim = Simulation::empty(config).unwrap();
        let idx = place(&mut sim, 0, 0, Stage::Egg);

        sim.tick();
        assert_eq!(sim.organisms[idx].stage, Stage::Egg);
        sim.tick();
        assert_eq!(sim.organisms[idx].stage, Stage::Adult);
        assert_eq!(sim.organisms[idx].health, sim.config().health.max_ant_health);
    }

    #[test]
    fn test_upkeep_starves_idle_organisms() {
        let mut config = bare_config();
        config.health.upkeep = 10;
        let mut sim = Simulation::empty(config).unwrap();
        let idx = place(&mut sim, 0, 0, Stage::Adult);
        sim.organisms[idx].health = 15;

        sim.resolve(vec![Action::None]);
        assert_eq!(sim.organisms().len(), 1);
        sim.resolve(vec![Action::None]);
        assert!(sim.organisms().is_empty());
    }

    #[test]
    fn test_newborns_skip_aging_on_birth_tick() {
        let mut sim = Simulation::empty(bare_config()).unwrap();
        place(&mut sim, 0, 0, Stage::Adult);
        sim.resolve(vec![Action::Asexual]);
        let egg = &sim.organisms()[1];
        assert_eq!(egg.age, 0);
        assert_eq!(egg.stage_age, 0);
    }

    #[test]
    fn test_spawn_food_inside_viewport() {
        let mut sim = Simulation::empty(bare_config()).unwrap();
        let viewport = Viewport::new(10, 10, 5, 5);
        sim.spawn_food(viewport, 10);

        let food: Vec<Position> = sim
            .grid()
            .iter()
            .filter(|(_, cell)| *cell == Cell::Food)
            .map(|(pos, _)| pos)
            .collect();
        assert!(!food.is_empty() && food.len() <= 10);
        assert!(food.iter().all(|pos| viewport.contains(*pos)));

        sim.spawn_food(Viewport::new(0, 0, 0, 0), 10);
    }

    #[test]
    fn test_spawn_food_in_very_wide_viewport() {
        let mut sim = Simulation::empty(bare_config()).unwrap();
        let viewport = Viewport::new(0, 0, u32::MAX, 1);
        sim.spawn_food(viewport, 50);

        assert!(sim.grid().materialized() > 0);
        assert!(sim.grid().iter().all(|(pos, _)| viewport.contains(pos)));
    }

    #[test]
    fn test_unbounded_lifespan_does_not_wrap() {
        let mut config = bare_config();
        config.population.ant_density = 5;
        config.population.ant_lifespan = u64::MAX;
        config.population.lifespan_jitter = 20;
        let sim = Simulation::new(config).unwrap();

        assert_eq!(sim.organisms().len(), 5);
        assert!(sim.organisms().iter().all(|o| o.lifespan >= u64::MAX - 20));
    }

    #[test]
    fn test_maximal_jitter_does_not_panic() {
        let mut config = bare_config();
        config.population.ant_density = 5;
        config.population.lifespan_jitter = u64::MAX;
        let sim = Simulation::new(config).unwrap();

        assert_eq!(sim.organisms().len(), 5);
        assert!(sim.organisms().iter().all(|o| o.lifespan >= 1));
    }

    #[test]
    fn test_queries() {
        let mut sim = Simulation::empty(bare_config()).unwrap();
        place(&mut sim, 2, 2, Stage::Adult);
        let id = sim.organisms[0].id;

        assert_eq!(sim.organism_at(Position::new(2, 2)).map(|o| o.id), Some(id));
        assert!(sim.organism_at(Position::new(2, 3)).is_none());
        assert!(sim.organism(id).is_some());

        sim.grid.set_food(Position::new(7, 7));
        assert!(sim.consume_food(Position::new(7, 7)));
        assert!(!sim.consume_food(Position::new(7, 7)));
    }

    #[test]
    fn test_adopt_genome() {
        let mut config = bare_config();
        config.genome_noise = 0.0;
        let mut sim = Simulation::empty(config).unwrap();
        place(&mut sim, 0, 0, Stage::Adult);
        let id = sim.organisms[0].id;

        let adopted = Genome::random(&mut ChaCha8Rng::seed_from_u64(99));
        assert!(sim.adopt_genome(id, &adopted).unwrap());
        assert_eq!(sim.organisms[0].genome(), &adopted);
        assert_eq!(sim.organisms[0].color(), adopted.color());

        let missing = OrganismId::from_rng(&mut ChaCha8Rng::seed_from_u64(100));
        assert!(!sim.adopt_genome(missing, &adopted).unwrap());
    }

    #[test]
    fn test_stats() {
        let mut sim = Simulation::empty(bare_config()).unwrap();
        place(&mut sim, 0, 0, Stage::Adult);
        place(&mut sim, 1, 0, Stage::Egg);

        let stats = sim.stats();
        assert_eq!(stats.population, 2);
        assert_eq!(stats.adults, 1);
        assert_eq!(stats.eggs, 1);
        assert_eq!(stats.tick, 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_lifespan_within_jitter(
            seed in any::<u64>(),
            base in 1u64..2_000,
            jitter in 0u64..3_000,
        ) {
            let mut config = bare_config();
            config.seed = seed;
            config.population.ant_density = 30;
            config.population.ant_lifespan = base;
            config.population.lifespan_jitter = jitter;
            let sim = Simulation::new(config).unwrap();

            let low = base.saturating_sub(jitter).max(1);
            for organism in sim.organisms() {
                prop_assert!(organism.lifespan >= low);
                prop_assert!(organism.lifespan <= base + jitter);
            }
        }

        #[test]
        fn prop_survivors_have_health_and_cap_holds(seed in any::<u64>()) {
            let config = SimulationConfig {
                seed,
                population: PopulationConfig {
                    ant_density: 40,
                    max_ants: 60,
                    ..Default::default()
                },
                spawn_area: Viewport::centered(12, 12),
                ..Default::default()
            };
            let max_ants = config.population.max_ants;
            let mut sim = Simulation::new(config).unwrap();

            for _ in 0..40 {
                let before = sim.organisms().len();
                sim.tick();
                prop_assert!(sim.organisms().iter().all(|o| o.health > 0));
                prop_assert!(sim.organisms().iter().all(|o| o.stage != Stage::Old));
                prop_assert!(sim.organisms().len() <= max_ants.max(before));
            }
        }
    }
}
