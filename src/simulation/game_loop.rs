//! Game loop - drives turns over the shared simulation state
//!
//! One turn: every active entity, in registry order, is asked for an action,
//! which is validated and executed. The clock then advances one period and,
//! on a day boundary, the new-day hook runs before the next turn opens.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::action::{Action, ActionResult};
use super::decider::{Decider, IdleDecider};
use super::decision::{DecisionContext, DecisionLog, DecisionRecord};
use super::execute::execute;
use super::turn::{Turn, TurnHistory};
use super::validate::validate;
use crate::agriculture::{AgricultureManager, CropType, DEFAULT_FIELD_SIZE};
use crate::core::clock::{GameClock, Weather};
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{EntityId, LocationId};
use crate::ecs::component::Position;
use crate::ecs::EntityRegistry;
use crate::economy::{EconomyManager, ItemCatalog, DEFAULT_MAX_WEIGHT};
use crate::event::{EventBus, EventFilter, EventLog, EventSubtype, GameEvent, SubscriberId};
use crate::social::SocialManager;
use crate::world::{World, WorldLimits};

// ============================================================================
// SHARED STATE
// ============================================================================

/// Everything a turn reads and writes, passed explicitly to every stage
#[derive(Debug, Clone)]
pub struct Simulation {
    pub clock: GameClock,
    pub registry: EntityRegistry,
    pub world: World,
    pub agriculture: AgricultureManager,
    pub economy: EconomyManager,
    pub social: SocialManager,
    pub events: EventLog,
}

impl Simulation {
    pub fn new(config: &SimulationConfig) -> Self {
        Self::with_world(
            config,
            World::new("Village", 100.0, 100.0, WorldLimits::from_config(config)),
        )
    }

    pub fn with_world(config: &SimulationConfig, world: World) -> Self {
        Self {
            clock: GameClock::new(config.days_per_season),
            registry: EntityRegistry::new(config),
            world,
            agriculture: AgricultureManager::new(),
            economy: EconomyManager::new(config),
            social: SocialManager::new(config),
            events: EventLog::new(config.max_event_log),
        }
    }

    /// Record an event at the current time; a sourced event without a
    /// location takes its source's
    pub fn emit(&mut self, mut event: GameEvent) -> u64 {
        event.day = self.clock.day;
        event.time_of_day = self.clock.time_of_day;
        if event.location.is_none() {
            event.location = event
                .source
                .and_then(|source| self.registry.component::<Position>(source))
                .map(|p| p.location.clone());
        }
        self.events.record(event)
    }

    /// Put an entity into a location and sync its position component
    pub fn place_entity(&mut self, entity: EntityId, location: LocationId) -> Result<()> {
        let from = self.world.entity_location(entity);
        self.world.move_entity(entity, from, location)?;
        if let Some(place) = self.world.get(location) {
            let center = place.center();
            let name = place.name.clone();
            if let Some(position) = self.registry.component_mut::<Position>(entity) {
                position.set(name, center.x, center.y);
            }
        }
        Ok(())
    }

    /// Spawn a villager with a trade inventory and a default personality
    pub fn add_villager(&mut self, name: &str, occupation: &str, home: LocationId) -> Result<EntityId> {
        let id = self.registry.spawn_villager(name, occupation)?;
        self.place_entity(id, home)?;
        self.economy
            .create_inventory(id, 15, DEFAULT_MAX_WEIGHT)
            .add_currency(50);
        self.social.assign_default_profile(id, occupation);
        self.emit(GameEvent::new(
            EventSubtype::EntityCreated,
            Some(id),
            format!("{} the {} arrived", name, occupation),
        ));
        Ok(id)
    }

    /// Spawn the player with a trade inventory
    pub fn add_player(&mut self, name: &str, home: LocationId) -> Result<EntityId> {
        let id = self.registry.spawn_player(name)?;
        self.place_entity(id, home)?;
        self.economy
            .create_inventory(id, 20, DEFAULT_MAX_WEIGHT)
            .add_currency(100);
        self.emit(GameEvent::new(
            EventSubtype::EntityCreated,
            Some(id),
            format!("{} arrived", name),
        ));
        Ok(id)
    }

    /// Validate and execute one action, returning it with its outcome
    pub fn apply(&mut self, mut action: Action) -> Action {
        match validate(&action, self) {
            Ok(()) => execute(&mut action, self),
            Err(e) => action.resolve(ActionResult::Invalid, e.to_string()),
        }
        tracing::debug!(
            actor = %action.actor,
            kind = %action.kind,
            result = ?action.result,
            message = %action.message,
            "action resolved"
        );
        action
    }
}

// ============================================================================
// ENGINE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialised,
    Initialised,
    Running,
    Paused,
    Stopped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub turns_processed: u64,
    pub total_actions: u64,
    pub successful: u64,
    pub failed: u64,
    pub invalid: u64,
    pub blocked: u64,
}

pub struct GameLoop {
    sim: Simulation,
    state: EngineState,
    history: TurnHistory,
    decider: Box<dyn Decider>,
    rng: ChaCha8Rng,
    config: SimulationConfig,
    stats: EngineStats,
    bus: EventBus,
    decisions: DecisionLog,
}

impl GameLoop {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let sim = Simulation::new(&config);
        Ok(Self::from_parts(config, sim))
    }

    /// Engine over the preset farming village
    pub fn village(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let world = World::farming_village(WorldLimits::from_config(&config))?;
        let sim = Simulation::with_world(&config, world);
        Ok(Self::from_parts(config, sim))
    }

    /// Engine over prepared state, e.g. a loaded snapshot
    pub fn from_parts(config: SimulationConfig, sim: Simulation) -> Self {
        Self {
            sim,
            state: EngineState::Uninitialised,
            history: TurnHistory::new(config.max_turn_history),
            decider: Box::new(IdleDecider::default()),
            rng: ChaCha8Rng::seed_from_u64(config.weather_seed),
            bus: EventBus::new(config.max_event_subscribers),
            decisions: DecisionLog::new(config.max_decision_log),
            config,
            stats: EngineStats::default(),
        }
    }

    pub fn set_decider(&mut self, decider: Box<dyn Decider>) {
        self.decider = decider;
    }

    /// Listen for events recorded from now on; `None` when the bus is full
    pub fn subscribe(
        &mut self,
        filter: EventFilter,
        callback: impl FnMut(&GameEvent) + 'static,
    ) -> Option<SubscriberId> {
        self.bus.subscribe(filter, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn sim(&self) -> &Simulation {
        &self.sim
    }

    /// Mutable state for setup between turns
    pub fn sim_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    /// Wire the domain managers to the world: default crops and items,
    /// a field on every farmable location, a shop on every shopping location
    pub fn initialize(&mut self) -> bool {
        if self.state != EngineState::Uninitialised {
            tracing::warn!(state = ?self.state, "initialize called twice");
            return false;
        }

        if self.sim.agriculture.crop_types().is_empty() {
            for kind in CropType::defaults() {
                self.sim.agriculture.register_crop_type(kind);
            }
        }
        if self.sim.economy.catalog().is_empty() {
            for definition in ItemCatalog::with_defaults().iter() {
                self.sim.economy.register_item(definition.clone());
            }
        }

        let farmland: Vec<LocationId> = self.sim.world.iter().filter(|l| l.can_farm).map(|l| l.id).collect();
        for location in farmland {
            self.sim
                .agriculture
                .register_field(location, DEFAULT_FIELD_SIZE, DEFAULT_FIELD_SIZE);
        }

        let markets: Vec<(LocationId, String)> = self
            .sim
            .world
            .iter()
            .filter(|l| l.can_shop)
            .map(|l| (l.id, l.name.clone()))
            .collect();
        for (location, name) in markets {
            if self.sim.economy.find_shop_at(location).is_some() {
                continue;
            }
            match self.sim.economy.create_shop(&name, location, None) {
                Ok(id) => {
                    if let Some(shop) = self.sim.economy.shop_mut(id) {
                        shop.auto_restock = true;
                    }
                }
                Err(e) => tracing::warn!(location = %location, error = %e, "could not open shop"),
            }
        }
        self.sim.economy.restock_all();

        self.state = EngineState::Initialised;
        tracing::info!(
            locations = self.sim.world.len(),
            entities = self.sim.registry.len(),
            fields = self.sim.agriculture.fields().len(),
            shops = self.sim.economy.shops().len(),
            "game loop initialised"
        );
        true
    }

    /// Open turn 1; only valid straight after `initialize`
    pub fn start(&mut self) -> bool {
        if self.state != EngineState::Initialised {
            return false;
        }
        self.history.push(Turn::new(1, self.sim.clock.snapshot()));
        self.state = EngineState::Running;
        tracing::info!(clock = %self.sim.clock.description(), "game loop started");
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.state != EngineState::Running {
            return false;
        }
        self.state = EngineState::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != EngineState::Paused {
            return false;
        }
        self.state = EngineState::Running;
        true
    }

    pub fn stop(&mut self) {
        if self.state != EngineState::Stopped {
            tracing::info!(turns = self.stats.turns_processed, "game loop stopped");
        }
        self.state = EngineState::Stopped;
    }

    /// Run one turn; false (and no change) unless the engine is running
    pub fn process_turn(&mut self) -> bool {
        if self.state != EngineState::Running {
            return false;
        }
        let Some(number) = self.history.current().map(|t| t.number) else {
            return false;
        };

        let max_actions = self.config.max_actions_per_turn;
        let mut recorded = 0;
        for id in self.sim.registry.entity_ids() {
            if recorded >= max_actions {
                tracing::warn!(turn = number, max_actions, "action limit reached");
                break;
            }
            let Some(entity) = self.sim.registry.entity(id) else {
                continue;
            };
            if !entity.active {
                continue;
            }
            let context = DecisionContext::capture(entity, &self.sim);
            let Some(mut decision) = self.decider.deliberate(entity, &self.sim) else {
                continue;
            };
            decision.action.actor = id;

            let action = self.sim.apply(decision.action);
            self.tally(action.result);
            match DecisionRecord::new(context, decision.options, decision.chosen, decision.reasoning) {
                Some(mut record) => {
                    let utility = if action.succeeded() { 1.0 } else { 0.0 };
                    record.set_outcome(action.succeeded(), utility, action.message.as_str());
                    self.decisions.log(record);
                }
                None => tracing::warn!(entity = %id, kind = %action.kind, "decision had no valid choice"),
            }
            self.publish_events();
            if let Some(turn) = self.history.current_mut() {
                turn.record(action, max_actions);
            }
            recorded += 1;
        }

        self.advance_clock();
        self.publish_events();
        self.history.push(Turn::new(number + 1, self.sim.clock.snapshot()));
        self.stats.turns_processed += 1;
        true
    }

    /// Run up to `turns` turns, stopping early if the engine leaves `Running`
    pub fn run(&mut self, turns: u32) -> u32 {
        let mut done = 0;
        while done < turns && self.process_turn() {
            done += 1;
        }
        done
    }

    fn tally(&mut self, result: Option<ActionResult>) {
        self.stats.total_actions += 1;
        match result {
            Some(ActionResult::Success) => self.stats.successful += 1,
            Some(ActionResult::Failed) => self.stats.failed += 1,
            Some(ActionResult::Blocked) => self.stats.blocked += 1,
            Some(ActionResult::Invalid) | None => self.stats.invalid += 1,
        }
    }

    /// Hand newly recorded events to listeners
    fn publish_events(&mut self) {
        for event in self.sim.events.take_unpublished() {
            self.bus.publish(&event);
        }
    }

    fn advance_clock(&mut self) {
        let advance = self.sim.clock.advance_period();
        let clock = &self.sim.clock;
        let period = GameEvent::new(
            EventSubtype::period_started(clock.time_of_day),
            None,
            format!("{} of day {}", clock.time_of_day, clock.day),
        );
        self.sim.emit(period);
        if advance.new_day {
            let day = GameEvent::new(EventSubtype::NewDay, None, format!("Day {} began", self.sim.clock.day));
            self.sim.emit(day);
        }
        if advance.new_season {
            tracing::info!(season = %self.sim.clock.season, year = self.sim.clock.year, "season changed");
            let season = GameEvent::new(
                EventSubtype::NewSeason,
                None,
                format!("{} began", self.sim.clock.season),
            );
            self.sim.emit(season);
        }
        if advance.new_year {
            let year = GameEvent::new(EventSubtype::NewYear, None, format!("Year {} began", self.sim.clock.year));
            self.sim.emit(year);
        }
        if advance.new_day {
            self.start_new_day();
        }
    }

    /// Runs exactly once per day boundary, before the day's first turn
    fn start_new_day(&mut self) {
        if self.config.dynamic_weather {
            let before = self.sim.clock.weather;
            let weather = Weather::roll(self.sim.clock.season, &mut self.rng);
            self.sim.clock.set_weather(weather);
            if weather != before {
                self.sim
                    .emit(GameEvent::weather_change(&before.to_string(), &weather.to_string()));
            }
        }
        self.sim.social.decay_all(1);
        let report = self
            .sim
            .agriculture
            .tick_day(self.sim.clock.weather, self.sim.clock.season);
        if report.withered > 0 {
            self.sim.emit(GameEvent::new(
                EventSubtype::CropWithered,
                None,
                format!("{} crops withered", report.withered),
            ));
        }
        if report.matured > 0 {
            self.sim.emit(GameEvent::new(
                EventSubtype::CropGrowthStage,
                None,
                format!("{} crops are ready to harvest", report.matured),
            ));
        }
        let restocked = self.sim.economy.restock_all();
        tracing::info!(
            day = self.sim.clock.day,
            season = %self.sim.clock.season,
            weather = %self.sim.clock.weather,
            crops = report.crops_updated,
            matured = report.matured,
            withered = report.withered,
            restocked,
            "new day"
        );
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn history(&self) -> &TurnHistory {
        &self.history
    }

    pub fn current(&self) -> Option<&Turn> {
        self.history.current()
    }

    /// Number of the open turn, 0 before `start`
    pub fn current_turn(&self) -> u32 {
        self.history.current().map_or(0, |t| t.number)
    }

    /// Turns opened so far, including the current one
    pub fn turn_count(&self) -> u64 {
        self.history.total()
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn decisions(&self) -> &DecisionLog {
        &self.decisions
    }

    pub fn events(&self) -> &EventLog {
        &self.sim.events
    }

    /// One-line description of the most recently completed turn
    pub fn summary(&self) -> String {
        let completed = self.current_turn().saturating_sub(1);
        match self.history.get(completed) {
            Some(turn) => turn.summary(),
            None => "No turn data".to_string(),
        }
    }
}
