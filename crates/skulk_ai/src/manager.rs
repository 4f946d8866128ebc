//! AgentManager: популяция, пулы, spawn points, доставка команд
//!
//! Порядок тика (`update`):
//! 1. clock += dt, spawn cooldown
//! 2. `WorldSnapshot` живой популяции на начало тика
//! 3. update всех агентов по возрастанию AgentId, команды копятся в outbox
//! 4. доставка команд (раундами: ответные команды получателей тоже доставляются)
//! 5. мёртвые / помеченные на уничтожение уходят в пул
//!
//! Агенты хранятся в `BTreeMap<AgentId, _>`, id монотонно растут, поэтому
//! порядок обхода = порядок спавна и не зависит от истории despawn.

use std::collections::BTreeMap;
use std::sync::Arc;

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::agent::{Agent, AgentId, Archetype, ArchetypeTable};
use crate::ai::{AgentCommand, AgentMessage, PeerView, PlayerView, WorldSnapshot};
use crate::config::{AiConfig, ConfigError, ManagerConfig};
use crate::feedback::FeedbackEvent;
use crate::geometry::distance;
use crate::logger::{log, log_info, log_warning, set_log_level};
use crate::player::PlayerTarget;

/// Сколько раз за тик доставляются ответные команды; остаток ждёт следующего тика
const MAX_DELIVERY_ROUNDS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPoint {
    pub position: Vec2,
    pub archetype: String,
}

/// Пул одного archetype: свободные экземпляры + сколько всего создано
#[derive(Debug, Default)]
struct Pool {
    idle: Vec<Agent>,
    constructed: usize,
}

#[derive(Resource, Debug)]
pub struct AgentManager {
    config: ManagerConfig,
    archetypes: ArchetypeTable,
    agents: BTreeMap<AgentId, Agent>,
    pools: BTreeMap<String, Pool>,
    spawn_points: Vec<SpawnPoint>,
    /// Оставшееся время до следующего автоспавна (ms)
    spawn_cooldown: f32,
    next_id: u64,
    clock: f64,
    rng: ChaCha8Rng,
    /// Feedback для хоста (drain_feedback)
    feedback: Vec<FeedbackEvent>,
    /// Команды, возникшие вне тика (damage_agent, spawn) или не доставленные за тик
    pending: Vec<AgentCommand>,
    last_player: Option<PlayerView>,
}

impl AgentManager {
    pub fn new(config: ManagerConfig, archetypes: ArchetypeTable) -> Self {
        let spawn_points = config
            .spawn_points
            .iter()
            .map(|point| SpawnPoint {
                position: Vec2::new(point.x, point.y),
                archetype: point.archetype.clone(),
            })
            .collect();

        Self {
            spawn_cooldown: config.spawn_interval,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            archetypes,
            agents: BTreeMap::new(),
            pools: BTreeMap::new(),
            spawn_points,
            next_id: 0,
            clock: 0.0,
            feedback: Vec::new(),
            pending: Vec::new(),
            last_player: None,
        }
    }

    /// Менеджер из конфига: builtin archetypes + переопределения, уровень логов
    pub fn from_config(config: &AiConfig) -> Result<Self, ConfigError> {
        let table = config.archetype_table()?;
        set_log_level(config.manager.log_level);
        Ok(Self::new(config.manager.clone(), table))
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn now(&self) -> f64 {
        self.clock
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn population_cap(&self) -> usize {
        self.config.population_cap
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    /// Живая популяция в порядке возрастания id
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn archetypes(&self) -> &ArchetypeTable {
        &self.archetypes
    }

    pub fn register_archetype(&mut self, archetype: Archetype) {
        self.archetypes.register(archetype);
    }

    /// Свободные экземпляры в пуле archetype
    pub fn pooled(&self, archetype: &str) -> usize {
        self.pools.get(archetype).map_or(0, |pool| pool.idle.len())
    }

    pub fn spawn_points(&self) -> &[SpawnPoint] {
        &self.spawn_points
    }

    pub fn add_spawn_point(&mut self, position: Vec2, archetype: &str) -> bool {
        if self.archetypes.get(archetype).is_none() {
            log_warning(&format!("⚠️ Spawn point ignored: unknown archetype '{}'", archetype));
            return false;
        }
        self.spawn_points.push(SpawnPoint {
            position,
            archetype: archetype.to_string(),
        });
        true
    }

    pub fn set_agent_position(&mut self, id: AgentId, position: Vec2) -> bool {
        match self.agents.get_mut(&id) {
            Some(agent) => {
                agent.set_position(position);
                true
            }
            None => false,
        }
    }

    /// Забрать накопленные feedback события
    pub fn drain_feedback(&mut self) -> Vec<FeedbackEvent> {
        std::mem::take(&mut self.feedback)
    }

    /// Спавн агента. `None`: популяция на cap, archetype не зарегистрирован
    /// или пул archetype исчерпан.
    pub fn spawn_agent(&mut self, position: Vec2, archetype: &str) -> Option<AgentId> {
        if self.agents.len() >= self.config.population_cap {
            log_warning(&format!(
                "⚠️ Spawn '{}' rejected: population cap {} reached",
                archetype, self.config.population_cap
            ));
            return None;
        }

        let Some(template) = self.archetypes.get(archetype).cloned() else {
            log_warning(&format!("⚠️ Spawn rejected: unknown archetype '{}'", archetype));
            return None;
        };

        let id = AgentId(self.next_id);
        let seed = self.config.seed;
        let pool = self.pools.entry(archetype.to_string()).or_default();
        let mut agent = match pool.idle.pop() {
            Some(mut agent) => {
                agent.reset(id, Arc::clone(&template), position, seed);
                agent
            }
            None if pool.constructed < template.params.pool_size => {
                pool.constructed += 1;
                Agent::new(id, Arc::clone(&template), position, seed)
            }
            None => {
                log_warning(&format!(
                    "⚠️ Spawn rejected: pool '{}' exhausted ({} instances)",
                    archetype, template.params.pool_size
                ));
                return None;
            }
        };
        self.next_id += 1;

        let world = self.snapshot();
        let mut outbox = Vec::new();
        if !agent.start(&world, &mut outbox) {
            log_warning(&format!(
                "⚠️ {} ({}): initial state '{}' not entered, agent has no active state",
                id,
                archetype,
                template.initial_state
            ));
        }
        self.agents.insert(id, agent);

        self.feedback.push(FeedbackEvent::Spawned {
            agent: id,
            archetype: archetype.to_string(),
            position,
        });
        self.queue(outbox);
        log_info(&format!("✨ Spawned {} ({}) at ({:.1}, {:.1})", id, archetype, position.x, position.y));
        Some(id)
    }

    /// Пометить агента на удаление (вернётся в пул в конце следующего update)
    pub fn despawn(&mut self, id: AgentId) -> bool {
        match self.agents.get_mut(&id) {
            Some(agent) => {
                agent.request_destroy();
                true
            }
            None => false,
        }
    }

    /// Звук в мире: предлагается hearing каждого живого агента.
    /// Возвращает число агентов, которые его услышали.
    pub fn emit_sound(&mut self, position: Vec2, volume: f32, category: &str) -> usize {
        let now = self.clock;
        let mut heard = 0;
        for agent in self.agents.values_mut().filter(|agent| agent.is_alive()) {
            let listener = agent.body.position;
            if agent
                .body
                .hearing
                .add_sound_event(listener, position, volume, category, now)
            {
                heard += 1;
            }
        }
        log(&format!("🔊 Sound '{}' at ({:.1}, {:.1}) heard by {}", category, position.x, position.y, heard));
        heard
    }

    /// Урон агенту извне (игрок, ловушки). Возвращает true если агент умер.
    pub fn damage_agent(&mut self, id: AgentId, amount: f32, source: Option<Vec2>) -> bool {
        let world = self.snapshot();
        let mut outbox = Vec::new();
        let died = match self.agents.get_mut(&id) {
            Some(agent) => agent.take_damage(amount, source, &world, &mut outbox),
            None => {
                log_warning(&format!("⚠️ damage_agent: {} not found", id));
                return false;
            }
        };
        self.queue(outbox);
        died
    }

    /// Read-only снимок живой популяции и игрока
    pub fn snapshot(&self) -> WorldSnapshot {
        let mut world = WorldSnapshot::new(self.clock, self.last_player);
        for agent in self.agents.values().filter(|agent| agent.is_alive()) {
            world.push_peer(PeerView {
                id: agent.id(),
                archetype: agent.archetype().name.clone(),
                team: agent.body.team(),
                position: agent.position(),
                state: agent.state(),
                last_player: agent.body.memory.last_player,
                known_until: agent.body.memory.known_until(),
            });
        }
        world
    }

    /// Один тик симуляции AI. `dt` в ms.
    pub fn update(&mut self, dt: f32, mut player: Option<&mut dyn PlayerTarget>) {
        self.clock += f64::from(dt);
        self.last_player = player.as_deref().map(|player| PlayerView {
            position: player.position(),
            alive: player.is_alive(),
        });

        self.tick_spawner(dt);

        let world = self.snapshot();
        let mut outbox = std::mem::take(&mut self.pending);
        for agent in self.agents.values_mut() {
            agent.update(dt, &world, &mut outbox);
        }

        self.deliver(outbox, &world, &mut player);
        self.remove_dead();
    }

    /// Headless интеграция: position += velocity * dt (velocity в units/sec)
    pub fn integrate_velocities(&mut self, dt: f32) {
        let seconds = dt / 1000.0;
        for agent in self.agents.values_mut().filter(|agent| agent.is_alive()) {
            agent.body.position += agent.body.velocity * seconds;
        }
    }

    fn tick_spawner(&mut self, dt: f32) {
        if self.spawn_points.is_empty() {
            return;
        }

        self.spawn_cooldown -= dt;
        if self.spawn_cooldown > 0.0 || self.agents.len() >= self.config.population_cap {
            return;
        }

        // Без игрока дистанцию проверять не от чего: подходит любая точка
        let player = self.last_player.filter(|player| player.alive).map(|player| player.position);
        let min_distance = self.config.min_spawn_distance;
        let candidates: Vec<usize> = self
            .spawn_points
            .iter()
            .enumerate()
            .filter(|(_, point)| player.map_or(true, |player| distance(point.position, player) > min_distance))
            .map(|(index, _)| index)
            .collect();
        if candidates.is_empty() {
            return;
        }

        let pick = candidates[self.rng.gen_range(0..candidates.len())];
        let point = self.spawn_points[pick].clone();
        self.spawn_agent(point.position, &point.archetype);
        self.spawn_cooldown = self.config.spawn_interval;
    }

    fn queue(&mut self, commands: Vec<AgentCommand>) {
        for command in commands {
            match command {
                AgentCommand::Feedback(event) => self.feedback.push(event),
                other => self.pending.push(other),
            }
        }
    }

    fn deliver(&mut self, outbox: Vec<AgentCommand>, world: &WorldSnapshot, player: &mut Option<&mut dyn PlayerTarget>) {
        let mut queue = outbox;
        for _ in 0..MAX_DELIVERY_ROUNDS {
            if queue.is_empty() {
                return;
            }
            let mut replies = Vec::new();
            for command in queue {
                self.apply_command(command, world, player, &mut replies);
            }
            queue = replies;
        }

        if !queue.is_empty() {
            log(&format!("AI: {} commands deferred to next tick", queue.len()));
            self.queue(queue);
        }
    }

    fn apply_command(
        &mut self,
        command: AgentCommand,
        world: &WorldSnapshot,
        player: &mut Option<&mut dyn PlayerTarget>,
        replies: &mut Vec<AgentCommand>,
    ) {
        match command {
            AgentCommand::DamagePlayer { from, damage, knockback } => {
                let Some(player) = player.as_deref_mut() else {
                    return;
                };
                if !player.is_alive() {
                    return;
                }
                player.apply_hit(damage, knockback);
                log(&format!("🗡️ {} hits player for {:.1}", from, damage));
            }
            AgentCommand::BroadcastAlert {
                from,
                team,
                origin,
                radius,
                player_position,
            } => {
                for agent in self.agents.values_mut() {
                    if agent.id() == from
                        || !agent.is_alive()
                        || agent.body.team() != team
                        || distance(agent.position(), origin) > radius
                    {
                        continue;
                    }
                    agent.receive(AgentMessage::Alert { origin, player_position }, world, replies);
                }
            }
            AgentCommand::Inspire {
                from,
                archetype,
                origin,
                radius,
                multiplier,
                duration,
            } => {
                for agent in self.agents.values_mut() {
                    if agent.id() == from
                        || !agent.is_alive()
                        || agent.archetype().name != archetype
                        || distance(agent.position(), origin) > radius
                    {
                        continue;
                    }
                    agent.receive(AgentMessage::Inspire { multiplier, duration }, world, replies);
                }
            }
            AgentCommand::ShareSighting { to, sighting, .. } => {
                if let Some(agent) = self.agents.get_mut(&to) {
                    agent.receive(AgentMessage::ShareSighting(sighting), world, replies);
                }
            }
            AgentCommand::Feedback(event) => self.feedback.push(event),
        }
    }

    fn remove_dead(&mut self) {
        let dead: Vec<AgentId> = self
            .agents
            .values()
            .filter(|agent| agent.should_despawn())
            .map(Agent::id)
            .collect();

        for id in dead {
            let Some(agent) = self.agents.remove(&id) else {
                continue;
            };
            let archetype = agent.archetype().name.clone();
            log_info(&format!("♻️ {} ({}) returned to pool", id, archetype));
            self.pools.entry(archetype).or_default().idle.push(agent);
        }
    }
}
