//! Координация стаи/команды поверх снимка живой популяции.
//!
//! `WorldSnapshot` собирается менеджером в начале тика и не меняется до
//! его конца: все агенты видят состояние соседей на начало тика, поэтому
//! результат не зависит от порядка обхода. Пространственного индекса нет,
//! каждый запрос: линейный проход O(n).

use std::f32::consts::TAU;

use bevy::math::Vec2;

use crate::agent::{AgentBody, AgentId, Role, Sighting};
use crate::ai::{AgentCommand, StateKind};
use crate::geometry::{direction, distance};

/// Прибавка pack bonus за каждого соседа по стае
pub const PACK_BONUS_PER_MEMBER: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub position: Vec2,
    pub alive: bool,
}

/// Read-only вид соседа
#[derive(Debug, Clone, PartialEq)]
pub struct PeerView {
    pub id: AgentId,
    pub archetype: String,
    pub team: u32,
    pub position: Vec2,
    pub state: Option<StateKind>,
    pub last_player: Option<Sighting>,
    /// Самый свежий timestamp в памяти агента, включая уже сброшенную цель
    pub known_until: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldSnapshot {
    pub now: f64,
    pub player: Option<PlayerView>,
    /// Живые агенты в порядке возрастания AgentId
    pub peers: Vec<PeerView>,
}

impl WorldSnapshot {
    pub fn new(now: f64, player: Option<PlayerView>) -> Self {
        Self {
            now,
            player,
            peers: Vec::new(),
        }
    }

    /// Снимок с живым игроком в `position`
    pub fn with_player(now: f64, position: Vec2) -> Self {
        Self::new(now, Some(PlayerView { position, alive: true }))
    }

    pub fn player_position(&self) -> Option<Vec2> {
        self.player
            .filter(|player| player.alive)
            .map(|player| player.position)
    }

    pub fn peer(&self, id: AgentId) -> Option<&PeerView> {
        self.peers.iter().find(|peer| peer.id == id)
    }

    pub fn push_peer(&mut self, peer: PeerView) {
        self.peers.push(peer);
    }
}

/// Все агенты в радиусе от точки
pub fn agents_in_range(world: &WorldSnapshot, center: Vec2, radius: f32) -> impl Iterator<Item = &PeerView> {
    world
        .peers
        .iter()
        .filter(move |peer| distance(peer.position, center) <= radius)
}

/// Союзники той же команды в радиусе (без себя)
pub fn teammates_in_range<'w>(
    world: &'w WorldSnapshot,
    body: &AgentBody,
    radius: f32,
) -> impl Iterator<Item = &'w PeerView> {
    let (id, team, position) = (body.id, body.team(), body.position);
    agents_in_range(world, position, radius).filter(move |peer| peer.id != id && peer.team == team)
}

/// Агенты того же archetype в радиусе (без себя)
pub fn pack_mates_in_range<'w>(
    world: &'w WorldSnapshot,
    body: &AgentBody,
    radius: f32,
) -> impl Iterator<Item = &'w PeerView> {
    let id = body.id;
    let position = body.position;
    let archetype = body.archetype.name.clone();
    agents_in_range(world, position, radius)
        .filter(move |peer| peer.id != id && peer.archetype == archetype)
}

/// `1 + 0.15 * (pack_size - 1)`; pack_size включает самого агента
pub fn pack_bonus(pack_size: usize) -> f32 {
    1.0 + PACK_BONUS_PER_MEMBER * pack_size.saturating_sub(1) as f32
}

/// Размер стаи вокруг агента (включая его самого)
pub fn pack_size(world: &WorldSnapshot, body: &AgentBody) -> usize {
    1 + pack_mates_in_range(world, body, body.archetype.params.pack_range).count()
}

/// Пересчитать pack bonus с нуля (не накапливается между тиками)
pub fn refresh_pack_bonus(world: &WorldSnapshot, body: &mut AgentBody) -> f32 {
    let bonus = pack_bonus(pack_size(world, body));
    body.modifiers.pack = bonus;
    bonus
}

/// Точка на кольце вокруг игрока для агента `id`.
///
/// Участники: агенты того же archetype в Surround на начало тика плюс сам
/// агент. Слоты пересчитываются каждый тик по рангу id: вход/выход участника
/// перетасовывает всех.
pub fn surround_slot(world: &WorldSnapshot, body: &AgentBody, player: Vec2) -> Vec2 {
    let mut participants: Vec<AgentId> = world
        .peers
        .iter()
        .filter(|peer| {
            peer.state == Some(StateKind::Surround) && peer.archetype == body.archetype.name
        })
        .map(|peer| peer.id)
        .collect();
    if !participants.contains(&body.id) {
        participants.push(body.id);
    }
    participants.sort();

    let rank = participants
        .iter()
        .position(|id| *id == body.id)
        .unwrap_or(0);
    let angle = TAU * rank as f32 / participants.len() as f32;
    player + direction(angle) * body.archetype.params.surround_radius
}

/// Стоит ли переходить из Chase в Surround: хотя бы один сосед по стае
/// уже охотится на игрока, и игрок не дальше двух радиусов кольца.
pub fn should_surround(world: &WorldSnapshot, body: &AgentBody, player: Vec2) -> bool {
    let params = &body.archetype.params;
    if distance(body.position, player) > params.surround_radius * 2.0 {
        return false;
    }

    pack_mates_in_range(world, body, params.pack_range).any(|peer| {
        matches!(
            peer.state,
            Some(StateKind::Chase) | Some(StateKind::Surround) | Some(StateKind::Attack)
        )
    })
}

/// Обмен памятью о игроке с командой в радиусе связи.
///
/// Pull: копируем у союзника `last_player`, если его запись строго новее.
/// Push: союзникам, чья память старее (включая сброшенную цель), отправляем
/// свою; те, что в Patrol, переходят в Alert при получении.
pub fn share_team_memory(world: &WorldSnapshot, body: &mut AgentBody) -> Vec<AgentCommand> {
    if body.archetype.params.role != Role::Team {
        return Vec::new();
    }

    let comm_range = body.archetype.params.comm_range;
    let newest = teammates_in_range(world, body, comm_range)
        .filter_map(|peer| peer.last_player)
        .fold(None::<Sighting>, |best, sighting| match best {
            Some(b) if b.timestamp >= sighting.timestamp => Some(b),
            _ => Some(sighting),
        });
    if let Some(sighting) = newest {
        body.memory.merge_sighting(sighting);
    }

    let Some(mine) = body.memory.last_player else {
        return Vec::new();
    };

    teammates_in_range(world, body, comm_range)
        .filter(|peer| peer.known_until.map_or(true, |theirs| mine.timestamp > theirs))
        .map(|peer| AgentCommand::ShareSighting {
            from: body.id,
            to: peer.id,
            sighting: mine,
        })
        .collect()
}

#[cfg(test)]
#[path = "coordination_tests.rs"]
mod tests;
