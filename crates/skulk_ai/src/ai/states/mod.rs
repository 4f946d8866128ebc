//! Конкретные states агента.
//!
//! Закрытый enum `State` с match-dispatch вместо map<string, State>:
//! exhaustiveness проверяется компилятором. Каждый вариант реализует
//! контракт `AgentState` (enter/update/exit/handle_message).

use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

use bevy::math::Vec2;
use rand::Rng;

use crate::agent::Sighting;
use crate::ai::{AgentCommand, AgentMessage, StateContext};
use crate::geometry::direction;

pub mod alert;
pub mod attack;
pub mod berserk;
pub mod chase;
pub mod disguise;
pub mod fear;
pub mod monitor;
pub mod patrol;
pub mod surround;

pub use alert::AlertState;
pub use attack::AttackState;
pub use berserk::BerserkState;
pub use chase::ChaseState;
pub use disguise::{DisguiseState, RevealState};
pub use fear::FearState;
pub use monitor::MonitorState;
pub use patrol::PatrolState;
pub use surround::SurroundState;

/// Дистанция, на которой Chase переходит в Attack
pub const ATTACK_ENGAGE_DISTANCE: f32 = 60.0;

/// Радиус "дошёл до точки" для waypoints / last known position
pub const ARRIVE_DISTANCE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateKind {
    Patrol,
    Chase,
    Attack,
    Alert,
    Surround,
    Berserk,
    Fear,
    Disguise,
    Reveal,
    /// Global state: координация и stat-триггеры, обновляется каждый тик
    Monitor,
}

impl StateKind {
    pub const ALL: [StateKind; 10] = [
        StateKind::Patrol,
        StateKind::Chase,
        StateKind::Attack,
        StateKind::Alert,
        StateKind::Surround,
        StateKind::Berserk,
        StateKind::Fear,
        StateKind::Disguise,
        StateKind::Reveal,
        StateKind::Monitor,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StateKind::Patrol => "patrol",
            StateKind::Chase => "chase",
            StateKind::Attack => "attack",
            StateKind::Alert => "alert",
            StateKind::Surround => "surround",
            StateKind::Berserk => "berserk",
            StateKind::Fear => "fear",
            StateKind::Disguise => "disguise",
            StateKind::Reveal => "reveal",
            StateKind::Monitor => "monitor",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown state '{}'", s))
    }
}

/// Набор StateKind (bitset, Copy)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateSet(u16);

impl StateSet {
    pub const EMPTY: StateSet = StateSet(0);

    pub fn from_kinds(kinds: &[StateKind]) -> Self {
        let mut set = Self::EMPTY;
        for kind in kinds {
            set.insert(*kind);
        }
        set
    }

    pub fn insert(&mut self, kind: StateKind) {
        self.0 |= kind.bit();
    }

    pub fn contains(&self, kind: StateKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = StateKind> + '_ {
        StateKind::ALL.iter().copied().filter(|kind| self.contains(*kind))
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Результат enter/update/handle_message: что сделать машине дальше
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Change(StateKind),
    /// Вернуться в state, активный до последнего перехода
    Revert,
}

/// Контракт behavior unit
pub trait AgentState {
    fn enter(&mut self, _ctx: &mut StateContext) -> Transition {
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut StateContext, dt: f32) -> Transition;

    fn exit(&mut self, _ctx: &mut StateContext) {}

    /// `None`: сообщение не обработано этим state
    fn handle_message(&mut self, _ctx: &mut StateContext, _message: &AgentMessage) -> Option<Transition> {
        None
    }
}

#[derive(Debug, Clone)]
pub enum State {
    Patrol(PatrolState),
    Chase(ChaseState),
    Attack(AttackState),
    Alert(AlertState),
    Surround(SurroundState),
    Berserk(BerserkState),
    Fear(FearState),
    Disguise(DisguiseState),
    Reveal(RevealState),
    Monitor(MonitorState),
}

macro_rules! dispatch {
    ($self:ident, $state:ident => $call:expr) => {
        match $self {
            State::Patrol($state) => $call,
            State::Chase($state) => $call,
            State::Attack($state) => $call,
            State::Alert($state) => $call,
            State::Surround($state) => $call,
            State::Berserk($state) => $call,
            State::Fear($state) => $call,
            State::Disguise($state) => $call,
            State::Reveal($state) => $call,
            State::Monitor($state) => $call,
        }
    };
}

impl State {
    /// Свежий экземпляр state с дефолтными рабочими данными
    pub fn new(kind: StateKind) -> Self {
        match kind {
            StateKind::Patrol => State::Patrol(PatrolState::default()),
            StateKind::Chase => State::Chase(ChaseState::default()),
            StateKind::Attack => State::Attack(AttackState::default()),
            StateKind::Alert => State::Alert(AlertState::default()),
            StateKind::Surround => State::Surround(SurroundState::default()),
            StateKind::Berserk => State::Berserk(BerserkState::default()),
            StateKind::Fear => State::Fear(FearState::default()),
            StateKind::Disguise => State::Disguise(DisguiseState::default()),
            StateKind::Reveal => State::Reveal(RevealState::default()),
            StateKind::Monitor => State::Monitor(MonitorState::default()),
        }
    }

    pub fn kind(&self) -> StateKind {
        match self {
            State::Patrol(_) => StateKind::Patrol,
            State::Chase(_) => StateKind::Chase,
            State::Attack(_) => StateKind::Attack,
            State::Alert(_) => StateKind::Alert,
            State::Surround(_) => StateKind::Surround,
            State::Berserk(_) => StateKind::Berserk,
            State::Fear(_) => StateKind::Fear,
            State::Disguise(_) => StateKind::Disguise,
            State::Reveal(_) => StateKind::Reveal,
            State::Monitor(_) => StateKind::Monitor,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn enter(&mut self, ctx: &mut StateContext) -> Transition {
        dispatch!(self, state => state.enter(ctx))
    }

    pub fn update(&mut self, ctx: &mut StateContext, dt: f32) -> Transition {
        dispatch!(self, state => state.update(ctx, dt))
    }

    pub fn exit(&mut self, ctx: &mut StateContext) {
        dispatch!(self, state => state.exit(ctx))
    }

    pub fn handle_message(&mut self, ctx: &mut StateContext, message: &AgentMessage) -> Option<Transition> {
        dispatch!(self, state => state.handle_message(ctx, message))
    }
}

/// Оповестить команду: игрок замечен в `player`
pub(crate) fn raise_alert(ctx: &mut StateContext, player: Vec2) {
    let radius = ctx.body.archetype.params.alert_radius;
    if radius <= 0.0 {
        return;
    }
    let command = AgentCommand::BroadcastAlert {
        from: ctx.body.id,
        team: ctx.body.team(),
        origin: ctx.body.position,
        radius,
        player_position: player,
    };
    ctx.send(command);
}

/// Самый свежий звук шагов → запомнить его как позицию игрока.
///
/// Без проверки дистанции и громкости: любой услышанный footstep считается
/// игроком. `None`: шагов не слышно, `Some(fresh)`: слышно, `fresh`
/// если звук новее того, что агент уже помнит.
pub(crate) fn heard_footstep(ctx: &mut StateContext) -> Option<bool> {
    let now = ctx.now();
    let sound = ctx.body.hearing.latest_sound(now)?.clone();
    if !sound.is_footstep() {
        return None;
    }
    Some(ctx.body.memory.merge_sighting(Sighting {
        position: sound.origin,
        timestamp: sound.timestamp,
    }))
}

/// Случайная точка в круге (равномерно по площади)
pub(crate) fn random_point_in_disk(ctx: &mut StateContext, center: Vec2, radius: f32) -> Vec2 {
    let angle = ctx.body.rng.gen_range(0.0..TAU);
    let r = radius * ctx.body.rng.gen::<f32>().sqrt();
    center + direction(angle) * r
}
