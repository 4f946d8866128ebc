//! State machine агента
//!
//! Переход: `previous = current` → `current.exit()` → `current = target` →
//! `target.enter()`, синхронно, в одном вызове. States не вызывают
//! `change_state` сами: они возвращают `Transition`, машина применяет его
//! после выхода из state. Переходы, запрошенные из `enter()`, выполняются
//! по очереди, поэтому exit/enter никогда не вкладываются друг в друга.

use std::collections::{BTreeMap, VecDeque};

use crate::agent::Archetype;
use crate::ai::{AgentMessage, State, StateContext, StateKind, StateSet, Transition};
use crate::logger::{log, log_error, log_warning};

/// Защита от бесконечной цепочки enter → Change → enter
const MAX_CHAINED_TRANSITIONS: usize = 16;

const JOURNAL_LIMIT: usize = 32;

/// Запись в журнале жизненного цикла states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEvent {
    Exited(StateKind),
    Entered(StateKind),
}

#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    states: BTreeMap<StateKind, State>,
    global: Option<State>,
    current: Option<StateKind>,
    previous: Option<StateKind>,
    registered: StateSet,
    journal: VecDeque<StateEvent>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// States из archetype + global Monitor если он включен
    pub fn for_archetype(archetype: &Archetype) -> Self {
        let mut machine = Self::new();
        for kind in archetype.states.iter() {
            machine.register(State::new(kind));
        }
        if archetype.global_state {
            machine.set_global_state(State::new(StateKind::Monitor));
        }
        machine
    }

    /// Регистрирует state (повторная регистрация заменяет экземпляр)
    pub fn register(&mut self, state: State) {
        let kind = state.kind();
        self.registered.insert(kind);
        self.states.insert(kind, state);
    }

    pub fn set_global_state(&mut self, state: State) {
        self.global = Some(state);
    }

    pub fn current(&self) -> Option<StateKind> {
        self.current
    }

    pub fn previous(&self) -> Option<StateKind> {
        self.previous
    }

    pub fn global(&self) -> Option<StateKind> {
        self.global.as_ref().map(State::kind)
    }

    pub fn registered(&self) -> StateSet {
        self.registered
    }

    pub fn is_in(&self, kind: StateKind) -> bool {
        self.current == Some(kind)
    }

    pub fn state(&self, kind: StateKind) -> Option<&State> {
        self.states.get(&kind)
    }

    /// Последние exit/enter события (старые вытесняются)
    pub fn journal(&self) -> impl Iterator<Item = &StateEvent> {
        self.journal.iter()
    }

    /// Переход в зарегистрированный state.
    ///
    /// Незарегистрированный: warning и no-op (false): ошибка конфигурации
    /// одного агента не должна ронять тик всей популяции.
    pub fn change_state(&mut self, ctx: &mut StateContext, kind: StateKind) -> bool {
        if !self.states.contains_key(&kind) {
            log_warning(&format!(
                "⚠️ {}: state '{}' is not registered, ignoring change_state",
                ctx.body.id, kind
            ));
            return false;
        }
        self.run_transitions(ctx, Transition::Change(kind));
        true
    }

    /// Повторный вход в state, активный до последнего перехода (одна ступень истории)
    pub fn revert_to_previous_state(&mut self, ctx: &mut StateContext) -> bool {
        match self.previous {
            Some(previous) => self.change_state(ctx, previous),
            None => false,
        }
    }

    /// Global state (если есть), затем текущий. Без текущего state: no-op.
    pub fn update(&mut self, ctx: &mut StateContext, dt: f32) {
        if self.current.is_none() {
            return;
        }

        if let Some(global) = self.global.as_mut() {
            ctx.current = self.current;
            let transition = global.update(ctx, dt);
            self.run_transitions(ctx, transition);
        }

        let Some(kind) = self.current else {
            return;
        };
        ctx.current = Some(kind);
        let transition = match self.states.get_mut(&kind) {
            Some(state) => state.update(ctx, dt),
            None => Transition::Stay,
        };
        self.run_transitions(ctx, transition);
    }

    /// Сообщение текущему state, затем global. true если кто-то обработал.
    pub fn handle_message(&mut self, ctx: &mut StateContext, message: &AgentMessage) -> bool {
        ctx.current = self.current;

        let mut outcome = match self.current {
            Some(kind) => self
                .states
                .get_mut(&kind)
                .and_then(|state| state.handle_message(ctx, message)),
            None => None,
        };
        if outcome.is_none() {
            if let Some(global) = self.global.as_mut() {
                outcome = global.handle_message(ctx, message);
            }
        }

        match outcome {
            Some(transition) => {
                self.run_transitions(ctx, transition);
                true
            }
            None => false,
        }
    }

    fn run_transitions(&mut self, ctx: &mut StateContext, first: Transition) {
        let mut next = first;
        for _ in 0..MAX_CHAINED_TRANSITIONS {
            let target = match next {
                Transition::Stay => return,
                Transition::Change(kind) => kind,
                Transition::Revert => match self.previous {
                    Some(previous) => previous,
                    None => return,
                },
            };

            if !self.states.contains_key(&target) {
                log_warning(&format!(
                    "⚠️ {}: transition to unregistered state '{}' dropped",
                    ctx.body.id, target
                ));
                return;
            }
            next = self.transition(ctx, target);
        }

        log_error(&format!(
            "❌ {}: more than {} chained transitions, stopping in '{:?}'",
            ctx.body.id, MAX_CHAINED_TRANSITIONS, self.current
        ));
    }

    fn transition(&mut self, ctx: &mut StateContext, target: StateKind) -> Transition {
        log(&format!(
            "AI: {} {} → {}",
            ctx.body.id,
            self.current.map(|kind| kind.name()).unwrap_or("none"),
            target
        ));

        self.previous = self.current;
        if let Some(outgoing) = self.current {
            if let Some(state) = self.states.get_mut(&outgoing) {
                state.exit(ctx);
            }
            self.record(StateEvent::Exited(outgoing));
        }

        self.current = Some(target);
        ctx.current = Some(target);
        self.record(StateEvent::Entered(target));
        match self.states.get_mut(&target) {
            Some(state) => state.enter(ctx),
            None => Transition::Stay,
        }
    }

    fn record(&mut self, event: StateEvent) {
        if self.journal.len() == JOURNAL_LIMIT {
            self.journal.pop_front();
        }
        self.journal.push_back(event);
    }
}

#[cfg(test)]
#[path = "state_machine_tests.rs"]
mod tests;
