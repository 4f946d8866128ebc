//! Enemy AI: state machine + perception-driven states + координация
//!
//! Поток данных за тик:
//! `AgentManager` → `Agent::update` → `StateMachine::update` → global state,
//! затем текущий state читает perception/память/снимок мира и возвращает
//! `Transition`; команды соседям и игроку уходят в outbox.

pub mod context;
pub mod coordination;
pub mod messages;
pub mod state_machine;
pub mod states;

pub use context::StateContext;
pub use coordination::{PeerView, PlayerView, WorldSnapshot};
pub use messages::{AgentCommand, AgentMessage};
pub use state_machine::{StateEvent, StateMachine};
pub use states::{AgentState, State, StateKind, StateSet, Transition};
