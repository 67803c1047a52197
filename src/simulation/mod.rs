//! Turn engine - actions, turns, deciders and the game loop

pub mod action;
pub mod decider;
pub mod decision;
pub mod execute;
pub mod game_loop;
pub mod turn;
pub mod validate;

pub use action::{Action, ActionCategory, ActionKind, ActionResult};
pub use decider::{Decider, IdleDecider, ScriptedDecider};
pub use decision::{Decision, DecisionContext, DecisionLog, DecisionOption, DecisionRecord};
pub use game_loop::{EngineState, EngineStats, GameLoop, Simulation};
pub use turn::{Turn, TurnHistory};
pub use validate::{validate, ValidationError};
