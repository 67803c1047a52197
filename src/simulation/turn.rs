//! Turns and the bounded turn history

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::action::{Action, ActionResult};
use crate::core::clock::ClockSnapshot;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub number: u32,
    /// Clock at the moment the turn was opened
    pub snapshot: ClockSnapshot,
    pub actions: Vec<Action>,
    pub entities_acted: u32,
}

impl Turn {
    pub fn new(number: u32, snapshot: ClockSnapshot) -> Self {
        Self {
            number,
            snapshot,
            actions: Vec::new(),
            entities_acted: 0,
        }
    }

    /// Record an action; false once the turn holds `max_actions`
    pub fn record(&mut self, mut action: Action, max_actions: usize) -> bool {
        if self.actions.len() >= max_actions {
            return false;
        }
        action.turn_number = self.number;
        self.actions.push(action);
        self.entities_acted += 1;
        true
    }

    pub fn count(&self, result: ActionResult) -> usize {
        self.actions.iter().filter(|a| a.result == Some(result)).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "Turn {}: Day {}, {}, {} actions",
            self.number,
            self.snapshot.day,
            self.snapshot.time_of_day,
            self.actions.len()
        )
    }
}

/// Ring of the most recent turns; the newest is the current one
#[derive(Debug, Clone, Default)]
pub struct TurnHistory {
    turns: VecDeque<Turn>,
    capacity: usize,
    total: u64,
}

impl TurnHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            capacity: capacity.max(1),
            total: 0,
        }
    }

    pub fn push(&mut self, turn: Turn) {
        if self.turns.len() >= self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
        self.total += 1;
    }

    pub fn current(&self) -> Option<&Turn> {
        self.turns.back()
    }

    pub fn current_mut(&mut self) -> Option<&mut Turn> {
        self.turns.back_mut()
    }

    pub fn get(&self, number: u32) -> Option<&Turn> {
        self.turns.iter().find(|t| t.number == number)
    }

    /// Retained turns, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Turns ever created, including those dropped from the ring
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn clear(&mut self) {
        self.turns.clear();
        self.total = 0;
    }
}
