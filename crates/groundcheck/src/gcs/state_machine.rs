//! UAS flight state machine.
//!
//! | command    | from                                   | to          |
//! |------------|----------------------------------------|-------------|
//! | `take_off` | `Landed`                               | `TakingOff` |
//! | `land`     | `Flying`, `FlyingToWaypoint`, `Loitering` | `Landing` |
//! | `loiter`   | `Flying`, `FlyingToWaypoint`           | `Loitering` |
//! | `fly`      | `Loitering`, `TakingOff`               | `Flying`    |
//!
//! Illegal commands are ignored. Every effective change is recorded.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Flight state; discriminants are stable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UasState {
    /// On the ground (initial)
    #[default]
    Landed = 0,
    /// Climbing to cruise altitude
    TakingOff = 1,
    /// Cruising without a destination
    Flying = 2,
    /// Navigating to a destination
    FlyingToWaypoint = 3,
    /// Circling a point
    Loitering = 4,
    /// Descending to the ground
    Landing = 5,
}

impl UasState {
    /// All states in discriminant order
    pub const ALL: [Self; 6] = [
        Self::Landed,
        Self::TakingOff,
        Self::Flying,
        Self::FlyingToWaypoint,
        Self::Loitering,
        Self::Landing,
    ];

    /// Text shown in the status panel
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Landed => "Landed",
            Self::TakingOff => "Taking Off",
            Self::Flying => "Flying",
            Self::FlyingToWaypoint => "Flying To Waypoint",
            Self::Loitering => "Loitering",
            Self::Landing => "Landing",
        }
    }

    /// In the air under control: can land or navigate
    #[must_use]
    pub const fn is_flyable(self) -> bool {
        matches!(self, Self::Flying | Self::FlyingToWaypoint | Self::Loitering)
    }

    /// Anywhere but on the ground
    #[must_use]
    pub const fn is_airborne(self) -> bool {
        !matches!(self, Self::Landed)
    }
}

impl fmt::Display for UasState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One recorded transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    /// Previous state
    pub from: UasState,
    /// New state
    pub to: UasState,
}

/// State machine with a change log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UasStateMachine {
    current: UasState,
    changes: Vec<StateChange>,
}

impl UasStateMachine {
    /// Start in `Landed`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    #[must_use]
    pub const fn current(&self) -> UasState {
        self.current
    }

    /// Every effective change so far, oldest first
    #[must_use]
    pub fn changes(&self) -> &[StateChange] {
        &self.changes
    }

    /// `Landed → TakingOff`
    pub fn take_off(&mut self) -> bool {
        self.command("take off", self.current == UasState::Landed, UasState::TakingOff)
    }

    /// `Flying | FlyingToWaypoint | Loitering → Landing`
    pub fn land(&mut self) -> bool {
        self.command("land", self.current.is_flyable(), UasState::Landing)
    }

    /// `Flying | FlyingToWaypoint → Loitering`
    pub fn loiter(&mut self) -> bool {
        let legal = matches!(self.current, UasState::Flying | UasState::FlyingToWaypoint);
        self.command("loiter", legal, UasState::Loitering)
    }

    /// `Loitering | TakingOff → Flying`
    pub fn fly(&mut self) -> bool {
        let legal = matches!(self.current, UasState::Loitering | UasState::TakingOff);
        self.command("fly", legal, UasState::Flying)
    }

    /// Unconditional transition; returns whether the state changed
    pub fn set_state(&mut self, state: UasState) -> bool {
        if self.current == state {
            return false;
        }
        let change = StateChange {
            from: self.current,
            to: state,
        };
        debug!(from = %change.from, to = %change.to, "UAS state changed");
        self.current = state;
        self.changes.push(change);
        true
    }

    fn command(&mut self, name: &str, legal: bool, to: UasState) -> bool {
        if legal {
            self.set_state(to)
        } else {
            debug!(command = name, state = %self.current, "command ignored");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_initial_state() {
        let sm = UasStateMachine::new();
        assert_eq!(sm.current(), UasState::Landed);
        assert!(sm.changes().is_empty());
    }

    #[test]
    fn test_discriminants() {
        for (i, state) in UasState::ALL.iter().enumerate() {
            assert_eq!(*state as usize, i);
        }
    }

    #[test]
    fn test_full_flight() {
        let mut sm = UasStateMachine::new();
        assert!(sm.take_off());
        assert!(sm.fly());
        assert!(sm.set_state(UasState::FlyingToWaypoint));
        assert!(sm.loiter());
        assert!(sm.land());
        assert!(sm.set_state(UasState::Landed));
        let path: Vec<_> = sm.changes().iter().map(|c| c.to).collect();
        assert_eq!(
            path,
            vec![
                UasState::TakingOff,
                UasState::Flying,
                UasState::FlyingToWaypoint,
                UasState::Loitering,
                UasState::Landing,
                UasState::Landed,
            ]
        );
    }

    #[test]
    fn test_illegal_commands_are_ignored() {
        let mut sm = UasStateMachine::new();
        assert!(!sm.land());
        assert!(!sm.loiter());
        assert!(!sm.fly());
        assert_eq!(sm.current(), UasState::Landed);
        assert!(sm.changes().is_empty());
    }

    #[test]
    fn test_same_state_records_nothing() {
        let mut sm = UasStateMachine::new();
        assert!(!sm.set_state(UasState::Landed));
        assert!(sm.changes().is_empty());
    }

    #[test]
    fn test_labels() {
        assert_eq!(UasState::FlyingToWaypoint.to_string(), "Flying To Waypoint");
        assert_eq!(UasState::TakingOff.label(), "Taking Off");
    }

    #[derive(Debug, Clone, Copy)]
    enum Command {
        TakeOff,
        Land,
        Loiter,
        Fly,
    }

    fn legal_target(from: UasState, command: Command) -> Option<UasState> {
        use UasState::{Flying, FlyingToWaypoint, Landed, Landing, Loitering, TakingOff};
        match (command, from) {
            (Command::TakeOff, Landed) => Some(TakingOff),
            (Command::Land, Flying | FlyingToWaypoint | Loitering) => Some(Landing),
            (Command::Loiter, Flying | FlyingToWaypoint) => Some(Loitering),
            (Command::Fly, Loitering | TakingOff) => Some(Flying),
            _ => None,
        }
    }

    proptest! {
        #[test]
        fn prop_commands_follow_transition_table(
            start in 0usize..6,
            commands in proptest::collection::vec(0u8..4, 0..20),
        ) {
            let mut sm = UasStateMachine::new();
            let _ = sm.set_state(UasState::ALL[start]);
            for c in commands {
                let command = match c {
                    0 => Command::TakeOff,
                    1 => Command::Land,
                    2 => Command::Loiter,
                    _ => Command::Fly,
                };
                let before = sm.current();
                let log_len = sm.changes().len();
                let applied = match command {
                    Command::TakeOff => sm.take_off(),
                    Command::Land => sm.land(),
                    Command::Loiter => sm.loiter(),
                    Command::Fly => sm.fly(),
                };
                match legal_target(before, command) {
                    Some(to) => {
                        prop_assert!(applied);
                        prop_assert_eq!(sm.current(), to);
                        prop_assert_eq!(sm.changes().len(), log_len + 1);
                    }
                    None => {
                        prop_assert!(!applied);
                        prop_assert_eq!(sm.current(), before);
                        prop_assert_eq!(sm.changes().len(), log_len);
                    }
                }
            }
        }
    }
}
