//! Station-wide emergency lockdown state machine.

use serde::{Deserialize, Serialize};

use forecourt_core::{StationError, StationResult};

/// Binary operational mode gating every mutating station operation.
///
/// `trigger` is valid only from `Normal` and `deactivate` only from
/// `Emergency`; the transition from the target state is a failed no-op.
/// Deactivation deliberately does not re-enable any tank: the operator
/// re-enables each one manually, which re-validates its level. Forcing
/// every tank disabled on trigger is the orchestrator's side effect, not
/// this machine's.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyMode {
    Normal,
    Emergency,
}

impl EmergencyMode {
    /// Rehydrate from the persisted boolean flag.
    pub fn from_flag(active: bool) -> Self {
        if active {
            EmergencyMode::Emergency
        } else {
            EmergencyMode::Normal
        }
    }

    pub fn as_flag(self) -> bool {
        self == EmergencyMode::Emergency
    }

    pub fn is_active(self) -> bool {
        self.as_flag()
    }

    /// Enter emergency mode. Fails (`AlreadyInState`) if already active.
    pub fn trigger(&mut self) -> StationResult<()> {
        if self.is_active() {
            return Err(StationError::AlreadyInState("active"));
        }
        *self = EmergencyMode::Emergency;
        Ok(())
    }

    /// Leave emergency mode. Fails (`AlreadyInState`) if not active.
    pub fn deactivate(&mut self) -> StationResult<()> {
        if !self.is_active() {
            return Err(StationError::AlreadyInState("inactive"));
        }
        *self = EmergencyMode::Normal;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_and_deactivate_round_trip() {
        let mut mode = EmergencyMode::Normal;
        mode.trigger().unwrap();
        assert!(mode.is_active());
        mode.deactivate().unwrap();
        assert!(!mode.is_active());
    }

    #[test]
    fn transitions_from_target_state_fail_without_changing_state() {
        let mut mode = EmergencyMode::Normal;
        assert_eq!(
            mode.deactivate(),
            Err(StationError::AlreadyInState("inactive"))
        );
        assert_eq!(mode, EmergencyMode::Normal);

        mode.trigger().unwrap();
        assert_eq!(mode.trigger(), Err(StationError::AlreadyInState("active")));
        assert_eq!(mode, EmergencyMode::Emergency);
    }

    #[test]
    fn flag_round_trip() {
        assert_eq!(EmergencyMode::from_flag(true), EmergencyMode::Emergency);
        assert_eq!(EmergencyMode::from_flag(false), EmergencyMode::Normal);
        assert!(EmergencyMode::Emergency.as_flag());
        assert!(!EmergencyMode::Normal.as_flag());
    }
}
