//! Tank entity: one fuel grade's physical inventory and its enable status.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use forecourt_core::{ColumnId, FuelGrade, StationError, StationResult, TankId};

/// Reject amounts that are not positive, finite liter quantities.
///
/// The volume arithmetic below assumes this has been checked; callers inside
/// the crate (the orchestrator's transfer path) rely on it too.
pub(crate) fn validate_amount(liters: f64) -> StationResult<()> {
    if !liters.is_finite() || liters <= 0.0 {
        return Err(StationError::InvalidAmount(liters));
    }
    Ok(())
}

/// A physical fuel tank.
///
/// Invariant: `0 <= current_volume <= max_volume` after every operation.
/// A tank whose volume drops below `min_level` is forced disabled as a side
/// effect of the mutation that took it there; it is never re-enabled
/// automatically — [`Tank::enable`] re-validates the level explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    id: TankId,
    fuel: FuelGrade,
    max_volume: f64,
    current_volume: f64,
    min_level: f64,
    enabled: bool,
    connected_to: BTreeSet<ColumnId>,
}

impl Tank {
    pub fn new(
        id: TankId,
        fuel: FuelGrade,
        max_volume: f64,
        current_volume: f64,
        min_level: f64,
        enabled: bool,
        connected_to: impl IntoIterator<Item = ColumnId>,
    ) -> StationResult<Self> {
        if !max_volume.is_finite() || max_volume < 0.0 {
            return Err(StationError::InvalidAmount(max_volume));
        }
        if !min_level.is_finite() || min_level < 0.0 {
            return Err(StationError::InvalidAmount(min_level));
        }
        if !current_volume.is_finite() || current_volume < 0.0 || current_volume > max_volume {
            return Err(StationError::InvalidAmount(current_volume));
        }
        Ok(Self {
            id,
            fuel,
            max_volume,
            current_volume,
            min_level,
            enabled,
            connected_to: connected_to.into_iter().collect(),
        })
    }

    pub fn id(&self) -> &TankId {
        &self.id
    }

    pub fn fuel(&self) -> FuelGrade {
        self.fuel
    }

    pub fn max_volume(&self) -> f64 {
        self.max_volume
    }

    pub fn current_volume(&self) -> f64 {
        self.current_volume
    }

    pub fn min_level(&self) -> f64 {
        self.min_level
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn free_capacity(&self) -> f64 {
        self.max_volume - self.current_volume
    }

    /// Whether this tank is physically plumbed to the given column.
    pub fn serves_column(&self, column: ColumnId) -> bool {
        self.connected_to.contains(&column)
    }

    pub fn connected_columns(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.connected_to.iter().copied()
    }

    /// True iff the current volume is at or above the minimum safe level.
    /// Pure, no side effects.
    pub fn check_level(&self) -> bool {
        self.current_volume >= self.min_level
    }

    /// Force `enabled = false` when the level is below minimum.
    ///
    /// Returns true whenever the level is low, whether or not this call is
    /// the one that flipped the flag (the startup sweep reports low tanks
    /// even if they were already disabled).
    pub fn disable_if_low(&mut self) -> bool {
        if self.current_volume < self.min_level {
            self.enabled = false;
            return true;
        }
        false
    }

    /// Add fuel. Fails with `CapacityExceeded` when the tank cannot absorb
    /// the full amount; never touches `enabled`.
    pub fn add_fuel(&mut self, liters: f64) -> StationResult<()> {
        validate_amount(liters)?;
        if self.current_volume + liters > self.max_volume {
            return Err(StationError::CapacityExceeded {
                tank: self.id.clone(),
                requested: liters,
                free: self.free_capacity(),
            });
        }
        self.current_volume += liters;
        Ok(())
    }

    /// Remove fuel for dispensing.
    ///
    /// Fails when the tank is disabled or holds less than requested. On
    /// success, dropping below `min_level` force-disables the tank.
    pub fn remove_fuel(&mut self, liters: f64) -> StationResult<()> {
        validate_amount(liters)?;
        if !self.enabled {
            return Err(StationError::SourceDisabled(self.id.clone()));
        }
        if liters > self.current_volume {
            return Err(StationError::InsufficientStock {
                tank: self.id.clone(),
                available: self.current_volume,
            });
        }
        self.current_volume -= liters;
        if self.current_volume < self.min_level {
            self.enabled = false;
        }
        Ok(())
    }

    /// Enable the tank; requires the level to be at or above minimum.
    pub fn enable(&mut self) -> StationResult<()> {
        if !self.check_level() {
            return Err(StationError::BelowMinimum {
                tank: self.id.clone(),
                min_level: self.min_level,
            });
        }
        self.enabled = true;
        Ok(())
    }

    /// Disable the tank. Always permitted.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Transfer-only raw debit: the source's enabled/stock checks are done
    /// by the orchestrator before this runs, and low-level auto-disable is
    /// re-evaluated separately afterwards.
    pub(crate) fn debit_unchecked(&mut self, liters: f64) {
        self.current_volume -= liters;
    }

    pub(crate) fn credit_unchecked(&mut self, liters: f64) {
        self.current_volume += liters;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tank(current: f64, min: f64, enabled: bool) -> Tank {
        Tank::new(
            TankId::from("ai95-1"),
            FuelGrade::Ai95,
            1000.0,
            current,
            min,
            enabled,
            [ColumnId::new(1), ColumnId::new(2)],
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_volume_outside_capacity() {
        assert!(
            Tank::new(
                TankId::from("t"),
                FuelGrade::Ai92,
                100.0,
                150.0,
                10.0,
                true,
                []
            )
            .is_err()
        );
    }

    #[test]
    fn add_fuel_respects_capacity() {
        let mut t = tank(900.0, 100.0, true);
        assert!(matches!(
            t.add_fuel(200.0),
            Err(StationError::CapacityExceeded { .. })
        ));
        assert_eq!(t.current_volume(), 900.0);

        t.add_fuel(100.0).unwrap();
        assert_eq!(t.current_volume(), 1000.0);
    }

    #[test]
    fn add_fuel_never_enables_a_disabled_tank() {
        let mut t = tank(50.0, 100.0, false);
        t.add_fuel(500.0).unwrap();
        assert!(!t.is_enabled());
        assert!(t.check_level());
    }

    #[test]
    fn remove_fuel_fails_when_disabled() {
        let mut t = tank(500.0, 100.0, false);
        assert!(matches!(
            t.remove_fuel(10.0),
            Err(StationError::SourceDisabled(_))
        ));
        assert_eq!(t.current_volume(), 500.0);
    }

    #[test]
    fn remove_fuel_fails_on_insufficient_stock() {
        let mut t = tank(500.0, 100.0, true);
        assert!(matches!(
            t.remove_fuel(600.0),
            Err(StationError::InsufficientStock { .. })
        ));
        assert_eq!(t.current_volume(), 500.0);
        assert!(t.is_enabled());
    }

    #[test]
    fn remove_fuel_below_minimum_auto_disables() {
        let mut t = tank(150.0, 100.0, true);
        t.remove_fuel(100.0).unwrap();
        assert_eq!(t.current_volume(), 50.0);
        assert!(!t.is_enabled());
    }

    #[test]
    fn enable_requires_minimum_level() {
        let mut t = tank(50.0, 100.0, false);
        assert!(matches!(
            t.enable(),
            Err(StationError::BelowMinimum { .. })
        ));
        assert!(!t.is_enabled());

        t.add_fuel(100.0).unwrap();
        t.enable().unwrap();
        assert!(t.is_enabled());
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let mut t = tank(500.0, 100.0, true);
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                t.add_fuel(bad),
                Err(StationError::InvalidAmount(_))
            ));
            assert!(matches!(
                t.remove_fuel(bad),
                Err(StationError::InvalidAmount(_))
            ));
        }
        assert_eq!(t.current_volume(), 500.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: no sequence of add/remove operations can take the
        /// volume outside [0, max_volume], and whenever the volume ends
        /// below min_level the tank ends disabled.
        #[test]
        fn volume_stays_in_bounds(
            amounts in prop::collection::vec((any::<bool>(), 1.0f64..400.0), 1..30)
        ) {
            let mut t = tank(500.0, 100.0, true);
            for (is_add, amount) in amounts {
                let _ = if is_add { t.add_fuel(amount) } else { t.remove_fuel(amount) };
                prop_assert!(t.current_volume() >= 0.0);
                prop_assert!(t.current_volume() <= t.max_volume());
                if t.current_volume() < t.min_level() {
                    prop_assert!(!t.is_enabled());
                }
            }
        }

        /// Property: a failed operation leaves the tank bitwise unchanged.
        #[test]
        fn failed_operations_do_not_mutate(amount in 600.0f64..2000.0) {
            let mut t = tank(500.0, 100.0, true);
            let before = t.clone();
            prop_assert!(t.remove_fuel(amount).is_err());
            prop_assert_eq!(&t, &before);
            prop_assert!(t.add_fuel(amount).is_err());
            prop_assert_eq!(&t, &before);
        }
    }
}
