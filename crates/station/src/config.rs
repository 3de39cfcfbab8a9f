//! Immutable station configuration supplied at startup.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use forecourt_core::{ColumnId, FuelGrade, TankId};

use crate::tank::Tank;

/// Read-only inputs the orchestrator is constructed with: the price table,
/// the initial tank roster (used only when no persisted tanks exist), and
/// the column-to-grade connectivity map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    prices: BTreeMap<FuelGrade, f64>,
    initial_tanks: Vec<Tank>,
    columns: BTreeMap<ColumnId, BTreeSet<FuelGrade>>,
}

impl StationConfig {
    pub fn new(
        prices: BTreeMap<FuelGrade, f64>,
        initial_tanks: Vec<Tank>,
        columns: BTreeMap<ColumnId, BTreeSet<FuelGrade>>,
    ) -> Self {
        Self {
            prices,
            initial_tanks,
            columns,
        }
    }

    /// Price per liter, if the grade is in the table.
    pub fn price_of(&self, grade: FuelGrade) -> Option<f64> {
        self.prices.get(&grade).copied()
    }

    /// Grades with a configured price (these seed zeroed statistics).
    pub fn priced_grades(&self) -> impl Iterator<Item = FuelGrade> + '_ {
        self.prices.keys().copied()
    }

    pub fn initial_tanks(&self) -> &[Tank] {
        &self.initial_tanks
    }

    pub fn column_ids(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.columns.keys().copied()
    }

    /// Grades a column is configured to serve (independent of tank state).
    pub fn grades_on(&self, column: ColumnId) -> Option<&BTreeSet<FuelGrade>> {
        self.columns.get(&column)
    }
}

impl Default for StationConfig {
    /// The standard eight-column, five-tank site layout.
    fn default() -> Self {
        let prices = BTreeMap::from([
            (FuelGrade::Ai92, 55.50),
            (FuelGrade::Ai95, 58.30),
            (FuelGrade::Ai98, 64.20),
            (FuelGrade::Diesel, 56.80),
        ]);

        let cols = |ns: &[u8]| ns.iter().copied().map(ColumnId::new).collect::<Vec<_>>();
        let initial_tanks = vec![
            Tank::new(
                TankId::from("ai92-1"),
                FuelGrade::Ai92,
                20_000.0,
                12_400.0,
                1_000.0,
                true,
                cols(&[1, 2, 3, 4, 5, 6]),
            )
            .expect("static roster is valid"),
            Tank::new(
                TankId::from("ai95-1"),
                FuelGrade::Ai95,
                20_000.0,
                9_800.0,
                1_000.0,
                true,
                cols(&[1, 2, 3, 4]),
            )
            .expect("static roster is valid"),
            Tank::new(
                TankId::from("ai95-2"),
                FuelGrade::Ai95,
                20_000.0,
                1_200.0,
                1_000.0,
                false,
                cols(&[5, 6, 7, 8]),
            )
            .expect("static roster is valid"),
            Tank::new(
                TankId::from("ai98-1"),
                FuelGrade::Ai98,
                15_000.0,
                10_000.0,
                800.0,
                false,
                cols(&[3, 4, 5, 6]),
            )
            .expect("static roster is valid"),
            Tank::new(
                TankId::from("diesel-1"),
                FuelGrade::Diesel,
                25_000.0,
                15_600.0,
                1_500.0,
                true,
                cols(&[3, 4, 5, 6, 7, 8]),
            )
            .expect("static roster is valid"),
        ];

        let grades = |gs: &[FuelGrade]| gs.iter().copied().collect::<BTreeSet<_>>();
        let all = grades(&FuelGrade::ALL);
        let columns = BTreeMap::from([
            (ColumnId::new(1), grades(&[FuelGrade::Ai92, FuelGrade::Ai95])),
            (ColumnId::new(2), grades(&[FuelGrade::Ai92, FuelGrade::Ai95])),
            (ColumnId::new(3), all.clone()),
            (ColumnId::new(4), all.clone()),
            (ColumnId::new(5), all.clone()),
            (ColumnId::new(6), all),
            (
                ColumnId::new(7),
                grades(&[FuelGrade::Ai95, FuelGrade::Diesel]),
            ),
            (
                ColumnId::new(8),
                grades(&[FuelGrade::Ai95, FuelGrade::Diesel]),
            ),
        ]);

        Self::new(prices, initial_tanks, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_site_prices_every_grade() {
        let config = StationConfig::default();
        for grade in FuelGrade::ALL {
            assert!(config.price_of(grade).is_some(), "{grade} has no price");
        }
    }

    #[test]
    fn default_roster_connectivity_matches_column_map() {
        let config = StationConfig::default();
        // Every (column, grade) a tank claims to serve is present in the
        // column map.
        for tank in config.initial_tanks() {
            for column in tank.connected_columns() {
                let grades = config
                    .grades_on(column)
                    .unwrap_or_else(|| panic!("column {column} missing from map"));
                assert!(
                    grades.contains(&tank.fuel()),
                    "column {column} does not list {}",
                    tank.fuel()
                );
            }
        }
    }
}
