//! Running sales statistics, mutated only by completed sales.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use forecourt_core::FuelGrade;

/// Per-grade running totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelTally {
    pub liters: f64,
    pub income: f64,
}

/// Station-lifetime sales totals.
///
/// Monotone: only [`Statistics::record_sale`] mutates it, and every field
/// is non-decreasing across calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    total_cars: u64,
    total_income: f64,
    fuel_stats: BTreeMap<FuelGrade, FuelTally>,
}

impl Statistics {
    /// Fresh statistics seeded with a zero entry for each known grade, so
    /// reports always show every grade even before its first sale.
    pub fn zeroed(grades: impl IntoIterator<Item = FuelGrade>) -> Self {
        Self {
            total_cars: 0,
            total_income: 0.0,
            fuel_stats: grades
                .into_iter()
                .map(|g| (g, FuelTally::default()))
                .collect(),
        }
    }

    pub fn total_cars(&self) -> u64 {
        self.total_cars
    }

    pub fn total_income(&self) -> f64 {
        self.total_income
    }

    pub fn fuel_stats(&self) -> &BTreeMap<FuelGrade, FuelTally> {
        &self.fuel_stats
    }

    pub fn tally_for(&self, grade: FuelGrade) -> FuelTally {
        self.fuel_stats.get(&grade).copied().unwrap_or_default()
    }

    /// Record one completed sale.
    pub fn record_sale(&mut self, grade: FuelGrade, liters: f64, total_price: f64) {
        self.total_cars += 1;
        self.total_income += total_price;
        let tally = self.fuel_stats.entry(grade).or_default();
        tally.liters += liters;
        tally.income += total_price;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_seeds_every_grade() {
        let stats = Statistics::zeroed(FuelGrade::ALL);
        assert_eq!(stats.total_cars(), 0);
        assert_eq!(stats.fuel_stats().len(), FuelGrade::ALL.len());
        assert_eq!(stats.tally_for(FuelGrade::Diesel), FuelTally::default());
    }

    #[test]
    fn record_sale_accumulates_per_grade_and_totals() {
        let mut stats = Statistics::zeroed(FuelGrade::ALL);
        stats.record_sale(FuelGrade::Ai95, 20.0, 1166.0);
        stats.record_sale(FuelGrade::Ai95, 10.0, 583.0);
        stats.record_sale(FuelGrade::Diesel, 30.0, 1704.0);

        assert_eq!(stats.total_cars(), 3);
        assert!((stats.total_income() - 3453.0).abs() < 1e-9);
        let ai95 = stats.tally_for(FuelGrade::Ai95);
        assert!((ai95.liters - 30.0).abs() < 1e-9);
        assert!((ai95.income - 1749.0).abs() < 1e-9);
    }
}
