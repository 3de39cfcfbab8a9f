//! Interactive console menu for the station operator.
//!
//! Thin external collaborator: parses input, calls orchestrator operations,
//! and formats their results. All rules live in `forecourt-station`.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use forecourt_core::{ColumnId, FuelGrade, StationError, TankId};
use forecourt_infra::JsonFileStore;
use forecourt_station::{StationConfig, StationOrchestrator};

fn main() -> Result<()> {
    forecourt_observability::init();

    let data_dir = std::env::var("FORECOURT_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let store = JsonFileStore::open(&data_dir)
        .with_context(|| format!("opening data directory {data_dir}"))?;
    let station = StationOrchestrator::new(StationConfig::default(), store)
        .context("loading station state")?;

    run(station)
}

fn run(mut station: StationOrchestrator<JsonFileStore>) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print_menu();
        let Some(choice) = read_line(&mut lines)? else {
            return Ok(());
        };
        let outcome = match choice.trim() {
            "1" => serve_customer(&mut station, &mut lines),
            "2" => column_status(&station, &mut lines),
            "3" => Ok(print_tanks(&station)),
            "4" => refuel(&mut station, &mut lines),
            "5" => transfer(&mut station, &mut lines),
            "6" => toggle(&mut station, &mut lines),
            "7" => Ok(print_statistics(&station)),
            "8" => Ok(print_transactions(&station)),
            "9" => emergency(&mut station),
            "0" => return Ok(()),
            other => {
                println!("unknown choice: {other}");
                Ok(())
            }
        };
        match outcome {
            Ok(()) => {}
            Err(MenuError::Station(err)) if err.is_storage() => {
                // State may have drifted from disk; do not keep operating.
                return Err(anyhow::anyhow!(err)).context("durable save failed");
            }
            Err(MenuError::Station(err)) => println!("rejected: {err}"),
            Err(MenuError::Input(msg)) => println!("invalid input: {msg}"),
            Err(MenuError::Io(err)) => return Err(err.into()),
        }
    }
}

enum MenuError {
    Station(StationError),
    Input(String),
    Io(io::Error),
}

impl From<StationError> for MenuError {
    fn from(err: StationError) -> Self {
        MenuError::Station(err)
    }
}

impl From<io::Error> for MenuError {
    fn from(err: io::Error) -> Self {
        MenuError::Io(err)
    }
}

type Lines<'a> = io::Lines<io::StdinLock<'a>>;

fn print_menu() {
    println!();
    println!("=== Forecourt control ===");
    println!(" 1) serve customer");
    println!(" 2) column status");
    println!(" 3) tank overview");
    println!(" 4) refuel tank");
    println!(" 5) transfer fuel");
    println!(" 6) enable/disable tank");
    println!(" 7) statistics");
    println!(" 8) recent transactions");
    println!(" 9) emergency mode");
    println!(" 0) exit");
    print!("> ");
    let _ = io::stdout().flush();
}

fn read_line(lines: &mut Lines<'_>) -> Result<Option<String>> {
    match lines.next() {
        Some(line) => Ok(Some(line?)),
        None => Ok(None),
    }
}

fn prompt(lines: &mut Lines<'_>, label: &str) -> Result<String, MenuError> {
    print!("{label}: ");
    let _ = io::stdout().flush();
    match lines.next() {
        Some(line) => Ok(line?),
        None => Err(MenuError::Input("end of input".to_string())),
    }
}

fn prompt_column(lines: &mut Lines<'_>) -> Result<ColumnId, MenuError> {
    prompt(lines, "column")?
        .parse::<ColumnId>()
        .map_err(|e| MenuError::Input(format!("column: {e}")))
}

fn prompt_grade(lines: &mut Lines<'_>) -> Result<FuelGrade, MenuError> {
    prompt(lines, "fuel grade")?
        .parse::<FuelGrade>()
        .map_err(|e| MenuError::Input(e.to_string()))
}

fn prompt_liters(lines: &mut Lines<'_>) -> Result<f64, MenuError> {
    prompt(lines, "liters")?
        .trim()
        .parse::<f64>()
        .map_err(|e| MenuError::Input(format!("liters: {e}")))
}

fn prompt_tank(lines: &mut Lines<'_>, label: &str) -> Result<TankId, MenuError> {
    let raw = prompt(lines, label)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MenuError::Input(format!("{label} must not be empty")));
    }
    Ok(TankId::from(trimmed))
}

fn serve_customer(
    station: &mut StationOrchestrator<JsonFileStore>,
    lines: &mut Lines<'_>,
) -> Result<(), MenuError> {
    let column = prompt_column(lines)?;
    let fuel = prompt_grade(lines)?;
    let liters = prompt_liters(lines)?;

    let receipt = station.serve_customer(column, fuel, liters)?;
    println!(
        "dispensed {:.1} l of {} from {} — {:.2} at {:.2}/l",
        receipt.liters, receipt.fuel, receipt.tank, receipt.total_price, receipt.price_per_liter
    );
    Ok(())
}

fn column_status(
    station: &StationOrchestrator<JsonFileStore>,
    lines: &mut Lines<'_>,
) -> Result<(), MenuError> {
    let column = prompt_column(lines)?;
    let status = station.column_status(column);

    println!("column {column}:");
    if status.available_fuels.is_empty() {
        println!("  no tanks connected");
    }
    for (fuel, line) in &status.available_fuels {
        let state = if line.enabled { "ok" } else { "disabled" };
        println!(
            "  {fuel}: tank {} ({:.1} l, {state})",
            line.tank, line.volume
        );
    }
    Ok(())
}

fn print_tanks(station: &StationOrchestrator<JsonFileStore>) {
    for tank in station.tanks() {
        let state = if tank.is_enabled() { "enabled" } else { "disabled" };
        println!(
            "{}: {} {:.1}/{:.1} l (min {:.1}) [{state}]",
            tank.id(),
            tank.fuel(),
            tank.current_volume(),
            tank.max_volume(),
            tank.min_level()
        );
    }
    let disabled = station.disabled_tanks();
    if !disabled.is_empty() {
        let ids: Vec<_> = disabled.iter().map(|t| t.id().as_str()).collect();
        println!("attention, disabled tanks: {}", ids.join(", "));
    }
}

fn refuel(
    station: &mut StationOrchestrator<JsonFileStore>,
    lines: &mut Lines<'_>,
) -> Result<(), MenuError> {
    let tank = prompt_tank(lines, "tank id")?;
    let liters = prompt_liters(lines)?;
    let new_volume = station.refuel_tank(&tank, liters)?;
    println!("tank {tank} now holds {new_volume:.1} l");
    Ok(())
}

fn transfer(
    station: &mut StationOrchestrator<JsonFileStore>,
    lines: &mut Lines<'_>,
) -> Result<(), MenuError> {
    let from = prompt_tank(lines, "source tank id")?;
    let to = prompt_tank(lines, "destination tank id")?;
    let liters = prompt_liters(lines)?;
    station.transfer_fuel(&from, &to, liters)?;
    println!("transferred {liters:.1} l from {from} to {to}");
    Ok(())
}

fn toggle(
    station: &mut StationOrchestrator<JsonFileStore>,
    lines: &mut Lines<'_>,
) -> Result<(), MenuError> {
    let tank = prompt_tank(lines, "tank id")?;
    let answer = prompt(lines, "enable? [y/n]")?;
    let enable = matches!(answer.trim(), "y" | "Y" | "yes");
    station.toggle_tank(&tank, enable)?;
    println!(
        "tank {tank} {}",
        if enable { "enabled" } else { "disabled" }
    );
    Ok(())
}

fn print_statistics(station: &StationOrchestrator<JsonFileStore>) {
    let stats = station.statistics();
    println!("vehicles served: {}", stats.total_cars());
    println!("total income:    {:.2}", stats.total_income());
    for (fuel, tally) in stats.fuel_stats() {
        println!("  {fuel}: {:.1} l, {:.2}", tally.liters, tally.income);
    }
}

fn print_transactions(station: &StationOrchestrator<JsonFileStore>) {
    let recent = station.recent_transactions(10);
    if recent.is_empty() {
        println!("no transactions yet");
    }
    for tx in recent {
        println!(
            "{} {} {:?}",
            tx.timestamp.format("%Y-%m-%d %H:%M:%S"),
            tx.details.kind(),
            tx.details
        );
    }
}

fn emergency(station: &mut StationOrchestrator<JsonFileStore>) -> Result<(), MenuError> {
    if station.is_emergency() {
        station.deactivate_emergency()?;
        println!("emergency deactivated; tanks remain disabled until re-enabled manually");
    } else {
        station.trigger_emergency()?;
        println!("emergency activated; all tanks locked");
    }
    Ok(())
}
