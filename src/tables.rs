use chrono::TimeDelta;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use ordered_float::OrderedFloat;

use crate::{
    core::{
        driver::RangeRun,
        estimate::PeakShavingEstimate,
        schedule::DaySchedule,
        sizing::SizingOutcome,
        step::Step,
        summary::Summary,
    },
    metering::TopHours,
    quantity::{Quantity, cost::Cost, power::Kilowatts, rate::KilowattHourRate},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

fn cost_color(cost: Cost) -> Color {
    if cost.0 > 0.0 { Color::Green } else { Color::Red }
}

pub fn build_steps_table(steps: &[Step], threshold: Kilowatts) -> Table {
    let median_rate = {
        let mut rates: Vec<_> = steps.iter().map(|step| OrderedFloat(step.grid_rate.0)).collect();
        rates.sort_unstable();
        rates.get(rates.len() / 2).map_or(KilowattHourRate::ZERO, |rate| Quantity(rate.0))
    };
    let threshold = threshold * TimeDelta::hours(1);

    let mut table = new_table();
    table.set_header(vec![
        "Hour", "Rate", "Consumption", "Mode", "Battery", "Before", "After", "Grid", "Cost",
    ]);
    for step in steps {
        table.add_row(vec![
            Cell::new(format!("{:02}:00", step.hour)).add_attribute(Attribute::Dim),
            Cell::new(step.grid_rate).fg(if step.grid_rate > median_rate {
                Color::Red
            } else {
                Color::Green
            }),
            Cell::new(step.consumption).set_alignment(CellAlignment::Right),
            Cell::new(step.working_mode).fg(step.working_mode.color()),
            Cell::new(step.battery_energy).set_alignment(CellAlignment::Right),
            Cell::new(step.residual_energy_before)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(step.residual_energy_after).set_alignment(CellAlignment::Right),
            Cell::new(step.grid_consumption).set_alignment(CellAlignment::Right).fg(
                if (step.grid_consumption - threshold).non_negative().is_negligible() {
                    Color::Green
                } else {
                    Color::Red
                },
            ),
            Cell::new(step.grid_cost).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn build_summary_table(schedule: &DaySchedule, summary: &Summary) -> Table {
    let mut table = new_table();
    table.set_header(vec!["", "Without battery", "With battery", "Difference"]);
    table.add_row(vec![
        Cell::new("Grid cost"),
        Cell::new(summary.grid_cost_without_battery).set_alignment(CellAlignment::Right),
        Cell::new(summary.grid_cost).set_alignment(CellAlignment::Right),
        Cell::new(summary.profit())
            .set_alignment(CellAlignment::Right)
            .fg(cost_color(summary.profit())),
    ]);
    table.add_row(vec![
        Cell::new("Peak hour"),
        Cell::new(summary.peak_consumption).set_alignment(CellAlignment::Right),
        Cell::new(summary.peak_grid_consumption).set_alignment(CellAlignment::Right),
        Cell::new(summary.peak_reduction()).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Arbitrage savings"),
        Cell::new(""),
        Cell::new(schedule.arbitrage_savings).set_alignment(CellAlignment::Right),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Peak shaving"),
        Cell::new(""),
        Cell::new(schedule.peak_shaving_energy).set_alignment(CellAlignment::Right),
        Cell::new(""),
    ]);
    table
}

pub fn build_run_table(run: &RangeRun) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Date", "Charge", "Discharge", "Peak shaving", "Peak grid", "Arbitrage", "End SoC",
    ]);
    for (date, schedule) in &run.schedules {
        table.add_row(vec![
            Cell::new(date.format("%a %b %d")).add_attribute(Attribute::Dim),
            Cell::new(schedule.total_charge()).set_alignment(CellAlignment::Right),
            Cell::new(schedule.total_discharge()).set_alignment(CellAlignment::Right),
            Cell::new(schedule.peak_shaving_energy).set_alignment(CellAlignment::Right),
            Cell::new(schedule.net_grid_load.peak().1).set_alignment(CellAlignment::Right),
            Cell::new(schedule.arbitrage_savings)
                .set_alignment(CellAlignment::Right)
                .fg(cost_color(schedule.arbitrage_savings)),
            Cell::new(format!("{:.1}%", schedule.ending_state_of_charge * 100.0))
                .set_alignment(CellAlignment::Right),
        ]);
    }
    for skipped in &run.skipped {
        table.add_row(vec![
            Cell::new(skipped.date.format("%a %b %d")).add_attribute(Attribute::Dim),
            Cell::new(format!("skipped: {}", skipped.reason)).fg(Color::DarkYellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(run.total_peak_shaving_energy()).set_alignment(CellAlignment::Right),
        Cell::new(""),
        Cell::new(run.total_arbitrage_savings)
            .set_alignment(CellAlignment::Right)
            .fg(cost_color(run.total_arbitrage_savings))
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{:.1}%", run.state_of_charge * 100.0))
            .set_alignment(CellAlignment::Right),
    ]);
    table
}

pub fn build_sizing_table(outcomes: &[SizingOutcome], best: Option<&SizingOutcome>) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Capacity", "Grid cost", "Profit", "Arbitrage", "Peak shaving", "Peak grid", "End SoC",
    ]);
    for outcome in outcomes {
        let is_best = best.is_some_and(|best| std::ptr::eq(best, outcome));
        let mut capacity = Cell::new(outcome.capacity).set_alignment(CellAlignment::Right);
        if is_best {
            capacity = capacity.add_attribute(Attribute::Bold);
        }
        table.add_row(vec![
            capacity,
            Cell::new(outcome.summary.grid_cost).set_alignment(CellAlignment::Right),
            Cell::new(outcome.summary.profit())
                .set_alignment(CellAlignment::Right)
                .fg(cost_color(outcome.summary.profit())),
            Cell::new(outcome.schedule.arbitrage_savings).set_alignment(CellAlignment::Right),
            Cell::new(outcome.schedule.peak_shaving_energy).set_alignment(CellAlignment::Right),
            Cell::new(outcome.summary.peak_grid_consumption).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}%", outcome.schedule.ending_state_of_charge * 100.0))
                .set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn build_estimate_table(estimates: &[PeakShavingEstimate]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Season", "Peak hour", "Above threshold", "Rate", "Savings"]);
    for estimate in estimates {
        table.add_row(vec![
            Cell::new(estimate.season),
            Cell::new(estimate.peak_consumption).set_alignment(CellAlignment::Right),
            Cell::new(estimate.peak_exceedance).set_alignment(CellAlignment::Right),
            Cell::new(format!("{} /kW", estimate.season.billing_factor()))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(estimate.seasonal_savings)
                .set_alignment(CellAlignment::Right)
                .fg(cost_color(estimate.seasonal_savings)),
        ]);
    }
    table
}

pub fn build_top_hours_table(top_hours: &TopHours) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Date", "Hour", "Consumption"]);
    for (timestamp, consumption) in &top_hours.hours {
        table.add_row(vec![
            Cell::new(timestamp.format("%a %b %d")).add_attribute(Attribute::Dim),
            Cell::new(timestamp.format("%H:%M")),
            Cell::new(consumption).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("Average").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(top_hours.average)
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
    ]);
    table
}
