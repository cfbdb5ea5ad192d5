mod battery;
mod compare;
mod consumption;
mod dispatch;
mod estimate;
mod price;
mod simulate;
mod soc;
mod threshold;

use clap::{Parser, Subcommand};

pub use self::{
    compare::{CompareArgs, compare},
    dispatch::{DispatchArgs, dispatch},
    estimate::{EstimateArgs, estimate},
    simulate::{SimulateArgs, simulate},
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Dispatch the battery over a single day and print the hourly schedule.
    #[clap(name = "dispatch")]
    Dispatch(Box<DispatchArgs>),

    /// Dispatch consecutive days, carrying the state of charge over.
    #[clap(name = "simulate")]
    Simulate(Box<SimulateArgs>),

    /// Estimate the demand tariff savings of peak shaving.
    #[clap(name = "estimate")]
    Estimate(Box<EstimateArgs>),

    /// Compare battery sizes on the same day.
    #[clap(name = "compare")]
    Compare(Box<CompareArgs>),
}
