#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod api;
mod cli;
mod core;
mod export;
mod metering;
mod ops;
mod prelude;
mod quantity;
mod tables;

use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command, compare, dispatch, estimate, simulate},
    prelude::*,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();

    match args.command {
        Command::Dispatch(args) => {
            dispatch(&args).await?;
        }
        Command::Simulate(args) => {
            simulate(&args).await?;
        }
        Command::Estimate(args) => {
            estimate(&args)?;
        }
        Command::Compare(args) => {
            compare(&args).await?;
        }
    }

    info!("done!");
    Ok(())
}
