pub mod battery;
pub mod dispatch;
pub mod driver;
pub mod estimate;
pub mod schedule;
pub mod series;
pub mod sizing;
pub mod soc;
pub mod step;
pub mod summary;
pub mod working_mode;
