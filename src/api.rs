mod client;
pub mod greenerway;
pub mod hvakosterstrommen;
pub mod provider;
