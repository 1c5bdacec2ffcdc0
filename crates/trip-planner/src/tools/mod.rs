//! The travel lookups offered to the model.
//!
//! All four tools answer from fixed tables, so their output only depends
//! on their input.

mod attractions;
mod budget;
mod flights_hotels;
mod weather;

pub use attractions::AttractionsTool;
pub use budget::BudgetTool;
pub use flights_hotels::FlightsHotelsTool;
pub use weather::WeatherTool;
