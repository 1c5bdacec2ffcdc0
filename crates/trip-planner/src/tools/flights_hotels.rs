use std::fmt::Write as _;
use std::future::{Future, ready};

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use trip_planner_core::tool::{Tool, ToolResult};

struct Flight {
    airline: &'static str,
    price: u32,
    duration: &'static str,
    stops: u32,
}

struct Hotel {
    name: &'static str,
    price_per_night: u32,
    rating: f64,
    location: &'static str,
}

const FLIGHTS: [Flight; 3] = [
    Flight {
        airline: "Air Travel Co",
        price: 450,
        duration: "8h 30m",
        stops: 1,
    },
    Flight {
        airline: "Budget Airlines",
        price: 320,
        duration: "10h 15m",
        stops: 2,
    },
    Flight {
        airline: "Premium Airways",
        price: 680,
        duration: "7h 45m",
        stops: 0,
    },
];

const HOTELS: [Hotel; 3] = [
    Hotel {
        name: "Grand Hotel",
        price_per_night: 120,
        rating: 4.5,
        location: "City Center",
    },
    Hotel {
        name: "Budget Inn",
        price_per_night: 60,
        rating: 3.8,
        location: "Near Airport",
    },
    Hotel {
        name: "Luxury Resort",
        price_per_night: 250,
        rating: 4.9,
        location: "Waterfront",
    },
];

#[derive(Deserialize, JsonSchema)]
pub struct FlightsHotelsToolParameters {
    #[schemars(description = "Origin city.")]
    origin: String,
    #[schemars(description = "Destination city.")]
    destination: String,
    #[schemars(description = "Departure date (YYYY-MM-DD).")]
    departure_date: String,
    #[schemars(
        description = "Return date (YYYY-MM-DD), omit for a one-way trip."
    )]
    return_date: Option<String>,
}

/// Finds flights and hotels for a trip.
pub struct FlightsHotelsTool {
    parameter_schema: Value,
}

impl FlightsHotelsTool {
    /// Creates a new flight and hotel search tool.
    #[inline]
    pub fn new() -> Self {
        FlightsHotelsTool {
            parameter_schema: schema_for!(FlightsHotelsToolParameters)
                .to_value(),
        }
    }
}

impl Default for FlightsHotelsTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for FlightsHotelsTool {
    type Input = FlightsHotelsToolParameters;

    fn name(&self) -> &str {
        "search_flights_hotels"
    }

    fn description(&self) -> &str {
        "Search for flights and hotels between two cities, with prices."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: FlightsHotelsToolParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok(search(&input)))
    }
}

fn search(input: &FlightsHotelsToolParameters) -> String {
    let mut result = format!(
        "Flight & Hotel Search: {} → {}\n",
        input.origin, input.destination
    );
    write!(result, "Departure: {}", input.departure_date).ok();
    match input.return_date.as_deref().filter(|date| !date.is_empty()) {
        Some(return_date) => {
            write!(result, ", Return: {return_date}\n\n").ok();
        }
        None => result.push_str(" (One-way)\n\n"),
    }

    result.push_str("FLIGHT OPTIONS:\n");
    for (idx, flight) in FLIGHTS.iter().enumerate() {
        writeln!(
            result,
            "{}. {}: ${}, Duration: {}, Stops: {}",
            idx + 1,
            flight.airline,
            flight.price,
            flight.duration,
            flight.stops
        )
        .ok();
    }

    result.push_str("\nHOTEL OPTIONS:\n");
    for (idx, hotel) in HOTELS.iter().enumerate() {
        writeln!(
            result,
            "{}. {} ({}): ${}/night, Rating: {}/5",
            idx + 1,
            hotel.name,
            hotel.location,
            hotel.price_per_night,
            hotel.rating
        )
        .ok();
    }
    result
}
