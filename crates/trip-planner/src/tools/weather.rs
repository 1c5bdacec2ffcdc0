use std::fmt::Write as _;
use std::future::{Future, ready};

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use trip_planner_core::tool::{Tool, ToolResult};

const DEFAULT_DAYS: u32 = 5;

struct ForecastDay {
    temp: &'static str,
    condition: &'static str,
    humidity: &'static str,
}

const FORECAST: [ForecastDay; 5] = [
    ForecastDay {
        temp: "22°C",
        condition: "Sunny",
        humidity: "65%",
    },
    ForecastDay {
        temp: "24°C",
        condition: "Partly Cloudy",
        humidity: "70%",
    },
    ForecastDay {
        temp: "21°C",
        condition: "Rainy",
        humidity: "80%",
    },
    ForecastDay {
        temp: "23°C",
        condition: "Sunny",
        humidity: "68%",
    },
    ForecastDay {
        temp: "25°C",
        condition: "Clear",
        humidity: "62%",
    },
];

fn default_days() -> u32 {
    DEFAULT_DAYS
}

#[derive(Deserialize, JsonSchema)]
pub struct WeatherToolParameters {
    #[schemars(description = "Name of the city.")]
    city: String,
    #[serde(default = "default_days")]
    #[schemars(description = "Number of days to forecast (max 5).")]
    days: u32,
}

/// Returns a five-day forecast for any city.
pub struct WeatherTool {
    parameter_schema: Value,
}

impl WeatherTool {
    /// Creates a new weather tool.
    #[inline]
    pub fn new() -> Self {
        WeatherTool {
            parameter_schema: schema_for!(WeatherToolParameters).to_value(),
        }
    }
}

impl Default for WeatherTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for WeatherTool {
    type Input = WeatherToolParameters;

    fn name(&self) -> &str {
        "get_weather_forecast"
    }

    fn description(&self) -> &str {
        "Get the weather forecast for a city, up to 5 days ahead."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: WeatherToolParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok(forecast(&input.city, input.days)))
    }
}

fn forecast(city: &str, days: u32) -> String {
    let mut result = format!("Weather forecast for {city}:\n");
    for (idx, day) in FORECAST.iter().take(days as usize).enumerate() {
        writeln!(
            result,
            "Day {}: {}, {}, Humidity: {}",
            idx + 1,
            day.temp,
            day.condition,
            day.humidity
        )
        .ok();
    }
    result
}
