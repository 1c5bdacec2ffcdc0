use std::fmt::Write as _;
use std::future::{Future, ready};

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use trip_planner_core::tool::{Error as ToolError, Tool, ToolResult};

const DEFAULT_DAILY_COST: u32 = 100;

/// A destination whose estimate exceeds its share by more than this
/// factor gets a warning.
const OVERSPEND_FACTOR: f64 = 1.2;

/// Leftover budget above this fraction of the total counts as a buffer.
const BUFFER_FRACTION: f64 = 0.2;

fn daily_cost(destination: &str) -> u32 {
    match destination.to_lowercase().as_str() {
        "paris" => 150,
        "tokyo" => 120,
        "new york" => 200,
        "london" => 180,
        _ => DEFAULT_DAILY_COST,
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct BudgetToolParameters {
    #[schemars(description = "List of destination cities.")]
    destinations: Vec<String>,
    #[schemars(description = "Total budget in USD.")]
    total_budget: f64,
    #[schemars(
        description = "Number of days to spend in each destination, in the same order."
    )]
    days_per_destination: Vec<u32>,
}

/// Splits a travel budget across destinations and compares it with
/// typical daily costs.
pub struct BudgetTool {
    parameter_schema: Value,
}

impl BudgetTool {
    /// Creates a new budget tool.
    #[inline]
    pub fn new() -> Self {
        BudgetTool {
            parameter_schema: schema_for!(BudgetToolParameters).to_value(),
        }
    }
}

impl Default for BudgetTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for BudgetTool {
    type Input = BudgetToolParameters;

    fn name(&self) -> &str {
        "optimize_budget"
    }

    fn description(&self) -> &str {
        r#"
Optimize budget allocation across multiple destinations.
Returns the recommended budget per destination, estimated costs and the remaining budget."#
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: BudgetToolParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(optimize(
            &input.destinations,
            input.total_budget,
            &input.days_per_destination,
        ))
    }
}

fn optimize(
    destinations: &[String],
    total_budget: f64,
    days_per_destination: &[u32],
) -> ToolResult {
    if destinations.len() != days_per_destination.len() {
        return Ok(
            "Error: Number of destinations must match number of days".to_owned()
        );
    }

    let total_days: u64 =
        days_per_destination.iter().map(|&days| u64::from(days)).sum();
    if total_days == 0 {
        return Err(ToolError::invalid_input()
            .with_reason("total number of days must be greater than zero"));
    }
    let daily_budget = total_budget / total_days as f64;

    let mut result = format!(
        "Budget Optimization for {} USD:\n",
        format_amount(total_budget)
    );
    writeln!(result, "Total days: {total_days}").ok();
    writeln!(result, "Average daily budget: ${daily_budget:.2}\n").ok();

    let mut allocated_budget = 0.0;
    for (idx, (destination, &days)) in
        destinations.iter().zip(days_per_destination).enumerate()
    {
        let estimated_daily = daily_cost(destination);
        let allocated = f64::from(days) * f64::from(estimated_daily);
        let recommended = f64::from(days) * daily_budget;
        allocated_budget += allocated;

        writeln!(result, "Destination {}: {destination} ({days} days)", idx + 1)
            .ok();
        writeln!(
            result,
            "  Estimated cost: ${allocated:.2} (${estimated_daily}/day)"
        )
        .ok();
        writeln!(result, "  Recommended budget: ${recommended:.2}").ok();
        if allocated > recommended * OVERSPEND_FACTOR {
            result.push_str("  ⚠️ Warning: This destination may exceed budget\n");
        }
        result.push('\n');
    }

    let remaining = total_budget - allocated_budget;
    writeln!(result, "Remaining budget: ${remaining:.2}").ok();
    if remaining < 0.0 {
        result.push_str(
            "⚠️ Budget exceeded! Consider reducing days or choosing cheaper destinations.\n",
        );
    } else if remaining > total_budget * BUFFER_FRACTION {
        result.push_str(
            "✅ Good budget allocation with buffer for unexpected expenses.\n",
        );
    }

    Ok(result)
}

/// Formats the budget the way it was given: whole amounts keep one
/// decimal (`3000.0`), others print their shortest form.
fn format_amount(amount: f64) -> String {
    if amount.is_finite() && amount.fract() == 0.0 && amount.abs() < 1e16 {
        format!("{amount:.1}")
    } else {
        amount.to_string()
    }
}

#[cfg(test)]
mod tests {
    use trip_planner_core::tool::ErrorKind;

    use super::*;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|&name| name.to_owned()).collect()
    }

    #[tokio::test]
    async fn test_within_budget() {
        let output = BudgetTool::new()
            .execute(BudgetToolParameters {
                destinations: names(&["Paris", "Tokyo"]),
                total_budget: 3000.0,
                days_per_destination: vec![3, 2],
            })
            .await
            .unwrap();
        assert_eq!(
            output,
            "Budget Optimization for 3000.0 USD:\n\
             Total days: 5\n\
             Average daily budget: $600.00\n\
             \n\
             Destination 1: Paris (3 days)\n\
             \x20 Estimated cost: $450.00 ($150/day)\n\
             \x20 Recommended budget: $1800.00\n\
             \n\
             Destination 2: Tokyo (2 days)\n\
             \x20 Estimated cost: $240.00 ($120/day)\n\
             \x20 Recommended budget: $1200.00\n\
             \n\
             Remaining budget: $2310.00\n\
             ✅ Good budget allocation with buffer for unexpected expenses.\n"
        );
    }

    #[test]
    fn test_exceeded() {
        let output =
            optimize(&names(&["New York"]), 500.0, &[5]).unwrap();
        assert_eq!(
            output,
            "Budget Optimization for 500.0 USD:\n\
             Total days: 5\n\
             Average daily budget: $100.00\n\
             \n\
             Destination 1: New York (5 days)\n\
             \x20 Estimated cost: $1000.00 ($200/day)\n\
             \x20 Recommended budget: $500.00\n\
             \x20 ⚠️ Warning: This destination may exceed budget\n\
             \n\
             Remaining budget: $-500.00\n\
             ⚠️ Budget exceeded! Consider reducing days or choosing cheaper destinations.\n"
        );
    }

    #[test]
    fn test_tight_budget_has_no_note() {
        // 1000 - 900 leaves 10%, below the buffer threshold.
        let output = optimize(&names(&["Lisbon"]), 1000.0, &[9]).unwrap();
        assert!(output.contains("($100/day)"));
        assert!(output.ends_with("Remaining budget: $100.00\n"));
    }

    #[test]
    fn test_mismatched_lengths() {
        let output = optimize(&names(&["Paris", "Tokyo"]), 3000.0, &[5]);
        assert_eq!(
            output.unwrap(),
            "Error: Number of destinations must match number of days"
        );
    }

    #[test]
    fn test_zero_days() {
        let err = optimize(&names(&["Paris"]), 3000.0, &[0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(optimize(&[], 3000.0, &[]).is_err());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(3000.0), "3000.0");
        assert_eq!(format_amount(1234.5), "1234.5");
        assert_eq!(format_amount(0.0), "0.0");
    }
}
