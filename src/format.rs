//! Formatting of raw result rows.

use std::collections::HashMap;

use crate::planner::{PartPlan, QueryPlan};
use crate::result::Row;

/// Routes each result column through the formatter of the part producing it.
///
/// Columns are matched by instance key, so two uses of one parameterized
/// metric are formatted independently. Columns no part produces pass
/// through unchanged.
pub struct Formatter<'p> {
    plan: &'p QueryPlan,
}

impl<'p> Formatter<'p> {
    pub fn new(plan: &'p QueryPlan) -> Self {
        Self { plan }
    }

    pub fn format(&self, rows: Vec<Row>) -> Vec<Row> {
        let mut parts: HashMap<String, &PartPlan> = HashMap::new();
        for part in self.plan.parts() {
            parts.entry(part.instance_key()).or_insert(part);
        }

        rows.into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(key, value)| {
                        let value = match parts.get(&key) {
                            Some(part) => part.format_value(value),
                            None => value,
                        };
                        (key, value)
                    })
                    .collect()
            })
            .collect()
    }
}
