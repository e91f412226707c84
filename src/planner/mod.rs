//! Query planning - resolve a request against an engine's catalogs.
//!
//! ```text
//! Request ──► dimensions ──► metrics ──► order ──► filters ──► QueryPlan
//!                 │             │           │          │
//!                 └─────────────┴─────┬─────┴──────────┘
//!                                     ▼
//!                             ValidationResult
//! ```
//!
//! Each category stops at its first bad entry but the others are still
//! processed, so one call reports at most one problem per category.
//! An order entry without parameters sorts by the instance the request
//! selects for the same identifier, so ORDER BY matches GROUP BY.
//! Building never fails; callers check [`QueryPlan::is_valid`].

pub mod parts;

pub use parts::{DimensionPlan, FilterPlan, MetricPlan, OrderPlan, PartPlan};

use std::sync::Arc;

use tracing::debug;

use crate::engine::EngineDescriptor;
use crate::model::PartDefinition;
use crate::request::{PartRequest, Request};
use crate::validation::{Category, ValidationError, ValidationResult};

/// A request resolved against an engine descriptor.
#[derive(Debug, Clone, Default)]
pub struct QueryPlan {
    pub dimensions: Vec<DimensionPlan>,
    pub metrics: Vec<MetricPlan>,
    pub order: Vec<OrderPlan>,
    pub filters: Vec<FilterPlan>,
    request: Request,
    validation: ValidationResult,
}

impl QueryPlan {
    /// Resolve `request` against the catalogs of `descriptor`.
    pub fn build(request: &Request, descriptor: &EngineDescriptor) -> QueryPlan {
        let mut plan = QueryPlan {
            request: request.clone(),
            ..QueryPlan::default()
        };

        plan.dimensions = plan_parts(
            &request.dimensions,
            Category::Dimensions,
            |id| descriptor.dimension(id),
            &mut plan.validation,
        );
        plan.metrics = plan_parts(
            &request.metrics,
            Category::Metrics,
            |id| descriptor.metric(id),
            &mut plan.validation,
        );
        plan.plan_order(descriptor);
        plan.plan_filters(descriptor);

        debug!(
            dimensions = plan.dimensions.len(),
            metrics = plan.metrics.len(),
            order = plan.order.len(),
            filters = plan.filters.len(),
            errors = plan.validation.len(),
            "built query plan"
        );

        plan
    }

    fn plan_order(&mut self, descriptor: &EngineDescriptor) {
        for requested in &self.request.order {
            let Some(definition) = descriptor.part(&requested.identifier) else {
                self.validation
                    .push(ValidationError::unknown(Category::Order, &requested.identifier));
                break;
            };

            let mut resolved = requested.clone();
            if resolved.parameters.is_empty() {
                // Sort by the same instance the request selects.
                if let Some(part) = self.parts().find(|p| p.identifier() == resolved.identifier) {
                    resolved.parameters = part.parameters().clone();
                }
            }

            let problems = definition.check_parameters(&resolved.parameters);
            if !problems.is_empty() {
                self.validation.push(ValidationError::InvalidParameters {
                    category: Category::Order,
                    identifier: requested.identifier.clone(),
                    message: problems.join("; "),
                });
                break;
            }

            self.order
                .push(OrderPlan::new(Arc::clone(definition), resolved));
        }
    }

    fn plan_filters(&mut self, descriptor: &EngineDescriptor) {
        for requested in &self.request.filters {
            let Some(definition) = descriptor.filter(&requested.identifier) else {
                self.validation
                    .push(ValidationError::unknown(Category::Filters, &requested.identifier));
                break;
            };

            match definition.condition(&requested.value) {
                Ok(condition) => self.filters.push(FilterPlan::new(
                    Arc::clone(definition),
                    requested.clone(),
                    condition,
                )),
                Err(message) => {
                    self.validation.push(ValidationError::InvalidFilterValue {
                        identifier: requested.identifier.clone(),
                        message,
                    });
                    break;
                }
            }
        }
    }

    /// The request this plan was built from.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Errors recorded while planning.
    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    pub fn is_valid(&self) -> bool {
        self.validation.is_valid()
    }

    /// Dimension plans followed by metric plans.
    pub fn parts(&self) -> impl Iterator<Item = &PartPlan> {
        self.dimensions.iter().chain(self.metrics.iter())
    }

    /// The part producing the result column `key`, if any.
    pub fn part_for_key(&self, key: &str) -> Option<&PartPlan> {
        self.parts().find(|part| part.instance_key() == key)
    }

    /// Whether the request applied the filter `identifier`.
    pub fn has_filter(&self, identifier: &str) -> bool {
        self.request
            .filters
            .iter()
            .any(|f| f.identifier == identifier)
    }
}

fn plan_parts<'d, F>(
    requested: &[PartRequest],
    category: Category,
    lookup: F,
    validation: &mut ValidationResult,
) -> Vec<PartPlan>
where
    F: Fn(&str) -> Option<&'d Arc<PartDefinition>>,
{
    let mut planned = Vec::with_capacity(requested.len());

    for part in requested {
        let Some(definition) = lookup(&part.identifier) else {
            validation.push(ValidationError::unknown(category, &part.identifier));
            break;
        };

        let problems = definition.check_parameters(&part.parameters);
        if !problems.is_empty() {
            validation.push(ValidationError::InvalidParameters {
                category,
                identifier: part.identifier.clone(),
                message: problems.join("; "),
            });
            break;
        }

        planned.push(PartPlan::new(Arc::clone(definition), part.clone()));
    }

    planned
}
