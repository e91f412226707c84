//! Aggregation engines.
//!
//! An engine pairs an [`EngineDescriptor`] with a backend. The backend
//! supplies [`Engine::execute_query_plan`]; validation, planning and
//! result wrapping are shared:
//!
//! ```text
//! Request ─► plan() ──────────┐
//!            validate() ──────┼─► ValidationResult ─► errors ─► ExecutionFailure
//!            validate_plan() ─┘           │
//!                                         └─► none ─► execute_query_plan()
//!                                                          │
//!                                                          ▼
//!                                               AggregationResult (unloaded)
//! ```

pub mod descriptor;

pub use descriptor::{EngineBuilder, EngineDescriptor};

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::ExecutionFailure;
use crate::planner::QueryPlan;
use crate::request::Request;
use crate::result::{AggregationResult, BackendQuery, ResultOptions};
use crate::validation::{ValidationError, ValidationResult};

/// A backend-specific aggregation engine.
pub trait Engine {
    /// Backend query produced from a plan.
    type Query: BackendQuery;

    fn descriptor(&self) -> &EngineDescriptor;

    /// Checks of the engine's own configuration.
    fn validate(&self) -> ValidationResult {
        ValidationResult::new()
    }

    /// Business rules over a built plan. Defaults to required filters.
    fn validate_plan(&self, plan: &QueryPlan) -> ValidationResult {
        required_filters(self.descriptor(), plan)
    }

    /// Turn a valid plan into a backend query. Must not run it.
    fn execute_query_plan(&self, plan: &QueryPlan) -> Self::Query;

    fn result_options(&self) -> ResultOptions {
        ResultOptions::default()
    }

    fn plan(&self, request: &Request) -> QueryPlan {
        QueryPlan::build(request, self.descriptor())
    }

    /// Every problem with `request`, without touching the backend.
    fn validate_request(&self, request: &Request) -> ValidationResult {
        let plan = self.plan(request);
        collect_errors(self, &plan)
    }

    fn request_valid(&self, request: &Request) -> bool {
        self.validate_request(request).is_valid()
    }

    /// Validate, plan and hand the plan to the backend.
    ///
    /// The returned result has not loaded anything yet.
    fn execute(
        &self,
        request: &Request,
    ) -> Result<AggregationResult<Self::Query>, ExecutionFailure> {
        let plan = self.plan(request);
        let errors = collect_errors(self, &plan);

        if !errors.is_valid() {
            debug!(errors = errors.len(), "rejected aggregation request");
            return Err(ExecutionFailure::new(errors));
        }

        let query = self.execute_query_plan(&plan);
        info!(
            dimensions = plan.dimensions.len(),
            metrics = plan.metrics.len(),
            filters = plan.filters.len(),
            "executing aggregation request"
        );

        Ok(AggregationResult::new(
            Arc::new(plan),
            query,
            self.result_options(),
        ))
    }
}

fn collect_errors<E: Engine + ?Sized>(engine: &E, plan: &QueryPlan) -> ValidationResult {
    let mut errors = engine.validate();
    errors.merge(plan.validation().clone());
    errors.merge(engine.validate_plan(plan));
    errors
}

/// Report each required filter the request did not apply.
pub fn required_filters(descriptor: &EngineDescriptor, plan: &QueryPlan) -> ValidationResult {
    descriptor
        .required_filters()
        .filter(|f| !plan.has_filter(f.identifier()))
        .map(|f| ValidationError::MissingRequiredFilter {
            identifier: f.identifier().to_string(),
        })
        .collect::<Vec<_>>()
        .into()
}
