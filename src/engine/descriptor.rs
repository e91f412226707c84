//! Engine descriptors - the immutable catalogs an engine serves.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::dsl::{Dimensions, Filters, Metrics};
use crate::error::{DefinitionError, DefinitionResult};
use crate::model::{FilterDefinition, PartDefinition};

/// Dimension, metric and filter catalogs of one engine.
///
/// Built once through [`EngineBuilder`] and read-only afterwards.
/// Dimensions and metrics share one identifier namespace; filters have
/// their own.
#[derive(Debug, Clone, Default)]
pub struct EngineDescriptor {
    dimensions: Vec<Arc<PartDefinition>>,
    metrics: Vec<Arc<PartDefinition>>,
    filters: Vec<Arc<FilterDefinition>>,
    dimension_index: HashMap<String, usize>,
    metric_index: HashMap<String, usize>,
    filter_index: HashMap<String, usize>,
}

impl EngineDescriptor {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// A builder seeded with every definition of this descriptor.
    ///
    /// The receiver is left untouched; the builder produces a new
    /// descriptor.
    pub fn extend(&self) -> EngineBuilder {
        EngineBuilder {
            dimensions: self.dimensions.clone(),
            metrics: self.metrics.clone(),
            filters: self.filters.clone(),
        }
    }

    pub fn dimensions(&self) -> &[Arc<PartDefinition>] {
        &self.dimensions
    }

    pub fn metrics(&self) -> &[Arc<PartDefinition>] {
        &self.metrics
    }

    pub fn filters(&self) -> &[Arc<FilterDefinition>] {
        &self.filters
    }

    pub fn dimension(&self, identifier: &str) -> Option<&Arc<PartDefinition>> {
        self.dimension_index
            .get(identifier)
            .map(|&i| &self.dimensions[i])
    }

    pub fn metric(&self, identifier: &str) -> Option<&Arc<PartDefinition>> {
        self.metric_index.get(identifier).map(|&i| &self.metrics[i])
    }

    /// A dimension or metric by identifier.
    pub fn part(&self, identifier: &str) -> Option<&Arc<PartDefinition>> {
        self.dimension(identifier)
            .or_else(|| self.metric(identifier))
    }

    pub fn filter(&self, identifier: &str) -> Option<&Arc<FilterDefinition>> {
        self.filter_index.get(identifier).map(|&i| &self.filters[i])
    }

    /// Required filters, in declaration order.
    pub fn required_filters(&self) -> impl Iterator<Item = &Arc<FilterDefinition>> {
        self.filters.iter().filter(|f| f.is_required())
    }
}

/// Registration of definitions into a new [`EngineDescriptor`].
///
/// Every registration call re-checks identifier uniqueness and fails on
/// the first duplicate, so a bad declaration surfaces at start-up.
///
/// ```
/// use rollup::engine::EngineDescriptor;
/// use rollup::model::DataType;
///
/// let base = EngineDescriptor::builder()
///     .dimensions(|d| {
///         d.column("state", DataType::String);
///     })?
///     .build();
///
/// let extended = base
///     .extend()
///     .metrics(|m| {
///         m.count("total", DataType::Integer);
///     })?
///     .build();
///
/// assert!(base.metric("total").is_none());
/// assert!(extended.metric("total").is_some());
/// # Ok::<(), rollup::error::DefinitionError>(())
/// ```
#[derive(Debug, Clone, Default)]
#[must_use = "builders have no effect until built"]
pub struct EngineBuilder {
    dimensions: Vec<Arc<PartDefinition>>,
    metrics: Vec<Arc<PartDefinition>>,
    filters: Vec<Arc<FilterDefinition>>,
}

impl EngineBuilder {
    /// Register the dimensions declared in `block`.
    pub fn dimensions<F>(mut self, block: F) -> DefinitionResult<Self>
    where
        F: FnOnce(&mut Dimensions),
    {
        let declared = Dimensions::collect(block)?;
        debug!(count = declared.len(), "registering dimensions");
        self.dimensions.extend(declared.into_iter().map(Arc::new));
        self.check_parts()?;
        Ok(self)
    }

    /// Register the metrics declared in `block`.
    pub fn metrics<F>(mut self, block: F) -> DefinitionResult<Self>
    where
        F: FnOnce(&mut Metrics),
    {
        let declared = Metrics::collect(block)?;
        debug!(count = declared.len(), "registering metrics");
        self.metrics.extend(declared.into_iter().map(Arc::new));
        self.check_parts()?;
        Ok(self)
    }

    /// Register the filters declared in `block`.
    pub fn filters<F>(mut self, block: F) -> DefinitionResult<Self>
    where
        F: FnOnce(&mut Filters),
    {
        let declared = Filters::collect(block)?;
        debug!(count = declared.len(), "registering filters");
        self.filters.extend(declared.into_iter().map(Arc::new));
        self.check_filters()?;
        Ok(self)
    }

    pub fn build(self) -> EngineDescriptor {
        let dimension_index = index(self.dimensions.iter().map(|d| d.identifier()));
        let metric_index = index(self.metrics.iter().map(|m| m.identifier()));
        let filter_index = index(self.filters.iter().map(|f| f.identifier()));

        EngineDescriptor {
            dimensions: self.dimensions,
            metrics: self.metrics,
            filters: self.filters,
            dimension_index,
            metric_index,
            filter_index,
        }
    }

    fn check_parts(&self) -> DefinitionResult<()> {
        let mut seen = HashSet::new();
        for part in self.dimensions.iter().chain(self.metrics.iter()) {
            if !seen.insert(part.identifier()) {
                return Err(DefinitionError::DuplicateIdentifier {
                    identifier: part.identifier().to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_filters(&self) -> DefinitionResult<()> {
        let mut seen = HashSet::new();
        for filter in &self.filters {
            if !seen.insert(filter.identifier()) {
                return Err(DefinitionError::DuplicateFilter {
                    identifier: filter.identifier().to_string(),
                });
            }
        }
        Ok(())
    }
}

fn index<'a>(identifiers: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    identifiers
        .enumerate()
        .map(|(i, id)| (id.to_string(), i))
        .collect()
}
