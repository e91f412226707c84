//! Metric declaration verbs.

use super::collector::DefinitionsCollector;
use crate::error::DefinitionResult;
use crate::model::{DataType, PartBuilder, PartDefinition, PartKind};

/// Declaration block for metrics: `mean` and `count`.
#[derive(Default)]
pub struct Metrics {
    collector: DefinitionsCollector<PartBuilder>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a declaration block and return its definitions.
    pub fn collect<F>(block: F) -> DefinitionResult<Vec<PartDefinition>>
    where
        F: FnOnce(&mut Metrics),
    {
        let mut metrics = Self::new();
        block(&mut metrics);
        metrics.finish()
    }

    /// `AVG` of the expression (the identifier's column by default).
    pub fn mean(&mut self, name: &str, data_type: DataType) -> &mut PartBuilder {
        self.collector
            .push(PartBuilder::new(PartKind::Mean, name, data_type))
    }

    /// `COUNT` of the expression, or `COUNT(*)` without one.
    pub fn count(&mut self, name: &str, data_type: DataType) -> &mut PartBuilder {
        self.collector
            .push(PartBuilder::new(PartKind::Count, name, data_type))
    }

    pub fn finish(self) -> DefinitionResult<Vec<PartDefinition>> {
        self.collector.finish()
    }
}
