//! Dimension declaration verbs.

use super::collector::DefinitionsCollector;
use crate::error::DefinitionResult;
use crate::model::{DataType, PartBuilder, PartDefinition, PartKind};

/// Declaration block for dimensions: `column` and `timestamp_column`.
#[derive(Default)]
pub struct Dimensions {
    collector: DefinitionsCollector<PartBuilder>,
}

impl Dimensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a declaration block and return its definitions.
    pub fn collect<F>(block: F) -> DefinitionResult<Vec<PartDefinition>>
    where
        F: FnOnce(&mut Dimensions),
    {
        let mut dimensions = Self::new();
        block(&mut dimensions);
        dimensions.finish()
    }

    /// A plain grouping column.
    pub fn column(&mut self, name: &str, data_type: DataType) -> &mut PartBuilder {
        self.collector
            .push(PartBuilder::new(PartKind::Column, name, data_type))
    }

    /// A timestamp grouped into buckets; accepts a `granularity` parameter.
    pub fn timestamp_column(&mut self, name: &str, data_type: DataType) -> &mut PartBuilder {
        self.collector
            .push(PartBuilder::new(PartKind::TimestampColumn, name, data_type))
    }

    pub fn finish(self) -> DefinitionResult<Vec<PartDefinition>> {
        self.collector.finish()
    }
}
