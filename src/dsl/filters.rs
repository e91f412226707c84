//! Filter declaration verbs.

use super::collector::DefinitionsCollector;
use crate::error::DefinitionResult;
use crate::model::{DataType, FilterBuilder, FilterDefinition, FilterKind};

/// Declaration block for filters: `exact_match` and `range`.
#[derive(Default)]
pub struct Filters {
    collector: DefinitionsCollector<FilterBuilder>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collect<F>(block: F) -> DefinitionResult<Vec<FilterDefinition>>
    where
        F: FnOnce(&mut Filters),
    {
        let mut filters = Self::new();
        block(&mut filters);
        filters.finish()
    }

    pub fn exact_match(&mut self, name: &str, data_type: DataType) -> &mut FilterBuilder {
        self.collector
            .push(FilterBuilder::new(FilterKind::ExactMatch, name, data_type))
    }

    pub fn range(&mut self, name: &str, data_type: DataType) -> &mut FilterBuilder {
        self.collector
            .push(FilterBuilder::new(FilterKind::Range, name, data_type))
    }

    pub fn finish(self) -> DefinitionResult<Vec<FilterDefinition>> {
        self.collector.finish()
    }
}
