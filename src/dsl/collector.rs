//! Generic collector behind the declaration blocks.

use crate::error::DefinitionResult;
use crate::model::{FilterBuilder, FilterDefinition, PartBuilder, PartDefinition};

/// A definition under construction inside a declaration block.
pub trait Draft {
    type Output;

    fn identifier(&self) -> &str;

    /// Validate the draft and produce the immutable definition.
    fn finish(&self) -> DefinitionResult<Self::Output>;
}

impl Draft for PartBuilder {
    type Output = PartDefinition;

    fn identifier(&self) -> &str {
        PartBuilder::identifier(self)
    }

    fn finish(&self) -> DefinitionResult<PartDefinition> {
        self.build()
    }
}

impl Draft for FilterBuilder {
    type Output = FilterDefinition;

    fn identifier(&self) -> &str {
        FilterBuilder::identifier(self)
    }

    fn finish(&self) -> DefinitionResult<FilterDefinition> {
        Ok(self.build())
    }
}

/// Accumulates drafts in declaration order.
pub struct DefinitionsCollector<B> {
    drafts: Vec<B>,
}

impl<B> Default for DefinitionsCollector<B> {
    fn default() -> Self {
        Self { drafts: Vec::new() }
    }
}

impl<B: Draft> DefinitionsCollector<B> {
    pub fn new() -> Self {
        Self { drafts: Vec::new() }
    }

    /// Append a draft and hand it back for further declaration calls.
    pub fn push(&mut self, draft: B) -> &mut B {
        let index = self.drafts.len();
        self.drafts.push(draft);
        &mut self.drafts[index]
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.drafts.iter().map(Draft::identifier)
    }

    /// Build every draft, stopping at the first declaration error.
    pub fn finish(self) -> DefinitionResult<Vec<B::Output>> {
        self.drafts.iter().map(Draft::finish).collect()
    }
}
