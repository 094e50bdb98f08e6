//! Visualization exports of chart definitions.
//!
//! Both exporters are pure projections of a [`ChartDefinition`]: they look
//! at the state tree and the transition table only, never at a running
//! interpreter. Predicates and actions appear under their registered names,
//! so a nameless function is a [`DefinitionError`] here.
//!
//! [`ChartDefinition`]: crate::core::ChartDefinition

mod dagre;
mod plantuml;

pub use dagre::{
    to_visualizer_format, ExportedGuard, ExportedTransition, StateShape, VisualizerDocument,
};
pub use plantuml::to_plantuml;

use crate::core::DefinitionError;

/// Options accepted by the exporters.
///
/// Reserved for layout tweaks; no field changes the output yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ExportOptions {}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The name to print for a function, rejecting blank names.
fn function_name<'a>(
    from: &str,
    kind: &'static str,
    name: &'a str,
) -> Result<&'a str, DefinitionError> {
    if name.trim().is_empty() {
        Err(DefinitionError::AnonymousFunction {
            from: from.to_string(),
            kind,
        })
    } else {
        Ok(name)
    }
}
