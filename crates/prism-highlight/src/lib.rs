//! Prism Highlight - Selection-to-highlight engine
//!
//! Maps a document path selected in the inspector onto live scene objects,
//! applies a reversible highlight and hands back a [`RevertHandle`] that
//! undoes exactly what was changed.

mod mutation;
mod resolver;
mod revert;
mod style;

pub use mutation::{Mutation, MutationSet};
pub use resolver::HighlightResolver;
pub use revert::{HighlightState, RevertHandle};
pub use style::HighlightStyle;
