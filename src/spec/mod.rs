//! Spec layer: table descriptors and composite spec parsing.
//!
//! Parsing is pure. Nothing here opens or registers a table; that happens
//! in the combinators once the whole spec has been validated.

pub mod descriptor;
pub mod parse;

pub use descriptor::ComponentDescriptor;
pub use parse::{CompositeSpec, group_len, split_grouped, strip_group};
