//! Declarative projections of the collection: text list, text tree and SVG map.

pub mod list;
pub mod map;
pub mod tree;
