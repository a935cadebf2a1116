/*!
 * Caption document store.
 *
 * This module holds the authoritative DFXP representation of a caption set:
 * - Node-per-caption model with opaque, stable `NodeId` handles
 * - DFXP parsing with head normalisation
 * - DFXP serialization
 * - TTML time expression codec
 */

pub mod model;
pub mod parser;
pub mod timing;
pub mod writer;

// Re-export types used by other modules
pub use model::{CaptionDocument, NodeAttrs, NodeId, Placement};
pub use parser::empty_dfxp;
pub use timing::{format_time_expression, parse_clock_time, parse_time_expression};
