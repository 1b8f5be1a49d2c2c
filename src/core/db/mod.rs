/// Database Module
///
/// The statement pipeline, split into focused submodules:
/// - **Connection Source** (`source.rs`): hands out one live connection per call
/// - **Parameter Binding** (`binder.rs`): positional binding onto a prepared statement
/// - **Shapes** (`shape.rs`): field-to-column tables for reflective extraction
/// - **Extraction Rules** (`rule.rs`): caller-supplied row decoders
/// - **Extraction** (`extract.rs`): drives a row cursor through either strategy
/// - **Template** (`template.rs`): the executor facade tying it all together
///
/// ## Error Handling
///
/// Every driver failure is translated once, at the template boundary, into
/// `DataAccessError`.
pub mod binder;
pub mod extract;
pub mod rule;
pub mod shape;
pub mod source;
pub mod template;

pub use binder::bind;
pub use extract::Extractor;
pub use rule::ExtractionRule;
pub use shape::{FieldAssign, Shape, ShapeDescriptor};
pub use source::{ConnectionSource, SqliteSource};
pub use template::SqlTemplate;
