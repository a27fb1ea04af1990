//! jkspec: a single-file JSON spec registry
//!
//! Re-exports the member crates so integration code can depend on one
//! package.

pub use jkspec_render as render;
pub use jkspec_store as store;
pub use jkspec_validate as validate;
