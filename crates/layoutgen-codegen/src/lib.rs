//! Code generators for the foreign value-type surface
//!
//! The [`emitter`] turns a catalog into a sequence of declarations; each
//! backend renders that sequence as text.

pub mod c_header;
pub mod emitter;
pub mod error;
pub mod json;
pub mod native;

use layoutgen_core::Catalog;

pub use c_header::{CHeaderCodegen, CHeaderConfig};
pub use emitter::{emit, emit_all, Declaration, Declarations, Emitter, FieldDeclaration};
pub use error::CodegenError;
pub use json::JsonCodegen;
pub use native::{NativeAssertionsCodegen, NativeAssertionsConfig};

/// Common trait for all code generators
pub trait Codegen {
    fn render(&mut self, declarations: &[Declaration]) -> Result<String, CodegenError>;

    fn generate(&mut self, catalog: &Catalog) -> Result<String, CodegenError> {
        let declarations = emit_all(catalog)?;
        self.render(&declarations)
    }
}
