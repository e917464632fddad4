//! Native layout assertions
//!
//! Generates a C++ header compiled into the engine-side binding. For every
//! declaration that names its engine type it pins `sizeof`/`alignof` of the
//! foreign type to the native one, and provides `convertIn*`/`convertOut*`
//! helpers that move values across the boundary without a field-by-field copy.

use std::fmt::Write;

use layoutgen_core::naming::is_valid_c_identifier;
use tracing::debug;

use crate::emitter::Declaration;
use crate::error::{BatchErrors, ErrorEntry};
use crate::{Codegen, CodegenError};

#[derive(Debug, Clone)]
pub struct NativeAssertionsConfig {
    /// Header produced by the C backend
    pub c_header: String,
    /// Engine headers that declare the native types
    pub native_includes: Vec<String>,
    /// Namespace wrapping the conversion helpers
    pub namespace: String,
    pub banner: Option<String>,
}

impl Default for NativeAssertionsConfig {
    fn default() -> Self {
        Self {
            c_header: "value_types.h".to_string(),
            native_includes: Vec::new(),
            namespace: "layoutgen".to_string(),
            banner: Some("Generated by layoutgen. Do not edit.".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NativeAssertionsCodegen {
    config: NativeAssertionsConfig,
}

impl NativeAssertionsCodegen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: NativeAssertionsConfig) -> Self {
        self.config = config;
        self
    }

    fn write_prelude(&self, output: &mut String) -> Result<(), CodegenError> {
        if let Some(banner) = &self.config.banner {
            writeln!(output, "/* {} */", banner.replace("*/", "* /"))?;
        }
        writeln!(output, "#pragma once")?;
        writeln!(output)?;
        writeln!(output, "#include <cstring>")?;
        writeln!(output, "#include <type_traits>")?;
        writeln!(output)?;
        writeln!(output, "#include \"{}\"", self.config.c_header)?;
        for include in &self.config.native_includes {
            if include.starts_with('<') {
                writeln!(output, "#include {}", include)?;
            } else {
                writeln!(output, "#include \"{}\"", include)?;
            }
        }
        writeln!(output)?;
        writeln!(output, "namespace {} {{", self.config.namespace)?;
        writeln!(output)?;
        Ok(())
    }

    fn write_assertions(
        &self,
        foreign: &str,
        native: &str,
        output: &mut String,
    ) -> Result<(), CodegenError> {
        writeln!(
            output,
            "static_assert(sizeof({0}) == sizeof({1}), \"{0} and {1} differ in size\");",
            foreign, native
        )?;
        writeln!(
            output,
            "static_assert(alignof({0}) == alignof({1}), \"{0} and {1} differ in alignment\");",
            foreign, native
        )?;
        writeln!(
            output,
            "static_assert(std::is_trivially_copyable<{0}>::value, \"{0} must be trivially copyable\");",
            native
        )?;
        Ok(())
    }

    fn write_conversions(
        &self,
        foreign: &str,
        native: &str,
        output: &mut String,
    ) -> Result<(), CodegenError> {
        // By value
        writeln!(output, "inline {1} convertIn{0}(const {0}& value) {{", foreign, native)?;
        writeln!(output, "    {} result;", native)?;
        writeln!(output, "    std::memcpy(&result, &value, sizeof(result));")?;
        writeln!(output, "    return result;")?;
        writeln!(output, "}}")?;
        writeln!(output, "inline {0} convertOut{0}(const {1}& value) {{", foreign, native)?;
        writeln!(output, "    {} result;", foreign)?;
        writeln!(output, "    std::memcpy(&result, &value, sizeof(result));")?;
        writeln!(output, "    return result;")?;
        writeln!(output, "}}")?;

        // By pointer
        for qualifier in ["", "const "] {
            writeln!(
                output,
                "inline {2}{1}* convertIn{0}({2}{0}* value) {{ return reinterpret_cast<{2}{1}*>(value); }}",
                foreign, native, qualifier
            )?;
            writeln!(
                output,
                "inline {2}{0}* convertOut{0}({2}{1}* value) {{ return reinterpret_cast<{2}{0}*>(value); }}",
                foreign, native, qualifier
            )?;
        }
        Ok(())
    }
}

impl Codegen for NativeAssertionsCodegen {
    fn render(&mut self, declarations: &[Declaration]) -> Result<String, CodegenError> {
        let mut output = String::new();
        let mut errors = BatchErrors::new();
        let mut pinned = 0usize;

        self.write_prelude(&mut output)?;
        for decl in declarations {
            let Some(native) = decl.native_name.as_deref() else {
                continue;
            };
            if !is_qualified_cpp_name(native) {
                errors.add(
                    ErrorEntry::invalid_native_name(&decl.id, native)
                        .with_suggestion("use identifiers separated by '::'"),
                );
                continue;
            }

            writeln!(output, "// {}", decl.id)?;
            self.write_assertions(&decl.external_name, native, &mut output)?;
            self.write_conversions(&decl.external_name, native, &mut output)?;
            writeln!(output)?;
            pinned += 1;
        }
        writeln!(output, "}} // namespace {}", self.config.namespace)?;

        errors.into_result()?;
        debug!(
            "Rendered native assertions for {} of {} declarations",
            pinned,
            declarations.len()
        );
        Ok(output)
    }
}

/// `utils::Entity`, `::filament::Frustum` or a plain identifier.
pub fn is_qualified_cpp_name(name: &str) -> bool {
    let name = name.strip_prefix("::").unwrap_or(name);
    !name.is_empty() && name.split("::").all(is_valid_c_identifier)
}
