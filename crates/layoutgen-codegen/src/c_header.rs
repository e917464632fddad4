//! C header generator
//!
//! Renders declarations as one self-contained C header:
//! - `typedef struct` definitions for structs and arrays
//! - plain typedefs for scalar aliases and type aliases
//! - compile-time assertions pinning size, alignment and every field offset

use std::collections::HashSet;
use std::fmt::Write;

use layoutgen_core::TypeKind;
use tracing::debug;

use crate::emitter::Declaration;
use crate::error::{BatchErrors, ErrorCategory, ErrorEntry, ErrorLocation};
use crate::{Codegen, CodegenError};

/// Name of the boolean typedef every header declares up front.
///
/// Declared as `uint32_t` rather than `int`: a `bool32` field is four bytes
/// holding 0 or 1, and `int` leaves both width and signedness to the
/// compiler.
pub const BOOL_TYPEDEF: &str = "FBOOL";

/// Field name used inside the struct wrapping a fixed scalar array
pub const ARRAY_FIELD: &str = "m";

/// Field name used inside the struct wrapping a struct array
pub const ELEMENTS_FIELD: &str = "elements";

/// Configuration for C header generation
#[derive(Debug, Clone)]
pub struct CHeaderConfig {
    /// Include guard macro
    pub include_guard: String,
    /// Comment placed on the first line of the header
    pub banner: Option<String>,
    /// Emit doc text as C comments
    pub include_docs: bool,
    /// Emit size, alignment and offset assertions
    pub emit_assertions: bool,
}

impl Default for CHeaderConfig {
    fn default() -> Self {
        Self {
            include_guard: "LAYOUTGEN_VALUE_TYPES_H".to_string(),
            banner: Some("Generated by layoutgen. Do not edit.".to_string()),
            include_docs: true,
            emit_assertions: true,
        }
    }
}

/// C header generator
#[derive(Debug, Clone)]
pub struct CHeaderCodegen {
    config: CHeaderConfig,
    indent_size: usize,
}

impl CHeaderCodegen {
    pub fn new() -> Self {
        Self {
            config: CHeaderConfig::default(),
            indent_size: 4,
        }
    }

    pub fn with_config(mut self, config: CHeaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CHeaderConfig {
        &self.config
    }

    fn indent(&self) -> String {
        " ".repeat(self.indent_size)
    }

    fn write_prelude(&self, output: &mut String) -> Result<(), CodegenError> {
        let guard = &self.config.include_guard;
        if let Some(banner) = &self.config.banner {
            writeln!(output, "/* {} */", comment_safe(banner))?;
        }
        writeln!(output, "#ifndef {}", guard)?;
        writeln!(output, "#define {}", guard)?;
        writeln!(output)?;
        writeln!(output, "#include <stddef.h>")?;
        writeln!(output, "#include <stdint.h>")?;
        writeln!(output)?;
        writeln!(output, "#ifdef __cplusplus")?;
        writeln!(
            output,
            "#define LAYOUTGEN_STATIC_ASSERT(cond, msg) static_assert(cond, msg)"
        )?;
        writeln!(output, "#define LAYOUTGEN_ALIGNOF(type) alignof(type)")?;
        writeln!(output, "extern \"C\" {{")?;
        writeln!(output, "#else")?;
        writeln!(
            output,
            "#define LAYOUTGEN_STATIC_ASSERT(cond, msg) _Static_assert(cond, msg)"
        )?;
        writeln!(output, "#define LAYOUTGEN_ALIGNOF(type) _Alignof(type)")?;
        writeln!(output, "#endif")?;
        writeln!(output)?;
        writeln!(output, "typedef uint32_t {};", BOOL_TYPEDEF)?;
        writeln!(output)?;
        Ok(())
    }

    fn write_epilogue(&self, output: &mut String) -> Result<(), CodegenError> {
        writeln!(output, "#ifdef __cplusplus")?;
        writeln!(output, "}}")?;
        writeln!(output, "#endif")?;
        writeln!(output)?;
        writeln!(output, "#endif /* {} */", self.config.include_guard)?;
        Ok(())
    }

    fn write_struct(
        &self,
        name: &str,
        members: &[(String, String)],
        output: &mut String,
    ) -> Result<(), CodegenError> {
        writeln!(output, "typedef struct {} {{", name)?;
        for (ty, member) in members {
            writeln!(output, "{}{} {};", self.indent(), ty, member)?;
        }
        writeln!(output, "}} {};", name)?;
        Ok(())
    }

    /// Writes the typedef for one declaration. Returns `false` and records an
    /// error when the declaration cannot be spelled.
    fn write_declaration(
        &self,
        decl: &Declaration,
        declared: &HashSet<&str>,
        errors: &mut BatchErrors,
        output: &mut String,
    ) -> Result<bool, CodegenError> {
        let name = decl.external_name.as_str();

        // Check before writing anything so a bad declaration leaves no partial output
        let target = match decl.kind {
            TypeKind::TypeAlias | TypeKind::StructArray => match decl.target.as_deref() {
                Some(target) if declared.contains(target) => Some(target),
                Some(target) => {
                    errors.add(ErrorEntry::unresolved_reference(&decl.id, target));
                    return Ok(false);
                }
                None => {
                    errors.add(
                        ErrorEntry::new(
                            ErrorCategory::UnsupportedLayout,
                            format!("{} declaration has no target", decl.kind),
                        )
                        .at(ErrorLocation::new().in_type(&decl.id)),
                    );
                    return Ok(false);
                }
            },
            _ => None,
        };

        if self.config.include_docs {
            if let Some(doc) = &decl.doc {
                for line in doc.lines() {
                    writeln!(output, "/* {} */", comment_safe(line))?;
                }
            }
        }

        match (decl.kind, target) {
            (TypeKind::ScalarAlias, _) => match decl.scalar() {
                Some(scalar) => writeln!(output, "typedef {} {};", scalar.c_name(), name)?,
                None => return Ok(unsupported(decl, errors)),
            },
            (TypeKind::FixedArrayOfScalars, _) => match decl.array_shape() {
                Some((scalar, count)) => self.write_struct(
                    name,
                    &[(
                        scalar.c_name().to_string(),
                        format!("{}[{}]", ARRAY_FIELD, count),
                    )],
                    output,
                )?,
                None => return Ok(unsupported(decl, errors)),
            },
            (TypeKind::NamedFieldStruct, _) => {
                let members: Vec<_> = decl
                    .fields
                    .iter()
                    .map(|f| (f.scalar.c_name().to_string(), f.external_name.clone()))
                    .collect();
                self.write_struct(name, &members, output)?;
            }
            (TypeKind::StructArray, Some(element)) => match decl.repeat_count() {
                Some(count) => self.write_struct(
                    name,
                    &[(
                        element.to_string(),
                        format!("{}[{}]", ELEMENTS_FIELD, count),
                    )],
                    output,
                )?,
                None => return Ok(unsupported(decl, errors)),
            },
            (TypeKind::TypeAlias, Some(target)) => {
                writeln!(output, "typedef {} {};", target, name)?;
            }
            _ => return Ok(unsupported(decl, errors)),
        }

        if self.config.emit_assertions {
            self.write_assertions(decl, output)?;
        }
        writeln!(output)?;
        Ok(true)
    }

    fn write_assertions(&self, decl: &Declaration, output: &mut String) -> Result<(), CodegenError> {
        let name = &decl.external_name;
        writeln!(
            output,
            "LAYOUTGEN_STATIC_ASSERT(sizeof({0}) == {1}, \"{0} size\");",
            name, decl.layout.size
        )?;
        writeln!(
            output,
            "LAYOUTGEN_STATIC_ASSERT(LAYOUTGEN_ALIGNOF({0}) == {1}, \"{0} alignment\");",
            name, decl.layout.align
        )?;
        for field in &decl.fields {
            writeln!(
                output,
                "LAYOUTGEN_STATIC_ASSERT(offsetof({0}, {1}) == {2}, \"{0}.{1} offset\");",
                name, field.external_name, field.offset
            )?;
        }
        Ok(())
    }
}

impl Default for CHeaderCodegen {
    fn default() -> Self {
        Self::new()
    }
}

impl Codegen for CHeaderCodegen {
    fn render(&mut self, declarations: &[Declaration]) -> Result<String, CodegenError> {
        let mut output = String::new();
        let mut errors = BatchErrors::new();
        let mut declared: HashSet<&str> = HashSet::new();

        self.write_prelude(&mut output)?;
        for decl in declarations {
            if decl.external_name == BOOL_TYPEDEF || declared.contains(decl.external_name.as_str())
            {
                errors.add(
                    ErrorEntry::new(
                        ErrorCategory::Other,
                        format!("'{}' is already declared in this header", decl.external_name),
                    )
                    .at(ErrorLocation::new().in_type(&decl.id)),
                );
                continue;
            }
            if self.write_declaration(decl, &declared, &mut errors, &mut output)? {
                declared.insert(decl.external_name.as_str());
            }
        }
        self.write_epilogue(&mut output)?;

        errors.into_result()?;
        debug!(
            "Rendered C header with {} declarations ({} bytes)",
            declared.len(),
            output.len()
        );
        Ok(output)
    }
}

fn unsupported(decl: &Declaration, errors: &mut BatchErrors) -> bool {
    errors.add(
        ErrorEntry::new(
            ErrorCategory::UnsupportedLayout,
            format!("{} with layout {}", decl.kind, decl.layout),
        )
        .at(ErrorLocation::new().in_type(&decl.id)),
    );
    false
}

fn comment_safe(text: &str) -> String {
    text.replace("*/", "* /")
}
