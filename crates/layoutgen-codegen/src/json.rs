//! JSON dump of the declaration sequence, for emitters living outside this workspace

use serde::Serialize;

use crate::emitter::Declaration;
use crate::{Codegen, CodegenError};

/// Document written by [`JsonCodegen`]
#[derive(Debug, Serialize)]
pub struct DeclarationDocument<'a> {
    pub generator_version: &'a str,
    pub declarations: &'a [Declaration],
}

#[derive(Debug, Clone, Default)]
pub struct JsonCodegen {
    pub compact: bool,
}

impl JsonCodegen {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Codegen for JsonCodegen {
    fn render(&mut self, declarations: &[Declaration]) -> Result<String, CodegenError> {
        let document = DeclarationDocument {
            generator_version: env!("CARGO_PKG_VERSION"),
            declarations,
        };
        let mut output = if self.compact {
            serde_json::to_string(&document)
        } else {
            serde_json::to_string_pretty(&document)
        }
        .map_err(|e| CodegenError::Generation(e.to_string()))?;
        output.push('\n');
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layoutgen_core::EngineRevision;

    #[test]
    fn test_declarations_serialize_in_order() {
        let catalog = EngineRevision::Initial.catalog().unwrap();
        let output = JsonCodegen { compact: true }.generate(&catalog).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        let declarations = value["declarations"].as_array().unwrap();
        assert_eq!(declarations.len(), catalog.len());
        assert_eq!(declarations[0]["external_name"], "FMAT44_DOUBLE");
        assert_eq!(declarations[0]["layout"]["size"], 128);
        assert_eq!(declarations[0]["kind"], "fixed_array_of_scalars");
    }
}
