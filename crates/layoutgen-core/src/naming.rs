//! Naming normalization for the foreign boundary.
//!
//! Every logical type id maps to exactly one external symbol name. The mapping
//! is versioned through [`NamingScheme`]: changing how names are produced
//! renames every emitted binding, so a new scheme gets a new variant instead
//! of silently altering an existing one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved words of C and C++ that may not be used as field names.
const C_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "auto", "bool", "break", "case", "char", "class", "const",
    "constexpr", "continue", "default", "delete", "do", "double", "else", "enum", "explicit",
    "extern", "false", "float", "for", "friend", "goto", "if", "inline", "int", "long",
    "mutable", "namespace", "new", "operator", "private", "protected", "public", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch",
    "template", "this", "throw", "true", "try", "typedef", "typename", "union", "unsigned",
    "using", "virtual", "void", "volatile", "while",
];

/// Versioned strategy for turning type ids into external symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingScheme {
    /// `F` prefix followed by the id in UPPER_SNAKE_CASE
    #[default]
    V1,
}

impl NamingScheme {
    pub fn prefix(self) -> &'static str {
        match self {
            NamingScheme::V1 => "F",
        }
    }

    /// Normalize a type id into its external symbol name.
    ///
    /// # Examples
    /// ```
    /// use layoutgen_core::naming::NamingScheme;
    /// assert_eq!(NamingScheme::V1.normalize("VEC3_FLOAT"), "FVEC3_FLOAT");
    /// assert_eq!(NamingScheme::V1.normalize("filament::Frustum"), "FFILAMENT_FRUSTUM");
    /// assert_eq!(NamingScheme::V1.normalize("linearColorA"), "FLINEAR_COLOR_A");
    /// ```
    pub fn normalize(self, id: &str) -> String {
        match self {
            NamingScheme::V1 => format!("{}{}", self.prefix(), to_upper_snake_case(id)),
        }
    }
}

impl fmt::Display for NamingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingScheme::V1 => write!(f, "v1"),
        }
    }
}

/// Split an identifier into words and join them in UPPER_SNAKE_CASE.
///
/// Words break at every non-alphanumeric character and wherever a lowercase
/// letter or digit is followed by an uppercase letter.
///
/// # Examples
/// ```
/// use layoutgen_core::naming::to_upper_snake_case;
/// assert_eq!(to_upper_snake_case("mat44_double"), "MAT44_DOUBLE");
/// assert_eq!(to_upper_snake_case("SamplerParams"), "SAMPLER_PARAMS");
/// assert_eq!(to_upper_snake_case("utils::Entity"), "UTILS_ENTITY");
/// ```
pub fn to_upper_snake_case(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for c in name.chars() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev = None;
            continue;
        }

        let camel_boundary = c.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit());
        if camel_boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }

        current.push(c.to_ascii_uppercase());
        prev = Some(c);
    }

    if !current.is_empty() {
        words.push(current);
    }

    words.join("_")
}

/// True if `name` can be used verbatim as a C identifier.
pub fn is_valid_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn is_c_keyword(name: &str) -> bool {
    C_KEYWORDS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_snake_case() {
        assert_eq!(to_upper_snake_case(""), "");
        assert_eq!(to_upper_snake_case("VEC3_F32"), "VEC3_F32");
        assert_eq!(to_upper_snake_case("vec3_f32"), "VEC3_F32");
        assert_eq!(to_upper_snake_case("LinearColor"), "LINEAR_COLOR");
        assert_eq!(to_upper_snake_case("linear-color.a"), "LINEAR_COLOR_A");
        assert_eq!(to_upper_snake_case("filament::math::float3"), "FILAMENT_MATH_FLOAT3");
        assert_eq!(to_upper_snake_case("__MAT33__FLOAT"), "MAT33_FLOAT");
        // Acronyms stay together
        assert_eq!(to_upper_snake_case("RGBColor"), "RGBCOLOR");
    }

    #[test]
    fn test_normalize_v1() {
        let scheme = NamingScheme::V1;
        assert_eq!(scheme.normalize("VEC3_F32"), "FVEC3_F32");
        assert_eq!(scheme.normalize("COLOR_RGB"), "FCOLOR_RGB");
        assert_eq!(scheme.normalize("SAMPLER_PARAMS"), "FSAMPLER_PARAMS");
        assert_eq!(scheme.normalize("frustum"), "FFRUSTUM");
    }

    #[test]
    fn test_normalize_is_not_injective_on_casing() {
        let scheme = NamingScheme::V1;
        assert_eq!(scheme.normalize("vec3Float"), scheme.normalize("VEC3_FLOAT"));
    }

    #[test]
    fn test_c_identifiers() {
        assert!(is_valid_c_identifier("x"));
        assert!(is_valid_c_identifier("_pad0"));
        assert!(is_valid_c_identifier("m00"));
        assert!(!is_valid_c_identifier(""));
        assert!(!is_valid_c_identifier("0x"));
        assert!(!is_valid_c_identifier("a-b"));
        assert!(!is_valid_c_identifier("é"));

        assert!(is_c_keyword("float"));
        assert!(is_c_keyword("struct"));
        assert!(!is_c_keyword("x"));
    }

    #[test]
    fn test_scheme_serializes_as_version_tag() {
        assert_eq!(serde_json::to_string(&NamingScheme::V1).unwrap(), "\"v1\"");
        assert_eq!(NamingScheme::default().to_string(), "v1");
    }
}
