//! Name normalisation for schema definitions.

/// `orion_real_descriptor` becomes `OrionRealDescriptor`.
///
/// Characters other than the first of each word are left as they are, so
/// already-pascalized names are unchanged.
pub fn pascalize(s: &str) -> String {
    s.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Module type of a hoisted sub-schema, taken from the last word of its key:
/// `orion_real_descriptor` is a `Descriptor`.
pub(crate) fn hoisted_module_type(key: &str) -> String {
    pascalize(key.rsplit('_').next().unwrap_or(key))
}

const REF_PREFIX: &str = "#/definitions/";

/// Definition key named by a local `$ref`.
pub(crate) fn ref_target(reference: &str) -> Option<&str> {
    reference.strip_prefix(REF_PREFIX).filter(|k| !k.is_empty())
}

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "box", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use",
    "where", "while", "yield",
];

/// A field name usable as a Rust identifier.
pub(crate) fn rust_ident(name: &str) -> String {
    if RUST_KEYWORDS.contains(&name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("orion_real_descriptor", "OrionRealDescriptor")]
    #[case("design_space", "DesignSpace")]
    #[case("OrionRealDescriptor", "OrionRealDescriptor")]
    #[case("score", "Score")]
    fn test_pascalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(pascalize(input), expected)
    }

    #[rstest]
    #[case("orion_real_descriptor", "Descriptor")]
    #[case("orion_scalar_min_objective", "Objective")]
    #[case("orion_paraboloid_predictor_configuration", "Configuration")]
    fn test_hoisted_module_type(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(hoisted_module_type(key), expected)
    }

    #[rstest]
    #[case("#/definitions/OrionRealDescriptor", Some("OrionRealDescriptor"))]
    #[case("#/definitions/", None)]
    #[case("http://example.com/schema", None)]
    fn test_ref_target(#[case] reference: &str, #[case] expected: Option<&str>) {
        assert_eq!(ref_target(reference), expected)
    }

    #[rstest]
    fn test_rust_ident() {
        assert_eq!(rust_ident("type"), "r#type");
        assert_eq!(rust_ident("descriptor_key"), "descriptor_key");
    }
}
