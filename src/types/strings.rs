use aliri_braid::braid;

/// The platform's module type, e.g. `PREDICTOR` or `DESIGN_SPACE`.
#[braid(serde)]
pub struct ModuleType;

impl ModuleTypeRef {
    /// Name of the group which classes of this module type are registered under,
    /// e.g. `DESIGN_SPACE` becomes `DesignSpace`.
    pub fn bucket(&self) -> String {
        crate::informatics::pascalize(&self.as_str().to_lowercase())
    }
}

/// API key (refresh token) used to obtain access tokens.
#[braid(serde)]
pub struct ApiKey;

/// Short-lived bearer token.
#[braid(serde)]
pub struct AccessToken;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("PREDICTOR", "Predictor")]
    #[case("DESIGN_SPACE", "DesignSpace")]
    #[case("Descriptor", "Descriptor")]
    fn test_bucket(#[case] module_type: &str, #[case] expected: &str) {
        assert_eq!(ModuleType::new(module_type.to_string()).bucket(), expected);
    }
}
