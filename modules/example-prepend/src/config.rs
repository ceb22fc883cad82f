//! Module configuration

use serde::Deserialize;

/// Settings bound from the `ExamplePrepend` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ExamplePrependConfig {
    /// Inserted between prefix and input
    #[serde(alias = "separationCharacter")]
    pub separation_character: String,
}

impl ExamplePrependConfig {
    /// Configuration section
    pub const SECTION: &'static str = "ExamplePrepend";
}

#[cfg(test)]
mod tests {
    use super::*;
    use chimera_core::Configuration;
    use serde_json::json;

    #[test]
    fn test_bind_section() {
        let configuration = Configuration::from_value(json!({
            "ExamplePrepend": { "SeparationCharacter": "*" }
        }));
        let config: ExamplePrependConfig = configuration
            .section(ExamplePrependConfig::SECTION)
            .bind()
            .unwrap();
        assert_eq!(config.separation_character, "*");
    }

    #[test]
    fn test_missing_section_defaults() {
        let config: ExamplePrependConfig = Configuration::default()
            .section(ExamplePrependConfig::SECTION)
            .bind_or_default()
            .unwrap();
        assert_eq!(config, ExamplePrependConfig::default());
    }
}
