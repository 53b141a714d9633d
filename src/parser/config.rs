use rustc_hash::FxHashSet;
use serde::Deserialize;

/// Parser behaviour switches.
///
/// Field names deserialize in camelCase so editor settings map onto this
/// struct directly; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserConfig {
    /// Symbols treated as `#define`d before the first line.
    pub preprocessor_definitions: FxHashSet<String>,
    /// Tolerate incomplete code while it is being typed.
    pub ide_mode: bool,
    /// Trusted sources: hide missing `;`, `,`, `}` and stray `;`/`}`.
    pub lenient_semicolons: bool,
    /// Only the outline is needed; skip statement parsing.
    pub skip_function_bodies: bool,
    pub error_recovery: bool,
    pub suppress_stylistic_warnings: bool,
    /// Emit a tracing event for every recovery decision.
    pub debug: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            preprocessor_definitions: FxHashSet::default(),
            ide_mode: false,
            lenient_semicolons: false,
            skip_function_bodies: false,
            error_recovery: true,
            suppress_stylistic_warnings: false,
            debug: false,
        }
    }
}

impl ParserConfig {
    /// Files the user is editing: report everything.
    pub fn workspace() -> Self {
        Self::default()
    }

    /// Game and mod library sources: trust them and only keep the outline.
    pub fn library() -> Self {
        Self {
            lenient_semicolons: true,
            skip_function_bodies: true,
            suppress_stylistic_warnings: true,
            ..Self::default()
        }
    }

    pub fn with_definitions<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preprocessor_definitions
            .extend(symbols.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_recover() {
        let config = ParserConfig::default();
        assert!(config.error_recovery);
        assert!(!config.lenient_semicolons);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{"lenientSemicolons": true, "preprocessorDefinitions": ["SERVER"]}"#;
        let config: ParserConfig = serde_json::from_str(json).expect("valid config");
        assert!(config.lenient_semicolons);
        assert!(config.error_recovery);
        assert!(config.preprocessor_definitions.contains("SERVER"));
    }

    #[test]
    fn test_library_preset() {
        let config = ParserConfig::library().with_definitions(["DEVELOPER"]);
        assert!(config.skip_function_bodies);
        assert!(config.preprocessor_definitions.contains("DEVELOPER"));
    }
}
