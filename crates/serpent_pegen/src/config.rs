//! Generator configuration.

/// Options controlling how a grammar is lowered to Rust.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Name of the emitted parser struct. Overrides the grammar's `@class` directive.
    pub class_name: Option<String>,
    /// Path under which the runtime crate is reachable from the generated code.
    pub runtime_path: String,
    /// Memoize every rule, not just annotated ones and left-recursion leaders.
    pub memoize_all: bool,
    /// Emit each rule's meta-language text as a doc comment.
    pub rule_comments: bool,
    /// Pretty-print the output with `prettyplease`. When off, the raw token stream is emitted.
    pub format: bool,
    /// First rule id; ids are assigned in declaration order from here.
    pub rule_id_base: u16,
    /// How many unreachable rules are listed in warnings before the rest are summarised.
    pub max_unreachable_reported: usize,
}

/// Struct name used when neither the config nor the grammar names one.
pub const DEFAULT_CLASS_NAME: &str = "GeneratedParser";

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            class_name: None,
            runtime_path: "::serpent_core".to_string(),
            memoize_all: false,
            rule_comments: true,
            format: true,
            rule_id_base: 1000,
            max_unreachable_reported: 10,
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class_name(mut self, name: impl Into<String>) -> Self {
        self.class_name = Some(name.into());
        self
    }

    pub fn with_runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime_path = path.into();
        self
    }

    pub fn with_memoize_all(mut self, on: bool) -> Self {
        self.memoize_all = on;
        self
    }

    pub fn with_rule_comments(mut self, on: bool) -> Self {
        self.rule_comments = on;
        self
    }

    pub fn with_format(mut self, on: bool) -> Self {
        self.format = on;
        self
    }

    pub fn with_rule_id_base(mut self, base: u16) -> Self {
        self.rule_id_base = base;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.runtime_path, "::serpent_core");
        assert_eq!(config.rule_id_base, 1000);
        assert!(config.format);
        assert!(!config.memoize_all);
    }

    #[test]
    fn test_builder_chain() {
        let config = GeneratorConfig::new()
            .with_class_name("Toy")
            .with_runtime_path("crate::rt")
            .with_memoize_all(true)
            .with_format(false);
        assert_eq!(config.class_name.as_deref(), Some("Toy"));
        assert_eq!(config.runtime_path, "crate::rt");
        assert!(config.memoize_all);
        assert!(!config.format);
    }
}
