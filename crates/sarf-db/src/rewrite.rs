// Dialect rewrite rules applied to merged surface forms.

use std::borrow::Cow;

use regex::Regex;

/// One orthographic rewrite: every match of `pattern` is replaced.
///
/// `replacement` uses the `regex` crate syntax, so `$1` and `${name}`
/// refer to capture groups.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pattern: Regex,
    replacement: String,
}

impl RewriteRule {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern.replace_all(text, self.replacement.as_str())
    }
}

/// Apply `rules` in order, each to the output of the previous one.
pub fn rewrite(rules: &[RewriteRule], text: String) -> String {
    rules.iter().fold(text, |acc, rule| match rule.apply(&acc) {
        Cow::Borrowed(_) => acc,
        Cow::Owned(changed) => changed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_rule() {
        let rule = RewriteRule::new("aa", "A").unwrap();
        assert_eq!(rule.apply("kaatib"), "kAtib");
        assert_eq!(rule.pattern(), "aa");
        assert_eq!(rule.replacement(), "A");
    }

    #[test]
    fn capture_groups() {
        // drop morpheme boundary markers between letters
        let rule = RewriteRule::new(r"([a-z])\+([a-z])", "${1}${2}").unwrap();
        assert_eq!(rule.apply("wa+katab"), "wakatab");
    }

    #[test]
    fn rules_apply_in_order() {
        let rules = vec![
            RewriteRule::new("l\\+", "l").unwrap(),
            RewriteRule::new("ll", "l~").unwrap(),
        ];
        assert_eq!(rewrite(&rules, "Al+lawn".to_string()), "Al~awn");
    }

    #[test]
    fn no_rules_is_identity() {
        assert_eq!(rewrite(&[], "kataba".to_string()), "kataba");
    }

    #[test]
    fn invalid_pattern_rejected() {
        assert!(RewriteRule::new("(unclosed", "").is_err());
    }
}
