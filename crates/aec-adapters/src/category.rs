//! Ordered keyword rules for inferring an event's theme from its name.

use anyhow::{bail, Context};
use serde::Deserialize;

const BUILTIN_RULES: &str = include_str!("../../../rules/categories.yaml");
const RULES_FILE_VERSION: u32 = 1;

#[derive(Debug, Clone, Deserialize)]
struct CategoryRulesFile {
    version: u32,
    fallback: String,
    #[serde(default)]
    rules: Vec<CategoryRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryRule {
    pub category: String,
    pub contains_any: Vec<String>,
}

/// First-match-wins rule table. Keywords are matched as whole words against
/// the lowercased name, so `acl` does not fire on "Oracle".
#[derive(Debug, Clone)]
pub struct CategoryRules {
    rules: Vec<CompiledRule>,
    fallback: String,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    category: String,
    phrases: Vec<Vec<String>>,
}

impl CategoryRules {
    /// The table shipped in `rules/categories.yaml`.
    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_yaml(BUILTIN_RULES).context("parsing rules/categories.yaml")
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        let file: CategoryRulesFile = serde_yaml::from_str(text)?;
        if file.version != RULES_FILE_VERSION {
            bail!(
                "unsupported category rules version {} (expected {RULES_FILE_VERSION})",
                file.version
            );
        }
        let rules = file
            .rules
            .into_iter()
            .map(|rule| CompiledRule {
                phrases: rule
                    .contains_any
                    .iter()
                    .map(|k| tokenize(k))
                    .filter(|p| !p.is_empty())
                    .collect(),
                category: rule.category,
            })
            .collect();
        Ok(Self {
            rules,
            fallback: file.fallback,
        })
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.category.as_str())
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn categorize(&self, name: &str) -> &str {
        let tokens = tokenize(name);
        self.rules
            .iter()
            .find(|rule| rule.phrases.iter().any(|p| contains_phrase(&tokens, p)))
            .map(|rule| rule.category.as_str())
            .unwrap_or(self.fallback.as_str())
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn contains_phrase(tokens: &[String], phrase: &[String]) -> bool {
    tokens.windows(phrase.len()).any(|w| w == phrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> CategoryRules {
        CategoryRules::builtin().expect("builtin rules parse")
    }

    #[test]
    fn builtin_table_is_in_documented_order() {
        let rules = rules();
        let order: Vec<&str> = rules.categories().collect();
        assert_eq!(
            order,
            vec![
                "Generative AI & LLMs",
                "Natural Language Processing",
                "Computer Vision",
                "Robotics & Autonomous Systems",
                "MLOps & Data Engineering",
                "AI Ethics & Policy",
                "Healthcare AI",
                "Machine Learning",
            ]
        );
        assert_eq!(rules.fallback(), "Artificial Intelligence");
    }

    #[test]
    fn keywords_pick_their_category() {
        let rules = rules();
        assert_eq!(rules.categorize("LLM Day Paris"), "Generative AI & LLMs");
        assert_eq!(rules.categorize("EMNLP 2026"), "Natural Language Processing");
        assert_eq!(rules.categorize("CVPR 2026"), "Computer Vision");
        assert_eq!(rules.categorize("ICRA 2027"), "Robotics & Autonomous Systems");
        assert_eq!(rules.categorize("MLOps World"), "MLOps & Data Engineering");
        assert_eq!(rules.categorize("Responsible AI Summit"), "AI Ethics & Policy");
        assert_eq!(rules.categorize("AI in Medicine Forum"), "Healthcare AI");
        assert_eq!(rules.categorize("Deep Learning Summit"), "Machine Learning");
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules = rules();
        // both "vision" and "generative" present
        assert_eq!(
            rules.categorize("Generative Vision Workshop"),
            "Generative AI & LLMs"
        );
        assert_eq!(
            rules.categorize("Clinical Machine Learning Symposium"),
            "Healthcare AI"
        );
    }

    #[test]
    fn matches_whole_words_only() {
        let rules = rules();
        assert_eq!(rules.categorize("Oracle CloudWorld"), "Artificial Intelligence");
        assert_eq!(rules.categorize("HTML Conf"), "Artificial Intelligence");
    }

    #[test]
    fn custom_tables_can_be_loaded() {
        let rules = CategoryRules::from_yaml(
            "version: 1\nfallback: Other\nrules:\n  - category: Quantum\n    contains_any: [quantum computing]\n",
        )
        .expect("parse");
        assert_eq!(rules.categorize("Quantum Computing Expo"), "Quantum");
        assert_eq!(rules.categorize("Quantum Expo"), "Other");
    }

    #[test]
    fn unknown_rules_version_is_rejected() {
        let err = CategoryRules::from_yaml("version: 2\nfallback: Other\nrules: []\n")
            .expect_err("version 2 should be rejected");
        assert!(err.to_string().contains("unsupported category rules version 2"));
    }
}
