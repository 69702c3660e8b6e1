//! Placeholder content for notes materialized without an author.

use rand::seq::SliceRandom;

const DEFAULT_PROMPTS: &[&str] = &[
    "have the curiosity to open the Door in the Wall...",
    "come back through the Door in the Wall, not quite the same, humbler yet better equipped...",
    "that's all the motorcycle is, a system of concepts worked out in steel...",
    "For the game of creation, a sacred \"Yes\" is needed...",
    "one cannot fly into flying...",
    "where is your way...",
];

/// Source of body text for stub notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders {
    prompts: Vec<String>,
}

impl Placeholders {
    /// Picks uniformly among `prompts`. An empty list yields empty content.
    pub fn new(prompts: Vec<String>) -> Self {
        Self { prompts }
    }

    /// Always yields `content`.
    pub fn fixed(content: impl Into<String>) -> Self {
        Self::new(vec![content.into()])
    }

    pub fn pick(&self) -> String {
        self.prompts
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for Placeholders {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPTS.iter().map(|p| (*p).to_string()).collect())
    }
}
