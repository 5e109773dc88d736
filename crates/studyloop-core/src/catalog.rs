//! Content catalog types and the pool adapter.
//!
//! The catalog is owned by the surrounding application; the engine only
//! reads it. [`ContentPool`] flattens per-domain item lists into one pool
//! and filters out excluded ids before generation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Content domain of a learnable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    #[serde(rename = "dsa")]
    Dsa,
    #[serde(rename = "core")]
    Core,
    #[serde(rename = "interview")]
    Interview,
    #[serde(rename = "systemDesign")]
    SystemDesign,
}

impl Domain {
    /// All domains, in display order.
    pub const ALL: [Domain; 4] = [
        Domain::Dsa,
        Domain::Core,
        Domain::Interview,
        Domain::SystemDesign,
    ];
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Domain::Dsa => "dsa",
            Domain::Core => "core",
            Domain::Interview => "interview",
            Domain::SystemDesign => "systemDesign",
        };
        write!(f, "{name}")
    }
}

/// What an action does with an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "learn")]
    Learn,
    #[serde(rename = "revise")]
    Revise,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Learn => write!(f, "learn"),
            ActionKind::Revise => write!(f, "revise"),
        }
    }
}

/// A unit of learnable content supplied by the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnableItem {
    pub id: String,
    pub domain: Domain,
    pub topic_id: Option<String>,
    pub topic_title: Option<String>,
    pub category_id: Option<String>,
    pub title: String,
    /// Difficulty on a 1 (easiest) to 5 (hardest) scale.
    pub difficulty_level: u8,
}

impl LearnableItem {
    pub fn new(id: impl Into<String>, domain: Domain, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            domain,
            topic_id: None,
            topic_title: None,
            category_id: None,
            title: title.into(),
            difficulty_level: 3,
        }
    }

    /// Set the difficulty level (clamped to 1..=5).
    pub fn with_difficulty(mut self, level: u8) -> Self {
        self.difficulty_level = level.clamp(1, 5);
        self
    }

    /// Set the topic reference.
    pub fn with_topic(mut self, id: impl Into<String>, title: impl Into<String>) -> Self {
        self.topic_id = Some(id.into());
        self.topic_title = Some(title.into());
        self
    }
}

/// Snapshot of all learnable content, flattened across domains.
///
/// Rebuilt from the application on every generation call; never cached by
/// the engine.
#[derive(Debug, Clone, Default)]
pub struct ContentPool {
    items: Vec<LearnableItem>,
}

impl ContentPool {
    pub fn new(items: Vec<LearnableItem>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[LearnableItem] {
        &self.items
    }

    /// Items in a single domain.
    pub fn domain_items(&self, domain: Domain) -> impl Iterator<Item = &LearnableItem> {
        self.items.iter().filter(move |i| i.domain == domain)
    }

    /// Items not present in the exclusion set, capped at `max_difficulty`.
    pub fn available(
        &self,
        exclude: &HashSet<String>,
        max_difficulty: u8,
    ) -> Vec<LearnableItem> {
        self.items
            .iter()
            .filter(|i| !exclude.contains(&i.id))
            .filter(|i| i.difficulty_level <= max_difficulty)
            .cloned()
            .collect()
    }
}
