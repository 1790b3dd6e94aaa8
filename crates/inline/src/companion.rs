use serde::{Deserialize, Serialize};

/// Side-channel accumulator threaded through one resolution run.
///
/// Handlers receive the companion by value and hand back its replacement, so
/// each step sees exactly what the previous steps produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Companion {
    /// Mentioned user ids, in the order the commands were resolved.
    pub mentions: Vec<String>,
}

impl Companion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a companion with `id` appended to the mention list.
    #[must_use]
    pub fn with_mention(mut self, id: impl Into<String>) -> Self {
        self.mentions.push(id.into());
        self
    }

    /// Return a companion with every id in `ids` appended, in order.
    #[must_use]
    pub fn with_mentions<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mentions.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn has_mentioned(&self, id: &str) -> bool {
        self.mentions.iter().any(|m| m == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentions_keep_resolution_order() {
        let companion = Companion::new()
            .with_mention("u2")
            .with_mentions(["u1", "u3"]);
        assert_eq!(companion.mentions, vec!["u2", "u1", "u3"]);
        assert!(companion.has_mentioned("u1"));
        assert!(!companion.has_mentioned("u4"));
    }
}
