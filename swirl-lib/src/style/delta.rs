use indexmap::IndexMap;

/// Properties changed since the last flush of one rule.
///
/// A second write to the same property replaces the first but keeps its
/// position, so changes drain in first-touched order.
#[derive(Debug, Default, Clone)]
pub struct DeltaTracker {
    pending: IndexMap<String, Vec<String>>,
}

impl DeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, property: String, values: Vec<String>) {
        self.pending.insert(property, values);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn get(&self, property: &str) -> Option<&[String]> {
        self.pending.get(property).map(Vec::as_slice)
    }

    /// Hands back every pending change and starts a new batch.
    pub fn drain(&mut self) -> IndexMap<String, Vec<String>> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_writes_coalesce() {
        let mut delta = DeltaTracker::new();
        delta.record("color".into(), vec!["red".into()]);
        delta.record("margin".into(), vec!["0".into()]);
        delta.record("color".into(), vec!["blue".into()]);

        assert_eq!(delta.len(), 2);
        let drained: Vec<_> = delta.drain().into_iter().collect();
        assert_eq!(
            drained,
            vec![
                ("color".to_string(), vec!["blue".to_string()]),
                ("margin".to_string(), vec!["0".to_string()]),
            ]
        );
        assert!(delta.is_empty());
    }
}
