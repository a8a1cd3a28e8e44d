use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Totals {
    values: IndexMap<String, i64>,
}

impl Totals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate<T, K, V>(rows: &[T], key: K, value: V) -> Self
    where
        K: Fn(&T) -> &str,
        V: Fn(&T) -> i64,
    {
        let mut totals = Self::new();
        for row in rows {
            totals.add(key(row), value(row));
        }
        totals
    }

    pub fn add(&mut self, key: &str, value: i64) {
        match self.values.get_mut(key) {
            Some(total) => *total = total.saturating_add(value),
            None => {
                self.values.insert(key.to_string(), value);
            }
        }
    }

    pub fn get(&self, key: &str) -> i64 {
        self.values.get(key).copied().unwrap_or(0)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// All entries by total, descending; equal totals keep first-seen order.
    pub fn ranked(&self) -> Vec<(&str, i64)> {
        let mut entries: Vec<(&str, i64)> = self
            .values
            .iter()
            .map(|(key, total)| (key.as_str(), *total))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

    pub fn top_n(&self, n: usize) -> Vec<String> {
        self.ranked()
            .into_iter()
            .take(n)
            .map(|(key, _)| key.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Totals {
        let rows = vec![("a", 3), ("b", 5), ("c", 3), ("a", 2), ("d", 1)];
        Totals::accumulate(&rows, |row| row.0, |row| row.1)
    }

    #[test]
    fn sums_per_key() {
        let totals = sample();
        assert_eq!(totals.get("a"), 5);
        assert_eq!(totals.get("b"), 5);
        assert_eq!(totals.get("missing"), 0);
        assert_eq!(totals.keys().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn top_n_is_stable_on_ties() {
        let totals = sample();
        assert_eq!(totals.top_n(2), vec!["a", "b"]);
        assert_eq!(totals.top_n(3), vec!["a", "b", "c"]);
    }

    #[test]
    fn top_n_larger_than_keys_returns_all() {
        let totals = sample();
        assert_eq!(totals.top_n(50).len(), 4);
        assert!(Totals::new().top_n(3).is_empty());
    }

    #[test]
    fn top_n_dominates_the_rest() {
        let totals = sample();
        let top = totals.top_n(2);
        let floor = top.iter().map(|key| totals.get(key)).min().unwrap();
        for key in totals.keys().filter(|key| !top.iter().any(|t| t == key)) {
            assert!(totals.get(key) <= floor);
        }
    }

    #[test]
    fn accumulation_order_does_not_change_sums() {
        let forward = vec![("x", 1), ("y", 2), ("x", 4)];
        let backward: Vec<_> = forward.iter().rev().copied().collect();
        let a = Totals::accumulate(&forward, |row| row.0, |row| row.1);
        let b = Totals::accumulate(&backward, |row| row.0, |row| row.1);
        assert_eq!(a.get("x"), b.get("x"));
        assert_eq!(a.get("y"), b.get("y"));
    }
}
