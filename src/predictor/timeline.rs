use chrono::{DateTime, Utc};
use serde::Serialize;

/// One point on the session's win-probability timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    /// Overs completed, one decimal.
    pub overs: f64,
    /// Win probability in percent, one decimal.
    pub win_pct: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Append-only record of predictions made during one interactive session.
///
/// Insertion order is chronological order; repeated predictions at the same
/// overs value are kept as-is (no dedup). `clear` is the only removal
/// operation. Not persisted across sessions.
#[derive(Debug, Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn new() -> Self {
        Timeline::default()
    }

    pub fn append(&mut self, overs: f64, win_pct: f64) {
        self.entries.push(TimelineEntry {
            overs,
            win_pct,
            recorded_at: Utc::now(),
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn all(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_call_order_without_dedup() {
        let mut t = Timeline::new();
        t.append(10.0, 64.2);
        t.append(10.0, 64.2);
        t.append(10.1, 65.0);
        let overs: Vec<f64> = t.all().iter().map(|e| e.overs).collect();
        assert_eq!(overs, vec![10.0, 10.0, 10.1]);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn clear_empties_the_store() {
        let mut t = Timeline::new();
        t.append(5.0, 50.0);
        t.clear();
        assert!(t.is_empty());
        assert!(t.all().is_empty());
    }
}
