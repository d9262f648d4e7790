use serde::Serialize;

use super::expression::Expression;

/// Emotions counted by the tally, in chart order.
pub const TRACKED_EMOTIONS: [Expression; 5] = [
    Expression::Happy,
    Expression::Sad,
    Expression::Angry,
    Expression::Neutral,
    Expression::Surprised,
];

/// Running histogram of dominant emotions for the session.
///
/// Owned by the frame loop; the chart only ever sees snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmotionTally {
    counts: [u64; TRACKED_EMOTIONS.len()],
}

impl EmotionTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence. Untracked expressions are ignored.
    ///
    /// Returns whether a counter changed.
    pub fn record(&mut self, expression: Expression) -> bool {
        match slot(expression) {
            Some(i) => {
                self.counts[i] += 1;
                true
            }
            None => false,
        }
    }

    /// Counts one occurrence of a textual label. Labels that do not parse,
    /// or parse to an untracked expression, are ignored.
    pub fn record_label(&mut self, label: &str) -> bool {
        label
            .parse::<Expression>()
            .map(|expr| self.record(expr))
            .unwrap_or(false)
    }

    pub fn count(&self, expression: Expression) -> u64 {
        slot(expression).map_or(0, |i| self.counts[i])
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn snapshot(&self) -> TallySnapshot {
        TallySnapshot {
            bars: TRACKED_EMOTIONS
                .iter()
                .zip(self.counts)
                .map(|(&emotion, count)| TallyBar { emotion, count })
                .collect(),
        }
    }
}

fn slot(expression: Expression) -> Option<usize> {
    TRACKED_EMOTIONS.iter().position(|&e| e == expression)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TallyBar {
    pub emotion: Expression,
    pub count: u64,
}

/// Point-in-time copy of the tally, in chart order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TallySnapshot {
    pub bars: Vec<TallyBar>,
}

impl TallySnapshot {
    pub fn labels(&self) -> Vec<&'static str> {
        self.bars.iter().map(|b| b.emotion.label()).collect()
    }

    pub fn values(&self) -> Vec<u64> {
        self.bars.iter().map(|b| b.count).collect()
    }

    pub fn max_count(&self) -> u64 {
        self.bars.iter().map(|b| b.count).max().unwrap_or(0)
    }
}
