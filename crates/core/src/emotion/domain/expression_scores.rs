use std::collections::BTreeMap;

use super::expression::Expression;

/// Per-face confidence for each expression, in [0, 1].
///
/// Backed by a `BTreeMap` so iteration always follows the canonical
/// [`Expression`] order, independent of how the scores were inserted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpressionScores {
    scores: BTreeMap<Expression, f32>,
}

impl ExpressionScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a score, clamped to [0, 1]. Replaces any previous value.
    pub fn insert(&mut self, expression: Expression, score: f32) {
        self.scores.insert(expression, score.clamp(0.0, 1.0));
    }

    pub fn get(&self, expression: Expression) -> Option<f32> {
        self.scores.get(&expression).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Expression, f32)> + '_ {
        self.scores.iter().map(|(&e, &s)| (e, s))
    }

    /// The expression with the strictly greatest score, scanning in
    /// canonical order so the earliest expression wins ties.
    ///
    /// Returns `None` for empty scores. NaN scores never win.
    pub fn dominant(&self) -> Option<Expression> {
        let mut best: Option<(Expression, f32)> = None;
        for (expr, score) in self.iter() {
            match best {
                None if !score.is_nan() => best = Some((expr, score)),
                Some((_, best_score)) if score > best_score => best = Some((expr, score)),
                _ => {}
            }
        }
        best.map(|(expr, _)| expr)
    }
}

impl FromIterator<(Expression, f32)> for ExpressionScores {
    fn from_iter<I: IntoIterator<Item = (Expression, f32)>>(iter: I) -> Self {
        let mut scores = Self::new();
        for (expr, score) in iter {
            scores.insert(expr, score);
        }
        scores
    }
}
