//! Rule engine for multi-criteria dispatching.
//!
//! Ranks the orders waiting at a machine with one or more dispatching rules
//! and turns the winner into a selection value.
//!
//! Rules are scored once per candidate; ranking then compares the score
//! rows, either lexicographically (`Sequential`) or by their weighted sum
//! (`Weighted`).
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::{Candidate, DispatchPolicy, DispatchingRule, PolicyView, RuleScore};

/// How the rule scores of a candidate are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvaluationMode {
    /// Later rules only separate candidates the earlier rules tie on.
    #[default]
    Sequential,
    /// Candidates are ranked by the weighted sum of all scores.
    Weighted,
}

/// Ordering applied when every rule ties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreaker {
    /// Earlier queue position first.
    #[default]
    QueuePosition,
    /// Lexicographic order id.
    ById,
}

/// Composable dispatching policy.
///
/// Busy machines and empty queues get selection `0`; otherwise the best
/// ranked order at queue position `p` is selected with `p + 1`.
///
/// # Example
/// ```
/// use u_shopsim::policy::{rules, RuleEngine};
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::Edd)
///     .with_tie_breaker(rules::Spt);
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<(Arc<dyn DispatchingRule>, f64)>,
    mode: EvaluationMode,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl RuleEngine {
    /// Engine without rules: the final tie-breaker alone decides.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            mode: EvaluationMode::default(),
            tie_breaker: TieBreaker::default(),
            epsilon: 1e-9,
        }
    }

    /// Adds a rule with weight 1.0.
    pub fn with_rule<R: DispatchingRule + 'static>(self, rule: R) -> Self {
        self.push(rule, 1.0)
    }

    pub fn with_weighted_rule<R: DispatchingRule + 'static>(self, rule: R, weight: f64) -> Self {
        self.push(rule, weight)
    }

    /// Adds a rule that only breaks ties; it carries no weight in
    /// `Weighted` mode.
    pub fn with_tie_breaker<R: DispatchingRule + 'static>(self, rule: R) -> Self {
        self.push(rule, 0.0)
    }

    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    fn push<R: DispatchingRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push((Arc::new(rule), weight));
        self
    }

    /// Candidate indices, best first.
    pub fn sort_indices(&self, candidates: &[Candidate<'_>]) -> Vec<usize> {
        let rows: Vec<Vec<RuleScore>> = candidates.iter().map(|c| self.raw_scores(c)).collect();
        let mut indices: Vec<usize> = (0..candidates.len()).collect();
        indices.sort_by(|&a, &b| {
            self.compare_rows(&rows[a], &rows[b])
                .then_with(|| self.final_tie(&candidates[a], &candidates[b]))
        });
        indices
    }

    /// Queue position of the best candidate.
    pub fn select_best(&self, candidates: &[Candidate<'_>]) -> Option<usize> {
        self.sort_indices(candidates)
            .first()
            .map(|&i| candidates[i].context.position)
    }

    /// Weighted score of each rule for one candidate.
    pub fn evaluate(&self, candidate: &Candidate<'_>) -> Vec<RuleScore> {
        self.raw_scores(candidate)
            .into_iter()
            .zip(&self.rules)
            .map(|(score, (_, weight))| score * weight)
            .collect()
    }

    fn raw_scores(&self, candidate: &Candidate<'_>) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|(rule, _)| rule.evaluate(candidate.order, &candidate.context))
            .collect()
    }

    fn compare_rows(&self, a: &[RuleScore], b: &[RuleScore]) -> Ordering {
        match self.mode {
            EvaluationMode::Sequential => a
                .iter()
                .zip(b)
                .find(|(x, y)| (*x - *y).abs() > self.epsilon)
                .map_or(Ordering::Equal, |(x, y)| x.total_cmp(y)),
            EvaluationMode::Weighted => {
                let sum = |row: &[RuleScore]| -> f64 {
                    row.iter().zip(&self.rules).map(|(s, (_, w))| s * w).sum()
                };
                sum(a).total_cmp(&sum(b))
            }
        }
    }

    fn final_tie(&self, a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
        match self.tie_breaker {
            TieBreaker::QueuePosition => a.context.position.cmp(&b.context.position),
            TieBreaker::ById => a.order.id.cmp(&b.order.id),
        }
    }
}

impl DispatchPolicy for RuleEngine {
    fn name(&self) -> &str {
        self.rules.first().map_or("FIFO", |(rule, _)| rule.name())
    }

    fn select(&mut self, view: &PolicyView<'_>) -> Vec<usize> {
        (0..view.machine_count())
            .map(|machine| {
                if !view.is_idle(machine) {
                    return 0;
                }
                self.select_best(&view.candidates(machine))
                    .map_or(0, |position| position + 1)
            })
            .collect()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules: Vec<String> = self
            .rules
            .iter()
            .map(|(rule, weight)| format!("{}*{}", weight, rule.name()))
            .collect();
        f.debug_struct("RuleEngine")
            .field("rules", &rules)
            .field("mode", &self.mode)
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}
