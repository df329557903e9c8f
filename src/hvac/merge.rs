//! Weight merge of heating-only and cooling-only candidates.
//!
//! Two descending weight queues are paired head to head. The lighter head
//! is consumed whole and the heavier head keeps the difference, so the
//! emitted weights always add up to the weights that went in.

use std::collections::VecDeque;
use tracing::debug;

/// Weights closer than this are treated as equal.
const WEIGHT_EPSILON: f64 = 1e-9;

/// Decimal places kept in output fractions.
const FRACTION_DECIMALS: i32 = 6;

/// Output systems kept after ranking.
pub const MAX_SYSTEMS: usize = 2;

/// A (heating, cooling, distribution) combination with a share of the
/// house weight. Members are indexes into the resolver's equipment and
/// distribution lists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub heating: Option<usize>,
    pub cooling: Option<usize>,
    pub distribution: Option<usize>,
    pub weight: f64,
}

impl Candidate {
    pub fn heating(index: usize, distribution: Option<usize>, weight: f64) -> Self {
        Self {
            heating: Some(index),
            cooling: None,
            distribution,
            weight,
        }
    }

    pub fn cooling(index: usize, distribution: Option<usize>, weight: f64) -> Self {
        Self {
            heating: None,
            cooling: Some(index),
            distribution,
            weight,
        }
    }
}

/// Pair heating-only and cooling-only candidates by weight.
///
/// `ducted` says whether a distribution index carries ducts; a merged pair
/// keeps the first choice's distribution when it does and falls back to
/// the other side's otherwise.
pub fn merge_singletons<F>(heating: Vec<Candidate>, cooling: Vec<Candidate>, ducted: F) -> Vec<Candidate>
where
    F: Fn(usize) -> bool,
{
    let sorted = |mut list: Vec<Candidate>| {
        list.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        VecDeque::from(list)
    };
    let mut heating = sorted(heating);
    let mut cooling = sorted(cooling);
    let choose = |first: Option<usize>, second: Option<usize>| match first {
        Some(d) if ducted(d) => Some(d),
        _ => second,
    };

    let mut merged = Vec::with_capacity(heating.len() + cooling.len());
    loop {
        match (heating.pop_front(), cooling.pop_front()) {
            (None, None) => break,
            (Some(h), None) => merged.push(h),
            (None, Some(c)) => merged.push(c),
            (Some(h), Some(c)) => {
                let diff = h.weight - c.weight;
                let weight = h.weight.min(c.weight);
                let distribution = if diff > WEIGHT_EPSILON {
                    choose(c.distribution, h.distribution)
                } else {
                    choose(h.distribution, c.distribution)
                };
                merged.push(Candidate {
                    heating: h.heating,
                    cooling: c.cooling,
                    distribution,
                    weight,
                });
                debug!(heating = ?h.heating, cooling = ?c.cooling, weight, "merged heating and cooling");
                if diff > WEIGHT_EPSILON {
                    heating.push_front(Candidate { weight: diff, ..h });
                } else if diff < -WEIGHT_EPSILON {
                    cooling.push_front(Candidate { weight: -diff, ..c });
                }
            }
        }
    }
    merged
}

/// Keep the heaviest candidates and turn their weights into fractions
/// summing to exactly one.
///
/// Fractions are rounded to six decimal places; the rounding remainder goes
/// to the last kept candidate.
pub fn rank(mut candidates: Vec<Candidate>) -> Vec<(Candidate, f64)> {
    candidates.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    candidates.truncate(MAX_SYSTEMS);

    let total: f64 = candidates.iter().map(|c| c.weight).sum();
    let scale = 10f64.powi(FRACTION_DECIMALS);
    let mut ranked: Vec<(Candidate, f64)> = candidates
        .into_iter()
        .map(|c| {
            let fraction = if total > 0.0 { c.weight / total } else { 0.0 };
            (c, (fraction * scale).round() / scale)
        })
        .collect();
    let remainder = 1.0 - ranked.iter().map(|(_, f)| f).sum::<f64>();
    if let Some((_, last)) = ranked.last_mut() {
        *last += remainder;
    }
    ranked
}
