//! Dollar amount extraction and total resolution.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::trace;

use super::patterns::{DOLLAR_AMOUNT, TOTAL_LABEL};
use super::{ExtractionMatch, FieldExtractor};

/// Dollar amount extractor.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DOLLAR_AMOUNT
            .captures_iter(text)
            .filter_map(|caps| {
                let token = caps.get(1)?;
                let Some(amount) = parse_dollar_amount(token.as_str()) else {
                    trace!("Skipping unparsable amount token {:?}", token.as_str());
                    return None;
                };
                let full_match = caps.get(0)?;
                Some(
                    ExtractionMatch::new(amount, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                )
            })
            .collect()
    }
}

/// How the total amount was settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TotalResolution {
    /// Taken from the first amount on a total-labeled line.
    Labeled {
        amount: Decimal,
        line: String,
    },
    /// Sum of every dollar amount in the text.
    Summed {
        amount: Decimal,
        count: usize,
    },
    /// The `count` amounts add up past what a `Decimal` can hold.
    Overflowed {
        count: usize,
    },
    /// Nothing that looks like money.
    NotFound,
}

impl TotalResolution {
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            Self::Labeled { amount, .. } | Self::Summed { amount, .. } => Some(*amount),
            Self::Overflowed { .. } | Self::NotFound => None,
        }
    }
}

/// Settle the receipt total from `text` and its `candidates`.
///
/// Only the first labeled line is consulted, and only the first dollar
/// token on it. When that token is missing or unparsable the candidates
/// are summed instead of trying later tokens or lines.
pub fn resolve_total(text: &str, candidates: &[ExtractionMatch<Decimal>]) -> TotalResolution {
    if let Some(line) = text.split('\n').find(|line| TOTAL_LABEL.is_match(line)) {
        let first = DOLLAR_AMOUNT
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|token| token.as_str());

        match first.and_then(parse_dollar_amount) {
            Some(amount) => {
                return TotalResolution::Labeled {
                    amount,
                    line: line.trim().to_string(),
                };
            }
            None => trace!("Total line {:?} has no usable amount", line.trim()),
        }
    }

    if candidates.is_empty() {
        return TotalResolution::NotFound;
    }

    let sum = candidates
        .iter()
        .try_fold(Decimal::ZERO, |acc, m| acc.checked_add(m.value));

    match sum {
        Some(amount) => TotalResolution::Summed {
            amount,
            count: candidates.len(),
        },
        None => TotalResolution::Overflowed {
            count: candidates.len(),
        },
    }
}

/// Parse the digits of a dollar token (e.g., "1,234.56" or ".75").
pub fn parse_dollar_amount(s: &str) -> Option<Decimal> {
    let cleaned = s.replace(',', "");
    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.starts_with('.') {
        format!("0{}", cleaned)
    } else {
        cleaned
    };

    Decimal::from_str(&normalized).ok()
}
