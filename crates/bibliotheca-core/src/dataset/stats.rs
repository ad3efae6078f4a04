use serde::Serialize;

use crate::error::{BibliothecaError, Result};

use super::NumberSource;

/// Aggregates over one read of a dataset. Empty datasets report zeros.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberStats {
    pub numbers: Vec<i64>,
    pub sum: i64,
    pub max: i64,
    pub min: i64,
    pub average: f64,
    pub count: usize,
}

impl NumberStats {
    /// Fails when the sum does not fit in an `i64`.
    pub fn from_numbers(numbers: Vec<i64>) -> Result<Self> {
        let sum = checked_sum(&numbers)?;
        let count = numbers.len();
        Ok(Self {
            sum,
            max: numbers.iter().copied().max().unwrap_or(0),
            min: numbers.iter().copied().min().unwrap_or(0),
            average: if count == 0 { 0.0 } else { sum as f64 / count as f64 },
            count,
            numbers,
        })
    }
}

fn checked_sum(numbers: &[i64]) -> Result<i64> {
    numbers
        .iter()
        .try_fold(0i64, |acc, n| acc.checked_add(*n))
        .ok_or_else(|| {
            BibliothecaError::Validation(format!("sum of {} numbers overflows i64", numbers.len()))
        })
}

/// Arithmetic over a number source.
pub struct NumberService<S> {
    source: S,
}

impl<S: NumberSource> NumberService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn sum(&mut self) -> Result<i64> {
        checked_sum(&self.source.numbers()?)
    }

    pub fn max(&mut self) -> Result<i64> {
        Ok(self.source.numbers()?.into_iter().max().unwrap_or(0))
    }

    pub fn min(&mut self) -> Result<i64> {
        Ok(self.source.numbers()?.into_iter().min().unwrap_or(0))
    }

    pub fn average(&mut self) -> Result<f64> {
        Ok(NumberStats::from_numbers(self.source.numbers()?)?.average)
    }

    pub fn count(&mut self) -> Result<usize> {
        Ok(self.source.numbers()?.len())
    }

    /// Every aggregate from a single read.
    pub fn summary(&mut self) -> Result<NumberStats> {
        NumberStats::from_numbers(self.source.numbers()?)
    }

    pub fn refresh(&mut self) -> Result<()> {
        self.source.refresh()
    }
}
