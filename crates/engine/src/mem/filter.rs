//! Selection and filtering over [`TriangleData`].
//!
//! Filter values arrive as strings off the wire. Comparison coerces both
//! sides: numeric when both parse as numbers, by date when both parse as
//! `YYYY-MM-DD`, lexicographic otherwise. Origin filters additionally
//! accept a bare year.

use chrono::{Datelike, NaiveDate};

use super::TriangleData;
use crate::{
    error::{EngineError, Result},
    mem::DevAxis,
    types::Comparator,
};

/// Compare two wire strings under the coercion rules above.
pub(crate) fn compare(cmp: Comparator, left: &str, right: &str) -> bool {
    if let (Ok(l), Ok(r)) = (left.parse::<f64>(), right.parse::<f64>()) {
        return cmp.eval(&l, &r);
    }
    if let (Ok(l), Ok(r)) = (
        NaiveDate::parse_from_str(left, "%Y-%m-%d"),
        NaiveDate::parse_from_str(right, "%Y-%m-%d"),
    ) {
        return cmp.eval(&l, &r);
    }
    cmp.eval(&left, &right)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

impl TriangleData {
    /// Keep index rows whose first key column matches one of `labels`.
    pub(crate) fn index_selection(&self, labels: &[String]) -> Result<Self> {
        let missing: Vec<&str> = labels
            .iter()
            .filter(|l| !self.index.iter().any(|row| &&row[0] == l))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(EngineError::unsupported(format!(
                "index label(s) not found: {}",
                missing.join(", ")
            )));
        }
        let rows: Vec<usize> = (0..self.index.len())
            .filter(|&i| labels.contains(&self.index[i][0]))
            .collect();
        Ok(self.keep_rows(&rows))
    }

    /// Keep index rows where `key`'s value satisfies the comparison.
    pub(crate) fn index_filtered(&self, key: &str, cmp: Comparator, value: &str) -> Result<Self> {
        let pos = self
            .key_labels
            .iter()
            .position(|k| k == key)
            .ok_or_else(|| EngineError::unsupported(format!("unknown index column '{key}'")))?;
        let rows: Vec<usize> = (0..self.index.len())
            .filter(|&i| compare(cmp, &self.index[i][pos], value))
            .collect();
        Ok(self.keep_rows(&rows))
    }

    /// Keep the named value columns, in the given order.
    pub(crate) fn column_selection(&self, names: &[String]) -> Result<Self> {
        let mut cols = Vec::with_capacity(names.len());
        for name in names {
            let pos = self
                .columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| EngineError::unsupported(format!("unknown column '{name}'")))?;
            cols.push(pos);
        }
        let (ni, _, no, nd) = self.dims();
        Ok(self.subgrid(
            &(0..ni).collect::<Vec<_>>(),
            &cols,
            &(0..no).collect::<Vec<_>>(),
            &(0..nd).collect::<Vec<_>>(),
        ))
    }

    /// Keep origin periods satisfying the comparison. Accepts a bare year
    /// (`"1985"`) or a date (`"1985-01-01"`).
    pub(crate) fn origin_filtered(&self, cmp: Comparator, value: &str) -> Result<Self> {
        let keep: Vec<usize> = if let Some(date) = parse_date(value) {
            (0..self.origin.len())
                .filter(|&o| cmp.eval(&self.origin[o], &date))
                .collect()
        } else if let Ok(year) = value.parse::<i32>() {
            (0..self.origin.len())
                .filter(|&o| cmp.eval(&self.origin[o].year(), &year))
                .collect()
        } else {
            return Err(EngineError::unsupported(format!(
                "origin filter expects a year or YYYY-MM-DD date, got '{value}'"
            )));
        };
        let (ni, nc, _, nd) = self.dims();
        Ok(self.subgrid(
            &(0..ni).collect::<Vec<_>>(),
            &(0..nc).collect::<Vec<_>>(),
            &keep,
            &(0..nd).collect::<Vec<_>>(),
        ))
    }

    /// Keep development points satisfying the comparison: ages in months on
    /// a development triangle, dates on a valuation triangle.
    pub(crate) fn development_filtered(&self, cmp: Comparator, value: &str) -> Result<Self> {
        let keep: Vec<usize> = match &self.dev {
            DevAxis::Age(ages) => {
                let months: u32 = value.parse().map_err(|_| {
                    EngineError::unsupported(format!(
                        "development filter expects an age in months, got '{value}'"
                    ))
                })?;
                (0..ages.len()).filter(|&d| cmp.eval(&ages[d], &months)).collect()
            },
            DevAxis::Valuation(dates) => {
                let date = parse_date(value).ok_or_else(|| {
                    EngineError::unsupported(format!(
                        "development filter expects a YYYY-MM-DD date on a valuation triangle, got '{value}'"
                    ))
                })?;
                (0..dates.len()).filter(|&d| cmp.eval(&dates[d], &date)).collect()
            },
        };
        let (ni, nc, no, _) = self.dims();
        Ok(self.subgrid(
            &(0..ni).collect::<Vec<_>>(),
            &(0..nc).collect::<Vec<_>>(),
            &(0..no).collect::<Vec<_>>(),
            &keep,
        ))
    }

    /// Mask cells whose valuation date fails the comparison. Axes keep
    /// their shape; only the grid thins out.
    pub(crate) fn valuation_masked(&self, cmp: Comparator, value: &str) -> Result<Self> {
        let date = parse_date(value).ok_or_else(|| {
            EngineError::unsupported(format!(
                "valuation filter expects a YYYY-MM-DD date, got '{value}'"
            ))
        })?;
        let mut out = self.clone();
        let (ni, nc, no, nd) = self.dims();
        for o in 0..no {
            for d in 0..nd {
                if cmp.eval(&self.cell_valuation(o, d), &date) {
                    continue;
                }
                for i in 0..ni {
                    for c in 0..nc {
                        let p = self.pos(i, c, o, d);
                        out.values[p] = None;
                    }
                }
            }
        }
        // the masked triangle may now end earlier than the original
        let latest = (0..no)
            .flat_map(|o| (0..nd).map(move |d| (o, d)))
            .filter(|&(o, d)| {
                (0..ni).any(|i| (0..nc).any(|c| out.at(i, c, o, d).is_some()))
            })
            .map(|(o, d)| out.cell_valuation(o, d))
            .max();
        if let Some(latest) = latest {
            out.valuation_date = latest;
        }
        Ok(out)
    }

    fn keep_rows(&self, rows: &[usize]) -> Self {
        let (_, nc, no, nd) = self.dims();
        self.subgrid(
            rows,
            &(0..nc).collect::<Vec<_>>(),
            &(0..no).collect::<Vec<_>>(),
            &(0..nd).collect::<Vec<_>>(),
        )
    }
}
