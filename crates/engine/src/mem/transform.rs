//! Structural transforms over [`TriangleData`].
//!
//! Every transform builds a fresh value, leaving the receiver untouched.
//! Cumulative/incremental conversions are exact inverses for the prefix-
//! populated rows a development triangle holds, so converting back and
//! forth reproduces the original grid.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use super::{DevAxis, TriangleData, add_months, month_start, months_between};
use crate::{
    error::{EngineError, Result},
    types::{Aggregation, Grain, TrendAxis},
};

impl TriangleData {
    pub(crate) fn accumulate(&self) -> Self {
        if self.is_cumulative {
            return self.clone();
        }
        let mut out = self.clone();
        let (ni, nc, no, nd) = self.dims();
        for i in 0..ni {
            for c in 0..nc {
                for o in 0..no {
                    let mut running = 0.0;
                    for d in 0..nd {
                        let p = self.pos(i, c, o, d);
                        out.values[p] = self.values[p].map(|v| {
                            running += v;
                            running
                        });
                    }
                }
            }
        }
        out.is_cumulative = true;
        out
    }

    pub(crate) fn decumulate(&self) -> Self {
        if !self.is_cumulative {
            return self.clone();
        }
        let mut out = self.clone();
        let (ni, nc, no, nd) = self.dims();
        for i in 0..ni {
            for c in 0..nc {
                for o in 0..no {
                    let mut prev = 0.0;
                    for d in 0..nd {
                        let p = self.pos(i, c, o, d);
                        out.values[p] = self.values[p].map(|v| {
                            let incr = v - prev;
                            prev = v;
                            incr
                        });
                    }
                }
            }
        }
        out.is_cumulative = false;
        out
    }

    /// Each origin period's most recent populated cell, as a one-column
    /// valuation triangle.
    pub(crate) fn diagonal(&self) -> Self {
        let (ni, nc, no, nd) = self.dims();
        let mut values = vec![None; ni * nc * no];
        for i in 0..ni {
            for c in 0..nc {
                for o in 0..no {
                    let latest = (0..nd).rev().find_map(|d| self.at(i, c, o, d));
                    values[(i * nc + c) * no + o] = latest;
                }
            }
        }
        Self {
            dev: DevAxis::Valuation(vec![self.valuation_date]),
            values,
            ..self.clone()
        }
    }

    /// Age-to-age factors between adjacent development ages.
    pub(crate) fn age_to_age(&self) -> Result<Self> {
        let DevAxis::Age(ages) = &self.dev else {
            return Err(EngineError::unsupported(
                "link ratios require a development triangle",
            ));
        };
        if !self.is_cumulative {
            return Err(EngineError::unsupported(
                "link ratios require a cumulative triangle",
            ));
        }
        if ages.len() < 2 {
            return Err(EngineError::unsupported(
                "link ratios need at least two development ages",
            ));
        }
        let (ni, nc, no, nd) = self.dims();
        let mut values = Vec::with_capacity(ni * nc * no * (nd - 1));
        for i in 0..ni {
            for c in 0..nc {
                for o in 0..no {
                    for d in 0..nd - 1 {
                        let ratio = match (self.at(i, c, o, d), self.at(i, c, o, d + 1)) {
                            (Some(from), Some(to)) if from != 0.0 => Some(to / from),
                            _ => None,
                        };
                        values.push(ratio);
                    }
                }
            }
        }
        Ok(Self {
            dev: DevAxis::Age(ages[..nd - 1].to_vec()),
            is_cumulative: false,
            values,
            ..self.clone()
        })
    }

    /// Coarsen origin and development grains per a spec like `"OQDY"`.
    pub(crate) fn regrain(&self, spec: &str, trailing: bool) -> Result<Self> {
        let (og, dg) = Grain::parse_spec(spec)?;
        let DevAxis::Age(_) = &self.dev else {
            return Err(EngineError::unsupported(
                "change grain on a development triangle; apply valToDev first",
            ));
        };
        for (label, from, to) in [
            ("origin", self.origin_grain, og),
            ("development", self.development_grain, dg),
        ] {
            if to.months() < from.months() || to.months() % from.months() != 0 {
                return Err(EngineError::unsupported(format!(
                    "cannot refine {label} grain {from} to {to}"
                )));
            }
        }
        if og == self.origin_grain && dg == self.development_grain {
            return Ok(self.clone());
        }

        // Regraining sums incremental cells into their new buckets, keyed by
        // each cell's valuation date relative to the new origin bucket.
        let incr = self.decumulate();
        let om = og.months() as i32;
        let dm = dg.months() as i32;
        let anchor = if trailing {
            (self.valuation_date.month0() as i32 + 1).rem_euclid(om)
        } else {
            0
        };

        let bucket_start = |d: NaiveDate| -> NaiveDate {
            let m = d.year() * 12 + d.month0() as i32;
            month_start(anchor + (m - anchor).div_euclid(om) * om)
        };

        let (ni, nc, no, nd) = incr.dims();
        let mut sums: BTreeMap<(NaiveDate, i32), Vec<Option<f64>>> = BTreeMap::new();
        for o in 0..no {
            for d in 0..nd {
                let start = bucket_start(incr.origin[o]);
                let lag = months_between(start, add_months(incr.cell_valuation(o, d), 1));
                let age = lag.div_euclid(dm) * dm + if lag.rem_euclid(dm) == 0 { 0 } else { dm };
                let slot = sums.entry((start, age)).or_insert_with(|| vec![None; ni * nc]);
                for i in 0..ni {
                    for c in 0..nc {
                        if let Some(v) = incr.at(i, c, o, d) {
                            let cell = &mut slot[i * nc + c];
                            *cell = Some(cell.unwrap_or(0.0) + v);
                        }
                    }
                }
            }
        }

        let mut origins: Vec<NaiveDate> = sums.keys().map(|(s, _)| *s).collect();
        origins.dedup();
        let mut ages: Vec<u32> = sums.keys().map(|(_, a)| *a as u32).collect();
        ages.sort_unstable();
        ages.dedup();

        let mut values = vec![None; ni * nc * origins.len() * ages.len()];
        for ((start, age), slot) in &sums {
            let o = origins.iter().position(|s| s == start).unwrap_or(0);
            let d = ages.iter().position(|a| *a as i32 == *age).unwrap_or(0);
            for i in 0..ni {
                for c in 0..nc {
                    let p = ((i * nc + c) * origins.len() + o) * ages.len() + d;
                    values[p] = slot[i * nc + c];
                }
            }
        }

        let out = Self {
            origin: origins,
            origin_grain: og,
            dev: DevAxis::Age(ages),
            development_grain: dg,
            is_cumulative: false,
            values,
            ..self.clone()
        };
        Ok(if self.is_cumulative { out.accumulate() } else { out })
    }

    /// True when any index row or column holds data at `(o, d)`.
    fn populated(&self, o: usize, d: usize) -> bool {
        let (ni, nc, _, _) = self.dims();
        (0..ni).any(|i| (0..nc).any(|c| self.at(i, c, o, d).is_some()))
    }

    /// Re-index development ages onto valuation dates. The new axis holds
    /// only the diagonals that carry data.
    pub(crate) fn to_val_axis(&self) -> Result<Self> {
        let DevAxis::Age(_) = &self.dev else {
            return Ok(self.clone());
        };
        let (ni, nc, no, nd) = self.dims();
        let mut dates: Vec<NaiveDate> = (0..no)
            .flat_map(|o| (0..nd).map(move |d| (o, d)))
            .filter(|&(o, d)| self.populated(o, d))
            .map(|(o, d)| self.cell_valuation(o, d))
            .collect();
        dates.sort_unstable();
        dates.dedup();

        let nv = dates.len();
        let mut values = vec![None; ni * nc * no * nv];
        for o in 0..no {
            for d in 0..nd {
                let Some(v) = dates.iter().position(|x| *x == self.cell_valuation(o, d)) else {
                    continue;
                };
                for i in 0..ni {
                    for c in 0..nc {
                        values[((i * nc + c) * no + o) * nv + v] = self.at(i, c, o, d);
                    }
                }
            }
        }
        Ok(Self {
            dev: DevAxis::Valuation(dates),
            values,
            ..self.clone()
        })
    }

    /// Re-index valuation dates onto development ages.
    pub(crate) fn to_dev_axis(&self) -> Result<Self> {
        let DevAxis::Valuation(dates) = &self.dev else {
            return Ok(self.clone());
        };
        let (ni, nc, no, _) = self.dims();
        let age_of = |o: usize, v: NaiveDate| months_between(self.origin[o], add_months(v, 1));
        let mut ages: Vec<u32> = Vec::new();
        for o in 0..no {
            for (vi, &v) in dates.iter().enumerate() {
                let age = age_of(o, v);
                if age > 0 && self.populated(o, vi) {
                    ages.push(age as u32);
                }
            }
        }
        ages.sort_unstable();
        ages.dedup();

        let nd = ages.len();
        let mut values = vec![None; ni * nc * no * nd];
        for o in 0..no {
            for (vi, &v) in dates.iter().enumerate() {
                let age = age_of(o, v);
                let Some(d) = ages.iter().position(|a| *a as i32 == age) else {
                    continue;
                };
                for i in 0..ni {
                    for c in 0..nc {
                        let p = ((i * nc + c) * no + o) * nd + d;
                        values[p] = self.at(i, c, o, vi);
                    }
                }
            }
        }
        Ok(Self {
            dev: DevAxis::Age(ages),
            values,
            ..self.clone()
        })
    }

    /// Multiply cells by `(1 + rate)` per year of distance from the
    /// reference point on the chosen axis.
    pub(crate) fn trended(
        &self,
        rate: f64,
        axis: TrendAxis,
        valuation_date: Option<NaiveDate>,
        ultimate_lag: Option<i32>,
    ) -> Self {
        let reference = match axis {
            TrendAxis::Origin => self.origin.last().copied().unwrap_or(self.valuation_date),
            TrendAxis::Valuation => valuation_date.unwrap_or(self.valuation_date),
        };
        let mut out = self.clone();
        let (ni, nc, no, nd) = self.dims();
        for o in 0..no {
            for d in 0..nd {
                let coord = match axis {
                    TrendAxis::Origin => self.origin[o],
                    TrendAxis::Valuation => {
                        let v = self.cell_valuation(o, d);
                        // Ultimate cells sit at a sentinel date; the lag pins
                        // them to a real valuation instead.
                        match ultimate_lag {
                            Some(lag) if v.year() >= 9999 => add_months(self.origin[o], lag),
                            _ => v,
                        }
                    },
                };
                let years = (reference - coord).num_days() as f64 / 365.25;
                let factor = (1.0 + rate).powf(years);
                for i in 0..ni {
                    for c in 0..nc {
                        let p = self.pos(i, c, o, d);
                        out.values[p] = self.values[p].map(|v| v * factor);
                    }
                }
            }
        }
        out
    }

    /// Reduce index rows sharing the named key columns.
    pub(crate) fn grouped(&self, by: &[String], aggregation: Aggregation) -> Result<Self> {
        if by.is_empty() {
            return Err(EngineError::unsupported("groupBy needs at least one key"));
        }
        let mut positions = Vec::with_capacity(by.len());
        for key in by {
            let pos = self
                .key_labels
                .iter()
                .position(|k| k == key)
                .ok_or_else(|| EngineError::unsupported(format!("unknown index column '{key}'")))?;
            positions.push(pos);
        }

        let mut groups: BTreeMap<Vec<String>, Vec<usize>> = BTreeMap::new();
        for (row, keys) in self.index.iter().enumerate() {
            let tuple: Vec<String> = positions.iter().map(|&p| keys[p].clone()).collect();
            groups.entry(tuple).or_default().push(row);
        }

        let (_, nc, no, nd) = self.dims();
        let index: Vec<Vec<String>> = groups.keys().cloned().collect();
        let mut values = Vec::with_capacity(index.len() * nc * no * nd);
        for members in groups.values() {
            for c in 0..nc {
                for o in 0..no {
                    for d in 0..nd {
                        let cells: Vec<f64> = members
                            .iter()
                            .filter_map(|&i| self.at(i, c, o, d))
                            .collect();
                        values.push(reduce(&cells, aggregation));
                    }
                }
            }
        }
        Ok(Self {
            key_labels: by.to_vec(),
            index,
            values,
            ..self.clone()
        })
    }

    /// Drop origin rows and development columns holding no data at all.
    pub(crate) fn without_empty_axes(&self) -> Self {
        let (ni, nc, no, nd) = self.dims();
        let any = |o: usize, d: usize| {
            (0..ni).any(|i| (0..nc).any(|c| self.at(i, c, o, d).is_some()))
        };
        let keep_o: Vec<usize> = (0..no).filter(|&o| (0..nd).any(|d| any(o, d))).collect();
        let keep_d: Vec<usize> = (0..nd).filter(|&d| (0..no).any(|o| any(o, d))).collect();
        self.subgrid(&(0..ni).collect::<Vec<_>>(), &(0..nc).collect::<Vec<_>>(), &keep_o, &keep_d)
    }

    /// Rebuild the triangle keeping only the listed axis positions.
    pub(crate) fn subgrid(
        &self,
        rows: &[usize],
        cols: &[usize],
        origins: &[usize],
        devs: &[usize],
    ) -> Self {
        let mut values = Vec::with_capacity(rows.len() * cols.len() * origins.len() * devs.len());
        for &i in rows {
            for &c in cols {
                for &o in origins {
                    for &d in devs {
                        values.push(self.at(i, c, o, d));
                    }
                }
            }
        }
        Self {
            index: rows.iter().map(|&i| self.index[i].clone()).collect(),
            columns: cols.iter().map(|&c| self.columns[c].clone()).collect(),
            origin: origins.iter().map(|&o| self.origin[o]).collect(),
            dev: match &self.dev {
                DevAxis::Age(ages) => DevAxis::Age(devs.iter().map(|&d| ages[d]).collect()),
                DevAxis::Valuation(dates) => {
                    DevAxis::Valuation(devs.iter().map(|&d| dates[d]).collect())
                },
            },
            values,
            ..self.clone()
        }
    }
}

fn reduce(cells: &[f64], aggregation: Aggregation) -> Option<f64> {
    if cells.is_empty() {
        return None;
    }
    let n = cells.len() as f64;
    let sum: f64 = cells.iter().sum();
    match aggregation {
        Aggregation::Sum => Some(sum),
        Aggregation::Mean => Some(sum / n),
        Aggregation::Min => cells.iter().copied().reduce(f64::min),
        Aggregation::Max => cells.iter().copied().reduce(f64::max),
        Aggregation::Prod => Some(cells.iter().product()),
        Aggregation::Median => {
            let mut sorted = cells.to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let mid = sorted.len() / 2;
            if sorted.len() % 2 == 1 {
                Some(sorted[mid])
            } else {
                Some((sorted[mid - 1] + sorted[mid]) / 2.0)
            }
        },
        Aggregation::Var | Aggregation::Std => {
            // Sample variance; undefined for a single observation.
            if cells.len() < 2 {
                return None;
            }
            let mean = sum / n;
            let var = cells.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            Some(if aggregation == Aggregation::Var {
                var
            } else {
                var.sqrt()
            })
        },
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::super::MemEngine;
    use crate::{
        Engine, Triangle,
        types::{Aggregation, TrendAxis},
    };

    #[test]
    fn cum_incr_round_trip_is_identity() {
        let raa = MemEngine::new().load_dataset("raa").unwrap();
        let back = raa.cum_to_incr().unwrap().incr_to_cum().unwrap();
        assert_eq!(back.to_payload().unwrap(), raa.to_payload().unwrap());
    }

    #[test]
    fn incr_to_cum_is_noop_on_cumulative() {
        let raa = MemEngine::new().load_dataset("raa").unwrap();
        let same = raa.incr_to_cum().unwrap();
        assert_eq!(same.to_payload().unwrap(), raa.to_payload().unwrap());
    }

    #[test]
    fn decumulate_first_column_unchanged() {
        let raa = MemEngine::new().load_dataset("raa").unwrap();
        let incr = raa.cum_to_incr().unwrap();
        let grid = incr.values();
        assert_eq!(grid[0][0][0][0], Some(5012.0));
        assert_eq!(grid[0][0][0][1], Some(8269.0 - 5012.0));
    }

    #[test]
    fn latest_diagonal_keeps_one_point_per_origin() {
        let raa = MemEngine::new().load_dataset("raa").unwrap();
        let diag = raa.latest_diagonal().unwrap();
        assert_eq!(diag.shape(), [1, 1, 10, 1]);
        assert!(diag.is_val_tri());
        let grid = diag.values();
        assert_eq!(grid[0][0][0][0], Some(18834.0));
        assert_eq!(grid[0][0][9][0], Some(2063.0));
    }

    #[test]
    fn link_ratio_shrinks_development_axis() {
        let raa = MemEngine::new().load_dataset("raa").unwrap();
        let lr = raa.link_ratio().unwrap();
        assert_eq!(lr.shape(), [1, 1, 10, 9]);
        let grid = lr.values();
        let first = grid[0][0][0][0].unwrap();
        assert!((first - 8269.0 / 5012.0).abs() < 1e-12);
        // the newest origin has no second age, so no ratio
        assert_eq!(grid[0][0][9][0], None);
    }

    #[test]
    fn link_ratio_rejects_incremental() {
        let raa = MemEngine::new().load_dataset("raa").unwrap();
        let incr = raa.cum_to_incr().unwrap();
        assert!(incr.link_ratio().is_err());
    }

    #[test]
    fn grain_quarterly_to_yearly_sums_buckets() {
        let q = MemEngine::new().load_dataset("quarterly").unwrap();
        let y = q.grain("OYDY", false).unwrap();
        assert_eq!(y.shape(), [2, 1, 1, 1]);
        assert_eq!(y.origin(), vec!["1990".to_string()]);
        let grid = y.values();
        // auto: all populated incremental cells summed into the single bucket
        let total: f64 = [100.0, 50.0, 25.0, 10.0, 110.0, 55.0, 28.0, 120.0, 60.0, 130.0]
            .iter()
            .sum();
        assert_eq!(grid[0][0][0][0], Some(total));
    }

    #[test]
    fn grain_refinement_is_rejected() {
        let raa = MemEngine::new().load_dataset("raa").unwrap();
        assert!(raa.grain("OQDQ", false).is_err());
        assert!(raa.grain("M", false).is_err());
    }

    #[test]
    fn grain_same_is_identity() {
        let raa = MemEngine::new().load_dataset("raa").unwrap();
        let same = raa.grain("OYDY", false).unwrap();
        assert_eq!(same.to_payload().unwrap(), raa.to_payload().unwrap());
    }

    #[test]
    fn val_dev_round_trip() {
        let raa = MemEngine::new().load_dataset("raa").unwrap();
        let val = raa.dev_to_val().unwrap();
        assert!(val.is_val_tri());
        assert_eq!(val.shape()[3], 10);
        let back = val.val_to_dev().unwrap();
        assert_eq!(back.to_payload().unwrap(), raa.to_payload().unwrap());
    }

    #[test]
    fn trend_scales_older_origins_harder() {
        let raa = MemEngine::new().load_dataset("raa").unwrap();
        let trended = raa.trend(0.05, TrendAxis::Origin, None, None).unwrap();
        let grid = trended.values();
        let oldest = grid[0][0][0][0].unwrap();
        // 3287 days of 5% annual trend on the 1981 row
        assert!((oldest - 5012.0 * 1.05f64.powf(3287.0 / 365.25)).abs() < 1e-6);
        let newest = grid[0][0][9][0].unwrap();
        assert!((newest - 2063.0).abs() < 1e-9);
    }

    #[test]
    fn group_by_sums_index_rows() {
        let q = MemEngine::new().load_dataset("quarterly").unwrap();
        let g = q.group_by(&["lob".to_string()], Aggregation::Sum).unwrap();
        // two distinct lobs: grouping is the identity on shape here
        assert_eq!(g.shape(), [2, 1, 4, 4]);
        let grid = g.values();
        assert_eq!(grid[0][0][0][0], Some(100.0));
    }

    #[test]
    fn group_by_unknown_key_fails() {
        let q = MemEngine::new().load_dataset("quarterly").unwrap();
        assert!(q.group_by(&["state".to_string()], Aggregation::Sum).is_err());
    }

    #[test]
    fn drop_na_removes_empty_axes() {
        let raa = MemEngine::new().load_dataset("raa").unwrap();
        // keep only the newest origin; nine dev columns become empty
        let latest = raa.filter_origin(crate::Comparator::Ge, "1990").unwrap();
        assert_eq!(latest.shape(), [1, 1, 1, 10]);
        let compact = latest.drop_na().unwrap();
        assert_eq!(compact.shape(), [1, 1, 1, 1]);
    }
}
