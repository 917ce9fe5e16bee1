//! Self-contained triangle implementation.
//!
//! Triangles are dense 4-D grids `[index, column, origin, development]` with
//! `None` marking cells outside the data. The development axis is either
//! ages in months or valuation dates; transforms move between the two. The
//! payload format is the JSON serialization of [`TriangleData`], which
//! round-trips byte-identically.

mod datasets;
mod date;
mod filter;
mod transform;

use {
    chrono::{Datelike, NaiveDate},
    serde::{Deserialize, Serialize},
};

use crate::{
    Engine, Triangle,
    error::{EngineError, Result},
    types::{Aggregation, Comparator, Grain, TrendAxis},
};

pub(crate) use date::{add_months, month_end, month_start, months_between, ymd};

/// The bundled engine. Knows the sample datasets and the payload format.
#[derive(Debug, Default)]
pub struct MemEngine;

impl MemEngine {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Names accepted by [`Engine::load_dataset`].
    #[must_use]
    pub fn dataset_names() -> &'static [&'static str] {
        &["raa", "quarterly"]
    }
}

impl Engine for MemEngine {
    fn load_dataset(&self, name: &str) -> Result<Box<dyn Triangle>> {
        match name {
            "raa" => Ok(Box::new(datasets::raa())),
            "quarterly" => Ok(Box::new(datasets::quarterly())),
            other => Err(EngineError::dataset_not_found(other)),
        }
    }

    fn from_payload(&self, payload: &str) -> Result<Box<dyn Triangle>> {
        let data: TriangleData =
            serde_json::from_str(payload).map_err(|e| EngineError::payload(e.to_string()))?;
        data.check()?;
        Ok(Box::new(data))
    }
}

/// Development axis: ages in months, or valuation dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "points", rename_all = "camelCase")]
pub(crate) enum DevAxis {
    Age(Vec<u32>),
    Valuation(Vec<NaiveDate>),
}

impl DevAxis {
    fn len(&self) -> usize {
        match self {
            Self::Age(a) => a.len(),
            Self::Valuation(v) => v.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct TriangleData {
    pub(crate) key_labels: Vec<String>,
    pub(crate) index: Vec<Vec<String>>,
    pub(crate) columns: Vec<String>,
    /// Origin period start dates, ascending.
    pub(crate) origin: Vec<NaiveDate>,
    pub(crate) origin_grain: Grain,
    pub(crate) dev: DevAxis,
    pub(crate) development_grain: Grain,
    pub(crate) is_cumulative: bool,
    pub(crate) valuation_date: NaiveDate,
    /// Dense grid, length `index * columns * origin * dev`.
    pub(crate) values: Vec<Option<f64>>,
}

impl TriangleData {
    pub(crate) fn dims(&self) -> (usize, usize, usize, usize) {
        (
            self.index.len(),
            self.columns.len(),
            self.origin.len(),
            self.dev.len(),
        )
    }

    pub(crate) fn pos(&self, i: usize, c: usize, o: usize, d: usize) -> usize {
        let (_, nc, no, nd) = self.dims();
        ((i * nc + c) * no + o) * nd + d
    }

    pub(crate) fn at(&self, i: usize, c: usize, o: usize, d: usize) -> Option<f64> {
        self.values[self.pos(i, c, o, d)]
    }

    /// Valuation date of cell `(o, d)`.
    pub(crate) fn cell_valuation(&self, o: usize, d: usize) -> NaiveDate {
        match &self.dev {
            DevAxis::Age(ages) => month_end(add_months(self.origin[o], ages[d] as i32 - 1)),
            DevAxis::Valuation(dates) => dates[d],
        }
    }

    /// Reject a grid whose length disagrees with its axes; revived payloads
    /// pass through here.
    fn check(&self) -> Result<()> {
        let (ni, nc, no, nd) = self.dims();
        if self.values.len() != ni * nc * no * nd {
            return Err(EngineError::payload(format!(
                "value grid holds {} cells, axes imply {}",
                self.values.len(),
                ni * nc * no * nd
            )));
        }
        if self.index.iter().any(|row| row.len() != self.key_labels.len()) {
            return Err(EngineError::payload("index row width != key labels"));
        }
        Ok(())
    }

    fn origin_label(&self, o: usize) -> String {
        let d = self.origin[o];
        match self.origin_grain {
            Grain::Yearly => format!("{}", d.year()),
            Grain::Quarterly => format!("{}Q{}", d.year(), d.month0() / 3 + 1),
            Grain::Monthly => format!("{}-{:02}", d.year(), d.month()),
        }
    }
}

impl Triangle for TriangleData {
    fn to_payload(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| EngineError::payload(e.to_string()))
    }

    fn grain(&self, grain: &str, trailing: bool) -> Result<Box<dyn Triangle>> {
        self.regrain(grain, trailing).map(boxed)
    }

    fn val_to_dev(&self) -> Result<Box<dyn Triangle>> {
        self.to_dev_axis().map(boxed)
    }

    fn dev_to_val(&self) -> Result<Box<dyn Triangle>> {
        self.to_val_axis().map(boxed)
    }

    fn incr_to_cum(&self) -> Result<Box<dyn Triangle>> {
        Ok(boxed(self.accumulate()))
    }

    fn cum_to_incr(&self) -> Result<Box<dyn Triangle>> {
        Ok(boxed(self.decumulate()))
    }

    fn latest_diagonal(&self) -> Result<Box<dyn Triangle>> {
        Ok(boxed(self.diagonal()))
    }

    fn link_ratio(&self) -> Result<Box<dyn Triangle>> {
        self.age_to_age().map(boxed)
    }

    fn trend(
        &self,
        rate: f64,
        axis: TrendAxis,
        valuation_date: Option<NaiveDate>,
        ultimate_lag: Option<i32>,
    ) -> Result<Box<dyn Triangle>> {
        Ok(boxed(self.trended(rate, axis, valuation_date, ultimate_lag)))
    }

    fn group_by(&self, by: &[String], aggregation: Aggregation) -> Result<Box<dyn Triangle>> {
        self.grouped(by, aggregation).map(boxed)
    }

    fn drop_na(&self) -> Result<Box<dyn Triangle>> {
        Ok(boxed(self.without_empty_axes()))
    }

    fn select_index(&self, labels: &[String]) -> Result<Box<dyn Triangle>> {
        self.index_selection(labels).map(boxed)
    }

    fn filter_index(&self, key: &str, cmp: Comparator, value: &str) -> Result<Box<dyn Triangle>> {
        self.index_filtered(key, cmp, value).map(boxed)
    }

    fn select_columns(&self, names: &[String]) -> Result<Box<dyn Triangle>> {
        self.column_selection(names).map(boxed)
    }

    fn filter_origin(&self, cmp: Comparator, value: &str) -> Result<Box<dyn Triangle>> {
        self.origin_filtered(cmp, value).map(boxed)
    }

    fn filter_development(&self, cmp: Comparator, value: &str) -> Result<Box<dyn Triangle>> {
        self.development_filtered(cmp, value).map(boxed)
    }

    fn filter_valuation(&self, cmp: Comparator, value: &str) -> Result<Box<dyn Triangle>> {
        self.valuation_masked(cmp, value).map(boxed)
    }

    fn shape(&self) -> [usize; 4] {
        let (i, c, o, d) = self.dims();
        [i, c, o, d]
    }

    fn origin_grain(&self) -> Grain {
        self.origin_grain
    }

    fn development_grain(&self) -> Grain {
        self.development_grain
    }

    fn origin(&self) -> Vec<String> {
        (0..self.origin.len()).map(|o| self.origin_label(o)).collect()
    }

    fn development(&self) -> Vec<String> {
        match &self.dev {
            DevAxis::Age(ages) => ages.iter().map(u32::to_string).collect(),
            DevAxis::Valuation(dates) => {
                dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect()
            },
        }
    }

    fn columns(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn key_labels(&self) -> Vec<String> {
        self.key_labels.clone()
    }

    fn index(&self) -> Vec<Vec<String>> {
        self.index.clone()
    }

    fn valuation_date(&self) -> NaiveDate {
        self.valuation_date
    }

    fn is_cumulative(&self) -> bool {
        self.is_cumulative
    }

    fn is_val_tri(&self) -> bool {
        matches!(self.dev, DevAxis::Valuation(_))
    }

    fn is_full(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    fn is_ultimate(&self) -> bool {
        self.valuation_date.year() >= 9999
    }

    fn values(&self) -> Vec<Vec<Vec<Vec<Option<f64>>>>> {
        let (ni, nc, no, nd) = self.dims();
        (0..ni)
            .map(|i| {
                (0..nc)
                    .map(|c| {
                        (0..no)
                            .map(|o| (0..nd).map(|d| self.at(i, c, o, d)).collect())
                            .collect()
                    })
                    .collect()
            })
            .collect()
    }
}

fn boxed(data: TriangleData) -> Box<dyn Triangle> {
    Box::new(data)
}
