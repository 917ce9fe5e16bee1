//! Bundled sample datasets.

use super::{DevAxis, TriangleData, ymd};
use crate::types::Grain;

/// The RAA reinsurance triangle: ten accident years 1981–1990, yearly
/// development, cumulative paid losses as of 1990-12-31.
pub(crate) fn raa() -> TriangleData {
    const ROWS: [&[f64]; 10] = [
        &[
            5012.0, 8269.0, 10907.0, 11805.0, 13539.0, 16181.0, 18009.0, 18608.0, 18662.0, 18834.0,
        ],
        &[106.0, 4285.0, 5396.0, 10666.0, 13782.0, 15599.0, 15496.0, 16169.0, 16704.0],
        &[3410.0, 8992.0, 13873.0, 16141.0, 18735.0, 22214.0, 22863.0, 23466.0],
        &[5655.0, 11555.0, 15766.0, 21266.0, 23425.0, 26083.0, 27067.0],
        &[1092.0, 9565.0, 15836.0, 22169.0, 25955.0, 26180.0],
        &[1513.0, 6445.0, 11702.0, 12935.0, 15852.0],
        &[557.0, 4020.0, 10946.0, 12314.0],
        &[1351.0, 6947.0, 13112.0],
        &[3133.0, 5395.0],
        &[2063.0],
    ];
    let mut values = Vec::with_capacity(100);
    for row in ROWS {
        values.extend(row.iter().map(|&v| Some(v)));
        values.extend(std::iter::repeat_n(None, 10 - row.len()));
    }
    TriangleData {
        key_labels: vec!["line".into()],
        index: vec![vec!["RAA".into()]],
        columns: vec!["values".into()],
        origin: (1981..=1990).map(|y| ymd(y, 1, 1)).collect(),
        origin_grain: Grain::Yearly,
        dev: DevAxis::Age((1..=10).map(|d| d * 12).collect()),
        development_grain: Grain::Yearly,
        is_cumulative: true,
        valuation_date: ymd(1990, 12, 31),
        values,
    }
}

/// A small synthetic quarterly triangle with two lines of business,
/// incremental paid amounts as of 1990-12-31. Exercises grain changes and
/// group-by without the bulk of a real dataset.
pub(crate) fn quarterly() -> TriangleData {
    const AUTO: [[Option<f64>; 4]; 4] = [
        [Some(100.0), Some(50.0), Some(25.0), Some(10.0)],
        [Some(110.0), Some(55.0), Some(28.0), None],
        [Some(120.0), Some(60.0), None, None],
        [Some(130.0), None, None, None],
    ];
    const HOME: [[Option<f64>; 4]; 4] = [
        [Some(200.0), Some(80.0), Some(40.0), Some(20.0)],
        [Some(210.0), Some(90.0), Some(45.0), None],
        [Some(220.0), Some(95.0), None, None],
        [Some(230.0), None, None, None],
    ];
    let values = AUTO
        .iter()
        .chain(HOME.iter())
        .flat_map(|row| row.iter().copied())
        .collect();
    TriangleData {
        key_labels: vec!["lob".into()],
        index: vec![vec!["auto".into()], vec!["home".into()]],
        columns: vec!["paid".into()],
        origin: [1, 4, 7, 10].iter().map(|&m| ymd(1990, m, 1)).collect(),
        origin_grain: Grain::Quarterly,
        dev: DevAxis::Age(vec![3, 6, 9, 12]),
        development_grain: Grain::Quarterly,
        is_cumulative: false,
        valuation_date: ymd(1990, 12, 31),
        values,
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grids_match_their_axes() {
        for data in [raa(), quarterly()] {
            let (i, c, o, d) = data.dims();
            assert_eq!(data.values.len(), i * c * o * d);
        }
    }

    #[test]
    fn raa_is_an_upper_left_triangle() {
        let data = raa();
        for o in 0..10 {
            for d in 0..10 {
                let cell = data.at(0, 0, o, d);
                assert_eq!(cell.is_some(), o + d < 10, "origin {o} age {d}");
            }
        }
    }
}
