//! Tab-separated results table.
//!
//! ```text
//! #colony_grid	0.1.0
//! #profile	Colony growth
//! #source	/data/plate1.jpg
//! #top left of the grid found as (x , y)	(12 , 9)
//! #bottom right of the grid found as (x , y)	(1410 , 941)
//! row	column	size	circularity
//! 1	1	812	0.874
//! ```
use crate::error::Result;
use crate::image::io::write_text_file;
use crate::matrix::TileMatrix;
use crate::measure::TileMeasurement;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

pub const TOOL_NAME: &str = env!("CARGO_PKG_NAME");
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsHeader {
    pub profile: String,
    pub source: String,
    /// Grid corners in cropped-plate coordinates.
    pub top_left: Option<(usize, usize)>,
    pub bottom_right: Option<(usize, usize)>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsRow {
    /// 1-based.
    pub row: usize,
    /// 1-based.
    pub column: usize,
    pub size: usize,
    pub circularity: f64,
    pub scores: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsTable {
    pub header: ResultsHeader,
    pub score_columns: Vec<String>,
    pub rows: Vec<ResultsRow>,
}

impl ResultsTable {
    pub fn from_measurements(
        header: ResultsHeader,
        score_columns: &[&str],
        measurements: &TileMatrix<TileMeasurement>,
    ) -> Self {
        let rows = measurements
            .iter()
            .map(|(r, c, m)| ResultsRow {
                row: r + 1,
                column: c + 1,
                size: m.colony_size,
                circularity: m.circularity,
                scores: m.scores.values.clone(),
            })
            .collect();
        Self {
            header,
            score_columns: score_columns.iter().map(|s| s.to_string()).collect(),
            rows,
        }
    }

    pub fn row(&self, row: usize, column: usize) -> Option<&ResultsRow> {
        self.rows.iter().find(|r| r.row == row && r.column == column)
    }

    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        let h = &self.header;
        let _ = writeln!(out, "#{TOOL_NAME}\t{TOOL_VERSION}");
        let _ = writeln!(out, "#profile\t{}", h.profile);
        let _ = writeln!(out, "#source\t{}", h.source);
        if let Some((x, y)) = h.top_left {
            let _ = writeln!(out, "#top left of the grid found as (x , y)\t({x} , {y})");
        }
        if let Some((x, y)) = h.bottom_right {
            let _ = writeln!(out, "#bottom right of the grid found as (x , y)\t({x} , {y})");
        }

        out.push_str("row\tcolumn\tsize\tcircularity");
        for name in &self.score_columns {
            out.push('\t');
            out.push_str(name);
        }
        out.push('\n');

        for r in &self.rows {
            let _ = write!(out, "{}\t{}\t{}\t{:.3}", r.row, r.column, r.size, r.circularity);
            for v in &r.scores {
                let _ = write!(out, "\t{v:.3}");
            }
            out.push('\n');
        }
        out
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        write_text_file(path, &self.to_tsv())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::ScoreRecord;
    use crate::types::Point;

    #[test]
    fn tsv_has_header_columns_and_one_based_rows() {
        let measurements = TileMatrix::from_fn(1, 2, |_, c| TileMeasurement {
            colony_size: 100 * c,
            circularity: if c == 0 { 0.0 } else { 0.87654 },
            colony: None,
            center: Point::default(),
            scores: ScoreRecord::new(vec![c as f64 * 1.5]),
        });
        let header = ResultsHeader {
            profile: "Opacity".into(),
            source: "plate.jpg".into(),
            top_left: Some((3, 4)),
            bottom_right: Some((300, 200)),
        };
        let table = ResultsTable::from_measurements(header, &["opacity"], &measurements);
        let tsv = table.to_tsv();
        let lines: Vec<&str> = tsv.lines().collect();
        assert!(lines[0].starts_with('#'));
        assert_eq!(lines[3], "#top left of the grid found as (x , y)\t(3 , 4)");
        assert_eq!(lines[5], "row\tcolumn\tsize\tcircularity\topacity");
        assert_eq!(lines[6], "1\t1\t0\t0.000\t0.000");
        assert_eq!(lines[7], "1\t2\t100\t0.877\t1.500");
        assert_eq!(table.row(1, 2).map(|r| r.size), Some(100));
    }
}
