//! Projects the history onto chart coordinates (x: sequence position, y: risk ordinal).

use lens_types::{AuditRecord, RiskLevel};
use std::fmt::Write;

/// Plotting extents. The chart area is inset by `padding` on every side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 200.0,
            padding: 40.0,
        }
    }
}

impl Canvas {
    pub fn chart_width(&self) -> f64 {
        (self.width - self.padding * 2.0).max(0.0)
    }

    pub fn chart_height(&self) -> f64 {
        (self.height - self.padding * 2.0).max(0.0)
    }

    /// y of the bottom edge of the chart area.
    pub fn baseline(&self) -> f64 {
        self.height - self.padding
    }

    /// High plots at the top of the chart area, Low at the bottom.
    pub fn y_for(&self, level: RiskLevel) -> f64 {
        let t = f64::from(level.ordinal() - 1) / 2.0;
        self.baseline() - t * self.chart_height()
    }

    /// Horizontal reference lines, one per risk level, bottom to top.
    pub fn gridlines(&self) -> [GridLine; 3] {
        [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High].map(|level| GridLine {
            level,
            y: self.y_for(level),
            label: match level {
                RiskLevel::Low => "LOW",
                RiskLevel::Medium => "MED",
                RiskLevel::High => "HIGH",
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub level: RiskLevel,
    pub y: f64,
    pub label: &'static str,
}

/// One plotted audit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint<'a> {
    pub x: f64,
    pub y: f64,
    pub record: &'a AuditRecord,
}

impl TrendPoint<'_> {
    /// Tooltip text.
    pub fn label(&self) -> String {
        format!("{}: {}", self.record.project_name, self.record.risk_level)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrendSeries<'a> {
    /// No audits yet.
    Empty,
    /// One audit: a lone centered point, no line.
    Single(TrendPoint<'a>),
    /// Two or more audits: polyline plus the area down to `baseline`.
    Line {
        points: Vec<TrendPoint<'a>>,
        baseline: f64,
    },
}

impl<'a> TrendSeries<'a> {
    pub fn points(&self) -> &[TrendPoint<'a>] {
        match self {
            TrendSeries::Empty => &[],
            TrendSeries::Single(p) => std::slice::from_ref(p),
            TrendSeries::Line { points, .. } => points,
        }
    }

    pub fn len(&self) -> usize {
        self.points().len()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TrendSeries::Empty)
    }

    /// SVG path data for the polyline (`M x y L x y ...`).
    pub fn line_path(&self) -> Option<String> {
        let TrendSeries::Line { points, .. } = self else {
            return None;
        };
        let mut d = String::new();
        for (i, p) in points.iter().enumerate() {
            if i > 0 {
                d.push(' ');
            }
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{} {} {}", cmd, p.x, p.y);
        }
        Some(d)
    }

    /// Line path closed along the baseline under the last and first points.
    pub fn area_path(&self) -> Option<String> {
        let mut d = self.line_path()?;
        let TrendSeries::Line { points, baseline } = self else {
            return None;
        };
        let (first, last) = (points.first()?, points.last()?);
        let _ = write!(
            d,
            " L {} {} L {} {} Z",
            last.x, baseline, first.x, baseline
        );
        Some(d)
    }
}

/// Map `records` (oldest first) onto `canvas`. Points are spread evenly across the
/// chart width by position; a single record is centered.
pub fn project<'a>(records: &'a [AuditRecord], canvas: &Canvas) -> TrendSeries<'a> {
    match records {
        [] => TrendSeries::Empty,
        [only] => TrendSeries::Single(TrendPoint {
            x: canvas.width / 2.0,
            y: canvas.y_for(only.risk_level),
            record: only,
        }),
        _ => {
            let last = (records.len() - 1) as f64;
            let points = records
                .iter()
                .enumerate()
                .map(|(i, record)| TrendPoint {
                    x: canvas.padding + (i as f64 / last) * canvas.chart_width(),
                    y: canvas.y_for(record.risk_level),
                    record,
                })
                .collect();
            TrendSeries::Line {
                points,
                baseline: canvas.baseline(),
            }
        }
    }
}
