//! Bar chart rendering: scales, a pure layout pass and the SVG component.

mod bar;
pub mod scale;

pub use bar::{
    BarChart, BarChartLayout, BarRect, CategoryTick, ChartDatum, LabelStyle, ValueTick,
    BAR_FILL, DENSE_LABEL_THRESHOLD, MARGIN,
};
