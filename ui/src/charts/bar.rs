use dioxus::prelude::*;
use serde::{Deserialize, Serialize};

use super::scale::{BandScale, LinearScale};
use crate::core::format::{format_count, format_date, truncate_label};

/// One bar: a category label and its count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDatum {
    pub term: String,
    pub count: u64,
}

impl ChartDatum {
    pub fn new(term: impl Into<String>, count: u64) -> Self {
        Self {
            term: term.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

pub const MARGIN: Margin = Margin {
    top: 40.0,
    right: 20.0,
    bottom: 60.0,
    left: 60.0,
};

pub const BAR_FILL: &str = "#3498db";
pub const BAND_PADDING: f64 = 0.4;
/// Above this many bars the axis labels shrink and turn vertical.
pub const DENSE_LABEL_THRESHOLD: usize = 7;
pub const LABEL_MAX_CHARS: usize = 10;
const Y_TICK_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct BarRect {
    pub term: String,
    pub count: u64,
    /// Full term and formatted count, e.g. `NAUSEA: 1,204`.
    pub description: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTick {
    pub label: String,
    /// Band centre along the x axis.
    pub x: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueTick {
    pub label: String,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    pub font_size: &'static str,
    pub rotate_deg: i32,
    pub anchor: &'static str,
    pub dx: &'static str,
    pub dy: &'static str,
}

const DENSE_LABELS: LabelStyle = LabelStyle {
    font_size: "8px",
    rotate_deg: -90,
    anchor: "end",
    dx: "-.8em",
    dy: "-.8em",
};

const UPRIGHT_LABELS: LabelStyle = LabelStyle {
    font_size: "12px",
    rotate_deg: 0,
    anchor: "middle",
    dx: "0em",
    dy: "1em",
};

/// Everything needed to draw one bar chart, in SVG user units.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChartLayout {
    pub width: f64,
    pub height: f64,
    pub chart_width: f64,
    pub chart_height: f64,
    pub y_max: f64,
    pub dense: bool,
    pub bars: Vec<BarRect>,
    pub category_ticks: Vec<CategoryTick>,
    pub value_ticks: Vec<ValueTick>,
    pub label_style: LabelStyle,
    pub x_title_y: f64,
}

impl BarChartLayout {
    pub fn compute(data: &[ChartDatum], width: f64, height: f64, x_values_are_dates: bool) -> Self {
        let chart_width = (width - MARGIN.left - MARGIN.right).max(0.0);
        let chart_height = (height - MARGIN.top - MARGIN.bottom).max(0.0);

        let x = BandScale::new(
            data.iter().map(|d| d.term.as_str()),
            (0.0, chart_width),
            BAND_PADDING,
        );
        let y_max = data.iter().map(|d| d.count).max().unwrap_or(0) as f64;
        let y = LinearScale::new((0.0, y_max), (chart_height, 0.0));

        let bars = data
            .iter()
            .filter_map(|datum| {
                let left = x.position(&datum.term)?;
                let top = y.apply(datum.count as f64);
                Some(BarRect {
                    term: datum.term.clone(),
                    count: datum.count,
                    description: format!("{}: {}", datum.term, format_count(datum.count)),
                    x: left,
                    y: top,
                    width: x.bandwidth(),
                    height: chart_height - top,
                })
            })
            .collect();

        let category_ticks = x
            .domain()
            .iter()
            .filter_map(|term| {
                let left = x.position(term)?;
                let label = if x_values_are_dates {
                    format_date(term)
                } else {
                    truncate_label(term, LABEL_MAX_CHARS)
                };
                Some(CategoryTick {
                    label,
                    x: left + x.bandwidth() / 2.0,
                })
            })
            .collect();

        let value_ticks = y
            .ticks(Y_TICK_COUNT)
            .into_iter()
            .map(|value| ValueTick {
                label: tick_label(value),
                y: y.apply(value),
            })
            .collect();

        let dense = data.len() > DENSE_LABEL_THRESHOLD;

        Self {
            width,
            height,
            chart_width,
            chart_height,
            y_max,
            dense,
            bars,
            category_ticks,
            value_ticks,
            label_style: if dense { DENSE_LABELS } else { UPRIGHT_LABELS },
            x_title_y: if dense { height } else { height - 20.0 },
        }
    }

    pub fn tallest(&self) -> Option<&BarRect> {
        self.bars
            .iter()
            .max_by(|a, b| a.height.total_cmp(&b.height))
    }
}

fn tick_label(value: f64) -> String {
    if value.fract() == 0.0 && value >= 0.0 {
        format_count(value as u64)
    } else {
        format!("{value}")
    }
}

/// Vertical bar chart drawn as inline SVG.
#[component]
pub fn BarChart(
    data: Vec<ChartDatum>,
    width: f64,
    height: f64,
    title: String,
    x_axis_label: String,
    y_axis_label: String,
    #[props(default)] x_values_are_dates: bool,
) -> Element {
    let layout = BarChartLayout::compute(&data, width, height, x_values_are_dates);
    let style = layout.label_style;
    let label_transform = format!("rotate({})", style.rotate_deg);
    let chart_width = layout.chart_width;
    let chart_height = layout.chart_height;
    let plot_offset = format!("translate({}, {})", MARGIN.left, MARGIN.top);
    let center_x = width / 2.0;
    let title_y = MARGIN.top / 2.0;
    let y_title_x = -(height / 2.0);
    let y_title_y = MARGIN.left / 3.0;
    let x_title_y = layout.x_title_y;

    rsx! {
        svg {
            class: "bar-chart",
            width: "{width}",
            height: "{height}",
            view_box: "0 0 {width} {height}",
            "role": "img",
            "aria-label": "{title}",

            g { transform: "{plot_offset}",
                g {
                    class: "bar-chart__axis bar-chart__axis--x",
                    transform: "translate(0, {chart_height})",
                    line { x1: "0", x2: "{chart_width}", stroke: "currentColor" }
                    for tick in layout.category_ticks.iter() {
                        g { transform: "translate({tick.x}, 0)",
                            line { y2: "6", stroke: "currentColor" }
                            text {
                                y: "9",
                                fill: "currentColor",
                                font_size: style.font_size,
                                transform: "{label_transform}",
                                text_anchor: style.anchor,
                                dx: style.dx,
                                dy: style.dy,
                                "{tick.label}"
                            }
                        }
                    }
                }

                g { class: "bar-chart__axis bar-chart__axis--y",
                    line { y1: "0", y2: "{chart_height}", stroke: "currentColor" }
                    for tick in layout.value_ticks.iter() {
                        g { transform: "translate(0, {tick.y})",
                            line { x2: "-6", stroke: "currentColor" }
                            text {
                                x: "-9",
                                dy: "0.32em",
                                fill: "currentColor",
                                font_size: "10px",
                                text_anchor: "end",
                                "{tick.label}"
                            }
                        }
                    }
                }

                for bar in layout.bars.iter() {
                    rect {
                        class: "bar-chart__bar",
                        x: "{bar.x}",
                        y: "{bar.y}",
                        width: "{bar.width}",
                        height: "{bar.height}",
                        fill: BAR_FILL,
                        "role": "img",
                        "aria-label": "{bar.description}",
                    }
                }
            }

            text {
                class: "bar-chart__title",
                x: "{center_x}",
                y: "{title_y}",
                text_anchor: "middle",
                font_size: "16px",
                font_weight: "bold",
                "{title}"
            }
            text {
                class: "bar-chart__axis-title",
                x: "{y_title_x}",
                y: "{y_title_y}",
                text_anchor: "middle",
                font_size: "14px",
                transform: "rotate(-90)",
                "{y_axis_label}"
            }
            text {
                class: "bar-chart__axis-title",
                x: "{center_x}",
                y: "{x_title_y}",
                text_anchor: "middle",
                font_size: "14px",
                "{x_axis_label}"
            }
        }
    }
}
