//! ECharts option builders for a ranked token list.
//!
//! Every builder takes the top-k slice as produced by the ranker and keeps its
//! order, so categories and series line up with the ranking.

use crate::table::TokenCount;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Bar,
    WordCloud,
    Line,
    Scatter,
    ImageList,
    Funnel,
    Pie,
    Area,
}

#[derive(Debug, Error)]
#[error("unknown chart kind `{0}`, expected one of: bar, word-cloud, line, scatter, image-list, funnel, pie, area")]
pub struct ParseChartKindError(String);

impl ChartKind {
    /// Menu order.
    pub const ALL: [ChartKind; 8] = [
        ChartKind::Bar,
        ChartKind::WordCloud,
        ChartKind::Line,
        ChartKind::Scatter,
        ChartKind::ImageList,
        ChartKind::Funnel,
        ChartKind::Pie,
        ChartKind::Area,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::WordCloud => "word-cloud",
            ChartKind::Line => "line",
            ChartKind::Scatter => "scatter",
            ChartKind::ImageList => "image-list",
            ChartKind::Funnel => "funnel",
            ChartKind::Pie => "pie",
            ChartKind::Area => "area",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar chart",
            ChartKind::WordCloud => "Word cloud",
            ChartKind::Line => "Line chart",
            ChartKind::Scatter => "Scatter plot",
            ChartKind::ImageList => "Images",
            ChartKind::Funnel => "Funnel chart",
            ChartKind::Pie => "Pie chart",
            ChartKind::Area => "Area chart",
        }
    }

    /// Suggested canvas height in pixels.
    pub fn height_px(self) -> u32 {
        match self {
            ChartKind::Line => 400,
            ChartKind::Pie => 600,
            _ => 500,
        }
    }

    pub fn is_chart(self) -> bool {
        self != ChartKind::ImageList
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = ParseChartKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        ChartKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted || (wanted == "wordcloud" && *k == ChartKind::WordCloud))
            .ok_or_else(|| ParseChartKindError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameValue<T> {
    pub name: String,
    pub value: T,
}

/// Options for `kind`, or `None` for [`ChartKind::ImageList`], which has no chart.
pub fn chart_options(kind: ChartKind, top: &[TokenCount]) -> Option<Value> {
    let options = match kind {
        ChartKind::Bar => bar_options(top),
        ChartKind::WordCloud => word_cloud_options(top),
        ChartKind::Line => line_options(top),
        ChartKind::Scatter => scatter_options(top),
        ChartKind::Funnel => funnel_options(top),
        ChartKind::Pie => pie_options(top),
        ChartKind::Area => area_options(top),
        ChartKind::ImageList => return None,
    };
    Some(options)
}

fn tokens(top: &[TokenCount]) -> Vec<&str> {
    top.iter().map(|t| t.token.as_str()).collect()
}

fn counts(top: &[TokenCount]) -> Vec<u64> {
    top.iter().map(|t| t.count).collect()
}

pub fn name_values(top: &[TokenCount]) -> Vec<NameValue<u64>> {
    top.iter()
        .map(|t| NameValue { name: t.token.clone(), value: t.count })
        .collect()
}

/// Share of each entry in the sum of the *displayed* counts, as a percentage
/// rounded to two decimals.
pub fn funnel_percentages(top: &[TokenCount]) -> Vec<NameValue<f64>> {
    let total: u64 = top.iter().map(|t| t.count).sum();
    if total == 0 {
        return Vec::new();
    }
    top.iter()
        .map(|t| NameValue {
            name: t.token.clone(),
            value: round2(t.count as f64 / total as f64 * 100.0),
        })
        .collect()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn category_axis(top: &[TokenCount]) -> Value {
    json!({
        "type": "category",
        "data": tokens(top),
        "axisLabel": { "rotate": 45 },
    })
}

pub fn bar_options(top: &[TokenCount]) -> Value {
    json!({
        "xAxis": category_axis(top),
        "yAxis": { "type": "value" },
        "series": [{ "data": counts(top), "type": "bar" }],
    })
}

pub fn line_options(top: &[TokenCount]) -> Value {
    json!({
        "xAxis": category_axis(top),
        "yAxis": { "type": "value" },
        "series": [{ "data": counts(top), "type": "line" }],
    })
}

pub fn area_options(top: &[TokenCount]) -> Value {
    let mut x_axis = category_axis(top);
    x_axis["boundaryGap"] = Value::Bool(false);
    json!({
        "xAxis": x_axis,
        "yAxis": { "type": "value" },
        "series": [{ "data": counts(top), "type": "line", "areaStyle": {} }],
    })
}

pub fn scatter_options(top: &[TokenCount]) -> Value {
    json!({
        "xAxis": category_axis(top),
        "yAxis": { "type": "value" },
        "series": [{ "symbolSize": 20, "data": name_values(top), "type": "scatter" }],
    })
}

pub fn word_cloud_options(top: &[TokenCount]) -> Value {
    json!({
        "series": [{ "type": "wordCloud", "data": name_values(top) }],
    })
}

pub fn pie_options(top: &[TokenCount]) -> Value {
    json!({
        "tooltip": { "trigger": "item" },
        "legend": { "orient": "vertical", "left": "left" },
        "series": [{
            "name": "Word frequency",
            "type": "pie",
            "radius": "50%",
            "data": name_values(top),
            "emphasis": {
                "itemStyle": {
                    "shadowBlur": 10,
                    "shadowOffsetX": 0,
                    "shadowColor": "rgba(0, 0, 0, 0.5)",
                }
            },
        }],
    })
}

pub fn funnel_options(top: &[TokenCount]) -> Value {
    json!({
        "tooltip": { "trigger": "item", "formatter": "{a} <br/>{b} : {c}%" },
        "legend": { "data": tokens(top) },
        "series": [{
            "name": "Word share",
            "type": "funnel",
            "left": "10%",
            "width": "80%",
            "data": funnel_percentages(top),
            "label": { "formatter": "{b}" },
            "labelLine": { "show": false },
            "itemStyle": { "opacity": 0.7 },
            "emphasis": { "label": { "position": "inside", "formatter": "{b} : {c}%" } },
        }],
    })
}
