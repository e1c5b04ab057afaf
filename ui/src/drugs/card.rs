//! One drug's card: label header, collapsible label sections, and the
//! adverse-event and recall charts with their summaries and CSV downloads.

use dioxus::prelude::*;

use super::export::{csv_filename, DownloadCsvButton};
use super::join::{DrugOutcome, JoinProgress, SourceFailure};
use super::model::{DrugName, DrugRecord, Labeling};
use super::source::SourceKind;
use super::summary::{split_lines, AiSummary};
use crate::charts::{BarChart, ChartDatum};
use crate::t;

/// Bars shown on the adverse-event chart; the CSV keeps the full list.
pub const TOP_ADVERSE_EVENTS: usize = 5;

pub const CHART_WIDTH: f64 = 500.0;
pub const CHART_HEIGHT: f64 = 300.0;

/// Titles sent to the summariser and used in CSV filenames.
const ADVERSE_EVENTS_TITLE: &str = "Top 5 Adverse Events";
const ADVERSE_EVENTS_KIND: &str = "Adverse Events";
const RECALL_TITLE: &str = "Recall Frequency";

#[component]
pub fn DrugCard(outcome: DrugOutcome) -> Element {
    let failures = outcome.failures().to_vec();

    match outcome.record().cloned() {
        Some(record) => {
            let name = record.name.clone();
            let labeling = record.labeling.clone();
            rsx! {
                article { class: "drug-card",
                    h2 { class: "drug-card__title", "{name}" }
                    LabelSections { name: name.clone(), labeling }
                    AdverseEventSection { record: record.clone() }
                    RecallSection { record: record.clone() }
                    SourceFailures { failures }
                }
            }
        }
        None => rsx! {
            article { class: "drug-card drug-card--failed",
                h2 { class: "drug-card__title", "{outcome.name()}" }
                p { class: "drug-card__placeholder", {t!("card-failed")} }
                SourceFailures { failures }
            }
        },
    }
}

/// Placeholder shown in a slot while its lookups are in flight.
#[component]
pub fn DrugCardLoading(name: DrugName, progress: JoinProgress) -> Element {
    let drug = name.to_string();
    rsx! {
        article { class: "drug-card drug-card--loading", aria_busy: "true",
            h2 { class: "drug-card__title", "{name}" }
            p { class: "drug-card__progress",
                {t!("card-loading", drug = drug, completed = progress.completed, total = progress.total)}
            }
        }
    }
}

#[component]
fn LabelSections(name: DrugName, labeling: Option<Labeling>) -> Element {
    let doc = match labeling {
        Some(Labeling::Document(doc)) => doc,
        Some(Labeling::NotFound(sentinel)) => {
            return rsx! {
                p { class: "drug-card__placeholder", "{sentinel}" }
            };
        }
        None => return rsx! {},
    };

    let brand = doc.brand_name().map(str::to_string);
    let manufacturer = doc.manufacturer_name().map(str::to_string);
    let dosage = doc.dosage_and_administration().map(str::to_string);
    let do_not_use = doc.do_not_use().map(str::to_string);
    let warnings = doc.warnings().map(str::to_string);

    rsx! {
        div { class: "drug-card__header",
            if let Some(value) = brand {
                HeaderField { label: t!("card-brand-name"), value }
            }
            if let Some(value) = manufacturer {
                HeaderField { label: t!("card-manufacturer-name"), value }
            }
        }
        if let Some(content) = dosage {
            Accordion { key: "{name}-dosage", title: t!("card-dosage"), content }
        }
        if let Some(content) = do_not_use {
            Accordion { key: "{name}-do-not-use", title: t!("card-do-not-use"), content }
        }
        if let Some(content) = warnings {
            Accordion { key: "{name}-warnings", title: t!("card-warnings"), content }
        }
    }
}

#[component]
fn HeaderField(label: String, value: String) -> Element {
    rsx! {
        p { class: "drug-card__field",
            strong { "{label}:" }
            " {value}"
        }
    }
}

/// Collapsed-by-default section.
#[component]
fn Accordion(title: String, content: String) -> Element {
    let mut open = use_signal(|| false);
    let (class_name, marker) = if open() {
        ("accordion accordion--open", "-")
    } else {
        ("accordion", "+")
    };

    rsx! {
        div { class: "{class_name}",
            button {
                r#type: "button",
                class: "accordion__toggle",
                aria_expanded: "{open()}",
                onclick: move |_| open.toggle(),
                span { "{title}" }
                span { class: "accordion__marker", "{marker}" }
            }
            if open() {
                AccordionPanel { content: content.clone() }
            }
        }
    }
}

/// Any newline convention in `content` becomes a line break.
#[component]
fn AccordionPanel(content: String) -> Element {
    let lines = split_lines(&content);
    rsx! {
        div { class: "accordion__panel",
            for (idx, line) in lines.into_iter().enumerate() {
                if idx > 0 {
                    br {}
                }
                "{line}"
            }
        }
    }
}

#[component]
fn AdverseEventSection(record: DrugRecord) -> Element {
    let Some(series) = record.adverse_event_series() else {
        return rsx! {};
    };
    let top: Vec<ChartDatum> = series.iter().take(TOP_ADVERSE_EVENTS).cloned().collect();
    let filename = csv_filename(ADVERSE_EVENTS_KIND, record.name.as_str());
    let has_rows = !top.is_empty();

    rsx! {
        section { class: "drug-card__section",
            h3 { class: "drug-card__section-title", {t!("card-adverse-heading")} }
            p { class: "drug-card__description", {t!("card-adverse-description")} }
            if !has_rows {
                p { class: "drug-card__empty", {t!("card-no-records")} }
            }
            div { class: "chart-container",
                BarChart {
                    data: top.clone(),
                    width: CHART_WIDTH,
                    height: CHART_HEIGHT,
                    title: t!("chart-adverse-title"),
                    x_axis_label: t!("chart-adverse-x"),
                    y_axis_label: t!("chart-count"),
                }
            }
            if has_rows {
                AiSummary { data: top.clone(), title: ADVERSE_EVENTS_TITLE.to_string() }
            }
            DownloadCsvButton { data: series.clone(), filename: filename.clone() }
        }
    }
}

#[component]
fn RecallSection(record: DrugRecord) -> Element {
    let Some(series) = record.recall_series() else {
        return rsx! {};
    };
    let filename = csv_filename(RECALL_TITLE, record.name.as_str());
    let has_rows = !series.is_empty();

    rsx! {
        section { class: "drug-card__section",
            h3 { class: "drug-card__section-title", {t!("card-recall-heading")} }
            p { class: "drug-card__description", {t!("card-recall-description")} }
            if !has_rows {
                p { class: "drug-card__empty", {t!("card-no-records")} }
            }
            div { class: "chart-container",
                BarChart {
                    data: series.clone(),
                    width: CHART_WIDTH,
                    height: CHART_HEIGHT,
                    title: t!("chart-recall-title"),
                    x_axis_label: t!("chart-recall-x"),
                    y_axis_label: t!("chart-count"),
                    x_values_are_dates: true,
                }
            }
            if has_rows {
                AiSummary { data: series.clone(), title: RECALL_TITLE.to_string() }
            }
            DownloadCsvButton { data: series.clone(), filename: filename.clone() }
        }
    }
}

#[component]
fn SourceFailures(failures: Vec<SourceFailure>) -> Element {
    if failures.is_empty() {
        return rsx! {};
    }
    rsx! {
        ul { class: "drug-card__failures",
            for failure in failures {
                li { key: "{failure.kind}", class: "drug-card__failure",
                    {failure_line(&failure)}
                }
            }
        }
    }
}

fn failure_line(failure: &SourceFailure) -> String {
    let reason = failure.message.clone();
    match failure.kind {
        SourceKind::Label => t!("card-label-unavailable", reason = reason),
        SourceKind::AdverseEvents => t!("card-adverse-unavailable", reason = reason),
        SourceKind::RecallFrequency => t!("card-recall-unavailable", reason = reason),
    }
}
