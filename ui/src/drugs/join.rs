//! Fan-out/join of the three openFDA lookups for one drug.
//!
//! The three requests run concurrently. Each completion, successful or not,
//! advances the join by exactly one step and is reported through a progress
//! callback. Only once all three have reported does the caller receive a
//! [`DrugOutcome`], so a half-filled record never reaches the UI as data.

use futures_util::future::{FutureExt, LocalBoxFuture};
use futures_util::stream::{FuturesUnordered, StreamExt};
use tracing::{info, warn};

use super::model::{DrugName, DrugRecord, LabelDocument, Labeling, TermCount, TimeCount};
use super::source::{FdaSource, FetchError, SourceKind};

pub const SOURCE_COUNT: usize = SourceKind::ALL.len();

/// A source that did not produce data, with a display-ready reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub kind: SourceKind,
    pub message: String,
}

/// One finished lookup.
#[derive(Debug)]
pub enum SourceReport {
    Label(Result<Option<LabelDocument>, FetchError>),
    AdverseEvents(Result<Vec<TermCount>, FetchError>),
    RecallFrequency(Result<Vec<TimeCount>, FetchError>),
}

impl SourceReport {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceReport::Label(_) => SourceKind::Label,
            SourceReport::AdverseEvents(_) => SourceKind::AdverseEvents,
            SourceReport::RecallFrequency(_) => SourceKind::RecallFrequency,
        }
    }

    /// Rows delivered, or `None` for a failed lookup.
    pub fn record_count(&self) -> Option<usize> {
        match self {
            SourceReport::Label(Ok(doc)) => Some(usize::from(doc.is_some())),
            SourceReport::AdverseEvents(Ok(rows)) => Some(rows.len()),
            SourceReport::RecallFrequency(Ok(rows)) => Some(rows.len()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinProgress {
    pub completed: usize,
    pub total: usize,
}

impl JoinProgress {
    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

/// What a finished join produced.
#[derive(Debug, Clone, PartialEq)]
pub enum DrugOutcome {
    /// All three sources answered.
    Complete(DrugRecord),
    /// At least one source answered and at least one failed.
    Partial {
        record: DrugRecord,
        failures: Vec<SourceFailure>,
    },
    /// Nothing usable came back.
    Failed {
        name: DrugName,
        failures: Vec<SourceFailure>,
    },
}

impl DrugOutcome {
    pub fn name(&self) -> &DrugName {
        match self {
            DrugOutcome::Complete(record) | DrugOutcome::Partial { record, .. } => &record.name,
            DrugOutcome::Failed { name, .. } => name,
        }
    }

    pub fn record(&self) -> Option<&DrugRecord> {
        match self {
            DrugOutcome::Complete(record) | DrugOutcome::Partial { record, .. } => Some(record),
            DrugOutcome::Failed { .. } => None,
        }
    }

    pub fn failures(&self) -> &[SourceFailure] {
        match self {
            DrugOutcome::Complete(_) => &[],
            DrugOutcome::Partial { failures, .. } | DrugOutcome::Failed { failures, .. } => {
                failures
            }
        }
    }
}

/// Accumulates source reports for one drug until all three are in.
#[derive(Debug)]
pub struct DrugJoin {
    record: DrugRecord,
    failures: Vec<SourceFailure>,
    seen: Vec<SourceKind>,
}

impl DrugJoin {
    pub fn new(name: DrugName) -> Self {
        Self {
            record: DrugRecord::empty(name),
            failures: Vec::new(),
            seen: Vec::with_capacity(SOURCE_COUNT),
        }
    }

    pub fn progress(&self) -> JoinProgress {
        JoinProgress {
            completed: self.seen.len(),
            total: SOURCE_COUNT,
        }
    }

    pub fn is_done(&self) -> bool {
        self.progress().is_done()
    }

    /// Fold one report into the record. A second report for a source that
    /// already answered is ignored and does not advance the join.
    pub fn record(&mut self, report: SourceReport) -> JoinProgress {
        let kind = report.kind();
        if self.seen.contains(&kind) {
            warn!(drug = %self.record.name, source = %kind, "duplicate source report ignored");
            return self.progress();
        }
        self.seen.push(kind);

        let failure = match report {
            SourceReport::Label(Ok(Some(doc))) => {
                self.record.labeling = Some(Labeling::Document(Box::new(doc)));
                None
            }
            SourceReport::Label(Ok(None)) => {
                self.record.labeling = Some(Labeling::not_found(&self.record.name));
                None
            }
            SourceReport::AdverseEvents(Ok(rows)) => {
                self.record.adverse_events = Some(rows);
                None
            }
            SourceReport::RecallFrequency(Ok(rows)) => {
                self.record.recall_frequency = Some(rows);
                None
            }
            SourceReport::Label(Err(err))
            | SourceReport::AdverseEvents(Err(err))
            | SourceReport::RecallFrequency(Err(err)) => Some(err),
        };

        if let Some(err) = failure {
            warn!(drug = %self.record.name, source = %kind, "source failed: {err}");
            self.failures.push(SourceFailure {
                kind,
                message: err.to_string(),
            });
        }

        self.progress()
    }

    /// Close the join. Sources that never reported count as failed.
    pub fn into_outcome(mut self) -> DrugOutcome {
        for kind in SourceKind::ALL {
            if !self.seen.contains(&kind) {
                self.failures.push(SourceFailure {
                    kind,
                    message: "no response".to_string(),
                });
            }
        }

        if self.failures.is_empty() {
            DrugOutcome::Complete(self.record)
        } else if self.failures.len() >= SOURCE_COUNT {
            DrugOutcome::Failed {
                name: self.record.name,
                failures: self.failures,
            }
        } else {
            DrugOutcome::Partial {
                record: self.record,
                failures: self.failures,
            }
        }
    }
}

/// Run the three lookups for `name` concurrently and join them.
///
/// `on_progress` is called once per finished lookup, in completion order.
pub async fn fetch_drug<S>(
    source: &S,
    name: DrugName,
    mut on_progress: impl FnMut(JoinProgress),
) -> DrugOutcome
where
    S: FdaSource,
{
    let mut join = DrugJoin::new(name.clone());

    let mut pending: FuturesUnordered<LocalBoxFuture<'_, SourceReport>> = FuturesUnordered::new();
    pending.push(source.label(&name).map(SourceReport::Label).boxed_local());
    pending.push(
        source
            .adverse_events(&name)
            .map(SourceReport::AdverseEvents)
            .boxed_local(),
    );
    pending.push(
        source
            .recall_frequency(&name)
            .map(SourceReport::RecallFrequency)
            .boxed_local(),
    );

    while let Some(report) = pending.next().await {
        let kind = report.kind();
        let records = report.record_count();
        let progress = join.record(report);
        info!(
            drug = %name,
            source = %kind,
            records = ?records,
            "source reported ({}/{})",
            progress.completed,
            progress.total
        );
        on_progress(progress);
    }
    drop(pending);

    let outcome = join.into_outcome();
    info!(
        drug = %name,
        failures = outcome.failures().len(),
        "drug lookup joined"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drugs::model::OpenFdaFields;

    fn name(raw: &str) -> DrugName {
        DrugName::parse(raw).unwrap()
    }

    fn label_doc() -> LabelDocument {
        LabelDocument {
            openfda: Some(OpenFdaFields {
                brand_name: vec!["Aspirin".into()],
                ..OpenFdaFields::default()
            }),
            ..LabelDocument::default()
        }
    }

    fn boom() -> FetchError {
        FetchError::Status {
            status: 500,
            message: "boom".into(),
        }
    }

    fn reports() -> Vec<SourceReport> {
        vec![
            SourceReport::Label(Ok(Some(label_doc()))),
            SourceReport::AdverseEvents(Ok(vec![TermCount {
                term: "NAUSEA".into(),
                count: 4,
            }])),
            SourceReport::RecallFrequency(Ok(vec![TimeCount {
                time: "20230615".into(),
                count: 1,
            }])),
        ]
    }

    #[derive(Default)]
    struct FakeSource {
        label: Option<LabelDocument>,
        failing: Vec<SourceKind>,
    }

    impl FdaSource for FakeSource {
        async fn label(&self, _name: &DrugName) -> Result<Option<LabelDocument>, FetchError> {
            if self.failing.contains(&SourceKind::Label) {
                return Err(boom());
            }
            Ok(self.label.clone())
        }

        async fn adverse_events(&self, _name: &DrugName) -> Result<Vec<TermCount>, FetchError> {
            if self.failing.contains(&SourceKind::AdverseEvents) {
                return Err(boom());
            }
            Ok(vec![TermCount {
                term: "HEADACHE".into(),
                count: 9,
            }])
        }

        async fn recall_frequency(&self, _name: &DrugName) -> Result<Vec<TimeCount>, FetchError> {
            if self.failing.contains(&SourceKind::RecallFrequency) {
                return Err(boom());
            }
            Ok(Vec::new())
        }
    }

    /// Adverse events never answer; the lookup gives up after a short limit.
    struct StallingSource;

    impl FdaSource for StallingSource {
        async fn label(&self, _name: &DrugName) -> Result<Option<LabelDocument>, FetchError> {
            Ok(None)
        }

        async fn adverse_events(&self, _name: &DrugName) -> Result<Vec<TermCount>, FetchError> {
            let limit = std::time::Duration::from_millis(20);
            crate::core::timing::with_timeout(limit, futures::future::pending())
                .await
                .map_err(|elapsed| FetchError::Timeout(elapsed.0))
        }

        async fn recall_frequency(&self, _name: &DrugName) -> Result<Vec<TimeCount>, FetchError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn any_completion_order_completes_after_the_third_report() {
        let orders: [[usize; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];

        for order in orders {
            let mut pending: Vec<Option<SourceReport>> = reports().into_iter().map(Some).collect();
            let mut join = DrugJoin::new(name("aspirin"));
            let mut steps = Vec::new();

            for idx in order {
                let report = pending[idx].take().unwrap();
                steps.push(join.record(report));
            }

            let completed: Vec<usize> = steps.iter().map(|p| p.completed).collect();
            assert_eq!(completed, vec![1, 2, 3], "order {order:?}");
            assert_eq!(steps.iter().filter(|p| p.is_done()).count(), 1);

            match join.into_outcome() {
                DrugOutcome::Complete(record) => assert!(record.is_complete()),
                other => panic!("order {order:?} produced {other:?}"),
            }
        }
    }

    #[test]
    fn record_counts_distinguish_empty_from_failed() {
        assert_eq!(SourceReport::Label(Ok(None)).record_count(), Some(0));
        assert_eq!(SourceReport::AdverseEvents(Ok(Vec::new())).record_count(), Some(0));
        assert_eq!(SourceReport::RecallFrequency(Err(boom())).record_count(), None);
        assert_eq!(reports()[0].record_count(), Some(1));
    }

    #[test]
    fn duplicate_reports_do_not_advance_the_join() {
        let mut join = DrugJoin::new(name("aspirin"));
        join.record(SourceReport::AdverseEvents(Ok(Vec::new())));
        let progress = join.record(SourceReport::AdverseEvents(Ok(Vec::new())));
        assert_eq!(progress.completed, 1);
        assert!(!join.is_done());
    }

    #[test]
    fn empty_label_lookup_stores_the_sentinel() {
        let mut join = DrugJoin::new(name("zzz"));
        join.record(SourceReport::Label(Ok(None)));
        join.record(SourceReport::AdverseEvents(Ok(Vec::new())));
        join.record(SourceReport::RecallFrequency(Ok(Vec::new())));

        let outcome = join.into_outcome();
        let record = outcome.record().unwrap();
        assert_eq!(
            record.labeling,
            Some(Labeling::NotFound("No data found for zzz".into()))
        );
        assert!(matches!(outcome, DrugOutcome::Complete(_)));
    }

    #[test]
    fn unfinished_join_reports_missing_sources() {
        let mut join = DrugJoin::new(name("aspirin"));
        join.record(SourceReport::Label(Ok(Some(label_doc()))));

        match join.into_outcome() {
            DrugOutcome::Partial { failures, .. } => {
                let kinds: Vec<SourceKind> = failures.iter().map(|f| f.kind).collect();
                assert_eq!(
                    kinds,
                    vec![SourceKind::AdverseEvents, SourceKind::RecallFrequency]
                );
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn fetch_reports_progress_once_per_source() {
        let source = FakeSource {
            label: Some(label_doc()),
            ..FakeSource::default()
        };
        let mut progress = Vec::new();

        let outcome = futures::executor::block_on(fetch_drug(&source, name("aspirin"), |p| {
            progress.push(p)
        }));

        assert_eq!(progress.len(), 3);
        assert_eq!(progress.iter().filter(|p| p.is_done()).count(), 1);
        assert!(progress.last().unwrap().is_done());

        let DrugOutcome::Complete(record) = outcome else {
            panic!("expected a complete record");
        };
        assert_eq!(record.name.as_str(), "aspirin");
        assert_eq!(
            record.labeling.as_ref().and_then(|l| l.document()).and_then(|d| d.brand_name()),
            Some("Aspirin")
        );
        assert_eq!(record.adverse_events.as_ref().map(Vec::len), Some(1));
        assert_eq!(record.recall_frequency, Some(Vec::new()));
    }

    #[test]
    fn one_failed_source_yields_a_partial_outcome() {
        let source = FakeSource {
            failing: vec![SourceKind::AdverseEvents],
            ..FakeSource::default()
        };
        let mut calls = 0;
        let outcome =
            futures::executor::block_on(fetch_drug(&source, name("aspirin"), |_| calls += 1));

        assert_eq!(calls, 3);
        let DrugOutcome::Partial { record, failures } = outcome else {
            panic!("expected a partial outcome");
        };
        assert!(record.adverse_events.is_none());
        assert!(record.recall_frequency.is_some());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, SourceKind::AdverseEvents);
        assert!(failures[0].message.contains("500"));
    }

    #[test]
    fn all_sources_failing_yields_failed() {
        let source = FakeSource {
            failing: SourceKind::ALL.to_vec(),
            ..FakeSource::default()
        };
        let outcome = futures::executor::block_on(fetch_drug(&source, name("aspirin"), |_| {}));
        assert!(matches!(outcome, DrugOutcome::Failed { .. }));
        assert_eq!(outcome.failures().len(), 3);
        assert!(outcome.record().is_none());
        assert_eq!(outcome.name().as_str(), "aspirin");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn timed_out_source_becomes_a_failure_and_the_join_completes() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let mut progress = Vec::new();
        let outcome = runtime.block_on(fetch_drug(&StallingSource, name("aspirin"), |p| {
            progress.push(p)
        }));

        assert_eq!(progress.len(), 3);
        assert!(progress.last().unwrap().is_done());
        let DrugOutcome::Partial { record, failures } = outcome else {
            panic!("expected a partial outcome");
        };
        assert!(record.adverse_events.is_none());
        assert_eq!(
            record.labeling,
            Some(Labeling::NotFound("No data found for aspirin".into()))
        );
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, SourceKind::AdverseEvents);
        assert!(failures[0].message.starts_with("no response within"));
    }
}
