//! openFDA drug lookups and the explorer UI built on them.

pub mod card;
pub mod export;
pub mod join;
pub mod model;
pub mod source;
pub mod summary;
pub mod view;

pub use join::{fetch_drug, DrugJoin, DrugOutcome, JoinProgress, SourceFailure};
pub use model::{DrugName, DrugRecord, LabelDocument, Labeling, TermCount, TimeCount};
pub use source::{FdaClient, FdaSource, FetchError, SourceKind};
pub use view::DrugExplorer;
