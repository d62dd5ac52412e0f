// Issue classification: the decision engine.
//
// Turns raw model outputs (label + confidence) and the raw input strings
// into a {severity, category} verdict. Everything in here is pure over its
// inputs and the static keyword tables; the only I/O happens through the
// model and image-source traits held by `Classifier`.

pub mod category;
pub mod combine;
pub mod error;
pub mod merge;
pub mod modality;
pub mod severity;
pub mod verdict;

pub use category::{match_category, Category};
pub use combine::{combine, CombinedScore, CombinedSeverity};
pub use error::ClassifyError;
pub use merge::{merge_verdicts, ImageFailurePolicy};
pub use modality::Classifier;
pub use severity::{assess_severity, Severity};
pub use verdict::{ClassificationSignal, IssueVerdict, Modality, ModalityVerdict};
