pub mod analysis;
pub mod document;
pub mod resume;

pub use analysis::{AnalysisResult, CategoryStatus};
pub use document::{DocumentKind, UploadedDocument};
pub use resume::ResumeData;
