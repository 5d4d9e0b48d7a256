pub mod aggregate;
pub mod error;
pub mod guards;
pub mod report;
pub mod types;

pub use aggregate::aggregate;
pub use error::{GuardError, ReportError};
pub use report::{render, Artifact, ExportFormat, FontSource};
pub use types::{
    Actor, AggregatedLine, DraftIngredient, IngredientAmount, RecipeDraft, Role, SavePurpose,
};
