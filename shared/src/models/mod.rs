//! Domain models for bean inspection

mod prediction;
mod record;
mod report;
mod symptom;
mod user;

pub use prediction::*;
pub use record::*;
pub use report::*;
pub use symptom::*;
pub use user::*;
