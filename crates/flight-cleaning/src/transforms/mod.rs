//! Column transforms applied by the pipeline.
//!
//! Each transform is a pure function of its input value or column:
//! - [`IdentifierReconstructor`] rebuilds the flight code sequence
//! - [`RouteSplitter`] splits the combined route into `To` / `From`
//! - [`NameNormalizer`] cleans carrier names

mod identifiers;
mod names;
mod routes;

pub use identifiers::{IdentifierReconstructor, Reconstruction};
pub use names::{NameNormalizer, is_kept, title_case};
pub use routes::{Route, RouteSplitter};
