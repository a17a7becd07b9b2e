pub mod gradeables;

pub use gradeables::{GradeableSource, JsonDirectorySource, SourceError};
