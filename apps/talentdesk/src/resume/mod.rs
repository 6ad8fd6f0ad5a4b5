// Resume intake: upload a file, get text back from the backend, pre-fill the form.

pub mod extractor;
pub mod intake;

pub use extractor::{extract_fields, ExtractedFields};
pub use intake::ResumeIntake;
