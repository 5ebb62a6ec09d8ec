// File I/O for the retitle workflow: the collaborators the engine talks to.

pub mod archive;
pub mod corpus;
pub mod emitter;
pub mod intake;
pub mod pdf;
pub mod report;
pub mod text;

pub use emitter::{FileEmitter, ReportFormat};
pub use pdf::PdfTitleStore;
