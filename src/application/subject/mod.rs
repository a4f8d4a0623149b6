//! Subject (question and answer) use cases.

mod service;

pub use service::SubjectService;
