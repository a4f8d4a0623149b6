//! Two-party chat use cases.

mod messenger;
mod resolver;

pub use messenger::{Delivered, Messenger};
pub use resolver::ChatResolver;
