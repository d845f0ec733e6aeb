//! Resolution core of installations: transitive component graphs and
//! binding of declared imports to cluster state.

pub mod api;
pub mod components;
mod context;
mod error;
pub mod hierarchy;
pub mod imports;
pub mod installation;
pub mod kubemodel;
pub mod names;
pub mod store;
pub mod util;

pub use context::{CancelHandle, Context};
pub use error::{Error, ErrorKind, Result};
