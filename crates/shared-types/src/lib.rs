pub mod error;

// Office domain modules
pub mod case;
pub mod config;
pub mod deadline;
pub mod document;
pub mod mediation;
pub mod notification;

pub use error::*;

pub use case::*;
pub use config::*;
pub use deadline::*;
pub use document::*;
pub use mediation::*;
pub use notification::*;
