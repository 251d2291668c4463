pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod session;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::RouterConfig;

pub use adapters::{
    dom::{HeadlessDocument, ShellOptions},
    history::SessionHistory,
    http::HttpFetcher,
    scripts::ScriptRegistry,
};
pub use core::{
    engine::{EngineOptions, EngineParts, NavigationEngine, FRAGMENT_HEADERS},
    events::GlobalScope,
};
pub use domain::model::{NavigationOutcome, PageSnapshot, Route};
pub use utils::error::{Result, RouterError};
