pub mod engine;
pub mod events;
pub mod fragment;
pub mod scripts;
pub mod styles;

pub use crate::domain::model::{
    FragmentResponse, NavigationOutcome, NavigationRequest, NavigationTrigger, PageLoaded,
    PageSnapshot, RawResponse, Route, ScriptElement,
};
pub use crate::domain::ports::{BrowserHistory, ContentFetcher, Document, NodeId, ScriptExecutor};
pub use crate::utils::error::Result;
