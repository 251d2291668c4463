// Adapters layer: concrete implementations of the ports for a headless session
// (in-memory document and history, HTTP fetcher, native page modules).

pub mod dom;
pub mod history;
pub mod html;
pub mod http;
pub mod scripts;
