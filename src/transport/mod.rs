//! # Transport Module
//!
//! * `http` - the primary transport: direct HTTP to a node
//! * `fallback` - remote script execution used when direct access is forbidden
//! * `mock` - canned-response implementations of both, for tests

pub mod fallback;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use fallback::{RemoteScript, ScriptOutput, ScriptRunner, ScriptType};
pub use http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockScriptRunner, MockTransport};
