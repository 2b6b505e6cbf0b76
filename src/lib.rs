//! # Notebook
//!
//! Routes `%interpreter code` submissions to a named engine and evaluates them
//! against a persistent, session-scoped environment.
//!
//! ## Pipeline
//!
//! 1. [`directive`]: splits the raw line into interpreter name and body
//! 2. [`engine::EngineRegistry`]: resolves the interpreter name
//! 3. [`context::ContextStore`]: selects (or creates) the environment for
//!    the (interpreter, session) pair
//! 4. [`dispatcher::Dispatcher`]: runs the engine with a per-call output sink
//! 5. [`response::ResultResponse`]: the uniform `{result?, error?}` envelope
//!
//! ## Usage Example
//!
//! ```rust
//! use notebook::{Dispatcher, ExecutionRequest};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let dispatcher = Dispatcher::default();
//! dispatcher.handle(ExecutionRequest::new("%python a = 3")).await;
//! let response = dispatcher.handle(ExecutionRequest::new("%python print a + 2")).await;
//! assert_eq!(response.result.as_deref(), Some("5"));
//! # }
//! ```

pub mod config;
pub mod context;
pub mod directive;
pub mod dispatcher;
pub mod engine;
pub mod environment;
pub mod error;
pub mod request;
pub mod response;

pub use config::NotebookConfig;
pub use context::ContextStore;
pub use dispatcher::Dispatcher;
pub use engine::{Engine, EngineRegistry, EvaluationFault};
pub use environment::{Environment, Value};
pub use error::{DispatchError, DispatchResult};
pub use request::ExecutionRequest;
pub use response::ResultResponse;
