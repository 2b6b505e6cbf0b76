mod concurrency;
mod sessions;

use notebook::{Dispatcher, ExecutionRequest, ResultResponse};

/// Sends `code` through `dispatcher`, optionally under `session_id`.
pub async fn run(dispatcher: &Dispatcher, code: &str, session_id: Option<&str>) -> ResultResponse {
    let request = match session_id {
        Some(id) => ExecutionRequest::with_session(code, id),
        None => ExecutionRequest::new(code),
    };
    dispatcher.handle(request).await
}
