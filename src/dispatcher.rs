use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::config::{ErrorPlacement, NotebookConfig};
use crate::context::ContextStore;
use crate::directive;
use crate::engine::{EngineRegistry, EvaluationFault, OutputSink};
use crate::error::{DispatchError, DispatchResult};
use crate::request::ExecutionRequest;
use crate::response::ResultResponse;

/// Parses a submission, resolves its engine, picks the environment for the
/// (interpreter, session) pair and evaluates the body against it.
///
/// Evaluations against the same environment run one at a time; different
/// environments evaluate in parallel on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<EngineRegistry>,
    store: Arc<ContextStore>,
    error_placement: ErrorPlacement,
    evaluation_timeout: Option<Duration>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(
            Arc::new(EngineRegistry::with_builtins()),
            Arc::new(ContextStore::new()),
        )
    }
}

impl Dispatcher {
    pub fn new(registry: Arc<EngineRegistry>, store: Arc<ContextStore>) -> Self {
        Self {
            registry,
            store,
            error_placement: ErrorPlacement::default(),
            evaluation_timeout: None,
        }
    }

    /// Built-in engines (minus the disabled ones) over a fresh store.
    pub fn from_config(config: &NotebookConfig) -> Self {
        let mut registry = EngineRegistry::with_builtins();
        for name in &config.disabled_engines {
            registry.unregister(name);
        }
        let store = ContextStore::with_eviction_policy(config.eviction_policy());

        Self::new(Arc::new(registry), Arc::new(store))
            .with_error_placement(config.error_placement)
            .with_evaluation_timeout(config.evaluation_timeout)
    }

    pub fn with_error_placement(mut self, error_placement: ErrorPlacement) -> Self {
        self.error_placement = error_placement;
        self
    }

    pub fn with_evaluation_timeout(mut self, evaluation_timeout: Option<Duration>) -> Self {
        self.evaluation_timeout = evaluation_timeout;
        self
    }

    pub fn registry(&self) -> &Arc<EngineRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<ContextStore> {
        &self.store
    }

    /// Handles a request. Every outcome, failures included, is delivered as
    /// a [`ResultResponse`].
    #[instrument(level = "debug", skip(self, request), fields(session = ?request.session_id))]
    pub async fn handle(&self, request: ExecutionRequest) -> ResultResponse {
        let outcome = self.dispatch(&request).await;
        if let Err(err) = &outcome {
            debug!("Dispatch failed: {}", err);
        }
        ResultResponse::from_outcome(outcome, self.error_placement)
    }

    /// Runs a request and returns the untrimmed captured output.
    pub async fn dispatch(&self, request: &ExecutionRequest) -> DispatchResult<String> {
        let directive = directive::parse(&request.code)?;
        let engine = self.registry.resolve(directive.interpreter).ok_or_else(|| {
            DispatchError::UnknownInterpreter(directive.interpreter.to_string())
        })?;
        let environment = self
            .store
            .get_environment(directive.interpreter, request.session());

        let body = directive.body.to_string();
        let evaluation = async move {
            let mut environment = environment.lock_owned().await;
            tokio::task::spawn_blocking(move || {
                let mut output = OutputSink::new();
                engine.evaluate(&body, &mut environment, &mut output)?;
                Ok::<_, EvaluationFault>(output.into_string())
            })
            .await
        };

        let joined = match self.evaluation_timeout {
            Some(limit) => tokio::time::timeout(limit, evaluation).await.map_err(|_| {
                warn!(
                    "Evaluation for '{}' exceeded {}ms",
                    directive.interpreter,
                    limit.as_millis()
                );
                DispatchError::Timeout(limit.as_millis())
            })?,
            None => evaluation.await,
        };

        let output = joined
            .map_err(|e| DispatchError::internal(format!("evaluation task failed: {}", e)))??;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::engine::{Engine, MockEngine};
    use crate::environment::{Environment, Value};
    use pretty_assertions::assert_eq;

    fn dispatcher_with(name: &str, engine: MockEngine) -> Dispatcher {
        let mut registry = EngineRegistry::new();
        registry.register([name], Arc::new(engine));
        Dispatcher::new(Arc::new(registry), Arc::new(ContextStore::new()))
    }

    #[tokio::test]
    async fn test_engine_receives_body_and_session_environment() {
        let mut engine = MockEngine::new();
        engine
            .expect_evaluate()
            .withf(|code, _, _| code == "say hi")
            .times(1)
            .returning(|_, env, out| {
                env.set("seen", Value::Bool(true));
                out.write_all(b"  hi \n").unwrap();
                Ok(())
            });
        let dispatcher = dispatcher_with("mock", engine);

        let response = dispatcher
            .handle(ExecutionRequest::with_session("%mock say hi", "s1"))
            .await;
        assert_eq!(response, ResultResponse::ok("hi"));

        let env = dispatcher.store().get_environment("mock", Some("s1"));
        assert_eq!(env.lock().await.get("seen"), Some(&Value::Bool(true)));
        assert!(dispatcher.store().shared_environment().lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_interpreter_touches_nothing() {
        let mut engine = MockEngine::new();
        engine.expect_evaluate().never();
        let dispatcher = dispatcher_with("mock", engine);

        let response = dispatcher
            .handle(ExecutionRequest::with_session("%other x", "1"))
            .await;
        assert_eq!(response, ResultResponse::error("Unknown 'other' as interpreter"));
        assert_eq!(dispatcher.store().session_count(), 0);
    }

    #[tokio::test]
    async fn test_parse_error_touches_nothing() {
        let mut engine = MockEngine::new();
        engine.expect_evaluate().never();
        let dispatcher = dispatcher_with("mock", engine);

        let response = dispatcher
            .handle(ExecutionRequest::with_session("mock x", "1"))
            .await;
        assert_eq!(response, ResultResponse::error("Requested code cannot be parsed"));
        assert_eq!(dispatcher.store().session_count(), 0);
    }

    #[tokio::test]
    async fn test_fault_message_passes_through() {
        let mut engine = MockEngine::new();
        engine
            .expect_evaluate()
            .returning(|_, _, _| Err(EvaluationFault::new("Boom: it broke")));
        let dispatcher = dispatcher_with("mock", engine);

        let response = dispatcher.handle(ExecutionRequest::new("%mock x")).await;
        assert_eq!(response, ResultResponse::error("Boom: it broke"));
    }

    #[tokio::test]
    async fn test_legacy_placement_for_unknown_interpreter() {
        let dispatcher = Dispatcher::default().with_error_placement(ErrorPlacement::Legacy);
        let response = dispatcher.handle(ExecutionRequest::new("%abc a = 1")).await;
        assert_eq!(response, ResultResponse::ok("Unknown 'abc' as interpreter"));
    }

    #[tokio::test]
    async fn test_from_config_disables_engines() {
        let config = NotebookConfig {
            disabled_engines: vec!["jython".to_string()],
            ..Default::default()
        };
        let dispatcher = Dispatcher::from_config(&config);
        assert_eq!(dispatcher.registry().names(), vec!["python"]);

        let response = dispatcher.handle(ExecutionRequest::new("%jython a = 1")).await;
        assert_eq!(response, ResultResponse::error("Unknown 'jython' as interpreter"));
    }

    struct SlowEngine;

    impl Engine for SlowEngine {
        fn evaluate(
            &self,
            _code: &str,
            _environment: &mut Environment,
            _output: &mut OutputSink,
        ) -> Result<(), EvaluationFault> {
            std::thread::sleep(Duration::from_millis(300));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_evaluation_timeout() {
        let mut registry = EngineRegistry::new();
        registry.register(["slow"], Arc::new(SlowEngine));
        let dispatcher = Dispatcher::new(Arc::new(registry), Arc::new(ContextStore::new()))
            .with_evaluation_timeout(Some(Duration::from_millis(20)));

        let err = dispatcher
            .dispatch(&ExecutionRequest::new("%slow x"))
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::Timeout(20));
    }
}
