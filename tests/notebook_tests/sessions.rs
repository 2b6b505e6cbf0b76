use notebook::{Dispatcher, ResultResponse};
use pretty_assertions::assert_eq;

use super::run;

const NAME_ERROR_A: &str = "NameError: name 'a' is not defined in <script> at line number 1";

#[tokio::test]
async fn test_print_sum() {
    let dispatcher = Dispatcher::default();
    let response = run(&dispatcher, "%python print 1 + 1", None).await;
    assert_eq!(response, ResultResponse::ok("2"));
}

#[tokio::test]
async fn test_assignment_yields_empty_result() {
    let dispatcher = Dispatcher::default();
    let response = run(&dispatcher, "%python a = 3", None).await;
    assert_eq!(response, ResultResponse::ok(""));
    assert_eq!(serde_json::to_string(&response).unwrap(), r#"{"result":""}"#);
}

#[tokio::test]
async fn test_consecutive_code_without_session() {
    let dispatcher = Dispatcher::default();
    run(&dispatcher, "%python a = 3", None).await;
    let response = run(&dispatcher, "%python print a + 2", None).await;
    assert_eq!(response, ResultResponse::ok("5"));
}

#[tokio::test]
async fn test_sessionless_bindings_cross_interpreters() {
    let dispatcher = Dispatcher::default();
    run(&dispatcher, "%python shared = 'yes'", None).await;
    let response = run(&dispatcher, "%jython print shared", None).await;
    assert_eq!(response, ResultResponse::ok("yes"));
}

#[tokio::test]
async fn test_empty_session_id_is_sessionless() {
    let dispatcher = Dispatcher::default();
    run(&dispatcher, "%python a = 4", Some("")).await;
    let response = run(&dispatcher, "%python print a", None).await;
    assert_eq!(response, ResultResponse::ok("4"));
}

#[tokio::test]
async fn test_print_undeclared_variable() {
    let dispatcher = Dispatcher::default();
    let response = run(&dispatcher, "%python print a", None).await;
    assert_eq!(response, ResultResponse::error(NAME_ERROR_A));
}

#[tokio::test]
async fn test_consecutive_code_with_session() {
    let dispatcher = Dispatcher::default();
    let response = run(&dispatcher, "%python a = 3", Some("1")).await;
    assert_eq!(response, ResultResponse::ok(""));
    let response = run(&dispatcher, "%python print a + 2", Some("1")).await;
    assert_eq!(response, ResultResponse::ok("5"));
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let dispatcher = Dispatcher::default();
    run(&dispatcher, "%python a = 3", Some("1")).await;

    let response = run(&dispatcher, "%python print a + 2", Some("2")).await;
    assert_eq!(response, ResultResponse::error(NAME_ERROR_A));

    let response = run(&dispatcher, "%python print a + 2", Some("1")).await;
    assert_eq!(response, ResultResponse::ok("5"));

    // nor does a session see sessionless bindings
    run(&dispatcher, "%python b = 1", None).await;
    let response = run(&dispatcher, "%python print b", Some("1")).await;
    assert!(response.is_error());
}

#[tokio::test]
async fn test_consecutive_code_with_different_sessions() {
    let dispatcher = Dispatcher::default();
    run(&dispatcher, "%python a = 3", Some("1")).await;
    run(&dispatcher, "%python a = 7", Some("2")).await;

    assert_eq!(
        run(&dispatcher, "%python print a + 2", Some("1")).await,
        ResultResponse::ok("5")
    );
    assert_eq!(
        run(&dispatcher, "%python print a + 2", Some("2")).await,
        ResultResponse::ok("9")
    );
}

#[tokio::test]
async fn test_session_ids_are_scoped_per_interpreter() {
    let dispatcher = Dispatcher::default();
    run(&dispatcher, "%python a = 3", Some("1")).await;
    let response = run(&dispatcher, "%jython print a", Some("1")).await;
    assert_eq!(response, ResultResponse::error(NAME_ERROR_A));
}

#[tokio::test]
async fn test_unknown_interpreter() {
    let dispatcher = Dispatcher::default();
    for session in [None, Some("1")] {
        let response = run(&dispatcher, "%noPython a = 3", session).await;
        assert_eq!(
            response,
            ResultResponse::error("Unknown 'noPython' as interpreter")
        );
    }
}

#[tokio::test]
async fn test_parse_errors() {
    let dispatcher = Dispatcher::default();
    for code in ["python print var", "%pythona=1", ""] {
        for session in [None, Some("1")] {
            let response = run(&dispatcher, code, session).await;
            assert_eq!(
                response,
                ResultResponse::error("Requested code cannot be parsed")
            );
        }
    }
    assert_eq!(dispatcher.store().session_count(), 0);
}

#[tokio::test]
async fn test_read_only_replay_is_idempotent() {
    let dispatcher = Dispatcher::default();
    run(&dispatcher, "%python a = 5", Some("1")).await;
    let first = run(&dispatcher, "%python print a", Some("1")).await;
    let second = run(&dispatcher, "%python print a", Some("1")).await;
    assert_eq!(first, ResultResponse::ok("5"));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_output_does_not_accumulate() {
    let dispatcher = Dispatcher::default();
    run(&dispatcher, "%python print 'first'", Some("1")).await;
    let response = run(&dispatcher, "%python print 'second'", Some("1")).await;
    assert_eq!(response, ResultResponse::ok("second"));
}

#[tokio::test]
async fn test_partial_side_effects_survive_fault() {
    let dispatcher = Dispatcher::default();
    let response = run(&dispatcher, "%python x = 1; y = nope; z = 2", Some("1")).await;
    assert_eq!(
        response,
        ResultResponse::error("NameError: name 'nope' is not defined in <script> at line number 1")
    );
    assert_eq!(
        run(&dispatcher, "%python print x", Some("1")).await,
        ResultResponse::ok("1")
    );
    assert!(run(&dispatcher, "%python print z", Some("1")).await.is_error());
}

#[tokio::test]
async fn test_removed_session_starts_fresh() {
    let dispatcher = Dispatcher::default();
    run(&dispatcher, "%python a = 3", Some("1")).await;
    assert!(dispatcher.store().remove("python", "1"));
    let response = run(&dispatcher, "%python print a", Some("1")).await;
    assert_eq!(response, ResultResponse::error(NAME_ERROR_A));
}

#[tokio::test]
async fn test_oversized_inputs_leave_service_usable() {
    let dispatcher = Dispatcher::default();
    run(&dispatcher, "%python a = 3", Some("keep")).await;

    let nested = format!("%python print {}1{}", "(".repeat(1000), ")".repeat(1000));
    let chain = format!("%python print 1{}", "+1".repeat(200_000));
    let signs = format!("%python x = {}1", "-".repeat(1000));
    let inputs = [
        nested.as_str(),
        chain.as_str(),
        "%python x = 'a' * 100000000000000",
        signs.as_str(),
    ];
    for code in inputs {
        for session in [None, Some("hostile")] {
            let response = run(&dispatcher, code, session).await;
            assert!(response.is_error(), "accepted {:.40}", code);
        }
    }

    assert_eq!(
        run(&dispatcher, "%python print 'x' * 100000000000000", None).await,
        ResultResponse::error(
            "MemoryError: string longer than 16777216 bytes in <script> at line number 1"
        )
    );
    assert_eq!(
        run(&dispatcher, "%python print a + 2", Some("keep")).await,
        ResultResponse::ok("5")
    );
    assert_eq!(
        run(&dispatcher, "%python y = 1; print y", Some("hostile")).await,
        ResultResponse::ok("1")
    );
}

#[tokio::test]
async fn test_chained_comparison_and_open_print() {
    let dispatcher = Dispatcher::default();
    run(&dispatcher, "%python a = 2", Some("1")).await;
    assert_eq!(
        run(&dispatcher, "%python print 1 < a < 3, 'x',", Some("1")).await,
        ResultResponse::ok("True x")
    );
}
