use std::sync::{Arc, Barrier};
use std::thread;

use futures::future::join_all;
use notebook::{ContextStore, Dispatcher, ResultResponse};
use pretty_assertions::assert_eq;

use super::run;

#[test]
fn test_concurrent_first_requests_create_one_environment() {
    let store = ContextStore::new();
    let barrier = Barrier::new(32);

    let handles: Vec<_> = thread::scope(|scope| {
        let store = &store;
        let barrier = &barrier;
        let workers: Vec<_> = (0..32)
            .map(|_| {
                scope.spawn(move || {
                    barrier.wait();
                    store.get_environment("python", Some("same"))
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect()
    });

    assert_eq!(store.session_count(), 1);
    assert!(handles.iter().all(|env| Arc::ptr_eq(env, &handles[0])));
}

#[test]
fn test_concurrent_inserts_for_different_keys_are_kept() {
    let store = ContextStore::new();
    let barrier = Barrier::new(16);

    thread::scope(|scope| {
        for worker in 0..16 {
            let store = &store;
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                for session in 0..50 {
                    let interpreter = if session % 2 == 0 { "python" } else { "jython" };
                    store.get_environment(interpreter, Some(format!("{}-{}", worker, session).as_str()));
                }
            });
        }
    });

    assert_eq!(store.session_count(), 16 * 50);
    assert_eq!(store.sessions("python").len(), 16 * 25);
    assert_eq!(store.sessions("jython").len(), 16 * 25);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_evaluations_on_one_session_are_serialized() {
    let dispatcher = Dispatcher::default();
    run(&dispatcher, "%python counter = 0", Some("1")).await;

    let increments = (0..32).map(|_| run(&dispatcher, "%python counter = counter + 1", Some("1")));
    let responses = join_all(increments).await;
    assert!(responses.iter().all(|r| *r == ResultResponse::ok("")));

    let response = run(&dispatcher, "%python print counter", Some("1")).await;
    assert_eq!(response, ResultResponse::ok("32"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sessions_evaluate_independently_in_parallel() {
    let dispatcher = Dispatcher::default();

    let writes = (0..16).map(|i| {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            let session = i.to_string();
            run(&dispatcher, &format!("%python a = {}", i), Some(session.as_str())).await;
            run(&dispatcher, "%python print a * 10", Some(session.as_str())).await
        })
    });
    let responses = join_all(writes).await;

    for (i, response) in responses.into_iter().enumerate() {
        assert_eq!(response.unwrap(), ResultResponse::ok((i * 10).to_string()));
    }
    assert_eq!(dispatcher.store().session_count(), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sessionless_requests_serialize_on_shared_environment() {
    let dispatcher = Dispatcher::default();
    run(&dispatcher, "%python total = 0", None).await;

    let increments = (0..20).map(|i| {
        let interpreter = if i % 2 == 0 { "python" } else { "jython" };
        let code = format!("%{} total = total + 1", interpreter);
        let dispatcher = dispatcher.clone();
        async move { run(&dispatcher, &code, None).await }
    });
    join_all(increments).await;

    let response = run(&dispatcher, "%jython print total", None).await;
    assert_eq!(response, ResultResponse::ok("20"));
}
