use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use flowpool::{Pool, PoolConfig, PoolError, logging};

#[test]
fn hundred_increment_tasks_awaited_in_submission_order() {
    logging::init_test();
    let pool = Pool::new(4).unwrap();

    let handles: Vec<_> = (0..100u64).map(|n| pool.submit(move || n + 1)).collect();
    let results: Vec<u64> = handles.into_iter().map(|h| h.join()).collect();

    assert_eq!(results.len(), 100);
    for (n, result) in results.iter().enumerate() {
        assert_eq!(*result, n as u64 + 1);
    }
    let inputs: u64 = (0..100).sum();
    assert_eq!(results.iter().sum::<u64>(), inputs + 100);
}

#[test]
fn doubling_tasks_are_correct_regardless_of_interleaving() {
    logging::init_test();
    let pool = Pool::new(3).unwrap();

    let handles: Vec<_> = (0..64i64).map(|n| pool.submit(move || n * 2)).collect();
    for (n, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join(), n as i64 * 2);
    }
}

#[test]
fn single_worker_pool_completes_every_await() {
    logging::init_test();
    let pool = Pool::new(1).unwrap();

    let handles: Vec<_> = (0..32u32).map(|n| pool.submit(move || n * n)).collect();
    for (n, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join(), (n as u32).pow(2));
    }
}

#[test]
fn detached_task_on_single_worker_runs_exactly_once() {
    logging::init_test();
    let pool = Pool::new(1).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = mpsc::channel();

    let task_counter = Arc::clone(&counter);
    pool.submit_detached(move || {
        task_counter.fetch_add(1, Ordering::SeqCst);
        tx.send(()).unwrap();
    });

    // synchronize on task completion before destroying the pool, so the
    // shutdown-may-drop-queued-tasks limitation cannot race this assertion
    rx.recv_timeout(Duration::from_secs(5)).unwrap();
    drop(pool);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn results_carry_owned_values() {
    logging::init_test();
    let pool = Pool::new(2).unwrap();

    let prefix = String::from("hello");
    let handle = pool.submit(move || format!("{prefix}, world"));
    assert_eq!(handle.join(), "hello, world");
}

#[test]
fn is_done_becomes_true_after_execution() {
    logging::init_test();
    let pool = Pool::new(2).unwrap();

    let handle = pool.submit(|| 7u8);
    while !handle.is_done() {
        thread::yield_now();
    }
    assert_eq!(handle.join(), 7);
}

#[test]
fn zero_size_pool_is_rejected() {
    logging::init_test();
    assert!(matches!(Pool::new(0), Err(PoolError::InvalidSize)));
    let config = PoolConfig {
        size: 0,
        ..PoolConfig::default()
    };
    assert!(matches!(Pool::with_config(config), Err(PoolError::InvalidSize)));
}

#[test]
fn workers_use_the_configured_thread_name_prefix() {
    logging::init_test();
    let config = PoolConfig {
        size: 1,
        thread_name_prefix: "renamed-worker".to_string(),
    };
    let pool = Pool::with_config(config).unwrap();
    assert_eq!(pool.size(), 1);

    // detached, so only the worker itself can run it (a joining caller could
    // have stolen an awaited task and reported its own thread name)
    let (tx, rx) = mpsc::channel();
    pool.submit_detached(move || {
        tx.send(thread::current().name().map(str::to_string)).unwrap();
    });
    let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(name.as_deref(), Some("renamed-worker-0"));
}

#[test]
fn panicking_awaited_task_resurfaces_at_join() {
    logging::init_test();
    let pool = Pool::new(2).unwrap();

    let handle = pool.submit(|| -> u32 { panic!("task failed") });
    let outcome = panic::catch_unwind(AssertUnwindSafe(move || handle.join()));
    assert!(outcome.is_err());

    // the worker that ran the panicking task must still be alive
    assert_eq!(pool.submit(|| 5).join(), 5);
}

#[test]
fn panicking_detached_task_does_not_kill_the_worker() {
    logging::init_test();
    let pool = Pool::new(1).unwrap();
    let (tx, rx) = mpsc::channel();

    pool.submit_detached(|| panic!("detached failure"));
    pool.submit_detached(move || tx.send(42u8).unwrap());

    // the single worker survived the panic and ran the second task
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 42);
}
