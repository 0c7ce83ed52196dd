use rangebins::{BoxedWork, CoalescingScheduler};

use anyhow::anyhow;
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// A scheduler whose work just counts its invocations.
fn counting_scheduler(pool: &LocalPool) -> (CoalescingScheduler<BoxedWork>, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let work: BoxedWork = Box::new(move || {
        counter.set(counter.get() + 1);
        Ok(())
    });
    (CoalescingScheduler::new(pool.spawner(), work), calls)
}

#[test]
fn burst_of_requests_runs_once() {
    init_logging();

    // number of runs does not grow with the number of requests
    for n in [1, 2, 10, 1000] {
        let mut pool = LocalPool::new();
        let (scheduler, calls) = counting_scheduler(&pool);

        for _ in 0..n {
            scheduler.request_run();
        }
        assert_eq!(calls.get(), 0);

        pool.run_until_stalled();
        assert_eq!(calls.get(), 1);
        assert_eq!(scheduler.run_count(), 1);
        assert!(!scheduler.is_running());
        assert!(!scheduler.is_requested());
    }
}

#[test]
fn idle_scheduler_never_runs() {
    let mut pool = LocalPool::new();
    let (scheduler, calls) = counting_scheduler(&pool);
    pool.run_until_stalled();
    assert_eq!(calls.get(), 0);
    assert!(!scheduler.is_running());
}

#[test]
fn request_after_completion_runs_again() {
    let mut pool = LocalPool::new();
    let (scheduler, calls) = counting_scheduler(&pool);

    for round in 1..=5 {
        scheduler.request_run();
        scheduler.request_run();
        pool.run_until_stalled();
        assert_eq!(calls.get(), round);
    }
}

#[test]
fn clones_share_state() {
    let mut pool = LocalPool::new();
    let (scheduler, calls) = counting_scheduler(&pool);
    let other = scheduler.clone();

    scheduler.request_run();
    other.request_run();
    assert!(other.is_running());

    pool.run_until_stalled();
    assert_eq!(calls.get(), 1);
    assert_eq!(other.run_count(), 1);
}

#[test]
fn queued_tasks_run_before_work() {
    let mut pool = LocalPool::new();
    let events: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&events);
    let scheduler = CoalescingScheduler::new(pool.spawner(), move || {
        log.borrow_mut().push("work");
        Ok(())
    });

    scheduler.request_run();

    let log = Rc::clone(&events);
    pool.spawner()
        .spawn_local(async move { log.borrow_mut().push("other") })
        .unwrap();

    pool.run_until_stalled();
    assert_eq!(*events.borrow(), vec!["other", "work"]);
}

#[test]
fn request_while_pending_is_absorbed_by_the_same_loop() {
    let mut pool = LocalPool::new();
    let (scheduler, calls) = counting_scheduler(&pool);

    scheduler.request_run();

    // runs while the loop is parked at its yield point
    let handle = scheduler.clone();
    pool.spawner()
        .spawn_local(async move {
            assert!(handle.is_running());
            handle.request_run();
        })
        .unwrap();

    pool.run_until_stalled();

    // the first run consumed the original request, the second the late one
    assert_eq!(calls.get(), 2);
    assert!(!scheduler.is_running());
}

#[test]
fn request_from_inside_work_reruns() {
    let mut pool = LocalPool::new();
    let calls = Rc::new(Cell::new(0));
    let slot: Rc<RefCell<Option<CoalescingScheduler<BoxedWork>>>> = Rc::new(RefCell::new(None));

    let counter = Rc::clone(&calls);
    let me = Rc::clone(&slot);
    let work: BoxedWork = Box::new(move || {
        counter.set(counter.get() + 1);
        if counter.get() == 1 {
            if let Some(scheduler) = me.borrow().as_ref() {
                scheduler.request_run();
            }
        }
        Ok(())
    });

    let scheduler = CoalescingScheduler::new(pool.spawner(), work);
    *slot.borrow_mut() = Some(scheduler.clone());

    scheduler.request_run();
    pool.run_until_stalled();
    assert_eq!(calls.get(), 2);

    // break the cycle
    slot.borrow_mut().take();
}

#[test]
fn failing_work_does_not_stop_scheduler() {
    init_logging();

    let mut pool = LocalPool::new();
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let scheduler = CoalescingScheduler::new(pool.spawner(), move || {
        counter.set(counter.get() + 1);
        if counter.get() == 1 {
            Err(anyhow!("first draw failed"))
        } else {
            Ok(())
        }
    });

    scheduler.request_run();
    pool.run_until_stalled();
    assert_eq!(scheduler.run_count(), 1);
    assert_eq!(scheduler.failure_count(), 1);
    assert!(!scheduler.is_running());

    scheduler.request_run();
    pool.run_until_stalled();
    assert_eq!(calls.get(), 2);
    assert_eq!(scheduler.failure_count(), 1);
}

#[test]
fn panicking_work_does_not_stop_scheduler() {
    init_logging();

    let mut pool = LocalPool::new();
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let scheduler = CoalescingScheduler::new(pool.spawner(), move || {
        counter.set(counter.get() + 1);
        if counter.get() == 1 {
            panic!("first draw panicked");
        }
        Ok(())
    });

    scheduler.request_run();
    pool.run_until_stalled();
    assert_eq!(scheduler.failure_count(), 1);

    scheduler.request_run();
    pool.run_until_stalled();
    assert_eq!(calls.get(), 2);
    assert_eq!(scheduler.run_count(), 2);
    assert_eq!(scheduler.failure_count(), 1);
}

#[test]
fn spawn_failure_keeps_request() {
    init_logging();

    let pool = LocalPool::new();
    let (scheduler, calls) = counting_scheduler(&pool);
    drop(pool);

    scheduler.request_run();
    assert_eq!(calls.get(), 0);
    assert!(!scheduler.is_running());
    assert!(scheduler.is_requested());
}
