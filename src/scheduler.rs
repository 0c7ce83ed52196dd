//! Coalescing, single-flight scheduling of an expensive callback.
//!
//! `CoalescingScheduler::request_run` can be called as often as a caller likes
//! (e.g. on every input change); the work callback is guaranteed to run at
//! least once after the last request, but bursts of requests collapse into
//! as few runs as possible and at most one run is ever in flight.
//!
//! Everything here is single-threaded: the run loop is a task on a local
//! `futures` executor, and its only suspension point is one `yield_now` before
//! each invocation of the work callback.

use futures::task::{LocalSpawn, LocalSpawnExt};
use log::{error, trace, warn};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// Type-erased work callback, handy when the callback needs to hold a handle
/// to its own scheduler.
pub type BoxedWork = Box<dyn FnMut() -> anyhow::Result<()>>;

struct Inner<W> {
    // a run was asked for and has not started yet
    requested: Cell<bool>,
    // a run loop task exists (spawned and not finished)
    running: Cell<bool>,

    runs: Cell<u64>,
    failures: Cell<u64>,

    work: RefCell<W>,
    spawner: Box<dyn LocalSpawn>,
}

/// Handle to a coalescing scheduler. Clones share the same state and work
/// callback.
///
/// # Examples
/// ```
/// use futures::executor::LocalPool;
/// use rangebins::CoalescingScheduler;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let mut pool = LocalPool::new();
/// let draws = Rc::new(Cell::new(0));
///
/// let counter = Rc::clone(&draws);
/// let scheduler = CoalescingScheduler::new(pool.spawner(), move || {
///     counter.set(counter.get() + 1);
///     Ok(())
/// });
///
/// for _ in 0..10 {
///     scheduler.request_run();
/// }
/// assert_eq!(draws.get(), 0);
///
/// pool.run_until_stalled();
/// assert_eq!(draws.get(), 1);
/// ```
pub struct CoalescingScheduler<W> {
    inner: Rc<Inner<W>>,
}

impl<W> Clone for CoalescingScheduler<W> {
    fn clone(&self) -> Self {
        CoalescingScheduler {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<W> CoalescingScheduler<W>
where
    W: FnMut() -> anyhow::Result<()> + 'static,
{
    /// Create a scheduler whose run loop is spawned onto `spawner`.
    pub fn new<S>(spawner: S, work: W) -> CoalescingScheduler<W>
    where
        S: LocalSpawn + 'static,
    {
        CoalescingScheduler {
            inner: Rc::new(Inner {
                requested: Cell::new(false),
                running: Cell::new(false),
                runs: Cell::new(0),
                failures: Cell::new(0),
                work: RefCell::new(work),
                spawner: Box::new(spawner),
            }),
        }
    }

    /// Ask for the work callback to run. Returns immediately; the callback
    /// runs later on the executor, possibly once for many requests.
    pub fn request_run(&self) {
        let inner = &self.inner;
        inner.requested.set(true);

        if inner.running.get() {
            trace!("run loop already active, request coalesced");
            return;
        }

        inner.running.set(true);
        if let Err(err) = inner.spawner.spawn_local(run_requests(Rc::clone(inner))) {
            // leave `requested` set so the next request retries
            inner.running.set(false);
            warn!("failed to spawn run loop: {}", err);
        }
    }
}

impl<W> CoalescingScheduler<W> {
    /// Number of times the work callback has been invoked, failed runs
    /// included.
    pub fn run_count(&self) -> u64 {
        self.inner.runs.get()
    }

    /// Number of invocations that returned an error or panicked.
    pub fn failure_count(&self) -> u64 {
        self.inner.failures.get()
    }

    /// True while a run loop is scheduled or executing.
    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    /// True if a request is waiting for its run to start.
    pub fn is_requested(&self) -> bool {
        self.inner.requested.get()
    }
}

impl<W> Inner<W>
where
    W: FnMut() -> anyhow::Result<()>,
{
    // Run the callback once. Errors and panics stop here.
    fn run_work(&self) {
        self.runs.set(self.runs.get() + 1);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut work = self.work.borrow_mut();
            (*work)()
        }));

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                self.failures.set(self.failures.get() + 1);
                error!("scheduled work failed: {:#}", err);
            }
            Err(payload) => {
                self.failures.set(self.failures.get() + 1);
                error!("scheduled work panicked: {}", panic_message(&*payload));
            }
        }
    }
}

async fn run_requests<W>(inner: Rc<Inner<W>>)
where
    W: FnMut() -> anyhow::Result<()>,
{
    while inner.requested.replace(false) {
        // let everything already queued go first; requests made meanwhile
        // are picked up by the next iteration
        yield_now().await;
        inner.run_work();
    }
    inner.running.set(false);
    trace!("run loop finished after {} runs", inner.runs.get());
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic payload>"
    }
}

/// Suspend the current task once, re-queueing it behind whatever the executor
/// already has ready to run. No timer is involved.
pub fn yield_now() -> YieldNow {
    YieldNow { yielded: false }
}

/// Future returned by `yield_now`.
#[derive(Debug)]
#[must_use = "futures do nothing unless awaited"]
pub struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}
