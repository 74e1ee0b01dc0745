use std::cell::RefCell;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, SendError, Sender};

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs blocking storage work off the owner thread.
pub trait TaskRunner {
    fn spawn(&self, task: Task);
}

type Starter = fn() -> io::Result<Sender<Task>>;

/// One long-lived thread draining a FIFO queue, so storage reads and writes
/// land in the order they were issued.
///
/// The thread starts on the first task and exits once the worker is dropped
/// and the queue is drained. If it cannot be started the task runs inline.
pub struct StorageWorker {
    queue: RefCell<Option<Sender<Task>>>,
    start: Starter,
}

impl StorageWorker {
    pub fn new() -> Self {
        Self::with_starter(start_worker_thread)
    }

    fn with_starter(start: Starter) -> Self {
        Self {
            queue: RefCell::new(None),
            start,
        }
    }
}

impl Default for StorageWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskRunner for StorageWorker {
    fn spawn(&self, mut task: Task) {
        let mut queue = self.queue.borrow_mut();
        if let Some(tx) = queue.as_ref() {
            match tx.send(task) {
                Ok(()) => return,
                Err(SendError(returned)) => {
                    tracing::warn!("storage worker stopped; restarting");
                    task = returned;
                }
            }
        }

        *queue = None;
        match (self.start)() {
            Ok(tx) => match tx.send(task) {
                Ok(()) => *queue = Some(tx),
                Err(SendError(task)) => task(),
            },
            Err(err) => {
                tracing::error!(?err, "failed to start storage worker; running task inline");
                task();
            }
        }
    }
}

fn start_worker_thread() -> io::Result<Sender<Task>> {
    let (tx, rx) = mpsc::channel::<Task>();
    std::thread::Builder::new()
        .name("preference-io".to_string())
        .spawn(move || {
            for task in rx {
                if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                    tracing::error!("storage task panicked");
                }
            }
            tracing::debug!("storage worker queue closed");
        })?;
    Ok(tx)
}

#[cfg(test)]
pub(crate) mod queued {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::{Task, TaskRunner};

    /// Holds tasks until the test decides which one completes next.
    #[derive(Clone, Default)]
    pub(crate) struct QueuedRunner {
        tasks: Rc<RefCell<VecDeque<Task>>>,
    }

    impl QueuedRunner {
        pub(crate) fn len(&self) -> usize {
            self.tasks.borrow().len()
        }

        pub(crate) fn run_first(&self) {
            let task = self.tasks.borrow_mut().pop_front().expect("no queued task");
            task();
        }

        pub(crate) fn run_last(&self) {
            let task = self.tasks.borrow_mut().pop_back().expect("no queued task");
            task();
        }

        pub(crate) fn run_all(&self) {
            loop {
                let next = self.tasks.borrow_mut().pop_front();
                match next {
                    Some(task) => task(),
                    None => break,
                }
            }
        }
    }

    impl TaskRunner for QueuedRunner {
        fn spawn(&self, task: Task) {
            self.tasks.borrow_mut().push_back(task);
        }
    }
}
