//! Debounced value channel for the search box
//!
//! Keystrokes are pushed as they arrive; subscribers only see a value once
//! input has been quiet for the configured window.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
    output: watch::Receiver<T>,
    worker: JoinHandle<()>,
}

impl<T> Debouncer<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Spawn the debounce loop. Must be called inside a tokio runtime.
    pub fn new(initial: T, delay: Duration) -> Self {
        let (input, mut rx) = mpsc::unbounded_channel::<T>();
        let (tx, output) = watch::channel(initial);

        let worker = tokio::spawn(async move {
            let mut pending: Option<T> = None;
            let mut deadline: Option<Instant> = None;

            loop {
                let sleep_until =
                    deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

                tokio::select! {
                    _ = tokio::time::sleep_until(sleep_until), if deadline.is_some() => {
                        deadline = None;
                        if let Some(value) = pending.take() {
                            tx.send_if_modified(|current| {
                                if *current == value {
                                    false
                                } else {
                                    *current = value;
                                    true
                                }
                            });
                        }
                    }
                    next = rx.recv() => match next {
                        Some(value) => {
                            pending = Some(value);
                            deadline = Some(Instant::now() + delay);
                        }
                        None => break,
                    },
                }
            }
        });

        Self {
            input,
            output,
            worker,
        }
    }

    /// Record a new raw value; restarts the quiet window
    pub fn push(&self, value: T) {
        // Receiver lives as long as the worker, which lives as long as self
        let _ = self.input.send(value);
    }

    /// Last settled value
    pub fn current(&self) -> T {
        self.output.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.output.clone()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.worker.abort();
    }
}
