//! Blocking FIFO shared by the coordinator and its workers.
//!
//! Besides jobs the queue carries sentinels, one per worker, telling a
//! worker to stop. It also counts unfinished jobs so the coordinator can
//! wait for every dispatched job to be handled before injecting sentinels.

use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};
use pararun_config::Job;
use parking_lot::{Condvar, Mutex};

/// Item travelling through the job queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueItem {
    Job(Job),
    /// No more work for the worker that receives it.
    Sentinel,
}

#[derive(Debug)]
pub struct JobQueue {
    sender: Sender<QueueItem>,
    receiver: Receiver<QueueItem>,
    unfinished: Mutex<usize>,
    all_done: Condvar,
    sentinels_consumed: AtomicUsize,
}

/// Marks a dequeued job as finished when dropped, including during unwinding.
#[must_use = "the job is marked finished as soon as the guard is dropped"]
pub struct TaskGuard<'a> {
    queue: &'a JobQueue,
}

impl Drop for TaskGuard<'_> {
    fn drop(&mut self) {
        self.queue.task_done();
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl JobQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            unfinished: Mutex::new(0),
            all_done: Condvar::new(),
            sentinels_consumed: AtomicUsize::new(0),
        }
    }

    /// Append a job or sentinel at the back of the queue.
    pub fn enqueue(&self, item: QueueItem) {
        if matches!(item, QueueItem::Job(_)) {
            *self.unfinished.lock() += 1;
        }
        // The queue owns a receiver, so the channel is never disconnected.
        let _ = self.sender.send(item);
    }

    /// Remove the front item, blocking the caller until one is available.
    pub fn dequeue(&self) -> QueueItem {
        // The queue owns a sender, so `recv` only returns once an item arrives.
        let item = self.receiver.recv().unwrap_or(QueueItem::Sentinel);
        if item == QueueItem::Sentinel {
            self.sentinels_consumed.fetch_add(1, Ordering::SeqCst);
        }
        item
    }

    /// Number of queued items, sentinels included. Informational only.
    pub fn depth(&self) -> usize {
        self.receiver.len()
    }

    /// Mark one dequeued job as handled.
    pub fn task_done(&self) {
        let mut unfinished = self.unfinished.lock();
        *unfinished = unfinished.saturating_sub(1);
        if *unfinished == 0 {
            self.all_done.notify_all();
        }
    }

    /// Guard calling [`JobQueue::task_done`] when it goes out of scope.
    pub fn task_guard(&self) -> TaskGuard<'_> {
        TaskGuard { queue: self }
    }

    /// Block until every enqueued job has been marked done.
    pub fn wait_until_done(&self) {
        let mut unfinished = self.unfinished.lock();
        while *unfinished > 0 {
            self.all_done.wait(&mut unfinished);
        }
    }

    pub fn unfinished(&self) -> usize {
        *self.unfinished.lock()
    }

    pub fn sentinels_consumed(&self) -> usize {
        self.sentinels_consumed.load(Ordering::SeqCst)
    }
}
