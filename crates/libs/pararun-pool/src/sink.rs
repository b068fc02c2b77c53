//! Overflow buffer for log lines that could not reach the shared log.

use std::borrow::Cow;

use crossbeam_channel::{Receiver, Sender, unbounded};

/// Entry waiting in the fallback sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackEntry {
    /// Fully formatted log line carrying the delayed marker.
    Delayed(String),
    /// Raw trace of an unexpected failure, such as a worker panic.
    Trace(Vec<u8>),
}

impl FallbackEntry {
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FallbackEntry::Delayed(line) => Cow::Borrowed(line),
            FallbackEntry::Trace(bytes) => String::from_utf8_lossy(bytes),
        }
    }
}

/// Unbounded FIFO of [`FallbackEntry`] values.
#[derive(Debug)]
pub struct FallbackSink {
    sender: Sender<FallbackEntry>,
    receiver: Receiver<FallbackEntry>,
}

impl Default for FallbackSink {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackSink {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    pub fn push(&self, entry: FallbackEntry) {
        // The sink owns a receiver, so the channel is never disconnected.
        let _ = self.sender.send(entry);
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Remove and return every queued entry, oldest first.
    ///
    /// Never blocks. Entries pushed once the sink has been emptied stay
    /// queued for a later drain.
    pub fn drain_all(&self) -> Vec<FallbackEntry> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_entries_in_push_order() {
        let sink = FallbackSink::new();
        sink.push(FallbackEntry::Delayed(String::from("first\n")));
        sink.push(FallbackEntry::Trace(b"second\n".to_vec()));
        assert_eq!(sink.len(), 2);

        let drained = sink.drain_all();
        assert_eq!(
            drained,
            vec![
                FallbackEntry::Delayed(String::from("first\n")),
                FallbackEntry::Trace(b"second\n".to_vec()),
            ]
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn drain_leaves_later_entries_for_next_drain() {
        let sink = FallbackSink::new();
        sink.push(FallbackEntry::Delayed(String::from("a\n")));
        assert_eq!(sink.drain_all().len(), 1);

        sink.push(FallbackEntry::Delayed(String::from("b\n")));
        assert_eq!(
            sink.drain_all(),
            vec![FallbackEntry::Delayed(String::from("b\n"))]
        );
        assert!(sink.drain_all().is_empty());
    }

    #[test]
    fn trace_is_decoded_lossily() {
        let entry = FallbackEntry::Trace(vec![b'o', b'k', 0xff]);
        assert_eq!(entry.as_text(), "ok\u{fffd}");
    }
}
