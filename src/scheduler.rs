//! Host frame scheduling
//!
//! Animation in this crate is driven by the host's frame scheduler (a
//! browser's animation-frame callback, a GUI toolkit's repaint request, a
//! test loop). Components ask for the next frame through
//! [`FrameScheduler::request_frame`] and receive a [`FrameRequest`] id; the
//! host later calls back with that id. Cancelling a request guarantees the
//! component ignores it even if the host delivers it anyway.

use std::collections::BTreeSet;

/// Identifier of one pending frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameRequest(pub u64);

/// The host's frame scheduler.
pub trait FrameScheduler {
    /// Ask for a callback on the next frame.
    fn request_frame(&mut self) -> FrameRequest;

    /// Withdraw a previously requested callback.
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// A deterministic scheduler that queues requests until drained.
///
/// Suitable for headless hosts and tests: the host loop pops due requests
/// with [`FrameQueue::drain`] and dispatches them itself.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: BTreeSet<FrameRequest>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, request: FrameRequest) -> bool {
        self.pending.contains(&request)
    }

    /// Take every pending request, oldest first.
    pub fn drain(&mut self) -> Vec<FrameRequest> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.pending.insert(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.pending.remove(&request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_are_unique() {
        let mut q = FrameQueue::new();
        let a = q.request_frame();
        let b = q.request_frame();
        assert_ne!(a, b);
        assert_eq!(q.pending(), 2);
    }

    #[test]
    fn test_cancel_removes_request() {
        let mut q = FrameQueue::new();
        let a = q.request_frame();
        let b = q.request_frame();
        q.cancel_frame(a);
        assert!(!q.is_pending(a));
        assert_eq!(q.drain(), vec![b]);
        assert_eq!(q.pending(), 0);
    }
}
