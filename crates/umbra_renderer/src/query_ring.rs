//! Non-blocking readback of the GPU-computed visible count.
//!
//! Reading the indirect args straight after submission would stall until the
//! GPU drains the queue.  Instead every GPU-culled frame copies its args into
//! slot `frame % QUERY_RING_LEN` of a ring of staging buffers, and later
//! frames poll the oldest outstanding slot without waiting.  The count
//! reported is therefore a few frames old; it is a statistic only and never
//! feeds back into drawing.
use std::sync::mpsc;

use crate::indirect::DrawIndexedIndirectArgs;
use crate::resources::buffer;

/// Number of frames that may be in flight before a new one is skipped.
pub const QUERY_RING_LEN: usize = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QueryPoll {
    /// Not finished yet; ask again next frame.
    Pending,
    /// Finished; carries the args as the cull pass left them.
    Complete(DrawIndexedIndirectArgs),
    /// Will never finish (map failure or dropped callback).
    Lost,
}

/// One outstanding GPU completion signal.
pub trait CompletionQuery {
    /// Starts tracking the work submitted for this slot.  Called once per use,
    /// after the commands that feed it have been submitted.
    fn arm(&mut self);

    /// Non-blocking check.  Only called on armed queries.
    fn poll(&mut self) -> QueryPoll;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SlotState {
    Free,
    /// Commands recorded, not yet submitted.
    Reserved { frame: u64 },
    /// Submitted and armed.
    Pending { frame: u64 },
}

struct Slot<Q> {
    query: Q,
    state: SlotState,
}

pub struct FrameQueryRing<Q> {
    slots: Vec<Slot<Q>>,
    last_completed_frame: Option<u64>,
    last_args: Option<DrawIndexedIndirectArgs>,
    skipped_frames: u64,
    lost_queries: u64,
}

impl<Q: CompletionQuery> FrameQueryRing<Q> {
    /// Builds a ring of [`QUERY_RING_LEN`] slots, `make(i)` producing slot `i`.
    pub fn new(mut make: impl FnMut(usize) -> Q) -> Self {
        Self {
            slots: (0..QUERY_RING_LEN)
                .map(|i| Slot {
                    query: make(i),
                    state: SlotState::Free,
                })
                .collect(),
            last_completed_frame: None,
            last_args: None,
            skipped_frames: 0,
            lost_queries: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Claims slot `frame % len` for `frame`.  Returns `None`, and counts the
    /// frame as skipped, when that slot is still in use.
    pub fn reserve(&mut self, frame: u64) -> Option<usize> {
        let index = (frame % self.slots.len() as u64) as usize;
        let slot = &mut self.slots[index];
        if slot.state != SlotState::Free {
            self.skipped_frames += 1;
            log::trace!("query slot {index} busy, frame {frame} not tracked");
            return None;
        }
        slot.state = SlotState::Reserved { frame };
        Some(index)
    }

    #[inline]
    pub fn query(&self, slot: usize) -> &Q {
        &self.slots[slot].query
    }

    /// Arms a reserved slot once its commands have been submitted.
    pub fn commit(&mut self, slot: usize) {
        let entry = &mut self.slots[slot];
        if let SlotState::Reserved { frame } = entry.state {
            entry.query.arm();
            entry.state = SlotState::Pending { frame };
        }
    }

    /// Releases a reserved slot whose commands were never submitted.
    pub fn cancel(&mut self, slot: usize) {
        let entry = &mut self.slots[slot];
        if matches!(entry.state, SlotState::Reserved { .. }) {
            entry.state = SlotState::Free;
        }
    }

    /// Polls the pending slot with the lowest frame id.  Returns
    /// `(frame, visible)` when it completed this call.
    pub fn poll_oldest(&mut self) -> Option<(u64, u32)> {
        let (index, frame) = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| match s.state {
                SlotState::Pending { frame } => Some((i, frame)),
                _ => None,
            })
            .min_by_key(|&(_, frame)| frame)?;

        let slot = &mut self.slots[index];
        match slot.query.poll() {
            QueryPoll::Pending => None,
            QueryPoll::Complete(args) => {
                slot.state = SlotState::Free;
                self.last_completed_frame = Some(frame);
                self.last_args = Some(args);
                Some((frame, args.instance_count))
            }
            QueryPoll::Lost => {
                slot.state = SlotState::Free;
                self.lost_queries += 1;
                log::warn!("visible-count query for frame {frame} was lost");
                None
            }
        }
    }

    /// Polls oldest-first until a slot is not ready.  Returns the newest
    /// completion seen, if any.
    pub fn poll_ready(&mut self) -> Option<(u64, u32)> {
        let mut newest = None;
        loop {
            let before = self.pending_count();
            match self.poll_oldest() {
                Some(done) => newest = Some(done),
                // a lost slot frees up without a result; keep draining
                None if self.pending_count() < before => {}
                None => return newest,
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s.state, SlotState::Pending { .. }))
            .count()
    }

    #[inline]
    pub fn last_completed_frame(&self) -> Option<u64> {
        self.last_completed_frame
    }

    /// Visible count of [`last_completed_frame`](Self::last_completed_frame).
    #[inline]
    pub fn gpu_visible_instances(&self) -> Option<u32> {
        self.last_args.map(|a| a.instance_count)
    }

    /// Full args of [`last_completed_frame`](Self::last_completed_frame).
    #[inline]
    pub fn last_args(&self) -> Option<DrawIndexedIndirectArgs> {
        self.last_args
    }

    #[inline]
    pub fn skipped_frames(&self) -> u64 {
        self.skipped_frames
    }

    #[inline]
    pub fn lost_queries(&self) -> u64 {
        self.lost_queries
    }
}

/// Staging copy of one frame's indirect args, read back with `map_async`.
pub struct ReadbackQuery {
    buffer: wgpu::Buffer,
    receiver: Option<mpsc::Receiver<Result<(), wgpu::BufferAsyncError>>>,
}

impl ReadbackQuery {
    pub fn new(device: &wgpu::Device, index: usize) -> Self {
        let buffer = buffer::create_readback(
            device,
            &format!("Visible Count Readback {index}"),
            DrawIndexedIndirectArgs::SIZE,
        );
        Self {
            buffer,
            receiver: None,
        }
    }

    /// Copy destination for the frame's live args.
    #[inline]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl CompletionQuery for ReadbackQuery {
    fn arm(&mut self) {
        let (tx, rx) = mpsc::channel();
        self.buffer
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                let _ = tx.send(result);
            });
        self.receiver = Some(rx);
    }

    fn poll(&mut self) -> QueryPoll {
        let Some(rx) = &self.receiver else {
            return QueryPoll::Lost;
        };
        match rx.try_recv() {
            Ok(Ok(())) => {
                let args = {
                    let data = self.buffer.slice(..).get_mapped_range();
                    DrawIndexedIndirectArgs::from_bytes(&data)
                };
                self.buffer.unmap();
                self.receiver = None;
                args.map_or(QueryPoll::Lost, QueryPoll::Complete)
            }
            Ok(Err(err)) => {
                log::warn!("visible-count readback failed: {err}");
                self.receiver = None;
                QueryPoll::Lost
            }
            Err(mpsc::TryRecvError::Empty) => QueryPoll::Pending,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.receiver = None;
                QueryPoll::Lost
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays a scripted sequence of poll results; `Pending` once exhausted.
    #[derive(Default)]
    struct Scripted {
        armed: u32,
        script: VecDeque<QueryPoll>,
    }

    impl CompletionQuery for Scripted {
        fn arm(&mut self) {
            self.armed += 1;
        }

        fn poll(&mut self) -> QueryPoll {
            self.script.pop_front().unwrap_or(QueryPoll::Pending)
        }
    }

    fn done(visible: u32) -> DrawIndexedIndirectArgs {
        DrawIndexedIndirectArgs {
            instance_count: visible,
            ..DrawIndexedIndirectArgs::seed(36)
        }
    }

    fn ring() -> FrameQueryRing<Scripted> {
        FrameQueryRing::new(|_| Scripted::default())
    }

    fn issue(ring: &mut FrameQueryRing<Scripted>, frame: u64) -> Option<usize> {
        let slot = ring.reserve(frame)?;
        ring.commit(slot);
        Some(slot)
    }

    #[test]
    fn slot_is_frame_modulo_len() {
        let mut ring = ring();
        assert_eq!(ring.len(), QUERY_RING_LEN);
        assert_eq!(issue(&mut ring, 0), Some(0));
        assert_eq!(issue(&mut ring, 3), Some(3));
        assert_eq!(issue(&mut ring, 17), Some(7));
        assert_eq!(ring.query(7).armed, 1);
    }

    #[test]
    fn busy_slot_skips_the_frame() {
        let mut ring = ring();
        for frame in 0..QUERY_RING_LEN as u64 {
            assert!(issue(&mut ring, frame).is_some());
        }
        // every slot in flight: frame 10 wraps onto slot 0 and is skipped
        assert_eq!(ring.reserve(QUERY_RING_LEN as u64), None);
        assert_eq!(ring.skipped_frames(), 1);
        assert_eq!(ring.pending_count(), QUERY_RING_LEN);
    }

    #[test]
    fn pending_poll_does_not_block_or_report() {
        let mut ring = ring();
        issue(&mut ring, 0);
        assert_eq!(ring.poll_oldest(), None);
        assert_eq!(ring.last_completed_frame(), None);
        assert_eq!(ring.pending_count(), 1);
    }

    #[test]
    fn oldest_frame_is_polled_first() {
        let mut ring = ring();
        // frame 12 lands in slot 2, frame 5 in slot 5: 5 is older
        issue(&mut ring, 12);
        issue(&mut ring, 5);
        ring.slots[2].query.script.push_back(QueryPoll::Complete(done(9)));
        ring.slots[5].query.script.push_back(QueryPoll::Complete(done(4)));

        assert_eq!(ring.poll_oldest(), Some((5, 4)));
        assert_eq!(ring.last_completed_frame(), Some(5));
        assert_eq!(ring.poll_oldest(), Some((12, 9)));
        assert_eq!(ring.gpu_visible_instances(), Some(9));
        assert_eq!(ring.last_args().map(|a| a.index_count), Some(36));
        assert_eq!(ring.pending_count(), 0);
    }

    #[test]
    fn oldest_pending_holds_back_newer() {
        let mut ring = ring();
        issue(&mut ring, 0);
        issue(&mut ring, 1);
        ring.slots[1].query.script.push_back(QueryPoll::Complete(done(3)));
        // frame 0 is not ready, so frame 1 is not looked at yet
        assert_eq!(ring.poll_ready(), None);
        ring.slots[0].query.script.push_back(QueryPoll::Complete(done(2)));
        assert_eq!(ring.poll_ready(), Some((1, 3)));
        assert_eq!(ring.last_completed_frame(), Some(1));
    }

    #[test]
    fn lost_query_frees_its_slot() {
        let mut ring = ring();
        issue(&mut ring, 4);
        ring.slots[4].query.script.push_back(QueryPoll::Lost);
        assert_eq!(ring.poll_oldest(), None);
        assert_eq!(ring.lost_queries(), 1);
        assert_eq!(ring.pending_count(), 0);
        assert_eq!(issue(&mut ring, 14), Some(4));
    }

    #[test]
    fn cancelled_reservation_is_reusable() {
        let mut ring = ring();
        let slot = ring.reserve(2).unwrap();
        assert_eq!(ring.reserve(12), None);
        ring.cancel(slot);
        assert_eq!(ring.query(slot).armed, 0);
        assert_eq!(ring.reserve(12), Some(2));
    }

    #[test]
    fn reserved_slots_are_not_polled() {
        let mut ring = ring();
        ring.reserve(0);
        ring.slots[0].query.script.push_back(QueryPoll::Complete(done(1)));
        assert_eq!(ring.poll_oldest(), None);
        assert_eq!(ring.slots[0].query.script.len(), 1);
    }
}
