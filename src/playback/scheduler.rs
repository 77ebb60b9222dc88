/// Tick-driven delay queue for play requests.
///
/// Any thread may schedule; the owner of the tick loop calls [`advance`] once
/// per tick and receives every request whose delay has elapsed.
///
/// [`advance`]: PlaybackScheduler::advance
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use super::PlayRequest;

#[derive(Debug)]
struct Job {
    due: u64,
    seq: u64,
    request: PlayRequest,
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        (self.due, self.seq) == (other.due, other.seq)
    }
}

impl Eq for Job {}

impl PartialOrd for Job {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Job {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

pub struct PlaybackScheduler {
    sender: Sender<Job>,
    receiver: Receiver<Job>,
    pending: Mutex<BinaryHeap<Reverse<Job>>>,
    tick: AtomicU64,
    seq: AtomicU64,
}

impl PlaybackScheduler {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            pending: Mutex::new(BinaryHeap::new()),
            tick: AtomicU64::new(0),
            seq: AtomicU64::new(0),
        }
    }

    /// Ticks elapsed so far.
    pub fn current_tick(&self) -> u64 {
        self.tick.load(AtomicOrdering::Acquire)
    }

    /// Queue `request` to fire `delay` ticks from now (at least one tick).
    pub fn schedule(&self, request: PlayRequest, delay: u64) {
        let due = self.current_tick().saturating_add(delay.max(1));
        let seq = self.seq.fetch_add(1, AtomicOrdering::Relaxed);

        tracing::debug!("Scheduled {} for tick {}", request.native, due);
        // Receiver lives as long as self, so send cannot fail.
        let _ = self.sender.send(Job { due, seq, request });
    }

    /// Move to the next tick and hand every due request to `fire`, in due
    /// order. Returns how many fired.
    pub fn advance(&self, mut fire: impl FnMut(PlayRequest)) -> usize {
        let now = self.tick.fetch_add(1, AtomicOrdering::AcqRel) + 1;

        let due: Vec<Job> = {
            let mut pending = self.pending.lock();
            pending.extend(self.receiver.try_iter().map(Reverse));

            let mut due = Vec::new();
            while pending.peek().is_some_and(|Reverse(job)| job.due <= now) {
                if let Some(Reverse(job)) = pending.pop() {
                    due.push(job);
                }
            }
            due
        };

        let fired = due.len();
        for job in due {
            fire(job.request);
        }
        fired
    }

    /// Requests queued but not yet fired.
    pub fn pending(&self) -> usize {
        self.pending.lock().len() + self.receiver.len()
    }
}

impl Default for PlaybackScheduler {
    fn default() -> Self {
        Self::new()
    }
}
