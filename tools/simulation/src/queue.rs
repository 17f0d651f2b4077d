//! Time-ordered message queue
//!
//! Min-heap on `(arrival, sequence)`. The sequence number is assigned at
//! enqueue time, so messages sharing an arrival tick pop in the order they
//! were dispatched.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use venue_types::ids::Timestamp;

use crate::message::Message;

#[derive(Debug)]
struct Queued(Message);

impl Queued {
    fn key(&self) -> (Timestamp, u64) {
        (self.0.arrival, self.0.sequence)
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap
        other.key().cmp(&self.key())
    }
}

#[derive(Debug, Default)]
pub struct MessageQueue {
    heap: BinaryHeap<Queued>,
    next_sequence: u64,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue, stamping the message with the next sequence number
    pub fn push(&mut self, mut message: Message) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        message.sequence = sequence;
        self.heap.push(Queued(message));
        sequence
    }

    pub fn pop(&mut self) -> Option<Message> {
        self.heap.pop().map(|queued| queued.0)
    }

    /// Arrival time of the next message due
    pub fn peek_arrival(&self) -> Option<Timestamp> {
        self.heap.peek().map(|queued| queued.0.arrival)
    }

    pub fn peek(&self) -> Option<&Message> {
        self.heap.peek().map(|queued| &queued.0)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Total messages ever enqueued
    pub fn dispatched_count(&self) -> u64 {
        self.next_sequence
    }
}
