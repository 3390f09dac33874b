use crate::error::InvalidOperation;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed-capacity FIFO ring buffer.
///
/// Storage is allocated once at construction and slots are reused in order.
/// Fullness is tracked with an explicit `count`, so `head == tail` is never
/// used to tell empty from full.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Vec<Option<T>>,
    /// Next write position.
    head: usize,
    /// Oldest live element.
    tail: usize,
    count: usize,
}

impl<T> RingBuffer<T> {
    /// A capacity of zero is accepted: every `write` fails as full and every
    /// `read` fails as empty.
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { slots, head: 0, tail: 0, count: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize { self.count }

    #[inline]
    pub fn capacity(&self) -> usize { self.slots.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.count == 0 }

    #[inline]
    pub fn is_full(&self) -> bool { self.count == self.capacity() }

    /// Free slots left before a plain `write` starts failing.
    #[inline]
    pub fn available(&self) -> usize { self.capacity() - self.count }

    /// Appends `value`, or fails with [`InvalidOperation::Full`] leaving the
    /// buffer unchanged.
    pub fn write(&mut self, value: T) -> Result<(), InvalidOperation> {
        if self.is_full() {
            return Err(InvalidOperation::Full);
        }
        self.store(value);
        Ok(())
    }

    /// Removes and returns the oldest element, or fails with
    /// [`InvalidOperation::Empty`] leaving the buffer unchanged.
    pub fn read(&mut self) -> Result<T, InvalidOperation> {
        if self.is_empty() {
            return Err(InvalidOperation::Empty);
        }
        // Every slot in the live window holds a value.
        let value = self.slots[self.tail].take().ok_or(InvalidOperation::Empty)?;
        self.tail = self.advance(self.tail);
        self.count -= 1;
        Ok(value)
    }

    /// Appends `value` unconditionally. When the buffer is full the oldest
    /// element is evicted and handed back; `len()` stays at capacity.
    ///
    /// With zero capacity there is nowhere to store anything, so `value`
    /// itself comes straight back.
    pub fn force_write(&mut self, value: T) -> Option<T> {
        if !self.is_full() {
            self.store(value);
            return None;
        }
        if self.capacity() == 0 {
            return Some(value);
        }
        let evicted = self.slots[self.head].replace(value);
        self.head = self.advance(self.head);
        self.tail = self.advance(self.tail);
        evicted
    }

    /// Writes according to `policy`. Only [`OverflowPolicy::Reject`] can fail.
    pub fn push(&mut self, value: T, policy: OverflowPolicy) -> Result<Option<T>, InvalidOperation> {
        match policy {
            OverflowPolicy::Reject    => self.write(value).map(|_| None),
            OverflowPolicy::Overwrite => Ok(self.force_write(value)),
        }
    }

    /// Empties the buffer and drops whatever it still held.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    /// Stores at `head` and grows the live window. Caller checks for room.
    fn store(&mut self, value: T) {
        self.slots[self.head] = Some(value);
        self.head = self.advance(self.head);
        self.count += 1;
    }

    #[inline]
    fn advance(&self, idx: usize) -> usize {
        (idx + 1) % self.capacity()
    }
}

/// What a write does when the buffer is already full.
///
/// `force` is accepted as an alias for `overwrite` everywhere a policy is
/// named: config files, command line flags and [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Fail with [`InvalidOperation::Full`].
    #[default]
    Reject,
    /// Evict the oldest element.
    #[serde(alias = "force")]
    #[value(alias = "force")]
    Overwrite,
}

impl OverflowPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            OverflowPolicy::Reject    => "reject",
            OverflowPolicy::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject"    => Ok(OverflowPolicy::Reject),
            "overwrite" | "force" => Ok(OverflowPolicy::Overwrite),
            other => Err(format!("unknown overflow policy '{}' (expected reject or overwrite)", other)),
        }
    }
}
