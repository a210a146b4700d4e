use std::collections::VecDeque;

use thiserror::Error;

use crate::types::Timestamped;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    #[error("element at {ts_ms}ms is older than the newest element at {last_ts_ms}ms")]
    OutOfOrder { last_ts_ms: u64, ts_ms: u64 },
}

/// Time-bounded, time-ordered sequence of elements.
///
/// Elements enter with [`Window::push`] and leave, oldest first, through
/// [`Window::pop_expired`]. An element is retained while
/// `now - ts <= width_ms`.
#[derive(Debug, Clone)]
pub struct Window<T> {
    items: VecDeque<T>,
    width_ms: u64,
    now_ms: Option<u64>,
}

impl<T: Timestamped> Window<T> {
    pub fn new(width_ms: u64) -> Self {
        Self {
            items: VecDeque::new(),
            width_ms,
            now_ms: None,
        }
    }

    /// Append the newest element. Time must not go backwards.
    pub fn push(&mut self, item: T) -> Result<(), WindowError> {
        self.advance_clock(item.ts_ms())?;
        self.items.push_back(item);
        Ok(())
    }

    /// Move the window's notion of "now" forward without adding anything.
    pub fn advance_clock(&mut self, now_ms: u64) -> Result<(), WindowError> {
        if let Some(last_ts_ms) = self.now_ms {
            if now_ms < last_ts_ms {
                return Err(WindowError::OutOfOrder {
                    last_ts_ms,
                    ts_ms: now_ms,
                });
            }
        }
        self.now_ms = Some(now_ms);
        Ok(())
    }

    /// Remove and return the oldest element if it fell outside the window.
    pub fn pop_expired(&mut self) -> Option<T> {
        let now_ms = self.now_ms?;
        let front = self.items.front()?;
        if now_ms - front.ts_ms() > self.width_ms {
            self.items.pop_front()
        } else {
            None
        }
    }

    pub fn width_ms(&self) -> u64 {
        self.width_ms
    }

    pub fn now_ms(&self) -> Option<u64> {
        self.now_ms
    }

    pub fn oldest(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
