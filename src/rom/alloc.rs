//! Free space bookkeeping for a ROM image

use std::ops::Range;

use tracing::debug;

use super::address::{bank_start, BANK_SIZE};
use crate::error::{Error, Result};

/// Sorted, coalesced set of free `[start, end)` ranges
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeSpace {
    ranges: Vec<Range<usize>>,
}

impl FreeSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    pub fn total(&self) -> usize {
        self.ranges.iter().map(|r| r.len()).sum()
    }

    pub fn contains(&self, addr: usize) -> bool {
        self.ranges.iter().any(|r| r.contains(&addr))
    }

    /// Mark a range reusable, merging with any neighbours it touches
    pub fn deallocate(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        debug!("free {:#08x}..{:#08x}", range.start, range.end);

        let mut merged = range;
        self.ranges.retain(|r| {
            if r.start <= merged.end && merged.start <= r.end {
                merged.start = merged.start.min(r.start);
                merged.end = merged.end.max(r.end);
                false
            } else {
                true
            }
        });
        let idx = self.ranges.partition_point(|r| r.start < merged.start);
        self.ranges.insert(idx, merged);
    }

    /// Take a range out of the free pool, splitting any range it cuts through
    pub fn reserve(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        debug!("reserve {:#08x}..{:#08x}", range.start, range.end);

        let mut kept = Vec::with_capacity(self.ranges.len() + 1);
        for r in self.ranges.drain(..) {
            if r.end <= range.start || range.end <= r.start {
                kept.push(r);
                continue;
            }
            if r.start < range.start {
                kept.push(r.start..range.start);
            }
            if range.end < r.end {
                kept.push(range.end..r.end);
            }
        }
        self.ranges = kept;
    }

    /// First-fit allocation anywhere in free space
    pub fn allocate(&mut self, size: usize) -> Result<usize> {
        self.allocate_by(size, |range| range.start)
    }

    /// First-fit allocation that never straddles a bank boundary
    pub fn allocate_in_bank(&mut self, size: usize) -> Result<usize> {
        if size > BANK_SIZE {
            return Err(self.exhausted(size));
        }
        self.allocate_by(size, |range| {
            let start = range.start;
            if bank_start(start) == bank_start(start + size.max(1) - 1) {
                start
            } else {
                bank_start(start) + BANK_SIZE
            }
        })
    }

    fn allocate_by(
        &mut self,
        size: usize,
        place: impl Fn(&Range<usize>) -> usize,
    ) -> Result<usize> {
        let found = self.ranges.iter().enumerate().find_map(|(i, range)| {
            let start = place(range);
            (start >= range.start && start + size <= range.end).then_some((i, start))
        });
        let (i, start) = found.ok_or_else(|| self.exhausted(size))?;

        let range = self.ranges.remove(i);
        let tail = start + size..range.end;
        if !tail.is_empty() {
            self.ranges.insert(i, tail);
        }
        let head = range.start..start;
        if !head.is_empty() {
            self.ranges.insert(i, head);
        }
        debug!("allocated {size} bytes at {start:#08x}");
        Ok(start)
    }

    fn exhausted(&self, need: usize) -> Error {
        Error::AllocationExhausted {
            what: "free",
            need,
            available: self.ranges.iter().map(|r| r.len()).max().unwrap_or(0),
        }
    }
}

/// Bump allocator over a fixed window
///
/// Blocks are handed out contiguously from the start of the window; nothing
/// is ever returned to it during a pass.
#[derive(Debug, Clone)]
pub struct RangeAllocator {
    what: &'static str,
    cursor: usize,
    end: usize,
}

impl RangeAllocator {
    pub fn new(what: &'static str, window: Range<usize>) -> Self {
        Self { what, cursor: window.start, end: window.end }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.end.saturating_sub(self.cursor)
    }

    pub fn allocate(&mut self, size: usize) -> Result<usize> {
        if self.cursor + size > self.end {
            return Err(Error::AllocationExhausted {
                what: self.what,
                need: size,
                available: self.remaining(),
            });
        }
        let addr = self.cursor;
        self.cursor += size;
        Ok(addr)
    }

    /// Unused tail of the window, if any
    pub fn leftover(&self) -> Option<Range<usize>> {
        (self.cursor < self.end).then(|| self.cursor..self.end)
    }
}
