// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-thread deferred work queue.
//!
//! [`Dispatcher`] holds work that must run "later on this thread": after the
//! current burst of layout and scene notifications has been handled. The
//! application decides when that is by servicing the queue, typically once
//! per trip around its event loop.
//!
//! The queue is deliberately `!Send`. Everything it holds touches native
//! window state that belongs to the thread that created the windows.

use alloc::collections::VecDeque;
use core::marker::PhantomData;

/// Relative urgency of queued work. Higher priorities drain first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    /// Idle-time work.
    Background,
    /// Runs after pending input has been processed.
    #[default]
    Input,
    /// Runs alongside rendering.
    Render,
    /// Runs as soon as the current operation returns.
    Normal,
}

impl Priority {
    const COUNT: usize = 4;

    /// Queue index, highest priority first.
    const fn slot(self) -> usize {
        match self {
            Self::Normal => 0,
            Self::Render => 1,
            Self::Input => 2,
            Self::Background => 3,
        }
    }
}

/// A priority queue of deferred tasks, FIFO within each priority.
pub struct Dispatcher<T> {
    queues: [VecDeque<T>; Priority::COUNT],
    _not_send: PhantomData<*const ()>,
}

impl<T> core::fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pending", &self.len())
            .finish_non_exhaustive()
    }
}

impl<T> Default for Dispatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Dispatcher<T> {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queues: [
                VecDeque::new(),
                VecDeque::new(),
                VecDeque::new(),
                VecDeque::new(),
            ],
            _not_send: PhantomData,
        }
    }

    /// Queues `task` at `priority`.
    pub fn post(&mut self, priority: Priority, task: T) {
        self.queues[priority.slot()].push_back(task);
    }

    /// Removes the next task to run, with its priority.
    pub fn pop(&mut self) -> Option<(Priority, T)> {
        const ORDER: [Priority; Priority::COUNT] = [
            Priority::Normal,
            Priority::Render,
            Priority::Input,
            Priority::Background,
        ];
        ORDER.into_iter().find_map(|priority| {
            self.queues[priority.slot()]
                .pop_front()
                .map(|task| (priority, task))
        })
    }

    /// Number of queued tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(VecDeque::is_empty)
    }

    /// Drops every queued task.
    pub fn clear(&mut self) {
        for queue in &mut self.queues {
            queue.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn higher_priority_drains_first() {
        let mut d = Dispatcher::new();
        d.post(Priority::Background, "idle");
        d.post(Priority::Input, "input");
        d.post(Priority::Normal, "now");
        d.post(Priority::Render, "render");
        let order: Vec<_> = core::iter::from_fn(|| d.pop()).map(|(_, t)| t).collect();
        assert_eq!(order, ["now", "render", "input", "idle"]);
    }

    #[test]
    fn fifo_within_priority() {
        let mut d = Dispatcher::new();
        d.post(Priority::Input, 1);
        d.post(Priority::Input, 2);
        d.post(Priority::Input, 3);
        assert_eq!(d.len(), 3);
        assert_eq!(d.pop(), Some((Priority::Input, 1)));
        assert_eq!(d.pop(), Some((Priority::Input, 2)));
        assert_eq!(d.pop(), Some((Priority::Input, 3)));
        assert!(d.is_empty());
        assert_eq!(d.pop(), None);
    }

    #[test]
    fn priority_ordering_matches_urgency() {
        assert!(Priority::Normal > Priority::Render);
        assert!(Priority::Render > Priority::Input);
        assert!(Priority::Input > Priority::Background);
        assert_eq!(Priority::default(), Priority::Input);
    }
}
