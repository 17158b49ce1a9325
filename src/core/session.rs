//! Tab-stop navigation for an expanded snippet
//!
//! The dispatcher hands back every remaining stop as an absolute offset. An
//! editor that wants to walk them with Tab keeps a `TabStopSession` and
//! reports its own edits so the pending stops stay in place.

use super::dispatcher::Expansion;

/// Pending tab stops of the most recent expansion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabStopSession {
    /// Stops not yet visited, in navigation order
    stops: Vec<usize>,
    /// Index of the next stop to visit
    next: usize,
}

impl TabStopSession {
    /// Start a session from an expansion's remaining stops
    pub fn new(expansion: &Expansion) -> Self {
        Self::from_stops(expansion.tab_stops.clone())
    }

    pub fn from_stops(stops: Vec<usize>) -> Self {
        Self { stops, next: 0 }
    }

    /// Move to the next stop, if any
    pub fn advance(&mut self) -> Option<usize> {
        let stop = self.stops.get(self.next).copied()?;
        self.next += 1;
        Some(stop)
    }

    /// Stops still ahead of the caret
    pub fn remaining(&self) -> &[usize] {
        &self.stops[self.next..]
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.stops.len()
    }

    /// Drop all pending stops (e.g. on Escape or a caret jump)
    pub fn cancel(&mut self) {
        self.stops.clear();
        self.next = 0;
    }

    /// `len` bytes were inserted at `at`
    pub fn on_insert(&mut self, at: usize, len: usize) {
        for stop in &mut self.stops[self.next..] {
            if *stop >= at {
                *stop = stop.saturating_add(len);
            }
        }
    }

    /// `len` bytes were removed starting at `at`
    pub fn on_delete(&mut self, at: usize, len: usize) {
        let end = at.saturating_add(len);
        for stop in &mut self.stops[self.next..] {
            if *stop >= end {
                *stop -= len;
            } else if *stop > at {
                *stop = at;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_all_stops() {
        let mut session = TabStopSession::from_stops(vec![9, 10]);
        assert_eq!(session.advance(), Some(9));
        assert_eq!(session.remaining(), &[10]);
        assert_eq!(session.advance(), Some(10));
        assert!(session.is_finished());
        assert_eq!(session.advance(), None);
    }

    #[test]
    fn test_empty_session_is_finished() {
        let session = TabStopSession::default();
        assert!(session.is_finished());
        assert!(session.remaining().is_empty());
    }

    #[test]
    fn test_typing_shifts_pending_stops() {
        // caret at 7 inside \frac{|}{}, stops at the second brace and the end
        let mut session = TabStopSession::from_stops(vec![9, 10]);
        session.on_insert(7, 2);
        assert_eq!(session.remaining(), &[11, 12]);
    }

    #[test]
    fn test_insert_after_stop_leaves_it() {
        let mut session = TabStopSession::from_stops(vec![3]);
        session.on_insert(5, 4);
        assert_eq!(session.remaining(), &[3]);
    }

    #[test]
    fn test_delete_shifts_and_collapses() {
        let mut session = TabStopSession::from_stops(vec![4, 6, 12]);
        session.on_delete(3, 4);
        assert_eq!(session.remaining(), &[3, 3, 8]);
    }

    #[test]
    fn test_visited_stops_are_not_shifted() {
        let mut session = TabStopSession::from_stops(vec![2, 5]);
        assert_eq!(session.advance(), Some(2));
        session.on_insert(2, 1);
        assert_eq!(session.remaining(), &[6]);
        assert_eq!(session.advance(), Some(6));
    }

    #[test]
    fn test_huge_edit_lengths_saturate() {
        let mut session = TabStopSession::from_stops(vec![2, 8]);
        session.on_delete(5, usize::MAX);
        assert_eq!(session.remaining(), &[2, 5]);
        session.on_insert(0, usize::MAX);
        assert_eq!(session.remaining(), &[usize::MAX, usize::MAX]);
    }

    #[test]
    fn test_cancel() {
        let mut session = TabStopSession::new(&Expansion {
            text: "ab".to_string(),
            cursor_index: 0,
            tab_stops: vec![1, 2],
        });
        session.cancel();
        assert!(session.is_finished());
    }
}
