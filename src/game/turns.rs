//! # Turn Rotation
//!
//! Explicit turn order for encounters.
//!
//! The rotation is a plain state machine: a fixed participant list, the
//! index of whoever acted last, and a flag asking for that participant to
//! act again. Nothing advances until `next` is called.

use crate::EntityId;
use serde::{Deserialize, Serialize};

/// A cyclic turn order over a fixed list of participants.
///
/// # Examples
///
/// ```
/// use wayfarer::{new_entity_id, TurnRotation};
///
/// let (a, b) = (new_entity_id(), new_entity_id());
/// let mut turns = TurnRotation::new(vec![a, b]);
/// assert_eq!(turns.next(), Some(a));
/// assert_eq!(turns.next(), Some(b));
/// turns.repeat_last();
/// assert_eq!(turns.next(), Some(b));
/// assert_eq!(turns.next(), Some(a));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRotation {
    order: Vec<EntityId>,
    /// Index of the participant returned by the last `next`
    cursor: Option<usize>,
    repeat: bool,
}

impl TurnRotation {
    pub fn new(order: Vec<EntityId>) -> Self {
        Self {
            order,
            cursor: None,
            repeat: false,
        }
    }

    /// Advances to and returns the next participant.
    ///
    /// Returns the same participant again if `repeat_last` was called since
    /// the previous advance.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<EntityId> {
        if self.order.is_empty() {
            return None;
        }
        let index = match self.cursor {
            None => 0,
            Some(current) if self.repeat => current,
            Some(current) => (current + 1) % self.order.len(),
        };
        self.repeat = false;
        self.cursor = Some(index);
        Some(self.order[index])
    }

    /// The participant whose turn it currently is.
    pub fn current(&self) -> Option<EntityId> {
        self.cursor.map(|index| self.order[index])
    }

    /// Makes the next `next` call return the current participant again.
    pub fn repeat_last(&mut self) {
        if self.cursor.is_some() {
            self.repeat = true;
        }
    }

    /// Adds a participant at the end of the rotation.
    pub fn push(&mut self, id: EntityId) {
        self.order.push(id);
    }

    /// Drops a participant. The rotation continues with whoever followed it.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let Some(position) = self.order.iter().position(|other| *other == id) else {
            return false;
        };
        self.order.remove(position);

        if self.order.is_empty() {
            self.cursor = None;
            self.repeat = false;
            return true;
        }
        if let Some(current) = self.cursor {
            if position < current {
                self.cursor = Some(current - 1);
            } else if position == current {
                self.repeat = false;
                self.cursor = Some(if position == 0 {
                    self.order.len() - 1
                } else {
                    position - 1
                });
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_entity_id;

    #[test]
    fn test_empty_rotation() {
        let mut turns = TurnRotation::default();
        assert_eq!(turns.next(), None);
        assert_eq!(turns.current(), None);
    }

    #[test]
    fn test_rotation_wraps() {
        let ids: Vec<EntityId> = (0..3).map(|_| new_entity_id()).collect();
        let mut turns = TurnRotation::new(ids.clone());
        let taken: Vec<EntityId> = (0..7).filter_map(|_| turns.next()).collect();
        assert_eq!(
            taken,
            vec![ids[0], ids[1], ids[2], ids[0], ids[1], ids[2], ids[0]]
        );
        assert_eq!(turns.current(), Some(ids[0]));
    }

    #[test]
    fn test_repeat_before_first_turn_is_ignored() {
        let ids: Vec<EntityId> = (0..2).map(|_| new_entity_id()).collect();
        let mut turns = TurnRotation::new(ids.clone());
        turns.repeat_last();
        assert_eq!(turns.next(), Some(ids[0]));
        assert_eq!(turns.next(), Some(ids[1]));
    }

    #[test]
    fn test_remove_current_continues_with_follower() {
        let ids: Vec<EntityId> = (0..3).map(|_| new_entity_id()).collect();
        let mut turns = TurnRotation::new(ids.clone());
        turns.next();
        turns.next(); // ids[1]
        turns.repeat_last();

        assert!(turns.remove(ids[1]));
        assert_eq!(turns.next(), Some(ids[2]));
        assert_eq!(turns.next(), Some(ids[0]));
    }

    #[test]
    fn test_remove_first_while_current() {
        let ids: Vec<EntityId> = (0..3).map(|_| new_entity_id()).collect();
        let mut turns = TurnRotation::new(ids.clone());
        turns.next(); // ids[0]
        assert!(turns.remove(ids[0]));
        assert_eq!(turns.next(), Some(ids[1]));
    }

    #[test]
    fn test_remove_earlier_participant_keeps_position() {
        let ids: Vec<EntityId> = (0..3).map(|_| new_entity_id()).collect();
        let mut turns = TurnRotation::new(ids.clone());
        turns.next();
        turns.next();
        turns.next(); // ids[2]
        assert!(turns.remove(ids[0]));
        assert_eq!(turns.current(), Some(ids[2]));
        assert_eq!(turns.next(), Some(ids[1]));
        assert!(!turns.remove(new_entity_id()));
    }
}
