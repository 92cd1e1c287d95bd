//! Wrapping 8-bit counters owned by each node.

use crate::consts::{MASTER_COUNTER_START, SLAVE_COUNTER_START};

/// Counting direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Counts up, wrapping 255 to 0
    Up,
    /// Counts down, wrapping 0 to 255
    Down,
}

/// A node-local counter. Only its owning node mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LocalCounter {
    value: u8,
    direction: Direction,
}

impl LocalCounter {
    /// Master counter, starting at [`MASTER_COUNTER_START`].
    pub const fn ascending() -> Self {
        Self::starting_at(MASTER_COUNTER_START, Direction::Up)
    }

    /// Slave counter, starting at [`SLAVE_COUNTER_START`].
    pub const fn descending() -> Self {
        Self::starting_at(SLAVE_COUNTER_START, Direction::Down)
    }

    /// Counter with an explicit start value.
    pub const fn starting_at(value: u8, direction: Direction) -> Self {
        Self { value, direction }
    }

    /// Current value.
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Counting direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Advances by one in the counter's direction and returns the new value.
    pub fn step(&mut self) -> u8 {
        self.value = match self.direction {
            Direction::Up => self.value.wrapping_add(1),
            Direction::Down => self.value.wrapping_sub(1),
        };
        self.value
    }
}
