//! Positional tokens for wiring sibling components
//!
//! When a node hosts several components, an initializer argument can name a
//! sibling by position instead of by value: `Second::Component` in the
//! argument list of the first component means "the second component on this
//! node goes here". `Third` does the same on three-component nodes. The
//! tokens carry no data; [`resolve_sibling`] turns them into an index into
//! the ordered sibling list.

use crate::error::{Result, StageError};

/// Marker for the first component of a multi-component node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum First {
    Component,
}

/// Marker for the second component of a multi-component node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Second {
    Component,
}

/// Marker for the third component of a multi-component node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Third {
    Component,
}

/// Closed set of sibling positions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Position {
    First,
    Second,
    Third,
}

impl Position {
    /// Zero-based index into a sibling list
    pub const fn index(self) -> usize {
        match self {
            Position::First => 0,
            Position::Second => 1,
            Position::Third => 2,
        }
    }
}

/// Implemented by the marker enums to expose their position at compile time
pub trait Positional: Copy + Into<Position> {
    const POSITION: Position;
}

impl Positional for First {
    const POSITION: Position = Position::First;
}

impl Positional for Second {
    const POSITION: Position = Position::Second;
}

impl Positional for Third {
    const POSITION: Position = Position::Third;
}

impl From<First> for Position {
    fn from(_: First) -> Self {
        Position::First
    }
}

impl From<Second> for Position {
    fn from(_: Second) -> Self {
        Position::Second
    }
}

impl From<Third> for Position {
    fn from(_: Third) -> Self {
        Position::Third
    }
}

/// Pick the sibling a positional token refers to
pub fn resolve_sibling<R>(siblings: &[R], position: impl Into<Position>) -> Result<&R> {
    let index = position.into().index();
    siblings.get(index).ok_or(StageError::MissingSibling {
        index,
        len: siblings.len(),
    })
}
