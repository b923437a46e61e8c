//! Game rules: match detection, the special registry and area effects.
//!
//! Everything here is a plain function over a [`Board`](crate::Board); the
//! sequencing of passes lives in [`engine`](crate::engine).

pub use self::{expansion::*, matching::*, special::*};

mod expansion;
mod matching;
mod special;
