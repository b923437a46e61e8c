pub use self::{board::*, color_source::*, piece::*, position::*};

pub(crate) mod board;
pub(crate) mod color_source;
pub(crate) mod piece;
pub(crate) mod position;
