use serde::{Deserialize, Serialize};

/// An ordinary piece color.
///
/// Colors are plain indices into the configured palette (`0..color_count`);
/// the engine never interprets them beyond equality.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct Color(u8);

impl Color {
    /// Largest palette the text format can express (one digit per color).
    pub const MAX_COUNT: u8 = 10;

    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// The next color in a palette of `count` colors, wrapping around.
    #[must_use]
    pub const fn next_in(self, count: u8) -> Self {
        Self((self.0 + 1) % count)
    }

    /// The digit of this color, or `?` for an index the text format cannot
    /// express.
    #[must_use]
    pub const fn as_char(self) -> char {
        if self.0 < Self::MAX_COUNT {
            (b'0' + self.0) as char
        } else {
            '?'
        }
    }

    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        c.to_digit(10).and_then(|d| u8::try_from(d).ok()).map(Self)
    }
}

/// Kinds of special piece.
///
/// Each kind has exactly one entry in the special registry, which carries its
/// trigger rule, mix element and area effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum SpecialKind {
    Bomb,
    HorizontalStripe,
    VerticalStripe,
    WaitingBomb,
    DoubleBomb,
    WaitingDoubleBomb,
    HorizontalBomb,
    VerticalBomb,
    Cross,
}

impl SpecialKind {
    pub const LEN: usize = 9;

    pub const ALL: [Self; Self::LEN] = [
        Self::Bomb,
        Self::HorizontalStripe,
        Self::VerticalStripe,
        Self::WaitingBomb,
        Self::DoubleBomb,
        Self::WaitingDoubleBomb,
        Self::HorizontalBomb,
        Self::VerticalBomb,
        Self::Cross,
    ];

    /// Armed kinds linger on the board after their first detonation.
    #[must_use]
    pub const fn is_armed(self) -> bool {
        matches!(self, Self::WaitingBomb | Self::WaitingDoubleBomb)
    }

    /// The armed kind a detonating piece turns into, if it survives its
    /// first detonation.
    #[must_use]
    pub const fn armed_form(self) -> Option<Self> {
        match self {
            Self::Bomb | Self::HorizontalBomb | Self::VerticalBomb => Some(Self::WaitingBomb),
            Self::DoubleBomb => Some(Self::WaitingDoubleBomb),
            Self::HorizontalStripe
            | Self::VerticalStripe
            | Self::WaitingBomb
            | Self::WaitingDoubleBomb
            | Self::Cross => None,
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Bomb => '*',
            Self::HorizontalStripe => '-',
            Self::VerticalStripe => '|',
            Self::WaitingBomb => 'w',
            Self::DoubleBomb => '@',
            Self::WaitingDoubleBomb => 'W',
            Self::HorizontalBomb => '=',
            Self::VerticalBomb => '!',
            Self::Cross => '+',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '*' => Some(Self::Bomb),
            '-' => Some(Self::HorizontalStripe),
            '|' => Some(Self::VerticalStripe),
            'w' => Some(Self::WaitingBomb),
            '@' => Some(Self::DoubleBomb),
            'W' => Some(Self::WaitingDoubleBomb),
            '=' => Some(Self::HorizontalBomb),
            '!' => Some(Self::VerticalBomb),
            '+' => Some(Self::Cross),
            _ => None,
        }
    }
}

/// What occupies a slot.
///
/// Promotion replaces `Normal` with `Special` and discards the color; a
/// mix turns the source piece into `Spent`, a special-like sentinel with no
/// area effect that is removed in the same pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    Normal(Color),
    Special(SpecialKind),
    Spent,
}

/// A piece on the board.
///
/// Pieces don't store their coordinates; a piece's position is the slot that
/// holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    kind: PieceKind,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    retain: bool,
}

impl Piece {
    #[must_use]
    pub const fn normal(color: Color) -> Self {
        Self {
            kind: PieceKind::Normal(color),
            retain: false,
        }
    }

    #[must_use]
    pub const fn special(kind: SpecialKind) -> Self {
        Self {
            kind: PieceKind::Special(kind),
            retain: false,
        }
    }

    #[must_use]
    pub const fn spent() -> Self {
        Self {
            kind: PieceKind::Spent,
            retain: false,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    /// The color of an ordinary piece; specials have none.
    #[must_use]
    pub const fn color(&self) -> Option<Color> {
        match self.kind {
            PieceKind::Normal(color) => Some(color),
            PieceKind::Special(_) | PieceKind::Spent => None,
        }
    }

    #[must_use]
    pub const fn special_kind(&self) -> Option<SpecialKind> {
        match self.kind {
            PieceKind::Special(kind) => Some(kind),
            PieceKind::Normal(_) | PieceKind::Spent => None,
        }
    }

    /// Specials (including the spent sentinel) never take part in color runs.
    #[must_use]
    pub const fn is_special(&self) -> bool {
        !matches!(self.kind, PieceKind::Normal(_))
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        matches!(self.kind, PieceKind::Special(kind) if kind.is_armed())
    }

    /// Whether the piece must survive the removal step of the current pass.
    #[must_use]
    pub const fn is_retained(&self) -> bool {
        self.retain
    }

    pub(crate) const fn set_kind(&mut self, kind: PieceKind) {
        self.kind = kind;
    }

    pub(crate) const fn set_retained(&mut self, retain: bool) {
        self.retain = retain;
    }

    #[must_use]
    pub const fn as_char(&self) -> char {
        match self.kind {
            PieceKind::Normal(color) => color.as_char(),
            PieceKind::Special(kind) => kind.as_char(),
            PieceKind::Spent => 'x',
        }
    }

    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        if c == 'x' {
            return Some(Self::spent());
        }
        Color::from_char(c)
            .map(Self::normal)
            .or_else(|| SpecialKind::from_char(c).map(Self::special))
    }
}
