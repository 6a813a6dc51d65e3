use link::protocol::{FACE1, FACE2, UNKNOWN};

/// What the display is showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DisplayState {
    /// Power-on state: the sleeping face.
    #[default]
    Idle,
    ShowingOne,
    ShowingTwo,
    ShowingSkull,
    /// A token outside the vocabulary arrived.
    ShowingUnknownGlyph,
}

impl DisplayState {
    /// State entered on receiving `token`. Never fails.
    pub fn for_token(token: &str) -> Self {
        match token {
            FACE1 => Self::ShowingOne,
            FACE2 => Self::ShowingTwo,
            UNKNOWN => Self::ShowingSkull,
            _ => Self::ShowingUnknownGlyph,
        }
    }

    /// 5x5 picture, `#` lit and `.` dark.
    pub fn glyph(self) -> [&'static str; 5] {
        match self {
            Self::Idle => [".....", "##.##", ".....", ".###.", "....."],
            Self::ShowingOne => ["..#..", ".##..", "..#..", "..#..", ".###."],
            Self::ShowingTwo => [".##..", "#..#.", "..#..", ".#...", "####."],
            Self::ShowingSkull => [".###.", "#.#.#", "#####", ".###.", ".###."],
            Self::ShowingUnknownGlyph => [".###.", "#...#", "..##.", ".....", "..#.."],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "asleep",
            Self::ShowingOne => "1",
            Self::ShowingTwo => "2",
            Self::ShowingSkull => "skull",
            Self::ShowingUnknownGlyph => "?",
        }
    }
}
