use serde::Serialize;

use crate::marketplace::domain::UserId;

/// Card colours available to the employer dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardColor {
    Blue,
    Green,
    Purple,
    Orange,
    Pink,
    Teal,
    Red,
    Indigo,
    Yellow,
    Gray,
}

pub const PALETTE: [CardColor; 10] = [
    CardColor::Blue,
    CardColor::Green,
    CardColor::Purple,
    CardColor::Orange,
    CardColor::Pink,
    CardColor::Teal,
    CardColor::Red,
    CardColor::Indigo,
    CardColor::Yellow,
    CardColor::Gray,
];

/// Three distinct card colours derived from the employer id.
///
/// Each pick consumes one digest byte and indexes into the colours not yet taken, so the
/// result is stable across processes and never repeats a colour.
pub fn palette_for(employer: &UserId) -> [CardColor; 3] {
    let digest = blake3::hash(employer.as_str().as_bytes());
    let bytes = digest.as_bytes();

    let mut remaining = PALETTE.to_vec();
    let mut picked = [CardColor::Blue; 3];
    for (slot, byte) in picked.iter_mut().zip(bytes.iter()) {
        let index = usize::from(*byte) % remaining.len();
        *slot = remaining.remove(index);
    }
    picked
}
