mod coords;
mod piece_id;
mod piece_type;

pub use coords::Coords;
pub use piece_id::PieceId;
pub use piece_type::{PieceColor, PieceKind, PieceType};
