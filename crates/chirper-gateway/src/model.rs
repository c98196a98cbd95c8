pub mod chirp;

pub use chirp::{CountQuery, CreateChirpResponse, TagFilter};
