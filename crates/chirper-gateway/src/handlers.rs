mod chirps;

pub use chirps::{count_chirps_handler, create_chirp_handler, list_chirps_handler};
