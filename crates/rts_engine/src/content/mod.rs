mod hashing;
mod tmx;

pub use hashing::sha256_hex;
pub use tmx::{load_tmx, parse_tmx, SourceLocation, TmxError};
