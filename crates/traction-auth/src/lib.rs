pub mod storage;

pub use storage::{FileTokenStore, MemoryTokenStore, TokenPair, TokenStore};
