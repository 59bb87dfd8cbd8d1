//! Wallet adapters.

pub mod fs_wallet;
pub mod memory_wallet;

pub use fs_wallet::FileSystemWallet;
pub use memory_wallet::InMemoryWallet;
