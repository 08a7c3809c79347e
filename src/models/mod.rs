// src/models/mod.rs
pub mod chain;
pub mod wallet;

// Re-export commonly used types so other modules can use `crate::models::X`
pub use chain::{OwnedObject, TokenBalance, TransactionPage, TransactionSummary, WalletBalances};
pub use wallet::{ApiResponse, ChatRole, ChatTurn, Contact, ResetSummary};
