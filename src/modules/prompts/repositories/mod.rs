pub mod account_repository;
pub mod prompt_repository;

pub use account_repository::{AccountRepository, MySqlAccountRepository};
pub use prompt_repository::{MySqlPromptRepository, PromptRepository};
