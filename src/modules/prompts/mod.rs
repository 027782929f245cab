pub mod models;
pub mod repositories;

pub use models::{Account, Prompt};
pub use repositories::{
    AccountRepository, MySqlAccountRepository, MySqlPromptRepository, PromptRepository,
};
