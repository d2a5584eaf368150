//! CLI commands

mod completions;
mod doctor;
mod identity;
mod keystore;
mod logs;
mod resign;

pub use completions::CompletionsCommand;
pub use doctor::DoctorCommand;
pub use identity::IdentityCommand;
pub use keystore::KeystoreCommand;
pub use logs::LogsCommand;
pub use resign::ResignCommand;
