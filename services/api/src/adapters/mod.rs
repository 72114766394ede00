pub mod accounts;
pub mod db;

pub use accounts::PasswordIdentityAdapter;
pub use db::DbAdapter;
