//! MindSpark Engine library.
//!
//! Pack purchases, wallets and card collections for the MindSpark card game.
//!
//! ## Structure
//!
//! - `use_cases/` - User story orchestration (open pack, wallet, collection)
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
