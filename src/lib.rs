// src/lib.rs

pub mod api;
pub mod chat;
pub mod config;
pub mod constants;
pub mod errors;
pub mod form;
pub mod logging;
pub mod login;
pub mod models;
pub mod register;
pub mod single_flight;
pub mod terminal;
pub mod view;

pub use api::{ApiClient, Backend};
pub use chat::{display_message, ChatFlow, ChatSettings};
pub use config::Config;
pub use errors::{ClientError, ClientResult};
pub use form::{FormKind, FormOutcome, FormSettings, FormState, PageHandles};
pub use login::LoginFlow;
pub use register::RegisterFlow;
