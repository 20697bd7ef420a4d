//! Core lorepane library (display pipeline, config, logging).

pub mod config;
pub mod context;
pub mod display;
pub mod error;
pub mod logging;
pub mod message;

pub use context::{ActiveCharacterOracle, CharacterId, ContextProvider, EnemyId, EnemyRef};
pub use error::PanelError;
pub use message::{Message, MessageKind, Style, StyledSpan};
