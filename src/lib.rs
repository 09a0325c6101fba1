pub mod catalog;
pub mod config;
pub mod llm;
pub mod session;
pub mod utils;

pub use catalog::{find_style, StyleOption, HAIRSTYLES};
pub use config::{Config, CONFIG};
pub use llm::{GeminiImageClient, InlineImage, StyleTransfer, StyleTransferError};
pub use session::{
    apply_style_shared, ApplyOutcome, ImageAsset, ProcessingStatus, Session, SessionError,
    SharedSession, TransferTicket,
};
