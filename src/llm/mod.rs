pub mod gemini;
pub mod media;

pub use gemini::{GeminiImageClient, StyleTransfer, StyleTransferError};
pub use media::{InlineImage, InvalidDataUri};
