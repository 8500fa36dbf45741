mod decoder;
mod encoder;

pub use self::{decoder::FlateDecoder, encoder::FlateEncoder};
