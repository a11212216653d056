//! Small helpers shared by the decoders.

pub mod decompress;
pub mod text;

pub use decompress::inflate_exact;
pub use text::decode_source_text;
