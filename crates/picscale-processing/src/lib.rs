//! Image processing for the derivative pipeline: decode/encode ([`codec`]),
//! the resize engine ([`resize`]), and the bounded-concurrency fan-out
//! coordinator ([`fanout`]).

pub mod codec;
pub mod fanout;
pub mod resize;

pub use codec::{CodecError, DecodedImage, SourceFormat};
pub use fanout::FanoutError;
