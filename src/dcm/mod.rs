//! Part 10 container in explicit VR little endian.
mod element;
mod encoder;
mod decoder;

use crate::tools::Error;

pub use dicom::dictionary_std::uids::EXPLICIT_VR_LITTLE_ENDIAN;

pub use element::{Element, Value, DataSet, has_long_length, padding_for, header_len, max_len, ITEM};
pub use encoder::{Encoder, EncoderSettings, EncodedObject, StudyEncoding, PathHint};
pub use decoder::{decode, DecodedObject};

pub const PREAMBLE_LEN:usize = 128;
pub const MAGIC:&[u8;4] = b"DICM";
/// character set for objects whose text is plain ASCII
pub const LATIN1:&str = "ISO_IR 100";
/// character set once any text needs more than ASCII
pub const UTF8:&str = "ISO_IR 192";

/// Reports a broken encoder invariant.
///
/// Panics in debug builds, release builds get the error so nothing broken is written.
pub(crate) fn violation(message:String) -> Error
{
	debug_assert!(false,"encoding invariant violated: {message}");
	Error::EncodingInvariantViolation {message}
}
