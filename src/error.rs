//! Error types for ITU-R M.1371 encoding and decoding

use thiserror::Error;

/// Result type for ITU-R M.1371 codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Error types encountered while packing or unpacking M.1371 bitstreams
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Decoded (DAC, FI) or message ID does not match the expected variant
    #[error("Identification mismatch: {0}")]
    IdentificationMismatch(String),

    /// Trailing application data is not a whole number of bytes
    #[error("Alignment violation: {0}")]
    AlignmentViolation(String),

    /// Bitstream shorter than the layout requires
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Raw-bits value length differs from the declared field width
    #[error("Invalid raw bits width: {0}")]
    InvalidRawBitsWidth(String),

    /// No value supplied for a field
    #[error("Missing value: {0}")]
    MissingValue(String),

    /// Value kind does not match the field kind
    #[error("Field kind mismatch: {0}")]
    FieldKindMismatch(String),

    /// Integer value does not fit the field width
    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),

    /// Character outside the 6-bit alphabet
    #[error("Invalid character: {0}")]
    InvalidCharacter(String),

    /// 6-bit text region whose length is not a multiple of 6
    #[error("Invalid text length: {0}")]
    InvalidTextLength(String),

    /// Malformed hexadecimal literal
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Message ID with no registered decoder
    #[error("Unsupported message: {0}")]
    UnsupportedMessage(String),
}

impl CodecError {
    /// Create a new IdentificationMismatch error
    pub fn identification_mismatch(msg: impl Into<String>) -> Self {
        CodecError::IdentificationMismatch(msg.into())
    }

    /// Create a new AlignmentViolation error
    pub fn alignment_violation(msg: impl Into<String>) -> Self {
        CodecError::AlignmentViolation(msg.into())
    }

    /// Create a new InsufficientData error
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        CodecError::InsufficientData(msg.into())
    }

    /// Create a new InvalidRawBitsWidth error
    pub fn invalid_raw_bits_width(msg: impl Into<String>) -> Self {
        CodecError::InvalidRawBitsWidth(msg.into())
    }

    /// Create a new MissingValue error
    pub fn missing_value(msg: impl Into<String>) -> Self {
        CodecError::MissingValue(msg.into())
    }

    /// Create a new FieldKindMismatch error
    pub fn field_kind_mismatch(msg: impl Into<String>) -> Self {
        CodecError::FieldKindMismatch(msg.into())
    }

    /// Create a new ValueOutOfRange error
    pub fn value_out_of_range(msg: impl Into<String>) -> Self {
        CodecError::ValueOutOfRange(msg.into())
    }

    /// Create a new InvalidCharacter error
    pub fn invalid_character(msg: impl Into<String>) -> Self {
        CodecError::InvalidCharacter(msg.into())
    }

    /// Create a new InvalidTextLength error
    pub fn invalid_text_length(msg: impl Into<String>) -> Self {
        CodecError::InvalidTextLength(msg.into())
    }

    /// Create a new InvalidHex error
    pub fn invalid_hex(msg: impl Into<String>) -> Self {
        CodecError::InvalidHex(msg.into())
    }

    /// Create a new UnsupportedMessage error
    pub fn unsupported_message(msg: impl Into<String>) -> Self {
        CodecError::UnsupportedMessage(msg.into())
    }
}
