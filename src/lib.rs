//! # ITU-R M.1371 Message Codec
//!
//! Bit-exact encoding and decoding of AIS binary messages as defined by
//! Rec. ITU-R M.1371-5, Annex 8.
//!
//! An application builds a message as plain Rust data, serializes it to the
//! MSB-first bit layout mandated by the standard, and reconstructs messages
//! from received bitstreams. This library provides:
//!
//! - A declarative bit-field pack/unpack engine
//! - 6-bit ASCII text encoding for name fields
//! - ASM payloads identified by (DAC, FI)
//! - AIS Message 8 (binary broadcast) and Message 21 (AtoN report)
//!
//! Link-layer concerns (CRC, bit stuffing, slot framing, scheduling) are out
//! of scope.
//!
//! ## Features
//!
//! - `serde`: Enable serialization/deserialization support
//!
//! ## Example
//!
//! ```
//! use itu_m1371::{core::to_hex, Message8, SampleAsmPayload1};
//!
//! let message = Message8::new(123456789, SampleAsmPayload1::new(2));
//! let bits = message.to_bitstream()?;
//! assert_eq!(to_hex(&bits), "201d6f345400010000");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod core;
pub mod encoding;
pub mod error;
pub mod message;
pub mod parser;
pub mod payload;

pub use crate::core::{BitStream, Bits, FieldKind, FieldSpec, FieldValue, Layout};
pub use encoding::{decode_from_6bit, encode_to_6bit, encode_to_6bit_lossy};
pub use error::{CodecError, Result};
pub use message::{Message21, Message21Builder, Message8, VdesAsm};
pub use parser::{parse, AisMessage};
pub use payload::{ApplicationId, AsmPayload, FromAsmBitstream, RawAsmPayload, SampleAsmPayload1};

/// Normative Rec. ITU-R M.1371 constants
pub mod consts {
    /// Common header width: message ID, repeat indicator, source ID
    pub const HEADER_BITS: usize = 6 + 2 + 30;

    /// Mask clearing the two MSBs of a 32-bit VDES source ID
    pub const SOURCE_ID_MASK: u32 = 0x3FFF_FFFF;

    /// Positions are transmitted in 1/10000 minute
    pub const COORDINATE_SCALE: f64 = 600_000.0;

    /// Longitude "not available"
    pub const LONGITUDE_NOT_AVAILABLE: f64 = 181.0;

    /// Latitude "not available"
    pub const LATITUDE_NOT_AVAILABLE: f64 = 91.0;

    /// Time stamp "not available"
    pub const TIME_STAMP_NOT_AVAILABLE: u8 = 60;

    /// Characters in the Message 21 name field
    pub const ATON_NAME_CHARS: usize = 20;

    /// Total width of Message 21 without name extension
    pub const MESSAGE_21_BITS: usize = 272;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_constants_agree() {
        assert_eq!(consts::HEADER_BITS, 38);
        assert_eq!(message::MESSAGE_21_LAYOUT.bit_len(), consts::MESSAGE_21_BITS);
        assert_eq!(
            message::MESSAGE_8_LAYOUT.bit_len(),
            consts::HEADER_BITS + 2
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let message = Message21::builder(992356001)
            .with_aton_type(30)
            .with_name("JAN'S VIRTUAL ATON")
            .with_position(1.34, 51.92, true)
            .build();
        let parsed = AisMessage::from(message);

        let json = serde_json::to_string(&parsed)?;
        let restored: AisMessage = serde_json::from_str(&json)?;
        assert_eq!(restored, parsed);
        Ok(())
    }
}
