//! Application Specific Message (ASM) payloads
//!
//! An ASM payload is the binary data portion carried by AIS Message 8 (and
//! by VDES-ASM messages). It starts with a 16-bit application identifier
//! (DAC + FI) followed by byte-aligned application data.

use bitvec::prelude::*;
use log::debug;

use crate::core::{to_bytes, BitStream, Bits, FieldSpec, Layout};
use crate::error::{CodecError, Result};

const APPLICATION_ID_FIELDS: &[FieldSpec] = &[
    FieldSpec::unsigned("dac", 10),
    FieldSpec::unsigned("fi", 6),
];

/// Wire layout of the application identifier
pub const APPLICATION_ID_LAYOUT: Layout =
    Layout::new("application identifier", APPLICATION_ID_FIELDS);

/// Application identifier: Designated Area Code + Function Identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApplicationId {
    dac: u16,
    fi: u8,
}

impl ApplicationId {
    /// Maximum DAC value (10 bits)
    pub const DAC_MAX: u16 = 0x3FF;
    /// Maximum FI value (6 bits)
    pub const FI_MAX: u8 = 0x3F;

    /// Create an identifier, validating both parts fit their fields
    pub fn new(dac: u16, fi: u8) -> Result<Self> {
        if dac > Self::DAC_MAX {
            return Err(CodecError::value_out_of_range(format!(
                "DAC {} out of range [0, {}]",
                dac,
                Self::DAC_MAX
            )));
        }
        if fi > Self::FI_MAX {
            return Err(CodecError::value_out_of_range(format!(
                "FI {} out of range [0, {}]",
                fi,
                Self::FI_MAX
            )));
        }
        Ok(ApplicationId { dac, fi })
    }

    /// Create an identifier without range checks
    ///
    /// Out-of-range parts are rejected later, when the payload is packed.
    pub const fn new_unchecked(dac: u16, fi: u8) -> Self {
        ApplicationId { dac, fi }
    }

    /// Designated Area Code
    pub fn dac(&self) -> u16 {
        self.dac
    }

    /// Function Identifier
    pub fn fi(&self) -> u8 {
        self.fi
    }

    /// Read the identifier from the head of an ASM bitstream.
    ///
    /// Returns the identifier and the bits following it.
    pub fn read(bits: &Bits) -> Result<(Self, &Bits)> {
        let mut fields = APPLICATION_ID_LAYOUT.unpack(bits)?;
        let dac = fields.next_uint::<u16>()?;
        let fi = fields.next_uint::<u8>()?;
        Ok((ApplicationId { dac, fi }, fields.remainder()))
    }

    /// Read the identifier and check it equals `self`, then check the
    /// remaining application data is byte-aligned.
    pub fn verify<'a>(&self, bits: &'a Bits) -> Result<&'a Bits> {
        let (found, data) = Self::read(bits)?;
        if found != *self {
            return Err(CodecError::identification_mismatch(format!(
                "expected {}, found {}",
                self, found
            )));
        }
        check_byte_aligned(data)?;
        Ok(data)
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DAC {} / FI {}", self.dac, self.fi)
    }
}

fn check_byte_aligned(data: &Bits) -> Result<()> {
    if data.len() % 8 != 0 {
        return Err(CodecError::alignment_violation(format!(
            "application data is {} bits, not a whole number of bytes",
            data.len()
        )));
    }
    Ok(())
}

/// A payload that can be carried by Message 8
pub trait AsmPayload {
    /// The (DAC, FI) pair identifying this payload on the wire
    fn application_id(&self) -> ApplicationId;

    /// Application data bits; must be a whole number of bytes
    fn application_data(&self) -> BitStream;

    /// Serialize the identifier followed by the application data
    fn to_bitstream(&self) -> Result<BitStream> {
        let id = self.application_id();
        let data = self.application_data();
        check_byte_aligned(&data)?;

        let mut bits = APPLICATION_ID_LAYOUT.pack(&[id.dac().into(), id.fi().into()])?;
        bits.extend_from_bitslice(&data);
        Ok(bits)
    }
}

/// A payload that can be reconstructed from its own bitstream
pub trait FromAsmBitstream: Sized {
    /// Decode and validate a payload bitstream
    fn from_bitstream(bits: &Bits) -> Result<Self>;
}

/// Sample ASM payload, type 1 (DAC 0, FI 1)
///
/// The application data carries no meaning; it is `n` zero bytes. Useful
/// sizes: 38 bytes fit a single-line VDM sentence carrying Message 8, 66 fill
/// a 3-slot Message 8, 157 fill a 3-slot VDES-ASM broadcast without FEC.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampleAsmPayload1 {
    app_data_bytes: usize,
}

impl SampleAsmPayload1 {
    /// Fixed identifier of this payload type
    pub const APPLICATION_ID: ApplicationId = ApplicationId::new_unchecked(0, 1);

    /// Human-readable application name
    pub const APPLICATION_STR: &'static str = "Sample ASM 1";

    /// Application data size used by [`Default`]
    pub const DEFAULT_APP_DATA_BYTES: usize = 10;

    /// Create a payload with `app_data_bytes` zero bytes of application data
    pub fn new(app_data_bytes: usize) -> Self {
        SampleAsmPayload1 { app_data_bytes }
    }

    /// Size of the application data in bytes
    pub fn app_data_bytes(&self) -> usize {
        self.app_data_bytes
    }
}

impl Default for SampleAsmPayload1 {
    fn default() -> Self {
        Self::new(Self::DEFAULT_APP_DATA_BYTES)
    }
}

impl AsmPayload for SampleAsmPayload1 {
    fn application_id(&self) -> ApplicationId {
        Self::APPLICATION_ID
    }

    fn application_data(&self) -> BitStream {
        bitvec![u8, Msb0; 0; self.app_data_bytes * 8]
    }
}

impl FromAsmBitstream for SampleAsmPayload1 {
    fn from_bitstream(bits: &Bits) -> Result<Self> {
        let data = Self::APPLICATION_ID.verify(bits)?;
        debug!(
            "decoded {} with {} application data bytes",
            Self::APPLICATION_STR,
            data.len() / 8
        );
        Ok(Self::new(data.len() / 8))
    }
}

/// Opaque payload of any application identifier
///
/// Application data is kept as bytes and never interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawAsmPayload {
    application_id: ApplicationId,
    data: Vec<u8>,
}

impl RawAsmPayload {
    /// Wrap application data under the given identifier
    pub fn new(application_id: ApplicationId, data: Vec<u8>) -> Self {
        RawAsmPayload {
            application_id,
            data,
        }
    }

    /// Application data bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl AsmPayload for RawAsmPayload {
    fn application_id(&self) -> ApplicationId {
        self.application_id
    }

    fn application_data(&self) -> BitStream {
        BitStream::from_slice(&self.data)
    }
}

impl FromAsmBitstream for RawAsmPayload {
    fn from_bitstream(bits: &Bits) -> Result<Self> {
        let (application_id, data) = ApplicationId::read(bits)?;
        check_byte_aligned(data)?;
        debug!("decoded raw ASM payload {}, {} bytes", application_id, data.len() / 8);
        Ok(Self::new(application_id, to_bytes(data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{from_hex, to_hex};

    #[test]
    fn test_sample_payload_creation() {
        let payload = SampleAsmPayload1::default();
        assert_eq!(payload.app_data_bytes(), 10);
        assert_eq!(SampleAsmPayload1::APPLICATION_STR, "Sample ASM 1");

        let payload = SampleAsmPayload1::new(2);
        assert_eq!(payload.app_data_bytes(), 2);
        assert_eq!(payload.application_id(), ApplicationId::new(0, 1).unwrap());
    }

    #[test]
    fn test_sample_payload_from_bitstream() -> Result<()> {
        let payload = SampleAsmPayload1::from_bitstream(&from_hex("0x00010000")?)?;
        assert_eq!(payload.app_data_bytes(), 2);
        Ok(())
    }

    #[test]
    fn test_sample_payload_rejects_wrong_identifier() -> Result<()> {
        // DAC 7, FI 33
        let err = SampleAsmPayload1::from_bitstream(&from_hex("0x01E10000")?).unwrap_err();
        assert!(matches!(err, CodecError::IdentificationMismatch(_)));

        // DAC 15, FI 33
        let err = SampleAsmPayload1::from_bitstream(&from_hex("0x03E10000")?).unwrap_err();
        assert!(matches!(err, CodecError::IdentificationMismatch(_)));

        // DAC 1, FI 1
        let err = SampleAsmPayload1::from_bitstream(&from_hex("0x00410000")?).unwrap_err();
        assert!(matches!(err, CodecError::IdentificationMismatch(_)));
        Ok(())
    }

    #[test]
    fn test_sample_payload_rejects_unaligned_data() -> Result<()> {
        let err = SampleAsmPayload1::from_bitstream(&from_hex("0x00010")?).unwrap_err();
        assert!(matches!(err, CodecError::AlignmentViolation(_)));
        Ok(())
    }

    #[test]
    fn test_sample_payload_rejects_truncated_identifier() {
        let err = SampleAsmPayload1::from_bitstream(bits![u8, Msb0; 0; 12]).unwrap_err();
        assert!(matches!(err, CodecError::InsufficientData(_)));
    }

    #[test]
    fn test_sample_payload_bitstream() -> Result<()> {
        let payload = SampleAsmPayload1::new(7);
        let bits = payload.to_bitstream()?;

        assert_eq!(bits.len(), 16 + 7 * 8);
        assert_eq!(bits[..10].load_be::<u16>(), 0);
        assert_eq!(bits[10..16].load_be::<u8>(), 1);
        assert!(bits[16..].not_any());
        Ok(())
    }

    #[test]
    fn test_sample_payload_roundtrip_preserves_size() -> Result<()> {
        for n in [0usize, 1, 38, 157] {
            let payload = SampleAsmPayload1::new(n);
            let decoded = SampleAsmPayload1::from_bitstream(&payload.to_bitstream()?)?;
            assert_eq!(decoded, payload);
        }
        Ok(())
    }

    #[test]
    fn test_application_id_range() {
        assert!(ApplicationId::new(1023, 63).is_ok());
        assert!(ApplicationId::new(1024, 0).is_err());
        assert!(ApplicationId::new(0, 64).is_err());
        assert_eq!(ApplicationId::new(235, 10).unwrap().to_string(), "DAC 235 / FI 10");
    }

    #[test]
    fn test_raw_payload_roundtrip() -> Result<()> {
        let payload = RawAsmPayload::new(ApplicationId::new(235, 10)?, vec![0xde, 0xad]);
        let bits = payload.to_bitstream()?;
        assert_eq!(to_hex(&bits), "3aca dead".replace(' ', ""));

        let decoded = RawAsmPayload::from_bitstream(&bits)?;
        assert_eq!(decoded, payload);
        assert_eq!(decoded.data(), &[0xde, 0xad]);
        Ok(())
    }

    #[test]
    fn test_unchecked_identifier_fails_when_packed() {
        let payload = RawAsmPayload::new(ApplicationId::new_unchecked(2000, 1), vec![]);
        assert!(matches!(
            payload.to_bitstream(),
            Err(CodecError::ValueOutOfRange(_))
        ));
    }
}
