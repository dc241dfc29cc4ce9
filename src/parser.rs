//! Message-level dispatch: decode any supported AIS message from its bitstream

use bitvec::prelude::*;
use log::debug;

use crate::core::{BitStream, Bits};
use crate::error::{CodecError, Result};
use crate::message::{Message21, Message8};
use crate::payload::RawAsmPayload;

const MSG_ID_BITS: usize = 6;

/// A decoded AIS message of any supported type
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AisMessage {
    /// Message 8, payload kept opaque
    BinaryBroadcast(Message8<RawAsmPayload>),
    /// Message 21
    AtonReport(Message21),
}

impl AisMessage {
    /// Message ID of the wrapped message
    pub fn msg_id(&self) -> u8 {
        match self {
            AisMessage::BinaryBroadcast(_) => Message8::<RawAsmPayload>::MSG_ID,
            AisMessage::AtonReport(_) => Message21::MSG_ID,
        }
    }

    /// MMSI of the originating station
    pub fn source_id(&self) -> u32 {
        match self {
            AisMessage::BinaryBroadcast(message) => message.source_id,
            AisMessage::AtonReport(message) => message.source_id,
        }
    }

    /// Serialize the wrapped message
    pub fn to_bitstream(&self) -> Result<BitStream> {
        match self {
            AisMessage::BinaryBroadcast(message) => message.to_bitstream(),
            AisMessage::AtonReport(message) => message.to_bitstream(),
        }
    }
}

impl std::fmt::Display for AisMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AisMessage::BinaryBroadcast(message) => write!(f, "{}", message),
            AisMessage::AtonReport(message) => write!(f, "{}", message),
        }
    }
}

impl From<Message8<RawAsmPayload>> for AisMessage {
    fn from(message: Message8<RawAsmPayload>) -> Self {
        AisMessage::BinaryBroadcast(message)
    }
}

impl From<Message21> for AisMessage {
    fn from(message: Message21) -> Self {
        AisMessage::AtonReport(message)
    }
}

/// Read the message ID from the first 6 bits
pub fn peek_msg_id(bits: &Bits) -> Result<u8> {
    if bits.len() < MSG_ID_BITS {
        return Err(CodecError::insufficient_data(format!(
            "message ID needs {} bits, got {}",
            MSG_ID_BITS,
            bits.len()
        )));
    }
    Ok(bits[..MSG_ID_BITS].load_be::<u8>())
}

/// Decode a message of any supported type
pub fn parse(bits: &Bits) -> Result<AisMessage> {
    let msg_id = peek_msg_id(bits)?;
    debug!("parsing message {} ({} bits)", msg_id, bits.len());

    match msg_id {
        Message21::MSG_ID => Ok(Message21::from_bitstream(bits)?.into()),
        id if id == Message8::<RawAsmPayload>::MSG_ID => {
            Ok(Message8::<RawAsmPayload>::from_bitstream(bits)?.into())
        }
        other => Err(CodecError::unsupported_message(format!(
            "no decoder for message {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{from_hex, to_hex};
    use crate::payload::{AsmPayload, SampleAsmPayload1};

    #[test]
    fn test_peek_msg_id() -> Result<()> {
        assert_eq!(peek_msg_id(&from_hex("0x54")?)?, 21);
        assert_eq!(peek_msg_id(&from_hex("0x20")?)?, 8);
        assert!(peek_msg_id(bits![u8, Msb0; 0; 5]).is_err());
        Ok(())
    }

    #[test]
    fn test_parse_message8() -> Result<()> {
        let bits = from_hex("0x201d6f345400010000")?;
        let message = parse(&bits)?;

        assert_eq!(message.msg_id(), 8);
        assert_eq!(message.source_id(), 123456789);
        match &message {
            AisMessage::BinaryBroadcast(m8) => {
                assert_eq!(
                    m8.payload.application_id(),
                    SampleAsmPayload1::APPLICATION_ID
                );
                assert_eq!(m8.payload.data(), &[0, 0]);
            }
            other => panic!("unexpected message {:?}", other),
        }
        assert_eq!(message.to_bitstream()?, bits);
        Ok(())
    }

    #[test]
    fn test_parse_message21() -> Result<()> {
        let hex = "54ec989a87c50274e9c0b12928a826400a879c00100c44a03b6af000101062078004";
        let message = parse(&from_hex(hex)?)?;

        assert_eq!(message.msg_id(), 21);
        assert_eq!(message.source_id(), 992356001);
        assert!(message.to_string().contains("AtoN name: JAN'S VIRTUAL ATON@@"));
        assert_eq!(to_hex(&message.to_bitstream()?), hex);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_unknown_message() {
        // message 1, position report
        let bits = bitvec![u8, Msb0; 0, 0, 0, 0, 0, 1, 0, 0];
        assert!(matches!(
            parse(&bits),
            Err(CodecError::UnsupportedMessage(_))
        ));
    }

    #[test]
    fn test_parse_rejects_truncated_message21() -> Result<()> {
        let bits = from_hex("0x54ec989a87c5")?;
        assert!(matches!(
            parse(&bits),
            Err(CodecError::InsufficientData(_))
        ));
        Ok(())
    }
}
