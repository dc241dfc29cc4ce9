//! 6-bit ASCII text encoding for M.1371 name fields

use bitvec::prelude::*;
use log::warn;

use crate::core::{BitStream, Bits};
use crate::error::{CodecError, Result};

/// Bits per character in the 6-bit alphabet
pub const BITS_PER_CHAR: usize = 6;

/// The "no character" symbol used to right-pad fixed-width text fields
pub const NO_CHARACTER: char = '@';

/// Encoder from 8-bit ASCII to the 6-bit alphabet
pub struct SixBitEncoder;

impl SixBitEncoder {
    /// Map one (already uppercased) character to its 6-bit code
    ///
    /// ASCII 32-63 map to themselves, ASCII 64-95 map to 0-31. Everything
    /// else has no 6-bit representation.
    pub fn encode_char(c: char) -> Option<u8> {
        match c as u32 {
            code @ 32..=63 => Some(code as u8),
            code @ 64..=95 => Some((code - 64) as u8),
            _ => None,
        }
    }

    /// Uppercase `text` and encode every character, failing on the first
    /// character outside the alphabet
    pub fn encode(text: &str) -> Result<BitStream> {
        let upper = text.to_uppercase();
        let mut bits = BitStream::with_capacity(upper.len() * BITS_PER_CHAR);

        for (index, c) in upper.chars().enumerate() {
            let code = Self::encode_char(c).ok_or_else(|| {
                CodecError::invalid_character(format!(
                    "{:?} at position {} has no 6-bit code",
                    c, index
                ))
            })?;
            push_code(&mut bits, code);
        }

        Ok(bits)
    }

    /// Uppercase `text` and encode it, dropping characters outside the
    /// alphabet
    pub fn encode_lossy(text: &str) -> BitStream {
        let upper = text.to_uppercase();
        let mut bits = BitStream::with_capacity(upper.len() * BITS_PER_CHAR);
        let mut dropped = 0usize;

        for c in upper.chars() {
            match Self::encode_char(c) {
                Some(code) => push_code(&mut bits, code),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!("dropped {} character(s) with no 6-bit code", dropped);
        }
        bits
    }
}

fn push_code(bits: &mut BitStream, code: u8) {
    let start = bits.len();
    bits.resize(start + BITS_PER_CHAR, false);
    bits[start..].store_be(code);
}

/// Decoder from the 6-bit alphabet back to 8-bit ASCII
pub struct SixBitDecoder;

impl SixBitDecoder {
    /// Map one 6-bit code back to ASCII
    pub fn decode_char(code: u8) -> char {
        let code = code & 0x3F;
        if code < 32 {
            (code + 64) as char
        } else {
            code as char
        }
    }

    /// Decode a whole text region
    ///
    /// The length must be a multiple of 6. Padding symbols are kept.
    pub fn decode(bits: &Bits) -> Result<String> {
        if bits.len() % BITS_PER_CHAR != 0 {
            return Err(CodecError::invalid_text_length(format!(
                "{} bits is not a multiple of {}",
                bits.len(),
                BITS_PER_CHAR
            )));
        }

        Ok(bits
            .chunks_exact(BITS_PER_CHAR)
            .map(|chunk| Self::decode_char(chunk.load_be::<u8>()))
            .collect())
    }
}

/// Encode text to the 6-bit alphabet, rejecting unrepresentable characters
pub fn encode_to_6bit(text: &str) -> Result<BitStream> {
    SixBitEncoder::encode(text)
}

/// Encode text to the 6-bit alphabet, silently dropping unrepresentable characters
pub fn encode_to_6bit_lossy(text: &str) -> BitStream {
    SixBitEncoder::encode_lossy(text)
}

/// Decode a 6-bit text region to a string
pub fn decode_from_6bit(bits: &Bits) -> Result<String> {
    SixBitDecoder::decode(bits)
}

/// Right-pad `text` with [`NO_CHARACTER`] up to `chars` characters.
///
/// Longer input is returned unchanged.
pub fn pad_text(text: &str, chars: usize) -> String {
    let mut padded = text.to_string();
    let len = padded.chars().count();
    padded.extend(std::iter::repeat(NO_CHARACTER).take(chars.saturating_sub(len)));
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    const BEAM_ME_UP: &str = "BEAM ME UP, SCOTTY!";
    const BEAM_ME_UP_BITS: &str = "000010000101000001001101100000001101000101100000\
                                   010101010000101100100000010011000011001111010100\
                                   010100011001100001";

    fn bits_from_str(s: &str) -> BitStream {
        s.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn test_encode_char() {
        assert_eq!(SixBitEncoder::encode_char('@'), Some(0));
        assert_eq!(SixBitEncoder::encode_char('A'), Some(1));
        assert_eq!(SixBitEncoder::encode_char('_'), Some(31));
        assert_eq!(SixBitEncoder::encode_char(' '), Some(32));
        assert_eq!(SixBitEncoder::encode_char('?'), Some(63));
        assert_eq!(SixBitEncoder::encode_char('a'), None);
        assert_eq!(SixBitEncoder::encode_char('\n'), None);
    }

    #[test]
    fn test_decode_char() {
        assert_eq!(SixBitDecoder::decode_char(0), '@');
        assert_eq!(SixBitDecoder::decode_char(1), 'A');
        assert_eq!(SixBitDecoder::decode_char(32), ' ');
        assert_eq!(SixBitDecoder::decode_char(39), '\'');
    }

    #[test]
    fn test_encode_known_text() -> Result<()> {
        let bits = encode_to_6bit(BEAM_ME_UP)?;
        assert_eq!(bits, bits_from_str(BEAM_ME_UP_BITS));
        Ok(())
    }

    #[test]
    fn test_decode_known_text() -> Result<()> {
        let text = decode_from_6bit(&bits_from_str(BEAM_ME_UP_BITS))?;
        assert_eq!(text, BEAM_ME_UP);
        Ok(())
    }

    #[test]
    fn test_encode_uppercases() -> Result<()> {
        let lower = encode_to_6bit("Beam me up, Scotty!")?;
        assert_eq!(lower, encode_to_6bit(BEAM_ME_UP)?);
        Ok(())
    }

    #[test]
    fn test_roundtrip_full_alphabet() -> Result<()> {
        let alphabet: String = (32u8..=95).map(|c| c as char).collect();
        assert_eq!(decode_from_6bit(&encode_to_6bit(&alphabet)?)?, alphabet);
        Ok(())
    }

    #[test]
    fn test_strict_encoder_rejects_out_of_range() {
        let err = encode_to_6bit("ABC{").unwrap_err();
        assert!(matches!(err, CodecError::InvalidCharacter(_)));
        assert!(encode_to_6bit("caf\u{e9}").is_err());
    }

    #[test]
    fn test_lossy_encoder_drops_out_of_range() {
        let bits = encode_to_6bit_lossy("A{B");
        assert_eq!(bits.len(), 12);
        assert_eq!(decode_from_6bit(&bits).unwrap(), "AB");
    }

    #[test]
    fn test_decode_rejects_partial_character() {
        let bits = bitvec![u8, Msb0; 0; 13];
        let err = decode_from_6bit(&bits).unwrap_err();
        assert!(matches!(err, CodecError::InvalidTextLength(_)));
    }

    #[test]
    fn test_pad_text() {
        assert_eq!(pad_text("ATON", 6), "ATON@@");
        assert_eq!(pad_text("", 3), "@@@");
        assert_eq!(pad_text("TOO LONG", 4), "TOO LONG");
    }
}
