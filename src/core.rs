//! Core bitstream types and the declarative bit-field pack/unpack engine
//!
//! Every M.1371 layout is a static table of [`FieldSpec`]s wrapped in a
//! [`Layout`]. Packing walks the table in order and appends each field
//! most-significant-bit first; unpacking reads the same table back and hands
//! whatever follows the fixed portion to the caller as a remainder.

use bitvec::prelude::*;
use log::trace;

use crate::error::{CodecError, Result};

/// Owned, MSB-first bitstream as transmitted on the VHF data link
pub type BitStream = BitVec<u8, Msb0>;

/// Borrowed view into a [`BitStream`]
pub type Bits = BitSlice<u8, Msb0>;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Render a bitstream as lowercase hex, one digit per 4 bits.
///
/// A trailing partial nibble is zero-filled on the right.
pub fn to_hex(bits: &Bits) -> String {
    let mut out = String::with_capacity((bits.len() + 3) / 4);
    for chunk in bits.chunks(4) {
        let nibble = chunk.load_be::<u8>() << (4 - chunk.len());
        out.push(HEX_DIGITS[nibble as usize] as char);
    }
    out
}

/// Parse a hex literal into a bitstream of exactly 4 bits per digit.
///
/// An optional `0x` prefix is accepted and whitespace anywhere is ignored, so
/// literals wrapped across lines parse as one value.
pub fn from_hex(text: &str) -> Result<BitStream> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);

    let mut bits = BitStream::with_capacity(digits.len() * 4);
    for c in digits.chars() {
        let digit = c
            .to_digit(16)
            .ok_or_else(|| CodecError::invalid_hex(format!("'{}' is not a hex digit", c)))?;
        let start = bits.len();
        bits.resize(start + 4, false);
        bits[start..].store_be(digit as u8);
    }
    Ok(bits)
}

/// Pack a bitstream into bytes, zero-filling the final byte if needed
pub fn to_bytes(bits: &Bits) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| chunk.load_be::<u8>() << (8 - chunk.len()))
        .collect()
}

/// Encoding kind of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Big-endian unsigned binary of exact width
    Unsigned,
    /// Two's-complement of exact width
    Signed,
    /// Pre-encoded bits that must already match the width
    Raw,
    /// Zero-filled spare bits, consume no value
    Padding,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Unsigned => write!(f, "uint"),
            FieldKind::Signed => write!(f, "int"),
            FieldKind::Raw => write!(f, "bits"),
            FieldKind::Padding => write!(f, "pad"),
        }
    }
}

/// One entry of a field layout: `(name, width, kind)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, used in diagnostics only
    pub name: &'static str,
    /// Width in bits
    pub width: usize,
    /// Encoding kind
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Unsigned integer field
    pub const fn unsigned(name: &'static str, width: usize) -> Self {
        FieldSpec {
            name,
            width,
            kind: FieldKind::Unsigned,
        }
    }

    /// Two's-complement integer field
    pub const fn signed(name: &'static str, width: usize) -> Self {
        FieldSpec {
            name,
            width,
            kind: FieldKind::Signed,
        }
    }

    /// Raw bits field
    pub const fn raw(name: &'static str, width: usize) -> Self {
        FieldSpec {
            name,
            width,
            kind: FieldKind::Raw,
        }
    }

    /// Spare bits
    pub const fn padding(width: usize) -> Self {
        FieldSpec {
            name: "spare",
            width,
            kind: FieldKind::Padding,
        }
    }
}

impl std::fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}={}", self.kind, self.width, self.name)
    }
}

/// A value supplied to, or produced by, the engine for one non-padding field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Value for an unsigned field
    Unsigned(u64),
    /// Value for a signed field
    Signed(i64),
    /// Value for a raw bits field
    Raw(BitStream),
}

impl FieldValue {
    /// Kind of field this value belongs to
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Unsigned(_) => FieldKind::Unsigned,
            FieldValue::Signed(_) => FieldKind::Signed,
            FieldValue::Raw(_) => FieldKind::Raw,
        }
    }
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(value: $t) -> Self {
                FieldValue::Unsigned(value as u64)
            }
        })*
    };
}

impl_from_unsigned!(u8, u16, u32, u64);

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Unsigned(value as u64)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Signed(value as i64)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Signed(value)
    }
}

impl From<BitStream> for FieldValue {
    fn from(value: BitStream) -> Self {
        FieldValue::Raw(value)
    }
}

/// A named, fixed-width, ordered field layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    name: &'static str,
    fields: &'static [FieldSpec],
}

impl Layout {
    /// Wrap a static field table
    pub const fn new(name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Layout { name, fields }
    }

    /// Layout name (diagnostics)
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Field table in wire order
    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Sum of all field widths
    pub const fn bit_len(&self) -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < self.fields.len() {
            total += self.fields[i].width;
            i += 1;
        }
        total
    }

    /// Pack `values` into a fresh bitstream.
    ///
    /// One value is consumed per non-padding field, in layout order.
    pub fn pack(&self, values: &[FieldValue]) -> Result<BitStream> {
        let mut out = BitStream::with_capacity(self.bit_len());
        self.pack_into(&mut out, values)?;
        Ok(out)
    }

    /// Pack `values` and append them to `out`.
    ///
    /// On error `out` may hold a partially written layout.
    pub fn pack_into(&self, out: &mut BitStream, values: &[FieldValue]) -> Result<()> {
        let mut values = values.iter();

        for field in self.fields {
            if field.kind == FieldKind::Padding {
                out.resize(out.len() + field.width, false);
                continue;
            }

            let value = values.next().ok_or_else(|| {
                CodecError::missing_value(format!(
                    "{}: no value for field '{}'",
                    self.name, field.name
                ))
            })?;

            match (field.kind, value) {
                (FieldKind::Unsigned, FieldValue::Unsigned(v)) => write_unsigned(out, field, *v)?,
                (FieldKind::Signed, FieldValue::Signed(v)) => write_signed(out, field, *v)?,
                (FieldKind::Raw, FieldValue::Raw(bits)) => {
                    if bits.len() != field.width {
                        return Err(CodecError::invalid_raw_bits_width(format!(
                            "field '{}' expects {} bits, got {}",
                            field.name,
                            field.width,
                            bits.len()
                        )));
                    }
                    out.extend_from_bitslice(bits);
                }
                (kind, other) => {
                    return Err(CodecError::field_kind_mismatch(format!(
                        "field '{}' is {}, value is {}",
                        field.name,
                        kind,
                        other.kind()
                    )));
                }
            }
        }

        trace!("packed {} ({} bits)", self.name, self.bit_len());
        Ok(())
    }

    /// Unpack the fixed-width portion of `bits`.
    ///
    /// Bits past [`Layout::bit_len`] are returned untouched as the remainder.
    pub fn unpack<'a>(&self, bits: &'a Bits) -> Result<UnpackedFields<'a>> {
        let needed = self.bit_len();
        if bits.len() < needed {
            return Err(CodecError::insufficient_data(format!(
                "{} needs {} bits, got {}",
                self.name,
                needed,
                bits.len()
            )));
        }

        let mut values = Vec::with_capacity(self.fields.len());
        let mut pos = 0;
        for field in self.fields {
            let slice = &bits[pos..pos + field.width];
            pos += field.width;

            let value = match field.kind {
                FieldKind::Padding => continue,
                FieldKind::Unsigned => {
                    check_int_width(field)?;
                    FieldValue::Unsigned(slice.load_be::<u64>())
                }
                FieldKind::Signed => {
                    check_int_width(field)?;
                    let shift = 64 - field.width;
                    FieldValue::Signed(((slice.load_be::<u64>() << shift) as i64) >> shift)
                }
                FieldKind::Raw => FieldValue::Raw(slice.to_bitvec()),
            };
            values.push((field.name, value));
        }

        trace!(
            "unpacked {} ({} bits, {} remaining)",
            self.name,
            needed,
            bits.len() - needed
        );

        Ok(UnpackedFields {
            layout: self.name,
            values,
            cursor: 0,
            remainder: &bits[needed..],
        })
    }
}

fn check_int_width(field: &FieldSpec) -> Result<()> {
    if !(1..=64).contains(&field.width) {
        return Err(CodecError::value_out_of_range(format!(
            "field '{}' width {} outside 1..=64",
            field.name, field.width
        )));
    }
    Ok(())
}

fn write_unsigned(out: &mut BitStream, field: &FieldSpec, value: u64) -> Result<()> {
    check_int_width(field)?;
    if field.width < 64 && value >> field.width != 0 {
        return Err(CodecError::value_out_of_range(format!(
            "field '{}' value {} does not fit in {} bits",
            field.name, value, field.width
        )));
    }
    let start = out.len();
    out.resize(start + field.width, false);
    out[start..].store_be(value);
    Ok(())
}

fn write_signed(out: &mut BitStream, field: &FieldSpec, value: i64) -> Result<()> {
    check_int_width(field)?;
    if field.width < 64 {
        let max = (1i64 << (field.width - 1)) - 1;
        let min = -max - 1;
        if value < min || value > max {
            return Err(CodecError::value_out_of_range(format!(
                "field '{}' value {} outside [{}, {}]",
                field.name, value, min, max
            )));
        }
    }
    let start = out.len();
    out.resize(start + field.width, false);
    out[start..].store_be(value as u64);
    Ok(())
}

/// Values extracted by [`Layout::unpack`], read back sequentially
#[derive(Debug, Clone)]
pub struct UnpackedFields<'a> {
    layout: &'static str,
    values: Vec<(&'static str, FieldValue)>,
    cursor: usize,
    remainder: &'a Bits,
}

impl<'a> UnpackedFields<'a> {
    /// Bits following the fixed-width portion
    pub fn remainder(&self) -> &'a Bits {
        self.remainder
    }

    /// Look a value up by field name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    /// Number of non-padding values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the layout had no non-padding fields
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn next_value(&mut self) -> Result<(&'static str, FieldValue)> {
        let entry = self.values.get(self.cursor).cloned().ok_or_else(|| {
            CodecError::missing_value(format!(
                "{}: read past the last of {} fields",
                self.layout,
                self.values.len()
            ))
        })?;
        self.cursor += 1;
        Ok(entry)
    }

    /// Read the next value as an unsigned integer
    pub fn next_unsigned(&mut self) -> Result<u64> {
        match self.next_value()? {
            (_, FieldValue::Unsigned(v)) => Ok(v),
            (name, other) => Err(CodecError::field_kind_mismatch(format!(
                "field '{}' holds {}, read as uint",
                name,
                other.kind()
            ))),
        }
    }

    /// Read the next unsigned value and narrow it to `T`
    pub fn next_uint<T: TryFrom<u64>>(&mut self) -> Result<T> {
        let value = self.next_unsigned()?;
        T::try_from(value).map_err(|_| {
            CodecError::value_out_of_range(format!(
                "{}: value {} does not fit target type",
                self.layout, value
            ))
        })
    }

    /// Read the next value as a signed integer
    pub fn next_signed(&mut self) -> Result<i64> {
        match self.next_value()? {
            (_, FieldValue::Signed(v)) => Ok(v),
            (name, other) => Err(CodecError::field_kind_mismatch(format!(
                "field '{}' holds {}, read as int",
                name,
                other.kind()
            ))),
        }
    }

    /// Read the next value as raw bits
    pub fn next_raw(&mut self) -> Result<BitStream> {
        match self.next_value()? {
            (_, FieldValue::Raw(bits)) => Ok(bits),
            (name, other) => Err(CodecError::field_kind_mismatch(format!(
                "field '{}' holds {}, read as bits",
                name,
                other.kind()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FIELDS: &[FieldSpec] = &[
        FieldSpec::unsigned("id", 6),
        FieldSpec::padding(2),
        FieldSpec::signed("offset", 12),
        FieldSpec::raw("tag", 4),
    ];
    const SAMPLE: Layout = Layout::new("sample", SAMPLE_FIELDS);

    #[test]
    fn test_layout_bit_len() {
        assert_eq!(SAMPLE.bit_len(), 24);
        assert_eq!(SAMPLE.fields().len(), 4);
    }

    #[test]
    fn test_pack_field_order_and_padding() -> Result<()> {
        let bits = SAMPLE.pack(&[
            FieldValue::Unsigned(0b101010),
            FieldValue::Signed(-1),
            FieldValue::Raw(bitvec![u8, Msb0; 1, 0, 0, 1]),
        ])?;

        assert_eq!(bits.len(), 24);
        assert_eq!(to_hex(&bits), "a8fff9");
        Ok(())
    }

    #[test]
    fn test_unpack_sign_extends_and_keeps_remainder() -> Result<()> {
        let mut bits = from_hex("0xa8800f")?;
        bits.extend_from_bitslice(bits![u8, Msb0; 1, 1, 0]);

        let mut fields = SAMPLE.unpack(&bits)?;
        assert_eq!(fields.len(), 3);
        assert_eq!(fields.next_unsigned()?, 42);
        assert_eq!(fields.next_signed()?, -2048);
        assert_eq!(fields.next_raw()?, bitvec![u8, Msb0; 1, 1, 1, 1]);
        assert_eq!(fields.remainder(), bits![u8, Msb0; 1, 1, 0]);
        Ok(())
    }

    #[test]
    fn test_pack_rejects_missing_value() {
        let err = SAMPLE.pack(&[FieldValue::Unsigned(1)]).unwrap_err();
        assert!(matches!(err, CodecError::MissingValue(_)));
    }

    #[test]
    fn test_pack_rejects_raw_width() {
        let err = SAMPLE
            .pack(&[
                FieldValue::Unsigned(1),
                FieldValue::Signed(0),
                FieldValue::Raw(bitvec![u8, Msb0; 1, 0, 1]),
            ])
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidRawBitsWidth(_)));
    }

    #[test]
    fn test_pack_rejects_kind_mismatch() {
        let err = SAMPLE
            .pack(&[FieldValue::Signed(1), FieldValue::Signed(0)])
            .unwrap_err();
        assert!(matches!(err, CodecError::FieldKindMismatch(_)));
    }

    #[test]
    fn test_pack_rejects_out_of_range() {
        let raw = FieldValue::Raw(bitvec![u8, Msb0; 0; 4]);

        let err = SAMPLE
            .pack(&[FieldValue::Unsigned(64), FieldValue::Signed(0), raw.clone()])
            .unwrap_err();
        assert!(matches!(err, CodecError::ValueOutOfRange(_)));

        let err = SAMPLE
            .pack(&[FieldValue::Unsigned(0), FieldValue::Signed(2048), raw.clone()])
            .unwrap_err();
        assert!(matches!(err, CodecError::ValueOutOfRange(_)));

        assert!(SAMPLE
            .pack(&[FieldValue::Unsigned(63), FieldValue::Signed(-2048), raw])
            .is_ok());
    }

    #[test]
    fn test_unpack_rejects_short_input() {
        let bits = from_hex("a8800").unwrap();
        let err = SAMPLE.unpack(&bits).unwrap_err();
        assert!(matches!(err, CodecError::InsufficientData(_)));
    }

    #[test]
    fn test_unpacked_kind_mismatch_on_read() -> Result<()> {
        let bits = from_hex("a8800f")?;
        let mut fields = SAMPLE.unpack(&bits)?;
        assert!(matches!(
            fields.next_signed(),
            Err(CodecError::FieldKindMismatch(_))
        ));
        assert_eq!(fields.get("offset"), Some(&FieldValue::Signed(-2048)));
        Ok(())
    }

    #[test]
    fn test_next_uint_narrows() -> Result<()> {
        let bits = from_hex("a8800f")?;
        let mut fields = SAMPLE.unpack(&bits)?;
        let id: u8 = fields.next_uint()?;
        assert_eq!(id, 42);
        Ok(())
    }

    #[test]
    fn test_hex_helpers() -> Result<()> {
        let bits = from_hex("0x00010")?;
        assert_eq!(bits.len(), 20);
        assert_eq!(to_hex(&bits), "00010");

        let bits = from_hex("0x201d\n   6f34")?;
        assert_eq!(to_bytes(&bits), vec![0x20, 0x1d, 0x6f, 0x34]);

        assert_eq!(to_hex(bits![u8, Msb0; 1, 1]), "c");
        assert_eq!(to_bytes(bits![u8, Msb0; 1, 0, 1]), vec![0xa0]);
        assert!(matches!(from_hex("0xzz"), Err(CodecError::InvalidHex(_))));
        Ok(())
    }

    #[test]
    fn test_field_spec_display() {
        assert_eq!(FieldSpec::unsigned("dac", 10).to_string(), "uint:10=dac");
        assert_eq!(FieldSpec::padding(2).to_string(), "pad:2=spare");
    }
}
