//! AIS message types (Rec. ITU-R M.1371-5, Annex 8)

use log::debug;

use crate::consts::{
    ATON_NAME_CHARS, COORDINATE_SCALE, LATITUDE_NOT_AVAILABLE, LONGITUDE_NOT_AVAILABLE,
    SOURCE_ID_MASK, TIME_STAMP_NOT_AVAILABLE,
};
use crate::core::{to_hex, BitStream, Bits, FieldSpec, FieldValue, Layout, UnpackedFields};
use crate::encoding::{decode_from_6bit, encode_to_6bit, pad_text};
use crate::error::{CodecError, Result};
use crate::payload::{AsmPayload, FromAsmBitstream};

/// Repeat indicator of locally originated messages
pub const REPEAT_INDICATOR: u8 = 0;

const MESSAGE_8_FIELDS: &[FieldSpec] = &[
    FieldSpec::unsigned("msg_id", 6),
    FieldSpec::unsigned("repeat_indicator", 2),
    FieldSpec::unsigned("source_id", 30),
    FieldSpec::padding(2),
];

const MESSAGE_21_FIELDS: &[FieldSpec] = &[
    FieldSpec::unsigned("msg_id", 6),
    FieldSpec::unsigned("repeat_indicator", 2),
    FieldSpec::unsigned("source_id", 30),
    FieldSpec::unsigned("aton_type", 5),
    FieldSpec::raw("aton_name", ATON_NAME_CHARS * 6),
    FieldSpec::unsigned("pos_accuracy", 1),
    FieldSpec::signed("lon", 28),
    FieldSpec::signed("lat", 27),
    FieldSpec::unsigned("dimension_a", 9),
    FieldSpec::unsigned("dimension_b", 9),
    FieldSpec::unsigned("dimension_c", 6),
    FieldSpec::unsigned("dimension_d", 6),
    FieldSpec::unsigned("epf_device_type", 4),
    FieldSpec::unsigned("time_stamp", 6),
    FieldSpec::unsigned("off_position", 1),
    FieldSpec::unsigned("aton_status", 8),
    FieldSpec::unsigned("raim_fl", 1),
    FieldSpec::unsigned("vaton_fl", 1),
    FieldSpec::unsigned("assigned_mode_fl", 1),
    FieldSpec::padding(1),
];

/// Message 8 header: common header plus 2 spare bits, payload follows
pub const MESSAGE_8_LAYOUT: Layout = Layout::new("AIS message 8", MESSAGE_8_FIELDS);

/// Complete fixed layout of Message 21
pub const MESSAGE_21_LAYOUT: Layout = Layout::new("AIS message 21", MESSAGE_21_FIELDS);

/// Read `msg_id`, `repeat_indicator` and `source_id`, checking the message ID
fn read_header(fields: &mut UnpackedFields<'_>, expected: u8) -> Result<u32> {
    let msg_id = fields.next_uint::<u8>()?;
    if msg_id != expected {
        return Err(CodecError::identification_mismatch(format!(
            "expected message {}, found message {}",
            expected, msg_id
        )));
    }

    let repeat_indicator = fields.next_uint::<u8>()?;
    let source_id = fields.next_uint::<u32>()?;
    if repeat_indicator != REPEAT_INDICATOR {
        debug!(
            "message {} from {} repeated {} time(s)",
            msg_id, source_id, repeat_indicator
        );
    }
    Ok(source_id)
}

fn degrees_to_fixed(field: &str, degrees: f64) -> Result<i64> {
    if !degrees.is_finite() {
        return Err(CodecError::value_out_of_range(format!(
            "{} {} is not a finite coordinate",
            field, degrees
        )));
    }
    Ok((degrees * COORDINATE_SCALE).round_ties_even() as i64)
}

fn fixed_to_degrees(fixed: i64) -> f64 {
    fixed as f64 / COORDINATE_SCALE
}

/// A VDES Application Specific Message that can be re-issued as Message 8
pub trait VdesAsm {
    /// Payload type carried by the message
    type Payload: AsmPayload;

    /// 32-bit VDES source identifier
    fn source_id(&self) -> u32;

    /// Take ownership of the carried payload
    fn into_asm_payload(self) -> Self::Payload;
}

/// AIS Message 8: Binary broadcast message
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message8<P> {
    /// MMSI of the source station
    pub source_id: u32,
    /// Binary data portion
    pub payload: P,
}

impl<P> Message8<P> {
    /// Message ID
    pub const MSG_ID: u8 = 8;
    /// Message type description
    pub const MSG_TYPE_STR: &'static str = "AIS Binary broadcast message";

    /// Create a new binary broadcast message
    pub fn new(source_id: u32, payload: P) -> Self {
        Message8 { source_id, payload }
    }
}

impl<P: AsmPayload> Message8<P> {
    /// Re-issue a VDES ASM as an AIS binary broadcast.
    ///
    /// The two most-significant bits of the 32-bit VDES source ID are cleared.
    pub fn from_vdes_asm<V>(vdes_asm: V) -> Self
    where
        V: VdesAsm<Payload = P>,
    {
        let source_id = vdes_asm.source_id() & SOURCE_ID_MASK;
        Message8::new(source_id, vdes_asm.into_asm_payload())
    }

    /// Serialize header, spare bits and the payload bitstream
    pub fn to_bitstream(&self) -> Result<BitStream> {
        let mut bits = MESSAGE_8_LAYOUT.pack(&[
            Self::MSG_ID.into(),
            REPEAT_INDICATOR.into(),
            self.source_id.into(),
        ])?;
        bits.extend_from_bitslice(&self.payload.to_bitstream()?);
        Ok(bits)
    }
}

impl<P: FromAsmBitstream> Message8<P> {
    /// Decode the header and hand the rest to the payload decoder
    pub fn from_bitstream(bits: &Bits) -> Result<Self> {
        let mut fields = MESSAGE_8_LAYOUT.unpack(bits)?;
        let source_id = read_header(&mut fields, Self::MSG_ID)?;
        let payload = P::from_bitstream(fields.remainder())?;
        debug!("decoded message 8 from {}", source_id);
        Ok(Message8::new(source_id, payload))
    }
}

impl<P: AsmPayload> std::fmt::Display for Message8<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "AIS Message 8: Binary Broadcast Message")?;
        writeln!(f, "---------------------------------------")?;
        writeln!(f, "Source ID: {}", self.source_id)?;
        match self.payload.to_bitstream() {
            Ok(bits) => write!(f, "Binary Data: 0x{}", to_hex(&bits)),
            Err(err) => write!(f, "Binary Data: <{}>", err),
        }
    }
}

/// AIS Message 21: Aids-to-navigation report
///
/// Field values are not range checked here; values that do not fit their
/// wire width are rejected by [`Message21::to_bitstream`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message21 {
    /// MMSI of the sending station
    pub source_id: u32,
    /// Type of AtoN (0-31)
    pub aton_type: u8,
    /// Name of AtoN, up to 20 characters
    pub aton_name: String,
    /// Position accuracy (true = high, < 10 m)
    pub pos_accuracy: bool,
    /// Longitude in degrees
    pub lon: f64,
    /// Latitude in degrees
    pub lat: f64,
    /// Dimension / reference for position [A, B, C, D] in metres
    pub dimension: [u16; 4],
    /// Type of electronic position fixing device (0-15)
    pub epf_device_type: u8,
    /// UTC second of the position fix (0-63)
    pub time_stamp: u8,
    /// Off-position indicator
    pub off_position: bool,
    /// AtoN status bits
    pub aton_status: u8,
    /// RAIM flag
    pub raim_fl: bool,
    /// Virtual AtoN flag
    pub vaton_fl: bool,
    /// Assigned mode flag
    pub assigned_mode_fl: bool,
    /// Name extension; never transmitted, always empty after decoding
    pub aton_name_extension: String,
}

impl Message21 {
    /// Message ID
    pub const MSG_ID: u8 = 21;
    /// Message type description
    pub const MSG_TYPE_STR: &'static str = "Aids-to-navigation report";

    /// Create a new AtoN report with an empty name extension
    ///
    /// Set a name extension through [`Message21Builder::with_name_extension`]
    /// or the `aton_name_extension` field.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source_id: u32,
        aton_type: u8,
        aton_name: impl Into<String>,
        pos_accuracy: bool,
        lon: f64,
        lat: f64,
        dimension: [u16; 4],
        epf_device_type: u8,
        time_stamp: u8,
        off_position: bool,
        aton_status: u8,
        raim_fl: bool,
        vaton_fl: bool,
        assigned_mode_fl: bool,
    ) -> Self {
        Message21 {
            source_id,
            aton_type,
            aton_name: aton_name.into(),
            pos_accuracy,
            lon,
            lat,
            dimension,
            epf_device_type,
            time_stamp,
            off_position,
            aton_status,
            raim_fl,
            vaton_fl,
            assigned_mode_fl,
            aton_name_extension: String::new(),
        }
    }

    /// Start a builder for an AtoN report from `source_id`
    pub fn builder(source_id: u32) -> Message21Builder {
        Message21Builder::new(source_id)
    }

    /// Serialize the report into its 272-bit wire form
    pub fn to_bitstream(&self) -> Result<BitStream> {
        let name = encode_to_6bit(&pad_text(&self.aton_name, ATON_NAME_CHARS))?;
        let [dim_a, dim_b, dim_c, dim_d] = self.dimension;

        MESSAGE_21_LAYOUT.pack(&[
            Self::MSG_ID.into(),
            REPEAT_INDICATOR.into(),
            self.source_id.into(),
            self.aton_type.into(),
            FieldValue::Raw(name),
            self.pos_accuracy.into(),
            degrees_to_fixed("lon", self.lon)?.into(),
            degrees_to_fixed("lat", self.lat)?.into(),
            dim_a.into(),
            dim_b.into(),
            dim_c.into(),
            dim_d.into(),
            self.epf_device_type.into(),
            self.time_stamp.into(),
            self.off_position.into(),
            self.aton_status.into(),
            self.raim_fl.into(),
            self.vaton_fl.into(),
            self.assigned_mode_fl.into(),
        ])
    }

    /// Decode a report from its wire form.
    ///
    /// The name keeps its `@` padding. Bits past the fixed layout are ignored.
    pub fn from_bitstream(bits: &Bits) -> Result<Self> {
        let mut fields = MESSAGE_21_LAYOUT.unpack(bits)?;
        let source_id = read_header(&mut fields, Self::MSG_ID)?;

        let message = Message21 {
            source_id,
            aton_type: fields.next_uint()?,
            aton_name: decode_from_6bit(&fields.next_raw()?)?,
            pos_accuracy: fields.next_unsigned()? != 0,
            lon: fixed_to_degrees(fields.next_signed()?),
            lat: fixed_to_degrees(fields.next_signed()?),
            dimension: [
                fields.next_uint()?,
                fields.next_uint()?,
                fields.next_uint()?,
                fields.next_uint()?,
            ],
            epf_device_type: fields.next_uint()?,
            time_stamp: fields.next_uint()?,
            off_position: fields.next_unsigned()? != 0,
            aton_status: fields.next_uint()?,
            raim_fl: fields.next_unsigned()? != 0,
            vaton_fl: fields.next_unsigned()? != 0,
            assigned_mode_fl: fields.next_unsigned()? != 0,
            aton_name_extension: String::new(),
        };

        debug!("decoded message 21 from {}", source_id);
        Ok(message)
    }
}

impl std::fmt::Display for Message21 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "AIS Message 21: Aids-to-navigation Report")?;
        writeln!(f, "-----------------------------------------")?;
        writeln!(f, "Source ID: {}", self.source_id)?;
        writeln!(f, "AtoN type: {}", self.aton_type)?;
        writeln!(f, "AtoN name: {}", self.aton_name)?;
        writeln!(f, "Position accuracy: {}", self.pos_accuracy as u8)?;
        writeln!(f, "Latitude (deg): {:.6}", self.lat)?;
        writeln!(f, "Longitude (deg): {:.6}", self.lon)?;
        writeln!(f, "Dimension A (m): {}", self.dimension[0])?;
        writeln!(f, "Dimension B (m): {}", self.dimension[1])?;
        writeln!(f, "Dimension C (m): {}", self.dimension[2])?;
        writeln!(f, "Dimension D (m): {}", self.dimension[3])?;
        writeln!(f, "EPF device type: {}", self.epf_device_type)?;
        writeln!(f, "Timestamp (s): {}", self.time_stamp)?;
        writeln!(f, "Off-position flag: {}", self.off_position as u8)?;
        writeln!(f, "AtoN status bits: {:b}", self.aton_status)?;
        writeln!(f, "RAIM flag: {}", self.raim_fl as u8)?;
        writeln!(f, "Virtual flag: {}", self.vaton_fl as u8)?;
        writeln!(f, "Assigned mode flag: {}", self.assigned_mode_fl as u8)
    }
}

/// Builder for [`Message21`]
///
/// Position and time stamp default to the M.1371 "not available" values.
#[derive(Debug, Clone)]
pub struct Message21Builder {
    message: Message21,
}

impl Message21Builder {
    /// Create a builder for an AtoN report from `source_id`
    pub fn new(source_id: u32) -> Self {
        Message21Builder {
            message: Message21::new(
                source_id,
                0,
                String::new(),
                false,
                LONGITUDE_NOT_AVAILABLE,
                LATITUDE_NOT_AVAILABLE,
                [0; 4],
                0,
                TIME_STAMP_NOT_AVAILABLE,
                false,
                0,
                false,
                false,
                false,
            ),
        }
    }

    /// Set the name extension; it is kept locally and not transmitted
    pub fn with_name_extension(mut self, extension: impl Into<String>) -> Self {
        self.message.aton_name_extension = extension.into();
        self
    }

    /// Set the AtoN type
    pub fn with_aton_type(mut self, aton_type: u8) -> Self {
        self.message.aton_type = aton_type;
        self
    }

    /// Set the AtoN name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.message.aton_name = name.into();
        self
    }

    /// Set longitude and latitude in degrees, with position accuracy
    pub fn with_position(mut self, lon: f64, lat: f64, high_accuracy: bool) -> Self {
        self.message.lon = lon;
        self.message.lat = lat;
        self.message.pos_accuracy = high_accuracy;
        self
    }

    /// Set the reference point dimensions [A, B, C, D]
    pub fn with_dimension(mut self, dimension: [u16; 4]) -> Self {
        self.message.dimension = dimension;
        self
    }

    /// Set the EPF device type
    pub fn with_epf_device_type(mut self, epf_device_type: u8) -> Self {
        self.message.epf_device_type = epf_device_type;
        self
    }

    /// Set the time stamp
    pub fn with_time_stamp(mut self, time_stamp: u8) -> Self {
        self.message.time_stamp = time_stamp;
        self
    }

    /// Set the off-position indicator
    pub fn with_off_position(mut self, off_position: bool) -> Self {
        self.message.off_position = off_position;
        self
    }

    /// Set the AtoN status bits
    pub fn with_aton_status(mut self, aton_status: u8) -> Self {
        self.message.aton_status = aton_status;
        self
    }

    /// Set the RAIM flag
    pub fn with_raim(mut self, raim_fl: bool) -> Self {
        self.message.raim_fl = raim_fl;
        self
    }

    /// Set the virtual AtoN flag
    pub fn with_virtual(mut self, vaton_fl: bool) -> Self {
        self.message.vaton_fl = vaton_fl;
        self
    }

    /// Set the assigned mode flag
    pub fn with_assigned_mode(mut self, assigned_mode_fl: bool) -> Self {
        self.message.assigned_mode_fl = assigned_mode_fl;
        self
    }

    /// Build the report
    pub fn build(self) -> Message21 {
        self.message
    }
}
