// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod tcp;

use std::fmt::{self, Display};

use crate::bytes::Bytes;

use self::tcp::{Header, TransactionId, UnitId};

/// A Modbus function code.
///
/// Only a small subset of the codes defined by the protocol specification
/// V1.1b3 can be sent, everything else is carried as [`FunctionCode::Custom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionCode {
    /// 01 (0x01) Read Coils.
    ReadCoils,

    /// 03 (0x03) Read Holding Registers
    ReadHoldingRegisters,

    /// 04 (0x04) Read Input Registers
    ReadInputRegisters,

    /// 05 (0x05) Write Single Coil
    WriteSingleCoil,

    /// 06 (0x06) Write Single Register
    WriteSingleRegister,

    /// 43 (0x2B) Encapsulated Interface Transport, i.e. Read Device Identification
    ReadDeviceIdentification,

    /// Any other function code, including exception responses.
    Custom(u8),
}

impl FunctionCode {
    /// Create a new [`FunctionCode`] with `value`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        match value {
            0x01 => Self::ReadCoils,
            0x03 => Self::ReadHoldingRegisters,
            0x04 => Self::ReadInputRegisters,
            0x05 => Self::WriteSingleCoil,
            0x06 => Self::WriteSingleRegister,
            0x2B => Self::ReadDeviceIdentification,
            code => Self::Custom(code),
        }
    }

    /// Gets the [`u8`] value of the current [`FunctionCode`].
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::ReadCoils => 0x01,
            Self::ReadHoldingRegisters => 0x03,
            Self::ReadInputRegisters => 0x04,
            Self::WriteSingleCoil => 0x05,
            Self::WriteSingleRegister => 0x06,
            Self::ReadDeviceIdentification => 0x2B,
            Self::Custom(code) => code,
        }
    }

    /// Whether requests with this function code can be encoded.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        !matches!(self, Self::Custom(_))
    }

    /// Whether the server answered with an exception, i.e. bit 7 is set.
    #[must_use]
    pub const fn is_exception(self) -> bool {
        self.value() & 0x80 != 0
    }

    /// Human readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ReadCoils => "Read Coils",
            Self::ReadHoldingRegisters => "Read Holding Registers",
            Self::ReadInputRegisters => "Read Input Registers",
            Self::WriteSingleCoil => "Write Single Coil",
            Self::WriteSingleRegister => "Write Single Register",
            Self::ReadDeviceIdentification => "Read ID Info",
            Self::Custom(_) => "Unsupported",
        }
    }
}

impl From<u8> for FunctionCode {
    fn from(from: u8) -> Self {
        Self::new(from)
    }
}

impl From<FunctionCode> for u8 {
    fn from(from: FunctionCode) -> Self {
        from.value()
    }
}

impl Display for FunctionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.value())
    }
}

/// A Modbus protocol address is represented by 16 bit from `0` to `65535`.
///
/// This *protocol address* uses 0-based indexing, while the *coil address* or
/// *register address* is often specified as a number with 1-based indexing.
pub type Address = u16;

/// Modbus uses 16 bit for its data items.
///
/// Transmitted using a big-endian representation.
pub type Word = u16;

/// A snapshot of everything needed to build one request frame.
///
/// `data` is interpreted by the function code: the quantity for reads,
/// the value for writes. It is not transmitted for
/// [`FunctionCode::ReadDeviceIdentification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub sequence: TransactionId,
    pub unit_id: UnitId,
    pub function: FunctionCode,
    pub address: Address,
    pub data: Word,
}

impl Request {
    #[must_use]
    pub const fn header(&self) -> Header {
        Header {
            transaction_id: self.sequence,
            unit_id: self.unit_id,
        }
    }
}

/// The payload of a decoded [`Response`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseData {
    /// Registers of a Read Holding Registers response.
    Registers(Vec<Word>),

    /// All bytes following the function code, verbatim.
    Raw(Bytes),
}

/// A received frame that passed validation.
///
/// The transaction id is reported as received, it is *not* matched
/// against the id of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub header: Header,
    pub function: FunctionCode,
    /// Value of the length field, i.e. the byte count from the unit id on.
    pub length: u16,
    pub data: ResponseData,
}

impl Response {
    /// The registers, if this is a decoded register read.
    #[must_use]
    pub fn registers(&self) -> Option<&[Word]> {
        match &self.data {
            ResponseData::Registers(registers) => Some(registers),
            ResponseData::Raw(_) => None,
        }
    }

    /// The server exception, if the function code has the exception bit set.
    #[must_use]
    pub fn exception(&self) -> Option<ExceptionCode> {
        if !self.function.is_exception() {
            return None;
        }
        match &self.data {
            ResponseData::Raw(raw) => raw.first().copied().map(ExceptionCode::new),
            ResponseData::Registers(_) => None,
        }
    }
}

/// The decoded fields of a request frame built for sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPreview {
    pub header: Header,
    pub function: FunctionCode,
    pub length: u16,
    pub address: Address,
    pub data: Word,
}

/// A server (slave) exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionCode {
    /// 0x01
    IllegalFunction,
    /// 0x02
    IllegalDataAddress,
    /// 0x03
    IllegalDataValue,
    /// 0x04
    ServerDeviceFailure,
    /// 0x05
    Acknowledge,
    /// 0x06
    ServerDeviceBusy,
    /// 0x08
    MemoryParityError,
    /// 0x0A
    GatewayPathUnavailable,
    /// 0x0B
    GatewayTargetDevice,
    /// None of the above.
    Custom(u8),
}

impl ExceptionCode {
    /// Create a new [`ExceptionCode`] with `value`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        use crate::frame::ExceptionCode::*;

        match value {
            0x01 => IllegalFunction,
            0x02 => IllegalDataAddress,
            0x03 => IllegalDataValue,
            0x04 => ServerDeviceFailure,
            0x05 => Acknowledge,
            0x06 => ServerDeviceBusy,
            0x08 => MemoryParityError,
            0x0A => GatewayPathUnavailable,
            0x0B => GatewayTargetDevice,
            other => Custom(other),
        }
    }

    pub(crate) fn description(&self) -> &str {
        use crate::frame::ExceptionCode::*;

        match *self {
            IllegalFunction => "Illegal function",
            IllegalDataAddress => "Illegal data address",
            IllegalDataValue => "Illegal data value",
            ServerDeviceFailure => "Server device failure",
            Acknowledge => "Acknowledge",
            ServerDeviceBusy => "Server device busy",
            MemoryParityError => "Memory parity error",
            GatewayPathUnavailable => "Gateway path unavailable",
            GatewayTargetDevice => "Gateway target device failed to respond",
            Custom(_) => "Custom",
        }
    }
}

impl fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Renders bytes as space separated, upper case hex digits.
#[derive(Debug, Clone, Copy)]
pub struct Hex<'a>(pub &'a [u8]);

impl Display for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

fn fmt_header(
    f: &mut fmt::Formatter<'_>,
    header: Header,
    length: u16,
    function: FunctionCode,
) -> fmt::Result {
    writeln!(
        f,
        "Sequence.....: 0x{:04X}   Data length: 0x{:04X}   Unit ID: 0x{:02X}",
        header.transaction_id, length, header.unit_id
    )?;
    write!(f, "Function code: {}     {}", function, function.name())
}

impl Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_header(f, self.header, self.length, self.function)?;
        f.write_str("\n")?;
        match &self.data {
            ResponseData::Registers(registers) => {
                for (i, word) in registers.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "0x{word:04X}")?;
                }
                Ok(())
            }
            ResponseData::Raw(raw) => Display::fmt(&Hex(raw), f),
        }
    }
}

impl Display for RequestPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_header(f, self.header, self.length, self.function)?;
        write!(
            f,
            "\nAddress......: 0x{:04X}   Data: 0x{:04X}",
            self.address, self.data
        )
    }
}
