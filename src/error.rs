// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types.

use std::{io, time::Duration};

use thiserror::Error;

use crate::frame::tcp::UnitId;

/// A request that cannot be turned into a frame.
///
/// Raised before any I/O happens, i.e. the stream is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The function code is not part of the supported set.
    #[error("unsupported function code 0x{0:02X}")]
    UnsupportedFunctionCode(u8),
}

/// Validation failures of a received (or previewed) frame.
///
/// Decoding stops at the first violation. Some variants are only
/// advisory, see [`DecodeError::is_advisory()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Fewer bytes than a minimal header.
    #[error("packet too short ({len} bytes) - needs to be at least {min} bytes")]
    TooShort { len: usize, min: usize },

    /// The protocol identifier at offset 2 and 3 is not zero.
    #[error("bytes at offset 2 and 3 must be zero (protocol id 0x{protocol_id:04X})")]
    MalformedHeader { protocol_id: u16 },

    /// The length field at offset 4 and 5 doesn't match the trailing byte count.
    #[error("length field 0x{declared:04X} does not match the {actual} trailing bytes")]
    LengthMismatch { declared: u16, actual: usize },

    /// No Modbus data follows the length field.
    #[error("no actual Modbus data present in packet which is unusual")]
    EmptyPayload,

    /// The Modbus data consists of the unit id only.
    #[error("Modbus data only 1 byte long with unit id {unit_id} which is unusual")]
    UndersizedPayload { unit_id: UnitId },

    /// A register read response without a byte count.
    #[error("no byte count")]
    MissingByteCount,

    /// A register read response announcing zero bytes.
    #[error("byte count is zero which is unusual")]
    ZeroByteCount,

    /// Registers are 16 bit wide, so the byte count must be even.
    #[error("byte count should be a multiple of 2 - it is {0}")]
    OddByteCount(u8),

    /// The byte count doesn't match the length of the packet.
    #[error("byte count of {byte_count} does not match data length 0x{declared:04X}")]
    ByteCountMismatch { byte_count: u8, declared: u16 },

    /// A previewed request has an unexpected data length for its function code.
    #[error("function code 0x{function:02X} has incorrect data length 0x{declared:04X}")]
    UnexpectedPayloadLength { function: u8, declared: u16 },

    /// The function code cannot be previewed.
    #[error("function code 0x{0:02X} is not supported for display")]
    UnsupportedForDisplay(u8),
}

impl DecodeError {
    /// Conditions that are unusual rather than wrong.
    ///
    /// Decoding of the frame still stops, but neither the stream
    /// nor the session are affected.
    #[must_use]
    pub const fn is_advisory(&self) -> bool {
        matches!(
            self,
            Self::EmptyPayload | Self::UndersizedPayload { .. } | Self::ZeroByteCount
        )
    }
}

/// Failures of a single transaction that happen outside of frame validation.
///
/// None of them is fatal to the session: the caller decides whether
/// to retry, reconnect or give up.
#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be built.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The underlying stream failed.
    #[error(transparent)]
    Transport(#[from] io::Error),

    /// The peer didn't send anything within the initial wait bound.
    #[error("timed out after {0:?} without a response")]
    ResponseTimeout(Duration),

    /// The stream became readable but no data bytes were received.
    #[error("no data bytes received")]
    EmptyResponse,
}
