// SPDX-FileCopyrightText: Copyright (c) 2017-2023 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

pub type TransactionId = u16;
pub type UnitId = u8;

/// Offset of the byte from which on the length field counts.
pub(crate) const LENGTH_OFFSET: usize = 6;

/// Offset of the function code, i.e. the first byte of the PDU.
pub(crate) const FUNCTION_OFFSET: usize = 7;

/// Offset of the function specific payload.
pub(crate) const PAYLOAD_OFFSET: usize = 8;

pub(crate) const PROTOCOL_ID: u16 = 0x0000;

/// The transaction identifier and unit identifier of an MBAP header.
///
/// Protocol id and length are implied by the frame itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub transaction_id: TransactionId,
    pub unit_id: UnitId,
}
