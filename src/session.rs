// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session state shared between the command layer and the transactions.

use crate::{
    bytes::Bytes,
    codec,
    error::{BuildError, DecodeError},
    frame::{
        tcp::{TransactionId, UnitId},
        Address, FunctionCode, Request, RequestPreview, Word,
    },
};

pub const DEFAULT_HOST: &str = "127.0.0.1";

/// The registered Modbus/TCP port.
pub const DEFAULT_PORT: u16 = 502;

/// The fields that describe the next request and where to send it.
///
/// The sequence counter is advanced once per transmitted request and
/// wraps around from `0xFFFF` to `0x0000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    host: String,
    port: u16,
    sequence: TransactionId,
    unit_id: UnitId,
    function: FunctionCode,
    address: Address,
    data: Word,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            sequence: 0,
            unit_id: 0,
            function: FunctionCode::ReadHoldingRegisters,
            address: 0,
            data: 1,
        }
    }
}

impl Session {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn set_host(&mut self, host: impl Into<String>) {
        self.host = host.into();
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    #[must_use]
    pub const fn sequence(&self) -> TransactionId {
        self.sequence
    }

    pub fn set_sequence(&mut self, sequence: TransactionId) {
        self.sequence = sequence;
    }

    /// Advances the sequence counter, wrapping around after `0xFFFF`.
    pub fn increment_sequence(&mut self) {
        self.sequence = self.sequence.wrapping_add(1);
    }

    #[must_use]
    pub const fn unit_id(&self) -> UnitId {
        self.unit_id
    }

    pub fn set_unit_id(&mut self, unit_id: UnitId) {
        self.unit_id = unit_id;
    }

    #[must_use]
    pub const fn function(&self) -> FunctionCode {
        self.function
    }

    /// Selects the function code of subsequent requests.
    ///
    /// Unsupported codes are rejected and leave the session unchanged.
    pub fn set_function(&mut self, function: impl Into<FunctionCode>) -> Result<(), BuildError> {
        let function = function.into();
        if !function.is_supported() {
            return Err(BuildError::UnsupportedFunctionCode(function.value()));
        }
        self.function = function;
        Ok(())
    }

    /// Bypasses the function code check to exercise the encoder's rejection.
    #[cfg(test)]
    pub(crate) fn set_function_unchecked(&mut self, function: FunctionCode) {
        self.function = function;
    }

    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    pub fn set_address(&mut self, address: Address) {
        self.address = address;
    }

    #[must_use]
    pub const fn data(&self) -> Word {
        self.data
    }

    pub fn set_data(&mut self, data: Word) {
        self.data = data;
    }

    /// Snapshot of the next request.
    #[must_use]
    pub const fn request(&self) -> Request {
        Request {
            sequence: self.sequence,
            unit_id: self.unit_id,
            function: self.function,
            address: self.address,
            data: self.data,
        }
    }

    /// The frame that would be sent next.
    pub fn encode(&self) -> Result<Bytes, BuildError> {
        codec::tcp::encode_request(&self.request())
    }

    /// Builds the pending request and decodes it again for display.
    pub fn preview(&self) -> Result<Result<RequestPreview, DecodeError>, BuildError> {
        let frame = self.encode()?;
        Ok(codec::tcp::decode_request(&frame))
    }
}
