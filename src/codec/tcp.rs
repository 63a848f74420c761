// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus/TCP frames: MBAP header followed by the PDU.
//!
//! ```text
//! | 0-1            | 2-3         | 4-5    | 6       | 7        | 8..     |
//! | transaction id | protocol id | length | unit id | function | payload |
//! ```
//!
//! All 16 bit fields are big-endian. The length counts every byte
//! from the unit id to the end of the frame.

use byteorder::{BigEndian, ByteOrder as _};

use crate::{
    bytes::{BufMut as _, Bytes, BytesMut},
    error::{BuildError, DecodeError},
    frame::{tcp::*, *},
};

use super::u16_len;

/// Smallest frame that carries a complete length field.
pub const MIN_FRAME_SIZE: usize = 6;

/// Request frame size of all supported functions with address and data.
const ADDRESSED_REQUEST_SIZE: usize = 12;

/// Request frame size of Read Device Identification, no payload.
const BARE_REQUEST_SIZE: usize = 8;

/// Offset of the byte count of register read responses.
const BYTE_COUNT_OFFSET: usize = 8;

/// The one data length a previewed request may have.
const PREVIEW_DATA_LENGTH: u16 = 6;

fn request_frame_size(function: FunctionCode) -> Result<usize, BuildError> {
    use FunctionCode::*;
    match function {
        ReadCoils | ReadHoldingRegisters | ReadInputRegisters | WriteSingleCoil
        | WriteSingleRegister => Ok(ADDRESSED_REQUEST_SIZE),
        ReadDeviceIdentification => Ok(BARE_REQUEST_SIZE),
        Custom(code) => Err(BuildError::UnsupportedFunctionCode(code)),
    }
}

/// Encodes a request into a complete frame.
///
/// Nothing is produced for unsupported function codes.
pub fn encode_request(req: &Request) -> Result<Bytes, BuildError> {
    let size = request_frame_size(req.function)?;
    let mut buf = BytesMut::with_capacity(size);
    buf.put_u16(req.sequence);
    buf.put_u16(PROTOCOL_ID);
    buf.put_u16(u16_len(size - LENGTH_OFFSET));
    buf.put_u8(req.unit_id);
    buf.put_u8(req.function.value());
    if size == ADDRESSED_REQUEST_SIZE {
        buf.put_u16(req.address);
        buf.put_u16(req.data);
    }
    debug_assert_eq!(buf.len(), size);
    Ok(buf.freeze())
}

/// Checks the MBAP header and returns it together with the length field.
///
/// On success the frame has at least [`PAYLOAD_OFFSET`] bytes.
fn decode_header(buf: &[u8]) -> Result<(Header, u16), DecodeError> {
    if buf.len() < MIN_FRAME_SIZE {
        return Err(DecodeError::TooShort {
            len: buf.len(),
            min: MIN_FRAME_SIZE,
        });
    }
    let protocol_id = BigEndian::read_u16(&buf[2..4]);
    if protocol_id != PROTOCOL_ID {
        return Err(DecodeError::MalformedHeader { protocol_id });
    }
    let length = BigEndian::read_u16(&buf[4..6]);
    let actual = buf.len() - LENGTH_OFFSET;
    if usize::from(length) != actual {
        return Err(DecodeError::LengthMismatch {
            declared: length,
            actual,
        });
    }
    match length {
        0 => return Err(DecodeError::EmptyPayload),
        1 => {
            return Err(DecodeError::UndersizedPayload {
                unit_id: buf[LENGTH_OFFSET],
            })
        }
        _ => {}
    }
    let header = Header {
        transaction_id: BigEndian::read_u16(&buf[0..2]),
        unit_id: buf[LENGTH_OFFSET],
    };
    Ok((header, length))
}

/// Decodes and validates a received frame.
///
/// Only Read Holding Registers responses are inspected beyond the
/// header, the payload of all other functions is passed through as is.
pub fn decode_response(buf: &[u8]) -> Result<Response, DecodeError> {
    let (header, length) = decode_header(buf)?;
    let function = FunctionCode::new(buf[FUNCTION_OFFSET]);
    let data = if function == FunctionCode::ReadHoldingRegisters {
        ResponseData::Registers(decode_registers(buf, length)?)
    } else {
        ResponseData::Raw(Bytes::copy_from_slice(&buf[PAYLOAD_OFFSET..]))
    };
    Ok(Response {
        header,
        function,
        length,
        data,
    })
}

fn decode_registers(buf: &[u8], length: u16) -> Result<Vec<Word>, DecodeError> {
    let Some(&byte_count) = buf.get(BYTE_COUNT_OFFSET) else {
        return Err(DecodeError::MissingByteCount);
    };
    if byte_count == 0 {
        return Err(DecodeError::ZeroByteCount);
    }
    if byte_count % 2 != 0 {
        return Err(DecodeError::OddByteCount(byte_count));
    }
    // The byte count follows unit id and function code.
    if length - 3 != u16::from(byte_count) {
        return Err(DecodeError::ByteCountMismatch {
            byte_count,
            declared: length,
        });
    }
    let registers = buf[BYTE_COUNT_OFFSET + 1..]
        .chunks_exact(2)
        .map(BigEndian::read_u16)
        .collect();
    Ok(registers)
}

/// Decodes a request frame for display purposes.
///
/// Stricter than [`decode_response()`]: only Read Coils, Read Holding
/// Registers and Write Single Coil requests with address and data can
/// be previewed.
pub fn decode_request(buf: &[u8]) -> Result<RequestPreview, DecodeError> {
    let (header, length) = decode_header(buf)?;
    let function = FunctionCode::new(buf[FUNCTION_OFFSET]);
    match function {
        FunctionCode::ReadCoils
        | FunctionCode::ReadHoldingRegisters
        | FunctionCode::WriteSingleCoil => {}
        other => return Err(DecodeError::UnsupportedForDisplay(other.value())),
    }
    if length != PREVIEW_DATA_LENGTH {
        return Err(DecodeError::UnexpectedPayloadLength {
            function: function.value(),
            declared: length,
        });
    }
    Ok(RequestPreview {
        header,
        function,
        length,
        address: BigEndian::read_u16(&buf[8..10]),
        data: BigEndian::read_u16(&buf[10..12]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(function: u8, address: Address, data: Word) -> Request {
        Request {
            sequence: 0,
            unit_id: 1,
            function: FunctionCode::new(function),
            address,
            data,
        }
    }

    mod encode {
        use super::*;

        #[test]
        fn read_holding_registers() {
            let buf = encode_request(&request(0x03, 0x0010, 0x0002)).unwrap();
            assert_eq!(
                &buf[..],
                &[0x00, 0x00, 0x00, 0x00, 0x00, 0x06, 0x01, 0x03, 0x00, 0x10, 0x00, 0x02]
            );
        }

        #[test]
        fn frame_sizes() {
            for function in [0x01, 0x03, 0x04, 0x05, 0x06] {
                let buf = encode_request(&request(function, 0xFFFF, 0xFFFF)).unwrap();
                assert_eq!(buf.len(), 12);
                assert_eq!(&buf[4..6], &[0x00, 0x06]);
            }
            let buf = encode_request(&request(0x2B, 0x1234, 0x5678)).unwrap();
            assert_eq!(&buf[..], &[0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x01, 0x2B]);
        }

        #[test]
        fn transaction_id() {
            let mut req = request(0x04, 0, 1);
            req.sequence = 0xABCD;
            let buf = encode_request(&req).unwrap();
            assert_eq!(&buf[0..2], &[0xAB, 0xCD]);
            assert_eq!(&buf[2..4], &[0x00, 0x00]);
        }

        #[test]
        fn unsupported_function_code() {
            for function in [0x00, 0x02, 0x07, 0x0F, 0x10, 0x83] {
                assert_eq!(
                    encode_request(&request(function, 0, 0)),
                    Err(BuildError::UnsupportedFunctionCode(function))
                );
            }
        }

        #[test]
        fn previewable_requests_round_trip() {
            for function in [0x01, 0x03, 0x05] {
                let req = request(function, 0x0102, 0xFF00);
                let buf = encode_request(&req).unwrap();
                let preview = decode_request(&buf).unwrap();
                assert_eq!(preview.header, req.header());
                assert_eq!(preview.function, req.function);
                assert_eq!(preview.address, req.address);
                assert_eq!(preview.data, req.data);
            }
        }

        #[test]
        fn other_requests_round_trip_as_raw_payload() {
            for function in [0x04, 0x06] {
                let req = request(function, 0x0102, 0x0304);
                let buf = encode_request(&req).unwrap();
                let rsp = decode_response(&buf).unwrap();
                assert_eq!(rsp.header.unit_id, 1);
                assert_eq!(rsp.function, req.function);
                assert_eq!(
                    rsp.data,
                    ResponseData::Raw(Bytes::from_static(&[0x01, 0x02, 0x03, 0x04]))
                );
            }
        }
    }

    mod decode_response {
        use super::*;

        #[test]
        fn read_holding_registers() {
            let rsp = decode_response(&[
                0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x01, 0x03, 0x02, 0x00, 0x2A,
            ])
            .unwrap();
            assert_eq!(
                rsp.header,
                Header {
                    transaction_id: 0,
                    unit_id: 1
                }
            );
            assert_eq!(rsp.function, FunctionCode::ReadHoldingRegisters);
            assert_eq!(rsp.length, 5);
            assert_eq!(rsp.registers(), Some(&[0x002A][..]));
        }

        #[test]
        fn multiple_registers() {
            let rsp = decode_response(&[
                0x00, 0x07, 0x00, 0x00, 0x00, 0x07, 0x11, 0x03, 0x04, 0x12, 0x34, 0xAB, 0xCD,
            ])
            .unwrap();
            assert_eq!(rsp.header.transaction_id, 7);
            assert_eq!(rsp.registers(), Some(&[0x1234, 0xABCD][..]));
        }

        #[test]
        fn too_short() {
            for len in 0..6 {
                let buf = vec![0; len];
                assert_eq!(
                    decode_response(&buf),
                    Err(DecodeError::TooShort { len, min: 6 })
                );
            }
        }

        #[test]
        fn malformed_header() {
            assert_eq!(
                decode_response(&[0x00, 0x00, 0x01, 0x00, 0x00, 0x02, 0x01, 0x03]),
                Err(DecodeError::MalformedHeader {
                    protocol_id: 0x0100
                })
            );
            assert_eq!(
                decode_response(&[0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0x01, 0x03]),
                Err(DecodeError::MalformedHeader {
                    protocol_id: 0x0001
                })
            );
        }

        #[test]
        fn length_mismatch() {
            assert_eq!(
                decode_response(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x06, 0x01, 0x03, 0x02]),
                Err(DecodeError::LengthMismatch {
                    declared: 6,
                    actual: 3
                })
            );
            assert_eq!(
                decode_response(&[0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x03]),
                Err(DecodeError::LengthMismatch {
                    declared: 0x0100,
                    actual: 2
                })
            );
        }

        #[test]
        fn empty_and_undersized_payload() {
            let err = decode_response(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]).unwrap_err();
            assert_eq!(err, DecodeError::EmptyPayload);
            assert!(err.is_advisory());

            let err = decode_response(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x09]).unwrap_err();
            assert_eq!(err, DecodeError::UndersizedPayload { unit_id: 9 });
            assert!(err.is_advisory());
        }

        #[test]
        fn missing_byte_count() {
            assert_eq!(
                decode_response(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x01, 0x03]),
                Err(DecodeError::MissingByteCount)
            );
        }

        #[test]
        fn zero_byte_count() {
            let err = decode_response(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x01, 0x03, 0x00])
                .unwrap_err();
            assert_eq!(err, DecodeError::ZeroByteCount);
            assert!(err.is_advisory());
        }

        #[test]
        fn odd_byte_count_is_checked_before_mismatch() {
            // byte count 3 is odd and doesn't match the length either
            assert_eq!(
                decode_response(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x01, 0x03, 0x03, 0x00, 0x2A]),
                Err(DecodeError::OddByteCount(3))
            );
            // odd and consistent with the length
            assert_eq!(
                decode_response(&[
                    0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0x01, 0x03, 0x01, 0x2A
                ]),
                Err(DecodeError::OddByteCount(1))
            );
        }

        #[test]
        fn byte_count_mismatch() {
            assert_eq!(
                decode_response(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x01, 0x03, 0x04, 0x00, 0x2A]),
                Err(DecodeError::ByteCountMismatch {
                    byte_count: 4,
                    declared: 5
                })
            );
        }

        #[test]
        fn raw_payload_of_other_functions() {
            let rsp = decode_response(&[
                0x00, 0x03, 0x00, 0x00, 0x00, 0x06, 0x01, 0x06, 0x00, 0x10, 0x12, 0x34,
            ])
            .unwrap();
            assert_eq!(rsp.function, FunctionCode::WriteSingleRegister);
            assert_eq!(
                rsp.data,
                ResponseData::Raw(Bytes::from_static(&[0x00, 0x10, 0x12, 0x34]))
            );

            // only the header is validated
            let rsp = decode_response(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x01, 0x2B]).unwrap();
            assert_eq!(rsp.data, ResponseData::Raw(Bytes::new()));
        }

        #[test]
        fn exception_response() {
            let rsp = decode_response(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x01, 0x83, 0x02])
                .unwrap();
            assert_eq!(rsp.function, FunctionCode::Custom(0x83));
            assert_eq!(rsp.exception(), Some(ExceptionCode::IllegalDataAddress));
        }
    }

    mod decode_request {
        use super::*;

        #[test]
        fn read_coils() {
            let preview = decode_request(&[
                0x12, 0x34, 0x00, 0x00, 0x00, 0x06, 0x05, 0x01, 0x00, 0x13, 0x00, 0x25,
            ])
            .unwrap();
            assert_eq!(
                preview,
                RequestPreview {
                    header: Header {
                        transaction_id: 0x1234,
                        unit_id: 5,
                    },
                    function: FunctionCode::ReadCoils,
                    length: 6,
                    address: 0x13,
                    data: 0x25,
                }
            );
        }

        #[test]
        fn narrower_allowlist_than_encoder() {
            for function in [0x04, 0x06] {
                let buf = encode_request(&request(function, 0, 1)).unwrap();
                assert_eq!(
                    decode_request(&buf),
                    Err(DecodeError::UnsupportedForDisplay(function))
                );
            }
            let buf = encode_request(&request(0x2B, 0, 0)).unwrap();
            assert_eq!(
                decode_request(&buf),
                Err(DecodeError::UnsupportedForDisplay(0x2B))
            );
        }

        #[test]
        fn unexpected_payload_length() {
            assert_eq!(
                decode_request(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0x01, 0x03, 0x00, 0x10]),
                Err(DecodeError::UnexpectedPayloadLength {
                    function: 0x03,
                    declared: 4
                })
            );
        }

        #[test]
        fn header_is_validated_first() {
            assert_eq!(
                decode_request(&[0x00, 0x00, 0x00, 0x00]),
                Err(DecodeError::TooShort { len: 4, min: 6 })
            );
            assert_eq!(
                decode_request(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
                Err(DecodeError::EmptyPayload)
            );
        }
    }
}
