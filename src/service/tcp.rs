// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The transaction executor.
//!
//! Responses are not length framed. After the request has been written
//! the stream is polled until it becomes readable, then drained until it
//! stays quiet for one poll interval. A response that the peer sends in
//! several writes with a gap longer than the poll interval is truncated
//! and will usually fail validation. This keeps the exchange simple and
//! mirrors what a debugging tool sees on the wire.

use std::{fmt, io};

use tokio::{
    io::{AsyncRead, AsyncReadExt as _, AsyncWrite, AsyncWriteExt as _},
    time,
};

use crate::{
    client::Timing,
    codec,
    error::Error,
    frame::{Hex, Response},
    session::Session,
    Result,
};

/// Size of a single read from the stream.
const CHUNK_SIZE: usize = 256;

/// Modbus/TCP client with exclusive access to a connected stream.
#[derive(Debug)]
pub(crate) struct Client<T> {
    transport: T,
    timing: Timing,
}

impl<T> Client<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(transport: T, timing: Timing) -> Self {
        Self { transport, timing }
    }

    /// Performs one request/response exchange.
    ///
    /// The sequence counter of the session is advanced right after the
    /// request has been written, i.e. also if no response arrives.
    pub(crate) async fn call(&mut self, session: &mut Session) -> Result<Response> {
        let req = session.request();
        let frame = codec::tcp::encode_request(&req)?;
        log::debug!("Call {:?}: {}", req, Hex(&frame));

        self.transport.write_all(&frame).await?;
        self.transport.flush().await?;
        session.increment_sequence();

        let buf = self.receive().await?;
        log::debug!("Received {} bytes: {}", buf.len(), Hex(&buf));

        let res = codec::tcp::decode_response(&buf);
        match &res {
            Ok(rsp) => log::debug!("Decoded {rsp:?}"),
            Err(err) if err.is_advisory() => log::warn!("Unusual response: {err}"),
            Err(err) => log::debug!("Invalid response: {err}"),
        }
        Ok(res)
    }

    async fn receive(&mut self) -> std::result::Result<Vec<u8>, Error> {
        let Timing {
            poll_interval,
            max_wait_polls,
            max_frame_len,
        } = self.timing;
        let mut chunk = [0; CHUNK_SIZE];

        let mut first = None;
        for _ in 0..max_wait_polls {
            if let Ok(res) = time::timeout(poll_interval, self.transport.read(&mut chunk)).await {
                first = Some(res?);
                break;
            }
        }
        let Some(mut n) = first else {
            let timeout = poll_interval * max_wait_polls;
            log::warn!("No response within {timeout:?}");
            return Err(Error::ResponseTimeout(timeout));
        };

        // Bytes beyond `max_frame_len` are still drained until the stream
        // turns quiet, but discarded. Nothing is left for the next call.
        // A closed stream (n == 0) is readable but has nothing to drain.
        let mut buf = Vec::new();
        let mut discarded = 0;
        while n > 0 {
            let keep = if max_frame_len == 0 {
                n
            } else {
                n.min(max_frame_len - buf.len())
            };
            buf.extend_from_slice(&chunk[..keep]);
            discarded += n - keep;
            log::trace!("Drained {} bytes", buf.len() + discarded);
            n = match time::timeout(poll_interval, self.transport.read(&mut chunk)).await {
                Ok(res) => res?,
                Err(_) => break,
            };
        }
        if discarded > 0 {
            log::warn!(
                "Discarded {discarded} bytes exceeding the maximum frame length of {max_frame_len}"
            );
        }

        if buf.is_empty() {
            log::warn!("No data bytes received");
            return Err(Error::EmptyResponse);
        }
        Ok(buf)
    }

    pub(crate) async fn disconnect(&mut self) -> io::Result<()> {
        self.transport.shutdown().await
    }
}

#[async_trait::async_trait]
impl<T> crate::client::Client for Client<T>
where
    T: fmt::Debug + AsyncRead + AsyncWrite + Send + Unpin,
{
    async fn call(&mut self, session: &mut Session) -> Result<Response> {
        Client::call(self, session).await
    }

    async fn disconnect(&mut self) -> io::Result<()> {
        Client::disconnect(self).await
    }
}
