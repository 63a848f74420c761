// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus/TCP clients

use std::{fmt::Debug, io, time::Duration};

use async_trait::async_trait;

use crate::{frame::Response, session::Session, Result};

#[cfg(feature = "tcp")]
pub mod tcp;

#[cfg(feature = "sync")]
pub mod sync;

/// Interval of all readiness polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Number of polls while waiting for the first response byte.
pub const DEFAULT_MAX_WAIT_POLLS: u32 = 100;

/// Upper bound of a received frame.
pub const DEFAULT_MAX_FRAME_LEN: usize = 65536;

/// Timing of the response read.
///
/// The response must start within `poll_interval * max_wait_polls`.
/// It ends as soon as the stream stays quiet for one `poll_interval`.
/// At most `max_frame_len` bytes are kept, the rest of the burst is
/// drained and discarded. `0` keeps everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub poll_interval: Duration,
    pub max_wait_polls: u32,
    pub max_frame_len: usize,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait_polls: DEFAULT_MAX_WAIT_POLLS,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

/// Transport independent asynchronous client trait
#[async_trait]
pub trait Client: Send + Debug {
    /// Sends the request described by `session` and reads the response.
    ///
    /// Advances the sequence counter of `session` once the request
    /// has been written.
    async fn call(&mut self, session: &mut Session) -> Result<Response>;

    /// Disconnects the client.
    ///
    /// Shuts down the underlying stream in a graceful manner. Dropping
    /// the client without explicitly disconnecting it beforehand also
    /// frees all resources.
    async fn disconnect(&mut self) -> io::Result<()>;
}

/// Asynchronous Modbus client context
#[derive(Debug)]
pub struct Context {
    client: Box<dyn Client>,
}

impl From<Box<dyn Client>> for Context {
    fn from(client: Box<dyn Client>) -> Self {
        Self { client }
    }
}

impl From<Context> for Box<dyn Client> {
    fn from(val: Context) -> Self {
        val.client
    }
}

#[async_trait]
impl Client for Context {
    async fn call(&mut self, session: &mut Session) -> Result<Response> {
        self.client.call(session).await
    }

    async fn disconnect(&mut self) -> io::Result<()> {
        self.client.disconnect().await
    }
}
