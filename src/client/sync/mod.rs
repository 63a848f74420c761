// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronous Modbus context access

#[cfg(feature = "tcp")]
pub mod tcp;

use std::io;

use super::{Client as AsyncClient, Context as AsyncContext};

use crate::{frame::Response, session::Session, Result};

/// A transport independent synchronous client trait.
pub trait Client {
    /// Blocks until the transaction has finished.
    fn call(&mut self, session: &mut Session) -> Result<Response>;

    fn disconnect(&mut self) -> io::Result<()>;
}

/// A synchronous Modbus client context.
#[derive(Debug)]
pub struct Context {
    runtime: tokio::runtime::Runtime,
    async_ctx: AsyncContext,
}

fn new_runtime() -> io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

impl Client for Context {
    fn call(&mut self, session: &mut Session) -> Result<Response> {
        self.runtime.block_on(self.async_ctx.call(session))
    }

    fn disconnect(&mut self) -> io::Result<()> {
        self.runtime.block_on(self.async_ctx.disconnect())
    }
}
