// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{io, net::SocketAddr};

use super::{new_runtime, Context};

use crate::{
    client::{tcp as async_tcp, Timing},
    session::Session,
};

/// Establish a direct connection to a Modbus/TCP server.
pub fn connect(socket_addr: SocketAddr) -> io::Result<Context> {
    connect_with_timing(socket_addr, Timing::default())
}

/// Connect with custom response [`Timing`].
pub fn connect_with_timing(socket_addr: SocketAddr, timing: Timing) -> io::Result<Context> {
    let runtime = new_runtime()?;
    let async_ctx = runtime.block_on(async_tcp::connect_with_timing(socket_addr, timing))?;
    Ok(Context { runtime, async_ctx })
}

/// Connect to the host and port of a [`Session`].
pub fn connect_session(session: &Session) -> io::Result<Context> {
    let runtime = new_runtime()?;
    let async_ctx = runtime.block_on(async_tcp::connect_session(session))?;
    Ok(Context { runtime, async_ctx })
}
