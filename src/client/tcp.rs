// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TCP client connections

use std::{fmt, io, net::SocketAddr};

use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
};

use super::*;

/// Establish a direct connection to a Modbus/TCP server.
pub async fn connect(socket_addr: SocketAddr) -> io::Result<Context> {
    connect_with_timing(socket_addr, Timing::default()).await
}

/// Connect with custom response [`Timing`].
pub async fn connect_with_timing(socket_addr: SocketAddr, timing: Timing) -> io::Result<Context> {
    let transport = TcpStream::connect(socket_addr).await?;
    log::debug!("Connected to {socket_addr}");
    Ok(attach_with_timing(transport, timing))
}

/// Connect to the host and port of a [`Session`].
///
/// The host may be a name that needs to be resolved.
pub async fn connect_session(session: &Session) -> io::Result<Context> {
    let transport = TcpStream::connect((session.host(), session.port())).await?;
    log::debug!("Connected to {}:{}", session.host(), session.port());
    Ok(attach(transport))
}

/// Attach a new client context to a connected transport.
pub fn attach<T>(transport: T) -> Context
where
    T: AsyncRead + AsyncWrite + Send + Unpin + fmt::Debug + 'static,
{
    attach_with_timing(transport, Timing::default())
}

/// Attach a new client context with custom response [`Timing`].
pub fn attach_with_timing<T>(transport: T, timing: Timing) -> Context
where
    T: AsyncRead + AsyncWrite + Send + Unpin + fmt::Debug + 'static,
{
    let client = crate::service::tcp::Client::new(transport, timing);
    Context {
        client: Box::new(client),
    }
}
