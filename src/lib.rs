// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A [Modbus/TCP](https://en.wikipedia.org/wiki/Modbus) transaction
//! debugger based on [tokio](https://tokio.rs).
//!
//! One transaction writes a single request frame to a connected stream
//! and reads whatever the server sends back until the stream turns
//! quiet. The received bytes are validated and decoded, but never
//! matched against the request: a debugging tool shows what is on the
//! wire instead of hiding it.
//!
//! Encoding and decoding are available as pure functions in [`codec`]
//! for previewing requests and inspecting captured responses.
//!
//! ```no_run
//! # #[cfg(feature = "tcp")]
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use mbdebug::prelude::*;
//!
//! let mut session = Session::default();
//! session.set_unit_id(1);
//! session.set_address(0x0010);
//! session.set_data(2);
//!
//! let mut ctx = client::tcp::connect_session(&session).await?;
//! match ctx.call(&mut session).await? {
//!     Ok(rsp) => println!("{rsp}"),
//!     Err(err) => println!("Invalid response: {err}"),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(rust_2018_idioms)]

pub use ::bytes;

pub mod client;
pub mod codec;
pub mod prelude;

mod error;
pub use self::error::{BuildError, DecodeError, Error};

mod frame;
pub use self::frame::{tcp::*, *};

mod session;
pub use self::session::{Session, DEFAULT_HOST, DEFAULT_PORT};

#[cfg(feature = "tcp")]
mod service;

/// Specialized [`std::result::Result`] type for transactions.
///
/// The outer result carries build and transport failures, the inner
/// one the validation result of the received frame.
pub type Result<T> = std::result::Result<std::result::Result<T, DecodeError>, Error>;
