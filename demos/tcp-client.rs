// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Asynchronous TCP client example

use mbdebug::{codec, prelude::*, Hex};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut session = Session::default();
    session.set_unit_id(1);
    session.set_address(0x0010);
    session.set_data(2);

    let frame = session.encode()?;
    println!("Bytes in packet to be sent:\n{}", Hex(&frame));
    match codec::tcp::decode_request(&frame) {
        Ok(preview) => println!("{preview}"),
        Err(err) => println!("{err}"),
    }

    let mut ctx = client::tcp::connect_session(&session).await?;
    match ctx.call(&mut session).await {
        Ok(Ok(rsp)) => println!("{rsp}"),
        Ok(Err(err)) if err.is_advisory() => println!("Info: {err}"),
        Ok(Err(err)) => println!("Error: {err}"),
        Err(err) => println!("Transaction failed: {err}"),
    }

    println!("Disconnecting");
    ctx.disconnect().await?;

    Ok(())
}
