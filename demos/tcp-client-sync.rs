// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronous TCP client example

use mbdebug::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut session = Session::new("192.168.0.222", 502);
    session.set_function(FunctionCode::ReadInputRegisters)?;
    session.set_address(0x1000);
    session.set_data(7);

    let mut ctx = sync::tcp::connect_session(&session)?;
    println!("Reading 7 input registers at 0x1000");
    match ctx.call(&mut session)? {
        Ok(rsp) => println!("{rsp}"),
        Err(err) => println!("Invalid response: {err}"),
    }
    ctx.disconnect()?;

    Ok(())
}
