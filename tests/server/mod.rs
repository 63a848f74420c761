// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use tokio::{
    io::{AsyncReadExt as _, AsyncWriteExt as _},
    net::{TcpListener, TcpStream},
};

/// Computes the response frame for a request frame.
pub type Handler = fn(&[u8]) -> Vec<u8>;

/// Upper bound of registers per read, as the protocol defines it.
const MAX_READ_QUANTITY: u16 = 125;

/// Answers like a well behaved server.
///
/// Register reads return `address + i` for each requested register,
/// writes are echoed and everything else is an illegal function.
/// Reads of more than 125 registers are an illegal data value.
pub fn answer(req: &[u8]) -> Vec<u8> {
    let function = req[7];
    match function {
        0x03 => {
            let address = u16::from_be_bytes([req[8], req[9]]);
            let quantity = u16::from_be_bytes([req[10], req[11]]);
            if quantity > MAX_READ_QUANTITY {
                return exception(req, 0x03);
            }
            let byte_count = u8::try_from(quantity * 2).expect("at most 250 bytes");
            let mut rsp = vec![req[0], req[1], 0x00, 0x00];
            rsp.extend_from_slice(&(u16::from(byte_count) + 3).to_be_bytes());
            rsp.extend_from_slice(&[req[6], function, byte_count]);
            for i in 0..quantity {
                rsp.extend_from_slice(&address.wrapping_add(i).to_be_bytes());
            }
            rsp
        }
        0x05 | 0x06 => req.to_vec(),
        _ => exception(req, 0x01),
    }
}

fn exception(req: &[u8], code: u8) -> Vec<u8> {
    vec![
        req[0],
        req[1],
        0x00,
        0x00,
        0x00,
        0x03,
        req[6],
        req[7] | 0x80,
        code,
    ]
}

/// Answers with a transaction id that doesn't match the request.
pub fn answer_stale(req: &[u8]) -> Vec<u8> {
    let mut rsp = answer(req);
    let transaction_id = u16::from_be_bytes([rsp[0], rsp[1]]).wrapping_add(0x0100);
    rsp[0..2].copy_from_slice(&transaction_id.to_be_bytes());
    rsp
}

/// Never answers.
pub fn answer_nothing(_req: &[u8]) -> Vec<u8> {
    Vec::new()
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut req = vec![0; 6];
    stream.read_exact(&mut req).await?;
    let len = usize::from(u16::from_be_bytes([req[4], req[5]]));
    req.resize(6 + len, 0);
    stream.read_exact(&mut req[6..]).await?;
    Ok(req)
}

/// Serves a single connection until the client disconnects.
pub async fn serve(listener: TcpListener, handler: Handler) -> anyhow::Result<()> {
    let (mut stream, peer) = listener.accept().await?;
    println!("Accepted connection from {peer}");
    while let Ok(req) = read_request(&mut stream).await {
        let rsp = handler(&req);
        if !rsp.is_empty() {
            stream.write_all(&rsp).await?;
        }
    }
    Ok(())
}
