//! Report framing.
//!
//! Every exchange is one 65-byte write followed by one 64-byte read on the
//! same handle. The first two response bytes echo the request opcode and
//! register; the remaining 62 bytes are payload.

use std::io::{self, Read, Write};

use tracing::{debug, error, trace};

use crate::{
    cmd::{ECHO_LEN, PAYLOAD_LEN, REQUEST_LEN, RESPONSE_LEN},
    hexdump, TransportError,
};

/// Outbound report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request([u8; REQUEST_LEN]);

impl Request {
    /// Build a report from an opcode and two parameter bytes.
    ///
    /// Byte 0 is the report ID and is always zero.
    pub const fn new(cmd: [u8; 3]) -> Request {
        let mut buf: [u8; REQUEST_LEN] = [0; REQUEST_LEN];
        buf[1] = cmd[0];
        buf[2] = cmd[1];
        buf[3] = cmd[2];
        Request(buf)
    }

    pub const fn opcode(&self) -> u8 {
        self.0[1]
    }

    pub const fn register(&self) -> u8 {
        self.0[2]
    }

    pub const fn param(&self) -> u8 {
        self.0[3]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Inbound report that passed the echo check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response([u8; RESPONSE_LEN]);

impl Response {
    /// Payload following the echoed opcode and register.
    pub fn payload(&self) -> &[u8] {
        &self.0[ECHO_LEN..]
    }

    /// Copy the start of the payload into `buf`.
    ///
    /// At most 62 bytes are copied. Returns the number of bytes copied.
    pub fn copy_payload(&self, buf: &mut [u8]) -> usize {
        let n: usize = buf.len().min(PAYLOAD_LEN);
        buf[..n].copy_from_slice(&self.payload()[..n]);
        n
    }
}

fn write_report<T: Write>(dev: &mut T, req: &Request) -> Result<(), TransportError> {
    let written: usize = loop {
        match dev.write(req.as_bytes()) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => break other?,
        }
    };
    if written != REQUEST_LEN {
        error!("write {}/{}", written, REQUEST_LEN);
        return Err(TransportError::ShortWrite {
            written,
            expected: REQUEST_LEN,
        });
    }
    Ok(())
}

fn read_report<T: Read>(dev: &mut T) -> Result<[u8; RESPONSE_LEN], TransportError> {
    let mut buf: [u8; RESPONSE_LEN] = [0; RESPONSE_LEN];
    let received: usize = loop {
        match dev.read(&mut buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => break other?,
        }
    };
    if received != RESPONSE_LEN {
        let dump: String = hexdump(&buf[..received]);
        error!("read {}/{}\n{}", received, RESPONSE_LEN, dump);
        return Err(TransportError::ShortRead {
            received,
            expected: RESPONSE_LEN,
            dump,
        });
    }
    Ok(buf)
}

/// Send one request and receive its response.
///
/// Short writes, short reads and responses that do not echo the request are
/// all errors; nothing is retried.
pub fn exchange<T: Read + Write>(dev: &mut T, cmd: [u8; 3]) -> Result<Response, TransportError> {
    let req = Request::new(cmd);
    debug!(
        "cmd {:02x} {:02x} {:02x}",
        req.opcode(),
        req.register(),
        req.param()
    );
    write_report(dev, &req)?;
    let buf = read_report(dev)?;
    trace!("response\n{}", hexdump(&buf));

    if buf[0] != req.opcode() || buf[1] != req.register() {
        let dump: String = hexdump(&buf);
        error!(
            "unexpected response {:02x} {:02x} to cmd {:02x} {:02x} {:02x}\n{}",
            buf[0],
            buf[1],
            req.opcode(),
            req.register(),
            req.param(),
            dump
        );
        Err(TransportError::EchoMismatch {
            opcode: req.opcode(),
            register: req.register(),
            param: req.param(),
            received: [buf[0], buf[1]],
            dump,
        })
    } else {
        Ok(Response(buf))
    }
}
