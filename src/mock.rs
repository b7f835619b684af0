//! Emulated power supply used by unit tests.
//!
//! Answers reads from a register table, keeps the device-side rail selector,
//! and records every request so tests can check command ordering.

use std::{
    collections::HashMap,
    io::{self, Read, Write},
};

use crate::{
    cmd::{self, OP_NAME, OP_READ, OP_SELECT, RAIL_SCOPED, REQUEST_LEN, RESPONSE_LEN},
    device::{DeviceIdentity, Identify},
    Model, VID,
};

/// Misbehaviour to inject into an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Accept only this many bytes of the request.
    ShortWrite(usize),
    /// Return only this many bytes of the response.
    ShortRead(usize),
    /// Flip the echoed opcode.
    CorruptOpcode,
    /// Flip the echoed register.
    CorruptRegister,
    /// Fail the write with an IO error.
    Disconnect,
}

/// One request seen by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange {
    pub cmd: [u8; 3],
    /// Rail selected on the device when the request arrived.
    pub rail: u8,
}

impl Exchange {
    pub fn is_select(&self) -> bool {
        self.cmd[0] == OP_SELECT
    }

    pub fn is_rail_read(&self) -> bool {
        self.cmd[0] == OP_READ && RAIL_SCOPED.contains(&self.cmd[1])
    }
}

#[derive(Debug)]
pub struct MockDevice {
    identity: DeviceIdentity,
    registers: HashMap<u8, Vec<u8>>,
    rails: [HashMap<u8, Vec<u8>>; 3],
    name: Vec<u8>,
    selected: u8,
    pending: Option<[u8; RESPONSE_LEN]>,
    log: Vec<Exchange>,
    fault: Option<(Option<usize>, Fault)>,
}

fn rail_table(voltage: u32, current: u32, power: u32) -> HashMap<u8, Vec<u8>> {
    let mut t = HashMap::new();
    t.insert(cmd::OUT_VOLTAGE, voltage.to_le_bytes().to_vec());
    t.insert(cmd::OUT_CURRENT, current.to_le_bytes().to_vec());
    t.insert(cmd::OUT_POWER, power.to_le_bytes().to_vec());
    t
}

impl MockDevice {
    /// An HX850i with fixed readings.
    ///
    /// | reading        | value      |
    /// |----------------|------------|
    /// | temperature 1  | 32.5       |
    /// | temperature 2  | 24.5       |
    /// | fan            | 0.0        |
    /// | input voltage  | 115.0      |
    /// | input power    | 18.0       |
    /// | rail 0 V/A/W   | 12.15625 / 0.75 / 8.0 |
    /// | rail 1 V/A/W   | 5.015625 / 1.625 / 7.5 |
    /// | rail 2 V/A/W   | 3.296875 / 0.8125 / 2.5 |
    pub fn hx850i() -> MockDevice {
        let mut registers: HashMap<u8, Vec<u8>> = HashMap::new();
        registers.insert(cmd::VENDOR, b"CORSAIR\0".to_vec());
        registers.insert(cmd::PRODUCT, b"HX850i\0".to_vec());
        registers.insert(cmd::POWERED, 1_234_567u32.to_le_bytes().to_vec());
        registers.insert(cmd::UPTIME, 6_935u32.to_le_bytes().to_vec());
        registers.insert(cmd::TEMP1, 0xF841u16.to_le_bytes().to_vec());
        registers.insert(cmd::TEMP2, 0xF062u16.to_le_bytes().to_vec());
        registers.insert(cmd::RPM, 0x0000u16.to_le_bytes().to_vec());
        registers.insert(cmd::IN_VOLTAGE, 0xF8E6u16.to_le_bytes().to_vec());
        registers.insert(cmd::IN_POWER, 0x0809u16.to_le_bytes().to_vec());
        MockDevice {
            identity: DeviceIdentity {
                vendor_id: VID,
                product_id: Model::HX850i.pid(),
            },
            registers,
            rails: [
                rail_table(0xD30A, 0xF003, 0x0804),
                rail_table(0xD141, 0xE01A, 0xF80F),
                rail_table(0xD0D3, 0xE00D, 0x0001_F805),
            ],
            name: b"HX850i\0".to_vec(),
            selected: 0,
            pending: None,
            log: Vec::new(),
            fault: None,
        }
    }

    pub fn with_identity(mut self, vendor_id: u16, product_id: u16) -> MockDevice {
        self.identity = DeviceIdentity {
            vendor_id,
            product_id,
        };
        self
    }

    pub fn with_register(mut self, reg: u8, data: &[u8]) -> MockDevice {
        self.registers.insert(reg, data.to_vec());
        self
    }

    /// Inject `fault` into every exchange.
    pub fn with_fault(mut self, fault: Fault) -> MockDevice {
        self.fault = Some((None, fault));
        self
    }

    /// Inject `fault` into the exchange with index `at` (zero based).
    pub fn with_fault_at(mut self, at: usize, fault: Fault) -> MockDevice {
        self.fault = Some((Some(at), fault));
        self
    }

    pub fn log(&self) -> &[Exchange] {
        &self.log
    }

    pub fn selected(&self) -> u8 {
        self.selected
    }

    /// Indices of rail-scoped reads that were not part of a triad directly
    /// following a rail select.
    pub fn rail_violations(&self) -> Vec<usize> {
        let mut violations: Vec<usize> = Vec::new();
        let mut reads_since_select: Option<usize> = None;
        for (idx, ex) in self.log.iter().enumerate() {
            if ex.is_select() {
                reads_since_select = Some(0);
            } else if ex.is_rail_read() {
                match reads_since_select {
                    Some(n) if n < RAIL_SCOPED.len() => reads_since_select = Some(n + 1),
                    _ => violations.push(idx),
                }
            } else {
                reads_since_select = None;
            }
        }
        violations
    }

    fn active_fault(&self) -> Option<Fault> {
        match self.fault {
            Some((None, f)) => Some(f),
            Some((Some(at), f)) if at + 1 == self.log.len() => Some(f),
            _ => None,
        }
    }

    fn respond(&mut self, req: &[u8]) -> [u8; RESPONSE_LEN] {
        let (op, reg, param) = (req[1], req[2], req[3]);
        let mut rsp: [u8; RESPONSE_LEN] = [0; RESPONSE_LEN];
        rsp[0] = op;
        rsp[1] = reg;
        if op == OP_SELECT {
            self.selected = param;
        }
        let data: Option<&Vec<u8>> = match op {
            OP_READ if RAIL_SCOPED.contains(&reg) => self
                .rails
                .get(usize::from(self.selected))
                .and_then(|t| t.get(&reg)),
            OP_READ => self.registers.get(&reg),
            OP_NAME if reg == cmd::NAME[1] => Some(&self.name),
            _ => None,
        };
        if let Some(data) = data {
            let n = data.len().min(RESPONSE_LEN - 2);
            rsp[2..2 + n].copy_from_slice(&data[..n]);
        }
        rsp
    }
}

impl Identify for MockDevice {
    fn identity(&self) -> io::Result<DeviceIdentity> {
        Ok(self.identity)
    }
}

impl Write for MockDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        assert_eq!(buf.len(), REQUEST_LEN, "request must be a full report");
        assert_eq!(buf[0], 0, "report ID must be zero");
        self.log.push(Exchange {
            cmd: [buf[1], buf[2], buf[3]],
            rail: self.selected,
        });
        match self.active_fault() {
            Some(Fault::Disconnect) => {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "disconnected"))
            }
            Some(Fault::ShortWrite(n)) => return Ok(n),
            _ => {}
        }
        let rsp = self.respond(buf);
        self.pending = Some(rsp);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for MockDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut rsp = match self.pending.take() {
            Some(rsp) => rsp,
            None => return Ok(0),
        };
        let mut len: usize = RESPONSE_LEN;
        match self.active_fault() {
            Some(Fault::ShortRead(n)) => len = n.min(RESPONSE_LEN),
            Some(Fault::CorruptOpcode) => rsp[0] ^= 0xFF,
            Some(Fault::CorruptRegister) => rsp[1] ^= 0x01,
            _ => {}
        }
        let len = len.min(buf.len());
        buf[..len].copy_from_slice(&rsp[..len]);
        Ok(len)
    }
}
