//! Error types.
//!
//! Device selection failures ([`OpenError`]) let a scan move on to the next
//! candidate. Failures during a polling pass ([`TransportError`]) end the pass.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::VID;

/// Failure to open or match a power supply.
#[derive(Error, Debug)]
pub enum OpenError {
    /// The device node does not exist.
    #[error("{}: no such device", .0.display())]
    DeviceNotFound(PathBuf),
    /// The device node exists but cannot be opened for read/write.
    #[error("{}: permission denied", .0.display())]
    PermissionDenied(PathBuf),
    /// The device is not a supported power supply.
    #[error(
        "unexpected device: {vendor_id:04x}:{product_id:04x} (expected vendor {expected:04x})",
        expected = VID
    )]
    IdentityMismatch { vendor_id: u16, product_id: u16 },
    /// The device did not answer the identity query.
    #[error("HIDIOCGRAWINFO: {0}")]
    Ioctl(#[source] io::Error),
    /// Any other IO failure while opening the device.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A scan ran out of candidates.
    #[error("no compatible devices found{}", permission_hint(.permission_denied))]
    NoDevices { permission_denied: bool },
}

fn permission_hint(permission_denied: &bool) -> &'static str {
    if *permission_denied {
        "; at least one device could not be checked because of lack of permissions for /dev/hidraw*"
    } else {
        ""
    }
}

impl OpenError {
    /// Classify an IO error raised while opening `path`.
    pub(crate) fn from_io(path: PathBuf, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => OpenError::DeviceNotFound(path),
            io::ErrorKind::PermissionDenied => OpenError::PermissionDenied(path),
            _ => OpenError::Io { path, source: e },
        }
    }
}

/// Failure of a single request/response exchange.
///
/// None of these are retried; the link is assumed broken or desynchronized.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("write {written}/{expected}")]
    ShortWrite { written: usize, expected: usize },
    #[error("read {received}/{expected}")]
    ShortRead {
        received: usize,
        expected: usize,
        /// Hex dump of the partial report, empty if nothing was read.
        dump: String,
    },
    #[error(
        "unexpected response {:02x} {:02x} to cmd {opcode:02x} {register:02x} {param:02x}",
        .received[0], .received[1]
    )]
    EchoMismatch {
        opcode: u8,
        register: u8,
        param: u8,
        received: [u8; 2],
        /// Hex dump of the full response.
        dump: String,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl TransportError {
    /// Hex dump of the offending report, if one was captured.
    pub fn dump(&self) -> Option<&str> {
        match self {
            TransportError::ShortRead { dump, .. } | TransportError::EchoMismatch { dump, .. }
                if !dump.is_empty() =>
            {
                Some(dump.as_str())
            }
            _ => None,
        }
    }
}
