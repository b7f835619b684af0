//! Opening and identifying hidraw devices.

use std::{
    fs::{File, OpenOptions},
    io::{self, Read, Write},
    os::unix::io::AsRawFd,
    path::Path,
};

use tracing::debug;

use crate::{Model, OpenError, PowerSupply, VID};

/// USB vendor and product ID reported by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceIdentity {
    /// Match against the table of supported power supplies.
    ///
    /// The vendor ID is checked first; a foreign vendor is rejected whatever
    /// its product ID.
    ///
    /// # Example
    ///
    /// ```
    /// use corsairmi_exporter::{DeviceIdentity, Model, VID};
    ///
    /// let id = DeviceIdentity { vendor_id: VID, product_id: 0x1C0C };
    /// assert_eq!(id.model().ok(), Some(Model::RM850i));
    ///
    /// let id = DeviceIdentity { vendor_id: 0x046D, product_id: 0x1C0C };
    /// assert!(id.model().is_err());
    /// ```
    pub fn model(&self) -> Result<Model, OpenError> {
        let mismatch = || OpenError::IdentityMismatch {
            vendor_id: self.vendor_id,
            product_id: self.product_id,
        };
        if self.vendor_id != VID {
            return Err(mismatch());
        }
        Model::from_pid(self.product_id).ok_or_else(mismatch)
    }
}

/// Something that can report its USB identity.
pub trait Identify {
    fn identity(&self) -> io::Result<DeviceIdentity>;
}

#[repr(C)]
#[derive(Debug)]
#[allow(non_camel_case_types)]
struct hidraw_devinfo {
    bustype: u32,
    vendor: i16,
    product: i16,
}

impl Identify for File {
    fn identity(&self) -> io::Result<DeviceIdentity> {
        // Only one IOCTL is needed for this crate.
        const IOC_READ: libc::c_ulong = 2;
        const IOC_NRBITS: libc::c_ulong = 8;
        const IOC_TYPEBITS: libc::c_ulong = 8;
        const IOC_SIZEBITS: libc::c_ulong = 14;
        const IOC_NRSHIFT: libc::c_ulong = 0;
        const IOC_TYPESHIFT: libc::c_ulong = IOC_NRSHIFT + IOC_NRBITS;
        const IOC_SIZESHIFT: libc::c_ulong = IOC_TYPESHIFT + IOC_TYPEBITS;
        const IOC_DIRSHIFT: libc::c_ulong = IOC_SIZESHIFT + IOC_SIZEBITS;
        const HIDIOCGRAWINFO: libc::c_ulong = (IOC_READ << IOC_DIRSHIFT)
            | ((b'H' as libc::c_ulong) << IOC_TYPESHIFT)
            | (0x03 << IOC_NRSHIFT)
            | ((std::mem::size_of::<hidraw_devinfo>() as libc::c_ulong) << IOC_SIZESHIFT);

        let mut info = hidraw_devinfo {
            bustype: 0,
            vendor: 0,
            product: 0,
        };
        // safety: the fd is owned by `self` and outlives the call, and `info`
        // matches the kernel's struct hidraw_devinfo layout
        let rc = unsafe { libc::ioctl(self.as_raw_fd(), HIDIOCGRAWINFO as _, &mut info) };
        if rc == -1 {
            Err(io::Error::last_os_error())
        } else {
            Ok(DeviceIdentity {
                vendor_id: info.vendor as u16,
                product_id: info.product as u16,
            })
        }
    }
}

impl PowerSupply<File> {
    /// Open the power supply by file path.
    ///
    /// The device is opened read/write and its identity checked against the
    /// supported models. A rejected device is closed before returning.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use corsairmi_exporter::PowerSupply;
    ///
    /// let psu = PowerSupply::open("/dev/hidraw5")?;
    /// println!("PSU model: {:?}", psu.model());
    /// # Ok::<(), corsairmi_exporter::OpenError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<PowerSupply<File>, OpenError> {
        let path: &Path = path.as_ref();
        let f: File = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| OpenError::from_io(path.to_path_buf(), e))?;
        debug!("opened {}", path.display());
        PowerSupply::from_device(f)
    }
}

impl<T: Read + Write + Identify> PowerSupply<T> {
    /// Wrap an already open device after checking its identity.
    ///
    /// On rejection `dev` is dropped, which closes it.
    pub fn from_device(dev: T) -> Result<PowerSupply<T>, OpenError> {
        let identity: DeviceIdentity = dev.identity().map_err(OpenError::Ioctl)?;
        let model: Model = identity.model()?;
        debug!(
            "matched {:04x}:{:04x} as {:?}",
            identity.vendor_id, identity.product_id, model
        );
        Ok(PowerSupply::new(dev, model))
    }
}
