//! Export telemetry from Corsair RMi and HXi series power supplies.
//!
//! This uses the Linux HIDRAW interface to communicate with the power supply,
//! and renders the readings as Prometheus metrics or plain text.
//!
//! This crate is based off of this implementation in C: [notaz/corsairmi]
//!
//! # Example
//!
//! ```no_run
//! use corsairmi_exporter::{telemetry, PowerSupply};
//!
//! let mut psu = PowerSupply::open("/dev/hidraw5")?;
//! for reading in telemetry::poll(&mut psu)? {
//!     println!("{:?}: {}", reading.metric, reading.value);
//! }
//! # Ok::<(), std::boxed::Box<dyn std::error::Error>>(())
//! ```
//!
//! # udev rules
//!
//! You will most likely want to update your udev rules so that you can access
//! the power supply as a non superuser.
//!
//! These are my udev rules, you will need to update the `idProduct` field for
//! the product ID of your power supply, you can figure this value out with
//! `lsusb`, or by reading the source.
//!
//! Also note the value for `idProduct` must be **lowercase** hexadecimal.
//!
//! ```text
//! # /etc/udev/rules.d/99-corsair.rules
//! SUBSYSTEM=="hidraw", ATTRS{idVendor}=="1b1c", ATTRS{idProduct}=="1c06", MODE="0666"
//! ```
//!
//! udev rules can be reloaded with
//! `sudo udevadm control --reload-rules && sudo udevadm trigger`
//!
//! [notaz/corsairmi]: https://github.com/notaz/corsairmi
#![doc(html_root_url = "https://docs.rs/corsairmi-exporter/0.1.0")]

use std::fmt;

pub mod cmd;
mod device;
mod dump;
mod error;
pub mod locate;
#[cfg(test)]
mod mock;
mod psu;
pub mod render;
pub mod telemetry;
pub mod transport;
mod value;

pub use device::{DeviceIdentity, Identify};
pub use dump::hexdump;
pub use error::{OpenError, TransportError};
pub use psu::{PowerSupply, RailSample, SelectedRail, Sensor, SENSORS};
pub use value::{encode_linear11, linear11, Wide};

/// Corsair vendor ID.
pub const VID: u16 = 0x1B1C;

/// Power supply models compatible with this API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Model {
    RM650i,
    RM750i,
    RM850i,
    RM1000i,
    HX650i,
    HX750i,
    HX850i,
    HX1000i,
    HX1200i,
}

impl Model {
    /// Get the product ID for the power supply model.
    ///
    /// # Example
    ///
    /// ```
    /// use corsairmi_exporter::Model;
    ///
    /// let m: Model = Model::RM850i;
    /// assert_eq!(m.pid(), 0x1C0Cu16);
    /// ```
    pub const fn pid(&self) -> u16 {
        match self {
            Model::RM650i => 0x1c0a,
            Model::RM750i => 0x1c0b,
            Model::RM850i => 0x1c0c,
            Model::RM1000i => 0x1c0d,
            Model::HX650i => 0x1c04,
            Model::HX750i => 0x1c05,
            Model::HX850i => 0x1c06,
            Model::HX1000i => 0x1c07,
            Model::HX1200i => 0x1c08,
        }
    }

    /// Look up a model by product ID.
    ///
    /// # Example
    ///
    /// ```
    /// use corsairmi_exporter::Model;
    ///
    /// assert_eq!(Model::from_pid(0x1C06), Some(Model::HX850i));
    /// assert_eq!(Model::from_pid(0x1234), None);
    /// ```
    pub fn from_pid(pid: u16) -> Option<Model> {
        MODELS.iter().copied().find(|m| m.pid() == pid)
    }
}

/// Array of all models.
pub const MODELS: [Model; 9] = [
    Model::RM650i,
    Model::RM750i,
    Model::RM850i,
    Model::RM1000i,
    Model::HX650i,
    Model::HX750i,
    Model::HX850i,
    Model::HX1000i,
    Model::HX1200i,
];

/// Power supply output rail.
///
/// This is an input argument for [`PowerSupply::select`] and
/// [`PowerSupply::rail`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rail {
    /// 12V rail.
    Rail12v,
    /// 5V rail.
    Rail5v,
    /// 3.3V rail.
    Rail3v3,
}

impl Rail {
    /// Index sent to the device to select this rail.
    pub const fn index(&self) -> u8 {
        match self {
            Rail::Rail12v => 0,
            Rail::Rail5v => 1,
            Rail::Rail3v3 => 2,
        }
    }
}

impl fmt::Display for Rail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rail::Rail12v => write!(f, "12V"),
            Rail::Rail5v => write!(f, "5V"),
            Rail::Rail3v3 => write!(f, "3.3V"),
        }
    }
}

/// Array of all rails, in selection order.
pub const RAILS: [Rail; 3] = [Rail::Rail12v, Rail::Rail5v, Rail::Rail3v3];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn unique_pid() {
        let mut pids: HashSet<u16> = HashSet::with_capacity(MODELS.len());
        for model in MODELS.iter() {
            let pid: u16 = model.pid();
            if pids.get(&pid).is_some() {
                panic!("PID 0x{:04X} for model {:?} is a duplicate", pid, model);
            }
            pids.insert(model.pid());
        }
    }

    #[test]
    fn pid_round_trip() {
        for model in MODELS.iter() {
            assert_eq!(Model::from_pid(model.pid()), Some(*model));
        }
    }

    #[test]
    fn rail_indices() {
        assert_eq!(RAILS.map(|r| r.index()), [0, 1, 2]);
        assert_eq!(Rail::Rail3v3.to_string(), "3.3V");
    }
}
