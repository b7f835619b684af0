use std::{
    io::{Read, Write},
    time::Duration,
};

use tracing::debug;

use crate::{
    cmd,
    transport::{exchange, Response},
    value::{linear11, Wide},
    Model, Rail, TransportError,
};

type Result<T> = std::result::Result<T, TransportError>;

/// Temperature sensor.
///
/// This is an input argument for [`PowerSupply::temperature`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sensor {
    Temp1,
    Temp2,
}

impl Sensor {
    /// One based sensor number, as used in metric labels.
    pub const fn number(&self) -> u8 {
        match self {
            Sensor::Temp1 => 1,
            Sensor::Temp2 => 2,
        }
    }

    pub(crate) const fn register(&self) -> u8 {
        match self {
            Sensor::Temp1 => cmd::TEMP1,
            Sensor::Temp2 => cmd::TEMP2,
        }
    }
}

/// Array of all temperature sensors.
pub const SENSORS: [Sensor; 2] = [Sensor::Temp1, Sensor::Temp2];

/// Output rail sample.
///
/// This is returned by [`PowerSupply::rail`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RailSample {
    pub rail: Rail,
    /// Voltage in volts.
    pub voltage: f64,
    /// Current in amps.
    pub current: f64,
    /// Power in watts.
    ///
    /// Note: this often does not add up to the product of current and
    /// voltage.
    pub power: f64,
    /// Raw register words, voltage, current and power in that order.
    pub raw: [Wide; 3],
}

/// Power supply.
///
/// Generic over the device handle so that anything speaking the report
/// protocol can stand in for a hidraw node. Dropping the power supply closes
/// the handle.
#[derive(Debug)]
pub struct PowerSupply<T> {
    dev: T,
    model: Model,
}

impl<T> PowerSupply<T> {
    pub(crate) fn new(dev: T, model: Model) -> PowerSupply<T> {
        PowerSupply { dev, model }
    }

    /// Get the power supply model.
    pub const fn model(&self) -> Model {
        self.model
    }

    /// Release the underlying handle.
    pub fn into_inner(self) -> T {
        self.dev
    }

    #[cfg(test)]
    pub(crate) fn device(&self) -> &T {
        &self.dev
    }
}

impl<T: Read + Write> PowerSupply<T> {
    fn command(&mut self, cmd: [u8; 3]) -> Result<Response> {
        exchange(&mut self.dev, cmd)
    }

    /// Read up to `size` payload bytes of a register.
    ///
    /// At most 62 bytes are available.
    pub fn read_raw(&mut self, reg: u8, size: usize) -> Result<Vec<u8>> {
        let rsp = self.command(cmd::read(reg))?;
        let mut buf: Vec<u8> = vec![0; size.min(cmd::PAYLOAD_LEN)];
        rsp.copy_payload(&mut buf);
        Ok(buf)
    }

    /// Read a 16-bit little endian register.
    pub fn read_u16(&mut self, reg: u8) -> Result<u16> {
        let mut buf: [u8; 2] = [0; 2];
        self.command(cmd::read(reg))?.copy_payload(&mut buf);
        Ok(u16::from_le_bytes(buf))
    }

    /// Read a 32-bit little endian register.
    pub fn read_u32(&mut self, reg: u8) -> Result<u32> {
        let mut buf: [u8; 4] = [0; 4];
        self.command(cmd::read(reg))?.copy_payload(&mut buf);
        Ok(u32::from_le_bytes(buf))
    }

    fn read_string(&mut self, cmd: [u8; 3]) -> Result<String> {
        let rsp = self.command(cmd)?;
        let payload: &[u8] = rsp.payload();
        let null_term: usize = payload
            .iter()
            .position(|x| *x == 0)
            .unwrap_or(payload.len());
        Ok(String::from_utf8_lossy(&payload[..null_term]).into_owned())
    }

    /// Model name as reported by the firmware.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use corsairmi_exporter::PowerSupply;
    ///
    /// let mut psu = PowerSupply::open("/dev/hidraw5")?;
    /// // e.g. "PSU name: HX850i"
    /// println!("PSU name: {:?}", psu.name()?);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn name(&mut self) -> Result<String> {
        self.read_string(cmd::NAME)
    }

    /// Vendor name, e.g. `CORSAIR`.
    pub fn vendor(&mut self) -> Result<String> {
        self.read_string(cmd::read(cmd::VENDOR))
    }

    /// Product name.
    pub fn product(&mut self) -> Result<String> {
        self.read_string(cmd::read(cmd::PRODUCT))
    }

    /// Total time the power supply has been powered, over its lifetime.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use corsairmi_exporter::PowerSupply;
    ///
    /// let mut psu = PowerSupply::open("/dev/hidraw5")?;
    /// // e.g. "PSU powered: 10535s"
    /// println!("PSU powered: {:?}", psu.powered()?);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn powered(&mut self) -> Result<Duration> {
        let secs: u32 = self.read_u32(cmd::POWERED)?;
        Ok(Duration::from_secs(u64::from(secs)))
    }

    /// Time since the PC was last switched on.
    pub fn uptime(&mut self) -> Result<Duration> {
        let secs: u32 = self.read_u32(cmd::UPTIME)?;
        Ok(Duration::from_secs(u64::from(secs)))
    }

    /// Temperature reading in Celsius.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use corsairmi_exporter::{PowerSupply, Sensor};
    ///
    /// let mut psu = PowerSupply::open("/dev/hidraw5")?;
    /// // e.g. "Temperature: 42.25"
    /// println!("Temperature: {:.2}", psu.temperature(Sensor::Temp1)?);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn temperature(&mut self, sensor: Sensor) -> Result<f64> {
        Ok(linear11(self.read_u16(sensor.register())?))
    }

    /// Fan rotations per minute.
    pub fn rpm(&mut self) -> Result<f64> {
        Ok(linear11(self.read_u16(cmd::RPM)?))
    }

    /// Input voltage in volts.
    pub fn input_voltage(&mut self) -> Result<f64> {
        Ok(linear11(self.read_u16(cmd::IN_VOLTAGE)?))
    }

    /// Total power in watts.
    pub fn input_power(&mut self) -> Result<f64> {
        Ok(linear11(self.read_u16(cmd::IN_POWER)?))
    }

    /// Input current in amps.
    ///
    /// This is derived from the input power and input voltage.
    pub fn input_current(&mut self) -> Result<f64> {
        let power: f64 = self.input_power()?;
        let voltage: f64 = self.input_voltage()?;
        Ok(power / voltage)
    }

    /// Select the output rail to read from.
    ///
    /// The device keeps the selection but never reports it back; read the
    /// rail registers through the returned handle.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use corsairmi_exporter::{PowerSupply, RAILS};
    ///
    /// let mut psu = PowerSupply::open("/dev/hidraw5")?;
    /// for rail in RAILS.iter() {
    ///     let mut sel = psu.select(*rail)?;
    ///     println!("{} output voltage: {}V", rail, sel.voltage()?.value());
    ///     println!("{} output current: {}A", rail, sel.current()?.value());
    ///     println!("{} output power: {}W", rail, sel.power()?.value());
    /// }
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn select(&mut self, rail: Rail) -> Result<SelectedRail<'_, T>> {
        debug!("select {}", rail);
        self.command(cmd::output_select(rail.index()))?;
        Ok(SelectedRail { psu: self, rail })
    }

    /// Get the current, voltage, and power for an output rail.
    pub fn rail(&mut self, rail: Rail) -> Result<RailSample> {
        let mut sel = self.select(rail)?;
        let raw: [Wide; 3] = [sel.voltage()?, sel.current()?, sel.power()?];
        Ok(RailSample {
            rail,
            voltage: raw[0].value(),
            current: raw[1].value(),
            power: raw[2].value(),
            raw,
        })
    }

    /// Return the rail selector to its default.
    ///
    /// Call this when done polling.
    pub fn release(&mut self) -> Result<()> {
        self.command(cmd::output_select(0))?;
        Ok(())
    }
}

/// A power supply with an output rail selected.
///
/// Holds the power supply borrow, so no other command can be sent until it is
/// dropped.
#[derive(Debug)]
pub struct SelectedRail<'a, T> {
    psu: &'a mut PowerSupply<T>,
    rail: Rail,
}

impl<'a, T: Read + Write> SelectedRail<'a, T> {
    pub fn rail(&self) -> Rail {
        self.rail
    }

    /// Output voltage register, decode with [`Wide::value`] for volts.
    pub fn voltage(&mut self) -> Result<Wide> {
        Ok(Wide(self.psu.read_u32(cmd::OUT_VOLTAGE)?))
    }

    /// Output current register, decode with [`Wide::value`] for amps.
    pub fn current(&mut self) -> Result<Wide> {
        Ok(Wide(self.psu.read_u32(cmd::OUT_CURRENT)?))
    }

    /// Output power register, decode with [`Wide::value`] for watts.
    pub fn power(&mut self) -> Result<Wide> {
        Ok(Wide(self.psu.read_u32(cmd::OUT_POWER)?))
    }
}
