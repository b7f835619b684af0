//! One complete polling pass over a power supply.
//!
//! The pass reads identity strings, time counters, temperatures, fan speed,
//! input power and then each output rail, always in that order. Each rail is
//! selected immediately before its three registers are read, and the selector
//! is returned to its default at the end of the pass.

use std::{
    fmt,
    io::{Read, Write},
};

use tracing::{debug, info};

use crate::{PowerSupply, Rail, Sensor, TransportError, RAILS, SENSORS};

/// What a reading measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Identity,
    Duration,
    Temperature,
    RotationalSpeed,
    Voltage,
    Current,
    Power,
}

/// Named reading produced by a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Device name string.
    Name,
    /// Vendor string.
    Vendor,
    /// Product string.
    Product,
    /// Lifetime powered seconds.
    Powered,
    /// Seconds since the PC was switched on.
    Uptime,
    Temperature(Sensor),
    FanSpeed,
    SupplyVoltage,
    TotalPower,
    OutputVoltage(Rail),
    OutputCurrent(Rail),
    OutputPower(Rail),
}

impl Metric {
    pub const fn kind(&self) -> Kind {
        match self {
            Metric::Name | Metric::Vendor | Metric::Product => Kind::Identity,
            Metric::Powered | Metric::Uptime => Kind::Duration,
            Metric::Temperature(_) => Kind::Temperature,
            Metric::FanSpeed => Kind::RotationalSpeed,
            Metric::SupplyVoltage | Metric::OutputVoltage(_) => Kind::Voltage,
            Metric::OutputCurrent(_) => Kind::Current,
            Metric::TotalPower | Metric::OutputPower(_) => Kind::Power,
        }
    }

    /// Output rail this reading belongs to, if it is rail scoped.
    pub const fn rail(&self) -> Option<Rail> {
        match self {
            Metric::OutputVoltage(r) | Metric::OutputCurrent(r) | Metric::OutputPower(r) => {
                Some(*r)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Float(f64),
    Counter(u64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{:.1}", v),
            Value::Counter(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub metric: Metric,
    pub value: Value,
}

impl Reading {
    fn new(metric: Metric, value: Value) -> Reading {
        Reading { metric, value }
    }
}

/// Read every metric from the power supply.
///
/// Any transport error ends the pass and no readings are returned. The device
/// is left for the caller to drop, which closes it.
///
/// # Example
///
/// ```no_run
/// use corsairmi_exporter::{telemetry, PowerSupply};
///
/// let mut psu = PowerSupply::open("/dev/hidraw5")?;
/// let readings = telemetry::poll(&mut psu)?;
/// assert_eq!(readings.len(), 19);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn poll<T: Read + Write>(psu: &mut PowerSupply<T>) -> Result<Vec<Reading>, TransportError> {
    let mut out: Vec<Reading> = Vec::with_capacity(19);

    out.push(Reading::new(Metric::Name, Value::Text(psu.name()?)));
    out.push(Reading::new(Metric::Vendor, Value::Text(psu.vendor()?)));
    out.push(Reading::new(Metric::Product, Value::Text(psu.product()?)));

    out.push(Reading::new(
        Metric::Powered,
        Value::Counter(psu.powered()?.as_secs()),
    ));
    out.push(Reading::new(
        Metric::Uptime,
        Value::Counter(psu.uptime()?.as_secs()),
    ));

    for sensor in SENSORS.iter() {
        let t: f64 = psu.temperature(*sensor)?;
        out.push(Reading::new(Metric::Temperature(*sensor), Value::Float(t)));
    }

    out.push(Reading::new(Metric::FanSpeed, Value::Float(psu.rpm()?)));
    out.push(Reading::new(
        Metric::SupplyVoltage,
        Value::Float(psu.input_voltage()?),
    ));
    out.push(Reading::new(
        Metric::TotalPower,
        Value::Float(psu.input_power()?),
    ));

    for rail in RAILS.iter() {
        let mut sel = psu.select(*rail)?;
        let voltage = sel.voltage()?;
        let current = sel.current()?;
        let power = sel.power()?;
        debug!(
            "rail {} reserved {:04x} {:04x} {:04x}",
            rail,
            voltage.reserved(),
            current.reserved(),
            power.reserved()
        );
        out.push(Reading::new(
            Metric::OutputVoltage(*rail),
            Value::Float(voltage.value()),
        ));
        out.push(Reading::new(
            Metric::OutputCurrent(*rail),
            Value::Float(current.value()),
        ));
        out.push(Reading::new(
            Metric::OutputPower(*rail),
            Value::Float(power.value()),
        ));
    }

    psu.release()?;
    info!("polled {} readings from {:?}", out.len(), psu.model());
    Ok(out)
}
