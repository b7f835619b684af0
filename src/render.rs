//! Rendering readings for humans and for Prometheus.
//!
//! Values are printed as read; rendering never alters them beyond rounding
//! floats to one decimal place.

use std::io::{self, Write};

use crate::telemetry::{Metric, Reading, Value};

/// Default metric name prefix.
pub const DEFAULT_PREFIX: &str = "corsair_";

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Prometheus text exposition format.
    #[default]
    Prometheus,
    /// Aligned `label: value` lines.
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    PoweredSeconds,
    UptimeSeconds,
    Temperature,
    FanRpm,
    SupplyVolts,
    PowerWatts,
    GreenLight,
    OutputVolts,
    OutputAmperes,
    OutputWatts,
}

const FAMILIES: [Family; 10] = [
    Family::PoweredSeconds,
    Family::UptimeSeconds,
    Family::Temperature,
    Family::FanRpm,
    Family::SupplyVolts,
    Family::PowerWatts,
    Family::GreenLight,
    Family::OutputVolts,
    Family::OutputAmperes,
    Family::OutputWatts,
];

impl Family {
    const fn name(&self) -> &'static str {
        match self {
            Family::PoweredSeconds => "powered_seconds",
            Family::UptimeSeconds => "uptime_seconds",
            Family::Temperature => "temperature_celsius",
            Family::FanRpm => "fan_rpm",
            Family::SupplyVolts => "global_supply_volts",
            Family::PowerWatts => "global_power_watts",
            Family::GreenLight => "green_equipment_power_consumption_va",
            Family::OutputVolts => "output_volts",
            Family::OutputAmperes => "output_amperes",
            Family::OutputWatts => "output_watts",
        }
    }

    const fn help(&self) -> &'static str {
        match self {
            Family::PoweredSeconds => "Global time powered in seconds",
            Family::UptimeSeconds => "Current uptime in seconds",
            Family::Temperature => "Temperature in celsius",
            Family::FanRpm => "Fan speed",
            Family::SupplyVolts => "Global power supply volts",
            Family::PowerWatts | Family::GreenLight => "Global power used in watts",
            Family::OutputVolts => "single output in volts",
            Family::OutputAmperes => "single output in amperes",
            Family::OutputWatts => "single output power in watts",
        }
    }

    fn contains(&self, metric: &Metric) -> bool {
        match self {
            Family::PoweredSeconds => matches!(metric, Metric::Powered),
            Family::UptimeSeconds => matches!(metric, Metric::Uptime),
            Family::Temperature => matches!(metric, Metric::Temperature(_)),
            Family::FanRpm => matches!(metric, Metric::FanSpeed),
            Family::SupplyVolts => matches!(metric, Metric::SupplyVoltage),
            Family::PowerWatts | Family::GreenLight => matches!(metric, Metric::TotalPower),
            Family::OutputVolts => matches!(metric, Metric::OutputVoltage(_)),
            Family::OutputAmperes => matches!(metric, Metric::OutputCurrent(_)),
            Family::OutputWatts => matches!(metric, Metric::OutputPower(_)),
        }
    }
}

/// Escape a Prometheus label value.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

fn labels(metric: &Metric) -> String {
    match metric {
        Metric::Temperature(s) => format!("{{sensor=\"{}\"}}", s.number()),
        m => match m.rail() {
            Some(r) => format!("{{output=\"{}\"}}", r.index()),
            None => String::new(),
        },
    }
}

fn text_of<'a>(readings: &'a [Reading], metric: Metric) -> &'a str {
    readings
        .iter()
        .find_map(|r| match (&r.value, r.metric == metric) {
            (Value::Text(s), true) => Some(s.as_str()),
            _ => None,
        })
        .unwrap_or("")
}

/// Write readings in the Prometheus text exposition format.
///
/// Identity strings become labels of a single `hardware_info` sample.
pub fn prometheus<W: Write>(w: &mut W, prefix: &str, readings: &[Reading]) -> io::Result<()> {
    if readings.iter().any(|r| matches!(r.value, Value::Text(_))) {
        writeln!(w, "# HELP {}hardware_info Hardware info", prefix)?;
        writeln!(w, "# TYPE {}hardware_info gauge", prefix)?;
        writeln!(
            w,
            "{}hardware_info{{name=\"{}\",vendor=\"{}\",product=\"{}\"}} 1",
            prefix,
            escape(text_of(readings, Metric::Name)),
            escape(text_of(readings, Metric::Vendor)),
            escape(text_of(readings, Metric::Product)),
        )?;
    }

    for family in FAMILIES.iter() {
        let samples: Vec<&Reading> = readings
            .iter()
            .filter(|r| family.contains(&r.metric))
            .collect();
        if samples.is_empty() {
            continue;
        }
        writeln!(w, "# HELP {}{} {}", prefix, family.name(), family.help())?;
        writeln!(w, "# TYPE {}{} gauge", prefix, family.name())?;
        for r in samples {
            writeln!(
                w,
                "{}{}{} {}",
                prefix,
                family.name(),
                labels(&r.metric),
                r.value
            )?;
        }
    }
    Ok(())
}

fn text_label(metric: &Metric) -> String {
    match metric {
        Metric::Name => "name".into(),
        Metric::Vendor => "vendor".into(),
        Metric::Product => "product".into(),
        Metric::Powered => "powered".into(),
        Metric::Uptime => "uptime".into(),
        Metric::Temperature(s) => format!("temp{}", s.number()),
        Metric::FanSpeed => "fan rpm".into(),
        Metric::SupplyVoltage => "supply volts".into(),
        Metric::TotalPower => "total watts".into(),
        Metric::OutputVoltage(r) => format!("output{} volts", r.index()),
        Metric::OutputCurrent(r) => format!("output{} amps", r.index()),
        Metric::OutputPower(r) => format!("output{} watts", r.index()),
    }
}

/// Write readings as aligned `label: value` lines.
pub fn text<W: Write>(w: &mut W, readings: &[Reading]) -> io::Result<()> {
    for r in readings {
        let label = format!("{}:", text_label(&r.metric));
        match &r.value {
            Value::Text(s) => writeln!(w, "{:<16}'{}'", label, s)?,
            Value::Counter(v) => writeln!(
                w,
                "{:<16}{} ({}d. {}h)",
                label,
                v,
                v / (24 * 60 * 60),
                v / (60 * 60) % 24
            )?,
            Value::Float(v) => writeln!(w, "{:<16}{:5.1}", label, v)?,
        }
    }
    Ok(())
}

/// Write readings in the requested format.
pub fn render<W: Write>(
    w: &mut W,
    format: Format,
    prefix: &str,
    readings: &[Reading],
) -> io::Result<()> {
    match format {
        Format::Prometheus => prometheus(w, prefix, readings),
        Format::Text => text(w, readings),
    }
}
