use corsairmi_exporter::{locate, OpenError, PowerSupply, RAILS, SENSORS};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut list = locate::list()?;
    let mut psu = match list.pop() {
        Some(path) => PowerSupply::open(path)?,
        None => match locate::scan(locate::SCAN_COUNT) {
            Ok(psu) => psu,
            Err(e @ OpenError::NoDevices { .. }) => {
                println!("{}", e);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        },
    };
    println!("Model: {:?}", psu.model());
    println!("Powered: {:?}", psu.powered()?);
    println!("Uptime: {:?}", psu.uptime()?);
    println!("Name: {:?}", psu.name()?);
    println!("Product: {:?}", psu.product()?);
    println!("Vendor: {:?}", psu.vendor()?);
    for sensor in SENSORS.iter() {
        println!("{:?}: {:.2} C", sensor, psu.temperature(*sensor)?);
    }
    println!("Fan: {:.1} RPM", psu.rpm()?);
    println!("Input voltage: {:.1} V", psu.input_voltage()?);
    println!("Input power: {:.1} W", psu.input_power()?);
    println!("Input current: {:.2} A", psu.input_current()?);

    for rail in RAILS.iter() {
        let sample = psu.rail(*rail)?;
        println!("{} sample: {:#?}", rail, sample);
    }
    psu.release()?;
    Ok(())
}
