//! Finding power supplies.

use std::{
    ffi::OsString,
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{Model, OpenError, PowerSupply, VID};

/// Number of `/dev/hidrawN` nodes tried by [`scan`].
pub const SCAN_COUNT: usize = 16;

/// Device node path for a hidraw index.
pub fn hidraw_path(idx: usize) -> PathBuf {
    PathBuf::from(format!("/dev/hidraw{}", idx))
}

/// Try candidate paths in order and return the first supported power supply.
///
/// Candidates that are missing, unreadable or foreign are skipped. When none
/// match, the error records whether any candidate was refused for lack of
/// permissions.
pub fn first_match<I, P>(candidates: I) -> Result<PowerSupply<File>, OpenError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut permission_denied: bool = false;
    for path in candidates {
        let path: &Path = path.as_ref();
        match PowerSupply::open(path) {
            Ok(psu) => {
                debug!("using {}", path.display());
                return Ok(psu);
            }
            Err(OpenError::DeviceNotFound(_)) => {}
            Err(e @ OpenError::PermissionDenied(_)) => {
                warn!("{}", e);
                permission_denied = true;
            }
            Err(e) => debug!("{}: {}", path.display(), e),
        }
    }
    Err(OpenError::NoDevices { permission_denied })
}

/// Try `/dev/hidraw0` through `/dev/hidraw{count - 1}` in order.
///
/// # Example
///
/// ```no_run
/// let psu = corsairmi_exporter::locate::scan(corsairmi_exporter::locate::SCAN_COUNT)?;
/// println!("found {:?}", psu.model());
/// # Ok::<(), corsairmi_exporter::OpenError>(())
/// ```
pub fn scan(count: usize) -> Result<PowerSupply<File>, OpenError> {
    first_match((0..count).map(hidraw_path))
}

/// Parses the USB (VID, PID) from the file path component.
///
/// The component is in the form of `0003:046D:C083.0006`.
fn parse_component(component: Option<OsString>) -> Option<(u16, u16)> {
    let component = component?;
    let data: &str = component.to_str()?;
    if data.len() < 14 {
        None
    } else {
        let vid: u16 = u16::from_str_radix(data.get(5..9)?, 16).ok()?;
        let pid: u16 = u16::from_str_radix(data.get(10..14)?, 16).ok()?;
        Some((vid, pid))
    }
}

/// Returns `true` if the VID and PID correspond to a valid power supply.
fn valid_vid_pid(vid: u16, pid: u16) -> bool {
    vid == VID && Model::from_pid(pid).is_some()
}

/// Last component of a path, if it exists.
fn last_component(p: &Path) -> Option<OsString> {
    Some(p.components().last()?.as_os_str().to_owned())
}

/// List power supply device paths.
///
/// This works by following the links under `/sys/class/hidraw/` to the parent
/// HID device, whose name carries the USB vendor ID (VID) and product ID
/// (PID), and comparing them to the known VID/PID.
///
/// Typically these files are accessible without super user permissions.
///
/// # Example
///
/// ```
/// let mut list = corsairmi_exporter::locate::list()?;
/// if let Some(path) = list.pop() {
///     let _psu = corsairmi_exporter::PowerSupply::open(path)?;
///     // call psu methods here
/// } else {
///     eprintln!("No PSUs found");
/// }
/// # Ok::<(), std::boxed::Box<dyn std::error::Error>>(())
/// ```
pub fn list() -> io::Result<Vec<PathBuf>> {
    let mut ret: Vec<PathBuf> = Vec::new();
    let sys_class_hidraw: &Path = Path::new("/sys/class/hidraw/");

    if sys_class_hidraw.is_dir() {
        for entry in fs::read_dir(sys_class_hidraw)? {
            if let Ok(mut link) = entry?.path().read_link() {
                if let Some(hidrawx) = last_component(&link) {
                    link.pop(); // e.g. hidraw9
                    link.pop(); // e.g. hidraw
                    if let Some((vid, pid)) = parse_component(last_component(&link)) {
                        if valid_vid_pid(vid, pid) {
                            let mut dev: PathBuf = PathBuf::from("/dev/");
                            dev.push(hidrawx);
                            if dev.exists() {
                                ret.push(dev);
                            }
                        }
                    }
                }
            }
        }
    }
    ret.sort();
    ret.dedup();
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_component_some() {
        assert_eq!(
            parse_component(Some(OsString::from("0000:1B1C:1C06.000A"))),
            Some((0x1B1C, 0x1C06))
        );
        assert_eq!(
            parse_component(Some(OsString::from("0000:1b1c:1c06.000a"))),
            Some((0x1B1C, 0x1C06))
        );
        assert_eq!(
            parse_component(Some(OsString::from("0000:1B1C:1C06"))),
            Some((0x1B1C, 0x1C06))
        );
    }

    #[test]
    fn parse_component_none() {
        assert_eq!(parse_component(None), None);
        assert_eq!(
            parse_component(Some(OsString::from("0000:1B1Z:1C06.000A"))),
            None,
        );
        assert_eq!(parse_component(Some(OsString::from("0000:1B1C:1C0"))), None);
        // non-ASCII input must not panic
        assert_eq!(
            parse_component(Some(OsString::from("0000:1BC\u{e9}:1C06.000A"))),
            None
        );
    }

    #[test]
    fn test_valid_vid_pid() {
        assert!(valid_vid_pid(VID, Model::HX850i.pid()));
        assert!(!valid_vid_pid(0x1234, Model::HX850i.pid()));
        assert!(!valid_vid_pid(VID, 0x1234));
    }

    #[test]
    fn hidraw_paths() {
        assert_eq!(hidraw_path(0), PathBuf::from("/dev/hidraw0"));
        assert_eq!(hidraw_path(15), PathBuf::from("/dev/hidraw15"));
    }

    #[test]
    fn missing_candidates_are_not_permission_problems() {
        let candidates = ["/nonexistent/hidraw0", "/nonexistent/hidraw1"];
        assert!(matches!(
            first_match(candidates),
            Err(OpenError::NoDevices {
                permission_denied: false
            })
        ));
    }

    #[test]
    fn empty_scan() {
        assert!(matches!(
            scan(0),
            Err(OpenError::NoDevices {
                permission_denied: false
            })
        ));
    }

    #[test]
    fn non_hidraw_candidate_is_skipped() {
        let path = std::env::temp_dir().join(format!("corsairmi-scan-{}", std::process::id()));
        std::fs::write(&path, b"").unwrap();
        let result = first_match([path.as_path(), Path::new("/nonexistent/hidraw0")]);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(OpenError::NoDevices { .. })));
    }
}
