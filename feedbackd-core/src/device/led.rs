//! LED device set: enumeration, variant classification, color selection,
//! and sysfs pattern driving (§4.5 — the hardest sub-subsystem).

use std::fs;
use std::path::{Path, PathBuf};

use feedbackd_types::ColorTag;

use crate::error::FeedbackError;

/// udev property marking an LED as feedback-eligible (opt-in discovery).
const FEEDBACKD_MARKER_PROPERTY: &str = "FEEDBACKD_LED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedVariant {
    Plain,
    Flash,
    Multicolor,
    VendorQcom,
    VendorQcomMulti,
}

impl LedVariant {
    /// Per-variant priority baseline; devices of a "better" variant sort first.
    fn default_priority(self) -> i32 {
        match self {
            LedVariant::VendorQcomMulti => 40,
            LedVariant::VendorQcom => 30,
            LedVariant::Multicolor => 20,
            LedVariant::Flash => 10,
            LedVariant::Plain => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorSupport {
    Fixed(FixedColor),
    Multicolor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FixedColor {
    White,
    Red,
    Green,
    Blue,
}

impl FixedColor {
    fn matches(self, color: ColorTag) -> bool {
        match (self, color) {
            (FixedColor::White, ColorTag::White) => true,
            (FixedColor::Red, ColorTag::Red) => true,
            (FixedColor::Green, ColorTag::Green) => true,
            (FixedColor::Blue, ColorTag::Blue) => true,
            _ => false,
        }
    }

    fn from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("red") {
            FixedColor::Red
        } else if lower.contains("green") {
            FixedColor::Green
        } else if lower.contains("blue") {
            FixedColor::Blue
        } else {
            FixedColor::White
        }
    }
}

/// Raw attributes read from a candidate sysfs LED directory, used as the
/// pure input to the probe chain so it can be unit-tested without hardware.
#[derive(Debug, Clone, Default)]
pub struct LedAttrs {
    pub name: String,
    pub max_brightness: u32,
    pub vendor: Option<String>,
    pub multi_index: Option<Vec<String>>,
}

impl LedAttrs {
    fn read_from(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_string();
        let max_brightness = read_u32(&path.join("max_brightness")).unwrap_or(255);
        let vendor = fs::read_to_string(path.join("vendor")).ok().map(|s| s.trim().to_string());
        let multi_index = fs::read_to_string(path.join("multi_index"))
            .ok()
            .map(|s| s.split_whitespace().map(|s| s.to_string()).collect());
        Some(LedAttrs { name, max_brightness, vendor, multi_index })
    }
}

fn read_u32(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// The probe chain, tried in order for each candidate device. The first
/// variant whose probe succeeds wins (§4.5).
fn probe_chain(attrs: &LedAttrs) -> LedVariant {
    if attrs.vendor.as_deref() == Some("qcom") && attrs.multi_index.is_some() {
        return LedVariant::VendorQcomMulti;
    }
    if attrs.vendor.as_deref() == Some("qcom") {
        return LedVariant::VendorQcom;
    }
    if attrs.multi_index.is_some() {
        return LedVariant::Multicolor;
    }
    if attrs.name.to_lowercase().contains("flash") {
        return LedVariant::Flash;
    }
    LedVariant::Plain
}

/// One driveable LED, already classified by the probe chain.
pub struct LedDevice {
    pub sysfs_path: PathBuf,
    pub max_brightness: u32,
    pub variant: LedVariant,
    pub priority: i32,
    color_support: ColorSupport,
    /// Position of (red, green, blue) within the `multi_intensity` tuple, for multicolor LEDs.
    channel_order: Option<(usize, usize, usize)>,
}

impl LedDevice {
    fn from_attrs(path: PathBuf, attrs: LedAttrs) -> Self {
        let variant = probe_chain(&attrs);
        let color_support = match variant {
            LedVariant::Multicolor | LedVariant::VendorQcomMulti => ColorSupport::Multicolor,
            _ => ColorSupport::Fixed(FixedColor::from_name(&attrs.name)),
        };
        let channel_order = attrs.multi_index.as_ref().map(|idx| channel_positions(idx));
        LedDevice {
            sysfs_path: path,
            max_brightness: attrs.max_brightness,
            variant,
            priority: variant.default_priority(),
            color_support,
            channel_order,
        }
    }

    pub fn is_flash(&self) -> bool {
        matches!(self.variant, LedVariant::Flash)
    }

    pub fn supports_color(&self, color: ColorTag) -> bool {
        match self.color_support {
            ColorSupport::Multicolor => true,
            ColorSupport::Fixed(fixed) => fixed.matches(color),
        }
    }

    /// Drive this LED to `color` at `max_brightness_pct`, starting a
    /// periodic blink at `frequency_mhz` (§4.5 "Multicolor driving").
    pub fn drive(&self, color: ColorTag, frequency_mhz: u32, max_brightness_pct: u32) -> Result<(), FeedbackError> {
        let scaled = self.max_brightness * max_brightness_pct.min(100) / 100;

        if let Some((r_pos, g_pos, b_pos)) = self.channel_order {
            let (r, g, b) = color.rgb();
            let mut channels = [0u32; 3];
            channels[r_pos] = (r as u32) * scaled / 255;
            channels[g_pos] = (g as u32) * scaled / 255;
            channels[b_pos] = (b as u32) * scaled / 255;
            let intensity = format!("{} {} {}", channels[0], channels[1], channels[2]);
            write_attr(&self.sysfs_path, "multi_intensity", &intensity)?;
        }

        write_attr(&self.sysfs_path, "brightness", &scaled.to_string())?;
        write_attr(&self.sysfs_path, "pattern", &frequency_mhz.to_string())?;
        Ok(())
    }

    /// Stop blinking by zeroing brightness (§4.5 "Stop").
    pub fn stop(&self) -> Result<(), FeedbackError> {
        write_attr(&self.sysfs_path, "brightness", "0")
    }
}

fn channel_positions(multi_index: &[String]) -> (usize, usize, usize) {
    let pos = |name: &str| multi_index.iter().position(|c| c == name).unwrap_or(0);
    (pos("red"), pos("green"), pos("blue"))
}

fn write_attr(device_path: &Path, attr: &str, value: &str) -> Result<(), FeedbackError> {
    fs::write(device_path.join(attr), value).map_err(|e| FeedbackError::DeviceDriveError {
        device: device_path.display().to_string(),
        reason: e.to_string(),
    })
}

/// The set of discovered, feedback-eligible LEDs, sorted by priority descending.
pub struct LedSet {
    leds: Vec<LedDevice>,
}

impl LedSet {
    /// Enumerate the `leds` udev subsystem, keep only devices carrying the
    /// feedback-eligible marker property, classify each via the probe
    /// chain, and sort by priority descending.
    pub fn discover() -> Self {
        let mut leds = Vec::new();
        match enumerate_leds() {
            Ok(candidates) => {
                for path in candidates {
                    if let Some(attrs) = LedAttrs::read_from(&path) {
                        leds.push(LedDevice::from_attrs(path, attrs));
                    }
                }
            }
            Err(e) => log::warn!(target: "led", "LED enumeration failed: {}", e),
        }
        leds.sort_by(|a, b| b.priority.cmp(&a.priority));
        LedSet { leds }
    }

    #[cfg(test)]
    fn from_devices(leds: Vec<LedDevice>) -> Self {
        LedSet { leds }
    }

    /// Find the first LED matching `color`; failing that, the first LED
    /// that is not a dedicated flash LED (§4.5 "find_for_color").
    pub fn find_for_color(&self, color: ColorTag) -> Result<&LedDevice, FeedbackError> {
        if let Some(led) = self.leds.iter().find(|l| l.supports_color(color)) {
            return Ok(led);
        }
        if let Some(led) = self.leds.iter().find(|l| !l.is_flash()) {
            return Ok(led);
        }
        Err(FeedbackError::NoDeviceForFeedback { variant: "Led" })
    }

    pub fn is_empty(&self) -> bool {
        self.leds.is_empty()
    }

    /// Find an LED for `color` and drive it, returning its sysfs path so the
    /// caller can stop the same device later without holding a borrow open.
    pub fn drive_for_color(
        &self,
        color: ColorTag,
        frequency_mhz: u32,
        max_brightness_pct: u32,
    ) -> Result<PathBuf, FeedbackError> {
        let led = self.find_for_color(color)?;
        led.drive(color, frequency_mhz, max_brightness_pct)?;
        Ok(led.sysfs_path.clone())
    }

    pub fn stop_path(&self, path: &Path) -> Result<(), FeedbackError> {
        if let Some(led) = self.leds.iter().find(|l| l.sysfs_path == path) {
            led.stop()?;
        }
        Ok(())
    }
}

fn enumerate_leds() -> std::io::Result<Vec<PathBuf>> {
    let mut enumerator = udev::Enumerator::new()?;
    enumerator.match_subsystem("leds")?;
    let mut paths = Vec::new();
    for device in enumerator.scan_devices()? {
        let marked = device
            .property_value(FEEDBACKD_MARKER_PROPERTY)
            .map(|v| v == "1")
            .unwrap_or(false);
        if marked {
            if let Some(syspath) = device.syspath().to_str() {
                paths.push(PathBuf::from(syspath));
            }
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_white(priority: i32) -> LedDevice {
        LedDevice {
            sysfs_path: PathBuf::from("/tmp/nonexistent-white"),
            max_brightness: 255,
            variant: LedVariant::Plain,
            priority,
            color_support: ColorSupport::Fixed(FixedColor::White),
            channel_order: None,
        }
    }

    fn multicolor(priority: i32) -> LedDevice {
        LedDevice {
            sysfs_path: PathBuf::from("/tmp/nonexistent-multi"),
            max_brightness: 255,
            variant: LedVariant::Multicolor,
            priority,
            color_support: ColorSupport::Multicolor,
            channel_order: Some((0, 1, 2)),
        }
    }

    #[test]
    fn selects_multicolor_for_color_plain_cannot_represent() {
        let set = LedSet::from_devices(vec![plain_white(10), multicolor(5)]);
        let chosen = set.find_for_color(ColorTag::Red).unwrap();
        assert_eq!(chosen.variant, LedVariant::Multicolor);
    }

    #[test]
    fn selects_plain_white_for_white_even_with_lower_priority_alternative() {
        let set = LedSet::from_devices(vec![plain_white(10), multicolor(5)]);
        let chosen = set.find_for_color(ColorTag::White).unwrap();
        assert_eq!(chosen.variant, LedVariant::Plain);
    }

    #[test]
    fn falls_back_to_non_flash_led_when_no_color_match() {
        let flash = LedDevice {
            sysfs_path: PathBuf::from("/tmp/nonexistent-flash"),
            max_brightness: 255,
            variant: LedVariant::Flash,
            priority: 20,
            color_support: ColorSupport::Fixed(FixedColor::White),
            channel_order: None,
        };
        let set = LedSet::from_devices(vec![flash, plain_white(1)]);
        let chosen = set.find_for_color(ColorTag::Blue).unwrap();
        assert_eq!(chosen.variant, LedVariant::Plain);
    }

    #[test]
    fn fails_when_no_led_present() {
        let set = LedSet::from_devices(vec![]);
        assert!(set.find_for_color(ColorTag::Red).is_err());
    }

    #[test]
    fn probe_chain_prefers_qcom_multicolor() {
        let attrs = LedAttrs {
            name: "led:rgb".into(),
            max_brightness: 255,
            vendor: Some("qcom".into()),
            multi_index: Some(vec!["red".into(), "green".into(), "blue".into()]),
        };
        assert_eq!(probe_chain(&attrs), LedVariant::VendorQcomMulti);
    }

    #[test]
    fn probe_chain_falls_back_to_plain() {
        let attrs = LedAttrs { name: "led:status".into(), max_brightness: 255, vendor: None, multi_index: None };
        assert_eq!(probe_chain(&attrs), LedVariant::Plain);
    }

    #[test]
    fn channel_positions_found_from_multi_index() {
        let idx = vec!["green".to_string(), "blue".to_string(), "red".to_string()];
        assert_eq!(channel_positions(&idx), (2, 0, 1));
    }
}
