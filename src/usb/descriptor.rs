//! USB Device Descriptors
//!
//! Identity strings and the single vendor-class interface.

use embassy_usb::driver::Driver;
use embassy_usb::Builder;

use crate::config::{
    USB_EP0_PACKET_SIZE, USB_MANUFACTURER, USB_MAX_POWER_MA, USB_PID,
    USB_PRODUCT, USB_VENDOR_CLASS, USB_VID,
};

/// USB device identity
#[derive(Clone, Copy, Debug)]
pub struct UsbIdentity {
    /// Vendor ID
    pub vid: u16,
    /// Product ID
    pub pid: u16,
    /// Device release number
    pub device_release: u16,
    /// Manufacturer name
    pub manufacturer: &'static str,
    /// Product name
    pub product: &'static str,
    /// Serial number
    pub serial: &'static str,
    /// Bus power draw in mA
    pub max_power_ma: u16,
}

impl UsbIdentity {
    /// Identity the evaluation software looks for
    pub const DEFAULT: Self = Self {
        vid: USB_VID,
        pid: USB_PID,
        device_release: 0x0100,
        manufacturer: USB_MANUFACTURER,
        product: USB_PRODUCT,
        serial: "0001",
        max_power_ma: USB_MAX_POWER_MA,
    };

    /// Build the embassy-usb device configuration
    #[must_use]
    pub fn to_config(&self) -> embassy_usb::Config<'static> {
        let mut config = embassy_usb::Config::new(self.vid, self.pid);
        config.manufacturer = Some(self.manufacturer);
        config.product = Some(self.product);
        config.serial_number = Some(self.serial);
        config.device_release = self.device_release;
        config.max_power = self.max_power_ma;
        config.max_packet_size_0 = USB_EP0_PACKET_SIZE;
        config.device_class = 0x00;
        config.device_sub_class = 0x00;
        config.device_protocol = 0x00;
        config.composite_with_iads = false;
        config
    }
}

impl Default for UsbIdentity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl defmt::Format for UsbIdentity {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "USB({:04X}:{:04X})", self.vid, self.pid);
    }
}

/// Add the vendor-class interface with no endpoints beyond EP0
///
/// Must be the first interface added, so it gets number 0.
pub fn add_vendor_interface<'d, D: Driver<'d>>(builder: &mut Builder<'d, D>) {
    let mut function = builder.function(USB_VENDOR_CLASS, 0, 0);
    let mut interface = function.interface();
    let _alt = interface.alt_setting(USB_VENDOR_CLASS, 0, 0, None);
}
