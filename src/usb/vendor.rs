//! Vendor Request Handler
//!
//! Plugs the bridge into the embassy-usb control pipe. The stack calls
//! these hooks from the USB task; each one only forwards to [`Bridge`],
//! which stores into atomics and returns.

use defmt::{debug, info, warn};
use embassy_usb::control::{OutResponse, Recipient as UsbRecipient, Request, RequestType};
use embassy_usb::driver::Direction as UsbDirection;
use embassy_usb::types::InterfaceNumber;
use embassy_usb::Handler;

use crate::bridge::Bridge;
use crate::error::BridgeError;
use crate::protocol::{accepts_interface, SetupPacket};

/// Rebuild the setup packet from the fields embassy-usb parsed out
#[must_use]
pub fn setup_packet(req: &Request) -> SetupPacket {
    let direction = match req.direction {
        UsbDirection::Out => 0x00,
        UsbDirection::In => 0x80,
    };
    let kind = match req.request_type {
        RequestType::Standard => 0x00,
        RequestType::Class => 0x20,
        RequestType::Vendor => 0x40,
        RequestType::Reserved => 0x60,
    };
    let recipient = match req.recipient {
        UsbRecipient::Device => 0x00,
        UsbRecipient::Interface => 0x01,
        UsbRecipient::Endpoint => 0x02,
        UsbRecipient::Other => 0x03,
        UsbRecipient::Reserved => 0x1F,
    };
    SetupPacket::new(
        direction | kind | recipient,
        req.request,
        req.value,
        req.index,
        req.length,
    )
}

/// embassy-usb handler for the SetRegister vendor request
pub struct VendorHandler {
    bridge: &'static Bridge,
}

impl VendorHandler {
    /// Create a handler feeding `bridge`
    #[must_use]
    pub const fn new(bridge: &'static Bridge) -> Self {
        Self { bridge }
    }
}

impl Handler for VendorHandler {
    fn enabled(&mut self, enabled: bool) {
        if !enabled {
            self.bridge.on_configured(false);
        }
        info!("USB {}", if enabled { "enabled" } else { "disabled" });
    }

    fn reset(&mut self) {
        self.bridge.on_configured(false);
        debug!("USB reset");
    }

    fn configured(&mut self, configured: bool) {
        self.bridge.on_configured(configured);
        info!("USB configured: {}", configured);
    }

    fn set_alternate_setting(&mut self, iface: InterfaceNumber, alternate_setting: u8) {
        if !accepts_interface(iface.0, alternate_setting) {
            warn!("Unexpected interface {}/{}", iface.0, alternate_setting);
        }
    }

    fn control_out(&mut self, req: Request, data: &[u8]) -> Option<OutResponse> {
        let setup = setup_packet(&req);
        match self.bridge.try_control_out(&setup, data) {
            Ok(_) => {
                debug!("SetRegister {:02X}", data);
                Some(OutResponse::Accepted)
            }
            Err(BridgeError::UnsupportedRequest) => None,
            Err(err) => {
                warn!("Rejected vendor request: {}", err);
                Some(OutResponse::Rejected)
            }
        }
    }
}
