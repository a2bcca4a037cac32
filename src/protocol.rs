//! Vendor Control Protocol
//!
//! Setup packet parsing and decoding of the single SetRegister vendor
//! command. Everything else is reported as not supported so the USB stack
//! can apply its default handling.

use crate::config::{
    CMD_SET_REG, SET_REG_PAYLOAD_LEN, USB_ALTERNATE_SETTING, USB_CONFIGURATION_VALUE,
    USB_INTERFACE_NUMBER,
};
use crate::error::{BridgeError, BridgeResult};
use crate::types::{PayloadByteOrder, RegisterValue, REGISTER_BYTES};

/// Length of a setup packet on the wire
pub const SETUP_PACKET_LEN: usize = 8;

/// Standard request codes the bridge gets to see and passes through
pub mod standard {
    //! Standard USB request codes (USB 2.0, table 9-4)

    /// GET_STATUS
    pub const GET_STATUS: u8 = 0x00;
    /// SET_ADDRESS
    pub const SET_ADDRESS: u8 = 0x05;
    /// GET_DESCRIPTOR
    pub const GET_DESCRIPTOR: u8 = 0x06;
    /// GET_CONFIGURATION
    pub const GET_CONFIGURATION: u8 = 0x08;
    /// SET_CONFIGURATION
    pub const SET_CONFIGURATION: u8 = 0x09;
    /// GET_INTERFACE
    pub const GET_INTERFACE: u8 = 0x0A;
    /// SET_INTERFACE
    pub const SET_INTERFACE: u8 = 0x0B;
}

/// Data stage direction (bmRequestType bit 7)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Host to device
    Out,
    /// Device to host
    In,
}

/// Request type (bmRequestType bits 6..5)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    /// Standard request
    Standard,
    /// Class request
    Class,
    /// Vendor request
    Vendor,
    /// Reserved encoding
    Reserved,
}

/// Request recipient (bmRequestType bits 4..0)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recipient {
    /// Device
    Device,
    /// Interface
    Interface,
    /// Endpoint
    Endpoint,
    /// Other
    Other,
    /// Reserved encoding
    Reserved,
}

/// A control transfer setup packet
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetupPacket {
    /// bmRequestType
    pub request_type: u8,
    /// bRequest
    pub request: u8,
    /// wValue
    pub value: u16,
    /// wIndex
    pub index: u16,
    /// wLength
    pub length: u16,
}

impl SetupPacket {
    /// Build a setup packet from its fields
    #[must_use]
    pub const fn new(request_type: u8, request: u8, value: u16, index: u16, length: u16) -> Self {
        Self {
            request_type,
            request,
            value,
            index,
            length,
        }
    }

    /// SetRegister request as sent by the host tool
    #[must_use]
    pub const fn set_register() -> Self {
        Self::new(
            crate::config::SET_REG_REQUEST_TYPE,
            CMD_SET_REG,
            0,
            0,
            SET_REG_PAYLOAD_LEN as u16,
        )
    }

    /// Parse the 8 setup bytes (multi-byte fields little-endian)
    #[must_use]
    pub const fn from_bytes(raw: [u8; SETUP_PACKET_LEN]) -> Self {
        Self {
            request_type: raw[0],
            request: raw[1],
            value: u16::from_le_bytes([raw[2], raw[3]]),
            index: u16::from_le_bytes([raw[4], raw[5]]),
            length: u16::from_le_bytes([raw[6], raw[7]]),
        }
    }

    /// Serialize back to the 8 wire bytes
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; SETUP_PACKET_LEN] {
        let v = self.value.to_le_bytes();
        let i = self.index.to_le_bytes();
        let l = self.length.to_le_bytes();
        [self.request_type, self.request, v[0], v[1], i[0], i[1], l[0], l[1]]
    }

    /// Data stage direction
    #[must_use]
    pub const fn direction(&self) -> Direction {
        if self.request_type & 0x80 == 0 {
            Direction::Out
        } else {
            Direction::In
        }
    }

    /// Request type
    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        match (self.request_type >> 5) & 0x03 {
            0 => RequestKind::Standard,
            1 => RequestKind::Class,
            2 => RequestKind::Vendor,
            _ => RequestKind::Reserved,
        }
    }

    /// Request recipient
    #[must_use]
    pub const fn recipient(&self) -> Recipient {
        match self.request_type & 0x1F {
            0 => Recipient::Device,
            1 => Recipient::Interface,
            2 => Recipient::Endpoint,
            3 => Recipient::Other,
            _ => Recipient::Reserved,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for SetupPacket {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Setup(type=0x{:02X}, req=0x{:02X}, val={}, idx={}, len={})",
            self.request_type,
            self.request,
            self.value,
            self.index,
            self.length
        );
    }
}

/// Vendor command recognized by the decoder
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VendorCommand {
    /// Write one synthesizer register
    SetRegister,
}

impl VendorCommand {
    /// Number of data-stage bytes the command carries
    #[must_use]
    pub const fn payload_len(self) -> usize {
        match self {
            Self::SetRegister => SET_REG_PAYLOAD_LEN,
        }
    }

    /// bRequest code
    #[must_use]
    pub const fn opcode(self) -> u8 {
        match self {
            Self::SetRegister => CMD_SET_REG,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for VendorCommand {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::SetRegister => defmt::write!(f, "SetRegister"),
        }
    }
}

/// Answer given to the USB stack for a setup packet
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupResponse {
    /// Request handled; arm the control endpoint for `data_len` bytes
    Accept {
        /// Expected data-stage length
        data_len: usize,
    },
    /// Request not handled here; the stack applies default handling
    NotSupported,
}

impl SetupResponse {
    /// Whether the request was taken by the bridge
    #[must_use]
    pub const fn is_handled(self) -> bool {
        matches!(self, Self::Accept { .. })
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for SetupResponse {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Accept { data_len } => defmt::write!(f, "Accept({})", data_len),
            Self::NotSupported => defmt::write!(f, "NotSupported"),
        }
    }
}

/// Decode a setup packet into the vendor command it carries
///
/// Only host-to-device vendor requests addressed to the device with the
/// SetRegister opcode are recognized. A recognized request announcing any
/// length other than four is rejected as an incomplete payload.
pub fn decode_setup(setup: &SetupPacket) -> BridgeResult<VendorCommand> {
    if setup.kind() != RequestKind::Vendor
        || setup.recipient() != Recipient::Device
        || setup.direction() != Direction::Out
        || setup.request != CMD_SET_REG
    {
        return Err(BridgeError::UnsupportedRequest);
    }

    let command = VendorCommand::SetRegister;
    if usize::from(setup.length) != command.payload_len() {
        return Err(BridgeError::IncompletePayload {
            received: usize::from(setup.length),
        });
    }

    Ok(command)
}

/// Decode a SetRegister data stage
///
/// The slice must hold exactly four bytes.
pub fn decode_payload(data: &[u8], order: PayloadByteOrder) -> BridgeResult<RegisterValue> {
    let bytes: [u8; REGISTER_BYTES] = data
        .try_into()
        .map_err(|_| BridgeError::IncompletePayload {
            received: data.len(),
        })?;
    Ok(RegisterValue::from_bytes(bytes, order))
}

/// Encode a register as the data stage the host sends
#[must_use]
pub const fn encode_payload(value: RegisterValue, order: PayloadByteOrder) -> [u8; REGISTER_BYTES] {
    match order {
        PayloadByteOrder::MsbFirst => value.as_u32().to_be_bytes(),
        PayloadByteOrder::LsbFirst => value.as_u32().to_le_bytes(),
    }
}

/// Whether SET_CONFIGURATION with `value` selects a configuration we provide
#[must_use]
pub const fn accepts_configuration(value: u8) -> bool {
    value == USB_CONFIGURATION_VALUE
}

/// Whether SET_INTERFACE with this interface/alternate pair is valid
#[must_use]
pub const fn accepts_interface(interface: u8, alternate: u8) -> bool {
    interface == USB_INTERFACE_NUMBER && alternate == USB_ALTERNATE_SETTING
}
