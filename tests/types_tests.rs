//! Shared Type Tests
//!
//! Tests for register values, bit ordering, line levels and the status
//! LED pattern.

use adf435x_firmware::config::{ACTIVITY_BLINK_MS, HEARTBEAT_OFF_MS, HEARTBEAT_ON_MS};
use adf435x_firmware::error::BridgeError;
use adf435x_firmware::types::{
    LedState, Level, PayloadByteOrder, RegisterValue, REGISTER_BITS, REGISTER_BYTES,
};

// ============================================================================
// RegisterValue Tests
// ============================================================================

#[test]
fn test_register_value_zero() {
    assert_eq!(RegisterValue::ZERO.as_u32(), 0);
    assert_eq!(RegisterValue::default(), RegisterValue::ZERO);
}

#[test]
fn test_register_value_conversions() {
    let value = RegisterValue::from(0x1234_5678);
    assert_eq!(value.as_u32(), 0x1234_5678);
    assert_eq!(u32::from(value), 0x1234_5678);
}

#[test]
fn test_register_value_from_bytes() {
    let bytes = [0x12, 0x34, 0x56, 0x78];
    assert_eq!(RegisterValue::from_be_bytes(bytes).as_u32(), 0x1234_5678);
    assert_eq!(
        RegisterValue::from_bytes(bytes, PayloadByteOrder::MsbFirst).as_u32(),
        0x1234_5678
    );
    assert_eq!(
        RegisterValue::from_bytes(bytes, PayloadByteOrder::LsbFirst).as_u32(),
        0x7856_3412
    );
}

#[test]
fn test_bus_bytes_are_msb_first() {
    assert_eq!(
        RegisterValue::new(0xDEAD_BEEF).to_bus_bytes(),
        [0xDE, 0xAD, 0xBE, 0xEF]
    );
}

#[test]
fn test_bit_access() {
    let value = RegisterValue::new(0x8000_0001);
    assert!(value.bit(31));
    assert!(value.bit(0));
    assert!(!value.bit(1));
    assert!(!value.bit(32));
}

#[test]
fn test_bits_msb_first_order() {
    let bits: Vec<bool> = RegisterValue::new(0xDEAD_BEEF).bits_msb_first().collect();
    let expected = "11011110101011011011111011101111";
    assert_eq!(bits.len(), 32);
    for (bit, ch) in bits.iter().zip(expected.chars()) {
        assert_eq!(*bit, ch == '1');
    }
}

#[test]
fn test_bits_iterator_exact_size() {
    let mut bits = RegisterValue::new(0).bits_msb_first();
    assert_eq!(bits.len(), REGISTER_BITS as usize);
    bits.next();
    assert_eq!(bits.len(), 31);
    assert_eq!(bits.count(), 31);
}

#[test]
fn test_register_value_formatting() {
    let value = RegisterValue::new(0x0058_0005);
    assert_eq!(format!("{value}"), "0x00580005");
    assert_eq!(format!("{value:?}"), "RegisterValue(0x00580005)");
}

#[test]
fn test_register_constants() {
    assert_eq!(REGISTER_BITS, 32);
    assert_eq!(REGISTER_BYTES, 4);
}

// ============================================================================
// Level and Byte Order Tests
// ============================================================================

#[test]
fn test_level_from_bool() {
    assert_eq!(Level::from(true), Level::High);
    assert_eq!(Level::from(false), Level::Low);
}

#[test]
fn test_default_byte_order() {
    assert_eq!(PayloadByteOrder::default(), PayloadByteOrder::MsbFirst);
}

// ============================================================================
// Status LED Tests
// ============================================================================

#[test]
fn test_led_starts_off() {
    assert_eq!(LedState::default(), LedState::Off);
}

#[test]
fn test_led_toggle() {
    assert_eq!(LedState::Off.toggle(), LedState::On);
    assert_eq!(LedState::On.toggle(), LedState::Off);
    assert_eq!(LedState::On.toggle().toggle(), LedState::On);
}

#[test]
fn test_led_heartbeat_hold() {
    assert_eq!(LedState::On.heartbeat_hold_ms(), HEARTBEAT_ON_MS);
    assert_eq!(LedState::Off.heartbeat_hold_ms(), HEARTBEAT_OFF_MS);
}

#[test]
fn test_led_activity_flicker_inverts_resting_state() {
    for resting in [LedState::Off, LedState::On] {
        let (flicker, blink_ms) = resting.activity_flicker();
        assert_eq!(flicker, resting.toggle());
        assert_eq!(blink_ms, ACTIVITY_BLINK_MS);
        // Flicker must stay visible against the heartbeat phase it interrupts
        assert!(blink_ms < resting.heartbeat_hold_ms());
    }
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_only_busy_is_retryable() {
    assert!(BridgeError::BusyTransport.is_retryable());
    assert!(!BridgeError::UnsupportedRequest.is_retryable());
    assert!(!BridgeError::IncompletePayload { received: 3 }.is_retryable());
    assert!(!BridgeError::Pin.is_retryable());
}

#[test]
fn test_error_display() {
    assert_eq!(
        BridgeError::IncompletePayload { received: 3 }.to_string(),
        "register payload has 3 bytes, expected 4"
    );
    assert_eq!(BridgeError::BusyTransport.to_string(), "transport busy");
}
