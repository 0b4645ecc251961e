//! GPIO / peripheral pin assignments for the composter control board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// 120 VAC actuators, switched through solid-state relays (active HIGH)
// ---------------------------------------------------------------------------

/// SSR driving the irrigation pump.
pub const SSR_PUMP_GPIO: i32 = 4;
/// SSR driving blower stage 1.
pub const SSR_BLOWER_1_GPIO: i32 = 2;
/// SSR driving blower stage 2.
pub const SSR_BLOWER_2_GPIO: i32 = 3;

// ---------------------------------------------------------------------------
// Manual-control buttons (active-low momentary, external pull-ups)
// ---------------------------------------------------------------------------

/// Start a manual pump run (configured pump duration).
pub const BTN_PUMP_GPIO: i32 = 7;
/// Start a manual blower sequence (configured stage duration).
pub const BTN_BLOWER_GPIO: i32 = 5;
/// Abort any run in progress.
pub const BTN_STOP_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// I²C bus — sensor array behind a TCA9548A multiplexer
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 14;
pub const I2C_SCL_GPIO: i32 = 15;
/// Standard-mode 100 kHz; the SHT31 nodes sit on long cable runs.
pub const I2C_FREQ_HZ: u32 = 100_000;

/// TCA9548A I²C multiplexer, default address.
pub const I2C_MUX_ADDR: u8 = 0x70;
/// SHT31 temperature/humidity sensor, ADDR pin low.
pub const SHT31_ADDR: u8 = 0x44;

// ---------------------------------------------------------------------------
// UART debug
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 17;
pub const UART_RX_GPIO: i32 = 18;
