#![cfg_attr(not(test), no_std)]

//! Protocol engine for a single-link serial LED strip controller.
//!
//! Bytes from the link are fed through [`Engine::service_link`], either into
//! the line reassembler (text commands terminated by CR) or, after an `A`
//! command, into the binary frame receiver. [`Engine::tick`] runs from the
//! main loop and executes at most one staged command per call while driving
//! the status LED heartbeat.

// must come first so the macros are visible in the other modules
mod fmt;

pub mod budget;
pub mod color;
pub mod command;
pub mod dispatch;
pub mod engine;
pub mod frame;
pub mod hal;
pub mod heartbeat;
pub mod line;
pub mod reply;
pub mod stage;

pub use color::{parse_color, ChannelOrder, RGB8};
pub use command::Command;
pub use dispatch::CommandError;
pub use engine::{Engine, Settings};
pub use hal::{ByteSource, StatusLed, Strip};

/// Milliseconds read from a monotonic clock.
pub type Millis = u64;

pub const VERSION_STR: &str = "LED Controller v1.0";

/// Largest strip the pixel array can hold.
pub const MAX_LEDS: usize = 300;
pub const DEFAULT_LEDS: usize = 8;
pub const DEFAULT_BRIGHTNESS: u8 = 20;
pub const DEFAULT_DATA_PIN: u8 = 3;
pub const BYTES_PER_LED: usize = 3;

pub const BAUD_RATE: u32 = 115_200;

/// Size of the line buffer, two bytes are reserved so at most 18 characters are kept.
pub const LINE_BUFFER_SIZE: usize = 20;
pub const LINE_TERMINATOR: u8 = b'\r';

/// A binary frame that has not completed within this window is aborted.
pub const FRAME_TIMEOUT_MS: Millis = 5000;

/// Line-mode bytes handled per [`Engine::service_link`] call before yielding to the tick.
pub const LINE_BYTE_BUDGET: usize = 20;

pub const PROMPT: u8 = b'>';
pub const ECHO_PROMPT: &[u8] = b"\r\n> ";
pub const LINE_FEED: &[u8] = b"\r\n";
pub const ERROR_MARKER: u8 = b'E';
pub const RECEIPT_MARKER: u8 = b'.';

// https://pid.codes/1209/F0F0/
pub const DEVICE_VENDOR_ID: u16 = 0x1209;
pub const DEVICE_PRODUCT_ID: u16 = 0xF0F0;

pub const DEVICE_PRODUCT_NAME: &str = "LED Controller";
pub const DEVICE_MANUFACTURER: &str = "hrmny.sh";
