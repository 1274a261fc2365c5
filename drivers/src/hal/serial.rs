//! Serial Port (UART) Hardware Abstraction Layer.
//!
//! This module defines platform-independent configuration and traits for
//! serial communication. Transmit and receive are configured separately
//! and may live on different physical channels.

use crate::platform::{CurrentPlatform, Platform};
use core::fmt;

/// Number of stop bits.
///
/// Discriminants are the hardware encodings of CR2.STOP.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u32)]
pub enum StopBits {
    /// One stop bit.
    One = 0b00,
    /// Half a stop bit.
    Half = 0b01,
    /// Two stop bits.
    Two = 0b10,
    /// One and a half stop bits.
    OneAndHalf = 0b11,
}

impl StopBits {
    pub const fn encoding(self) -> u32 {
        self as u32
    }
}

/// Parity mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Parity {
    /// Even parity.
    Even,
    /// Odd parity.
    Odd,
}

/// Configuration of one direction (transmit or receive).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DirectionConfig {
    /// USART/UART channel number (UART4 = 4).
    pub channel: u8,
    /// Baud rate in bits per second.
    pub baud_rate: u32,
    pub stop_bits: StopBits,
    pub parity: Parity,
}

impl DirectionConfig {
    pub const fn new(channel: u8, baud_rate: u32, stop_bits: StopBits, parity: Parity) -> Self {
        Self {
            channel,
            baud_rate,
            stop_bits,
            parity,
        }
    }
}

/// Serial port configuration.
///
/// Either side may be absent; a handle without a transmit side refuses to
/// transmit and vice versa.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    pub tx: Option<DirectionConfig>,
    pub rx: Option<DirectionConfig>,
    /// Kernel clock of the USART in Hz, used to derive the baud divisor.
    pub clock_hz: u32,
}

impl SerialConfig {
    /// Configuration with neither side, for the given kernel clock.
    pub const fn new(clock_hz: u32) -> Self {
        Self {
            tx: None,
            rx: None,
            clock_hz,
        }
    }

    pub const fn with_tx(mut self, tx: DirectionConfig) -> Self {
        self.tx = Some(tx);
        self
    }

    pub const fn with_rx(mut self, rx: DirectionConfig) -> Self {
        self.rx = Some(rx);
        self
    }
}

impl Default for SerialConfig {
    /// Neither side, clocked at the platform's reset kernel clock.
    fn default() -> Self {
        Self::new(CurrentPlatform::usart_kernel_clock_hz())
    }
}

/// Status flag a serial transfer waits on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SerialFlag {
    /// Transmit data register empty (ISR.TXE).
    TransmitEmpty,
    /// Received data ready (ISR.RXNE).
    ReceiveReady,
}

/// Serial port errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SerialError {
    /// The platform has no USART/UART with this channel number.
    InvalidChannel(u8),
    /// Baud rate is zero or yields a divisor outside the BRR range.
    InvalidBaudRate(u32),
    /// Configuration names neither side, or both sides share a channel
    /// with different settings.
    InvalidConfig,
    /// Transmit requested on a handle without a transmit side.
    NoTransmitter,
    /// Receive requested on a handle without a receive side.
    NoReceiver,
    /// Operation would block but non-blocking mode was requested.
    WouldBlock,
    /// The flag never came up within the wait budget.
    Timeout(SerialFlag),
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerialError::InvalidChannel(channel) => write!(f, "no serial channel {}", channel),
            SerialError::InvalidBaudRate(baud) => write!(f, "unsupported baud rate {}", baud),
            SerialError::InvalidConfig => f.write_str("invalid transmit/receive configuration"),
            SerialError::NoTransmitter => f.write_str("transmit side not configured"),
            SerialError::NoReceiver => f.write_str("receive side not configured"),
            SerialError::WouldBlock => f.write_str("operation would block"),
            SerialError::Timeout(flag) => write!(f, "timed out waiting for {:?}", flag),
        }
    }
}

/// Serial port trait.
///
/// Both operations block until the whole buffer has moved or an error
/// occurs.
pub trait SerialPort {
    /// Error type for serial operations.
    type Error: fmt::Debug;

    /// Write every byte of `bytes`.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Fill `buffer` with received bytes.
    fn read(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error>;

    /// Write a single byte (blocking).
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.write(&[byte])
    }

    /// Read a single byte (blocking).
    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut byte = [0u8; 1];
        self.read(&mut byte)?;
        Ok(byte[0])
    }
}

/// Extension trait for non-blocking operations.
pub trait NonBlockingSerial: SerialPort {
    /// Try to write a byte without blocking.
    fn try_write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Try to read a byte without blocking.
    fn try_read_byte(&mut self) -> Result<u8, Self::Error>;
}

/// Wrapper type to implement core::fmt::Write for SerialPort types.
/// This allows using write!/writeln! macros.
pub struct SerialWriter<T: SerialPort>(pub T);

impl<T: SerialPort> fmt::Write for SerialWriter<T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut rest = s.as_bytes();
        // Convert line endings
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.0.write(&rest[..pos]).map_err(|_| fmt::Error)?;
            self.0.write(b"\r\n").map_err(|_| fmt::Error)?;
            rest = &rest[pos + 1..];
        }
        self.0.write(rest).map_err(|_| fmt::Error)
    }
}
