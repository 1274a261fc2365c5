//! STM32H7 USART/UART Driver (polled)
//!
//! Transmit and receive are independent halves: each has its own channel,
//! register block and line settings, and either may be absent.
//!
//! # Features
//!
//! - Configurable baud rate, stop bits and parity per direction
//! - Blocking buffer transfers with a bounded wait per byte
//! - Non-blocking single-byte I/O
//!
//! # Example
//!
//! ```ignore
//! use h7_drivers::hal::serial::*;
//! use h7_drivers::peripheral::usart::Usart;
//! use common::WaitPolicy;
//!
//! static LINK: DirectionConfig = DirectionConfig::new(4, 115_200, StopBits::Two, Parity::Odd);
//! static CONFIG: SerialConfig = SerialConfig::new(64_000_000).with_tx(LINK).with_rx(LINK);
//!
//! // UART4 clock and PC10/PC11 AF8 set up by the caller.
//! let mut uart = unsafe { Usart::init(&CONFIG, WaitPolicy::DEFAULT)? };
//! uart.transmit_polling(b"hello world\r\n")?;
//! ```

use crate::hal::serial::{
    DirectionConfig, NonBlockingSerial, Parity, SerialConfig, SerialError, SerialFlag, SerialPort,
};
use crate::hw::stm32h743::usart::{self as hw, Cr1, Isr};
use crate::platform::{CurrentPlatform, Platform};
use common::wait::{self, WaitPolicy};
use common::{Mmio, RegisterAccess};
use log::{debug, trace, warn};

/// Baud divisor: `clock / baud` rounded half up, i.e.
/// `(clock + baud / 2) / baud` in integer arithmetic.
///
/// Returns `None` for a zero baud rate.
pub const fn baud_divisor(clock_hz: u32, baud_rate: u32) -> Option<u32> {
    if baud_rate == 0 {
        return None;
    }
    let divisor = (clock_hz as u64 + (baud_rate >> 1) as u64) / baud_rate as u64;
    if divisor > u32::MAX as u64 {
        return None;
    }
    Some(divisor as u32)
}

/// Divisor for `side`, checked against the BRR range.
fn checked_divisor(clock_hz: u32, side: &DirectionConfig) -> Result<u32, SerialError> {
    match baud_divisor(clock_hz, side.baud_rate) {
        Some(divisor) if (hw::BRR_MIN..=hw::BRR_MAX).contains(&divisor) => Ok(divisor),
        _ => Err(SerialError::InvalidBaudRate(side.baud_rate)),
    }
}

/// One configured direction.
struct Half<'a, R: RegisterAccess> {
    regs: R,
    config: &'a DirectionConfig,
}

impl<R: RegisterAccess> Half<'_, R> {
    fn program(&self, divisor: u32) {
        // Frame format bits are only writable with the USART disabled.
        self.regs.clear_bits(hw::CR1, Cr1::UE.bits());

        self.regs.write_field(
            hw::CR2,
            hw::CR2_STOP_MASK,
            hw::CR2_STOP_SHIFT,
            self.config.stop_bits.encoding(),
        );

        // 9-bit word with parity in the top bit: 8 data bits + parity.
        let parity = match self.config.parity {
            Parity::Even => Cr1::PCE | Cr1::M0,
            Parity::Odd => Cr1::PCE | Cr1::M0 | Cr1::PS,
        };
        self.regs.modify(hw::CR1, |v| {
            (v & !(Cr1::PCE | Cr1::M0 | Cr1::PS).bits()) | parity.bits()
        });

        self.regs.write(hw::BRR, divisor);
        self.regs.set_bits(hw::CR1, Cr1::UE.bits());
    }

    fn wait_flag(
        &self,
        policy: WaitPolicy,
        flag: Isr,
        which: SerialFlag,
    ) -> Result<(), SerialError> {
        let ready = || self.regs.is_set(hw::ISR, flag.bits());
        wait::wait_for(policy, ready).map_err(|timeout| {
            warn!(
                "USART{}: {:?} still clear after {} polls",
                self.config.channel, which, timeout.polls
            );
            SerialError::Timeout(which)
        })
    }
}

/// Polled USART handle.
///
/// Borrows the direction configurations for as long as it lives.
pub struct Usart<'a, R: RegisterAccess> {
    tx: Option<Half<'a, R>>,
    rx: Option<Half<'a, R>>,
    wait: WaitPolicy,
}

impl<'a> Usart<'a, Mmio> {
    /// Resolve each configured side on the current platform and program it.
    ///
    /// # Safety
    ///
    /// - the bus clock of every referenced channel must be enabled and its
    ///   pins set to the USART alternate function
    /// - no other handle may drive the same channel
    pub unsafe fn init(config: &'a SerialConfig, wait: WaitPolicy) -> Result<Self, SerialError> {
        Self::init_with(config, wait, |channel| {
            CurrentPlatform::usart_channel(channel).map(|base| {
                debug!(
                    "{} USART{}: registers at {:#010x}",
                    CurrentPlatform::name(),
                    channel,
                    base
                );
                // SAFETY: the platform table only lists USART register
                // blocks; the caller guarantees clocking and ownership.
                unsafe { Mmio::new(base) }
            })
        })
    }
}

impl<'a, R: RegisterAccess> Usart<'a, R> {
    /// Program the sides present in `config`, resolving each side's channel
    /// through `resolve`.
    ///
    /// Every check runs before any register is written. `resolve` is only
    /// called for sides that are configured.
    ///
    /// Both sides may name the same channel only with identical settings;
    /// the channel is then programmed once.
    pub fn init_with<F>(
        config: &'a SerialConfig,
        wait: WaitPolicy,
        mut resolve: F,
    ) -> Result<Self, SerialError>
    where
        F: FnMut(u8) -> Option<R>,
    {
        let shared = match (&config.tx, &config.rx) {
            (None, None) => return Err(SerialError::InvalidConfig),
            (Some(tx), Some(rx)) if tx.channel == rx.channel => {
                if tx != rx {
                    return Err(SerialError::InvalidConfig);
                }
                true
            }
            _ => false,
        };

        let tx_divisor = config
            .tx
            .as_ref()
            .map(|side| checked_divisor(config.clock_hz, side))
            .transpose()?;
        let rx_divisor = config
            .rx
            .as_ref()
            .map(|side| checked_divisor(config.clock_hz, side))
            .transpose()?
            .filter(|_| !shared);

        let mut half = |side: &'a DirectionConfig| {
            resolve(side.channel)
                .map(|regs| Half { regs, config: side })
                .ok_or(SerialError::InvalidChannel(side.channel))
        };
        let tx = config.tx.as_ref().map(&mut half).transpose()?;
        let rx = config.rx.as_ref().map(&mut half).transpose()?;

        for (side, divisor) in [(&tx, tx_divisor), (&rx, rx_divisor)] {
            if let (Some(side), Some(divisor)) = (side, divisor) {
                side.program(divisor);
                debug!(
                    "USART{}: {} baud (BRR {}), {:?} stop, {:?} parity",
                    side.config.channel,
                    side.config.baud_rate,
                    divisor,
                    side.config.stop_bits,
                    side.config.parity
                );
            }
        }

        Ok(Self { tx, rx, wait })
    }

    /// Send all of `bytes`, waiting for the data register to drain after
    /// each one.
    ///
    /// An empty buffer returns at once without touching the hardware.
    pub fn transmit_polling(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        let tx = self.tx.as_ref().ok_or(SerialError::NoTransmitter)?;
        if bytes.is_empty() {
            return Ok(());
        }

        // A previous transfer may still be draining.
        tx.wait_flag(self.wait, Isr::TXE, SerialFlag::TransmitEmpty)?;

        tx.regs.set_bits(hw::CR1, Cr1::TE.bits());
        let result = bytes.iter().try_for_each(|&byte| {
            tx.regs.write(hw::TDR, byte as u32);
            tx.wait_flag(self.wait, Isr::TXE, SerialFlag::TransmitEmpty)
        });
        tx.regs.clear_bits(hw::CR1, Cr1::TE.bits());

        trace!("USART{}: sent {} bytes", tx.config.channel, bytes.len());
        result
    }

    /// Fill `buffer` with received bytes, waiting for each one.
    pub fn receive_polling(&mut self, buffer: &mut [u8]) -> Result<(), SerialError> {
        let rx = self.rx.as_ref().ok_or(SerialError::NoReceiver)?;

        rx.regs.set_bits(hw::CR1, Cr1::RE.bits());
        let result = buffer.iter_mut().try_for_each(|slot| {
            rx.wait_flag(self.wait, Isr::RXNE, SerialFlag::ReceiveReady)?;
            *slot = (rx.regs.read(hw::RDR) & hw::DATA_MASK) as u8;
            Ok(())
        });
        rx.regs.clear_bits(hw::CR1, Cr1::RE.bits());

        trace!("USART{}: received {} bytes", rx.config.channel, buffer.len());
        result
    }

    pub fn has_transmitter(&self) -> bool {
        self.tx.is_some()
    }

    pub fn has_receiver(&self) -> bool {
        self.rx.is_some()
    }
}

// ============================================================================
// HAL Implementation
// ============================================================================

impl<R: RegisterAccess> SerialPort for Usart<'_, R> {
    type Error = SerialError;

    fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        self.transmit_polling(bytes)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<(), SerialError> {
        self.receive_polling(buffer)
    }
}

impl<R: RegisterAccess> NonBlockingSerial for Usart<'_, R> {
    /// Leaves the transmitter enabled so the byte can finish shifting out.
    fn try_write_byte(&mut self, byte: u8) -> Result<(), SerialError> {
        let tx = self.tx.as_ref().ok_or(SerialError::NoTransmitter)?;
        if !tx.regs.is_set(hw::ISR, Isr::TXE.bits()) {
            return Err(SerialError::WouldBlock);
        }
        tx.regs.set_bits(hw::CR1, Cr1::TE.bits());
        tx.regs.write(hw::TDR, byte as u32);
        Ok(())
    }

    /// Leaves the receiver enabled so later bytes are not lost.
    fn try_read_byte(&mut self) -> Result<u8, SerialError> {
        let rx = self.rx.as_ref().ok_or(SerialError::NoReceiver)?;
        if !rx.regs.is_set(hw::CR1, Cr1::RE.bits()) {
            rx.regs.set_bits(hw::CR1, Cr1::RE.bits());
        }
        if !rx.regs.is_set(hw::ISR, Isr::RXNE.bits()) {
            return Err(SerialError::WouldBlock);
        }
        Ok((rx.regs.read(hw::RDR) & hw::DATA_MASK) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::serial::{SerialWriter, StopBits};
    use crate::peripheral::sim::SimRegisters;
    use core::fmt::Write;

    const POLICY: WaitPolicy = WaitPolicy::Spins(100);
    const CLOCK: u32 = 64_000_000;

    fn side(channel: u8) -> DirectionConfig {
        DirectionConfig::new(channel, 115_200, StopBits::Two, Parity::Odd)
    }

    /// A channel whose transmit register is always empty and whose
    /// receiver always has data.
    fn idle_line() -> SimRegisters {
        let regs = SimRegisters::new();
        regs.preset(hw::ISR, (Isr::TXE | Isr::RXNE).bits());
        regs
    }

    #[test]
    fn divisor_for_reference_clock() {
        assert_eq!(baud_divisor(64_000_000, 115_200), Some(556));
        assert_eq!(baud_divisor(64_000_000, 9_600), Some(6667));
    }

    #[test]
    fn divisor_rounds_half_up() {
        // 3_200_000 / 64_000 = 50 exactly; 3_232_000 / 64_000 = 50.5.
        assert_eq!(baud_divisor(3_200_000, 64_000), Some(50));
        assert_eq!(baud_divisor(3_232_000, 64_000), Some(51));
        assert_eq!(baud_divisor(3_231_999, 64_000), Some(50));
        assert_eq!(baud_divisor(5, 2), Some(3));
        assert_eq!(baud_divisor(7, 3), Some(2));
    }

    #[test]
    fn divisor_rejects_zero_baud() {
        assert_eq!(baud_divisor(CLOCK, 0), None);
    }

    #[test]
    fn init_programs_both_sides() {
        let config = SerialConfig::new(CLOCK).with_tx(side(4)).with_rx(side(5));
        let (uart4, uart5) = (idle_line(), idle_line());
        uart4.preset(hw::CR1, Cr1::UE.bits());

        let uart = Usart::init_with(&config, POLICY, |channel| match channel {
            4 => Some(&uart4),
            5 => Some(&uart5),
            _ => None,
        })
        .unwrap();

        assert!(uart.has_transmitter() && uart.has_receiver());
        for regs in [&uart4, &uart5] {
            assert_eq!(regs.peek(hw::BRR), 556);
            assert_eq!(regs.peek(hw::CR2), 0b10 << 12);
            assert_eq!(regs.peek(hw::CR1), (Cr1::UE | Cr1::PCE | Cr1::M0 | Cr1::PS).bits());
        }
        // UE is dropped before the frame format changes.
        assert_eq!(uart4.writes_to(hw::CR1)[0], 0);
    }

    #[test]
    fn even_parity_clears_ps() {
        let mut even = side(4);
        even.parity = Parity::Even;
        even.stop_bits = StopBits::One;
        let config = SerialConfig::new(CLOCK).with_tx(even);
        let regs = idle_line();
        regs.preset(hw::CR1, Cr1::PS.bits()).preset(hw::CR2, 0b11 << 12);

        Usart::init_with(&config, POLICY, |_| Some(&regs)).unwrap();

        assert_eq!(regs.peek(hw::CR1) & Cr1::PS.bits(), 0);
        assert_eq!(regs.peek(hw::CR2), 0);
    }

    #[test]
    fn init_validates_before_touching_hardware() {
        let regs = idle_line();
        let mut resolved = 0;

        let empty = SerialConfig::new(CLOCK);
        let result = Usart::init_with(&empty, POLICY, |_| {
            resolved += 1;
            Some(&regs)
        });
        assert!(matches!(result, Err(SerialError::InvalidConfig)));

        let mut zero_baud = side(5);
        zero_baud.baud_rate = 0;
        let config = SerialConfig::new(CLOCK).with_tx(side(4)).with_rx(zero_baud);
        let result = Usart::init_with(&config, POLICY, |_| {
            resolved += 1;
            Some(&regs)
        });
        assert!(matches!(result, Err(SerialError::InvalidBaudRate(0))));

        let mut too_fast = side(4);
        too_fast.baud_rate = CLOCK / 8;
        let config = SerialConfig::new(CLOCK).with_tx(too_fast);
        let result = Usart::init_with(&config, POLICY, |_| {
            resolved += 1;
            Some(&regs)
        });
        assert!(matches!(result, Err(SerialError::InvalidBaudRate(8_000_000))));

        assert_eq!(resolved, 0);
        assert_eq!(regs.accesses(), 0);
    }

    #[test]
    fn init_rejects_unknown_channel() {
        let config = SerialConfig::new(CLOCK).with_tx(side(9));
        let result = Usart::<&SimRegisters>::init_with(&config, POLICY, |_| None);
        assert!(matches!(result, Err(SerialError::InvalidChannel(9))));
    }

    #[test]
    fn shared_channel_needs_matching_settings() {
        let tx = DirectionConfig::new(4, 115_200, StopBits::One, Parity::Even);
        let rx = DirectionConfig::new(4, 9_600, StopBits::Two, Parity::Odd);
        let config = SerialConfig::new(CLOCK).with_tx(tx).with_rx(rx);
        let regs = idle_line();
        let mut resolved = 0;

        let result = Usart::init_with(&config, POLICY, |_| {
            resolved += 1;
            Some(&regs)
        });

        assert!(matches!(result, Err(SerialError::InvalidConfig)));
        assert_eq!(resolved, 0);
        assert_eq!(regs.accesses(), 0);
    }

    #[test]
    fn shared_channel_is_programmed_once() {
        let link = side(4);
        let config = SerialConfig::new(CLOCK).with_tx(link).with_rx(link);
        let regs = idle_line();

        let uart = Usart::init_with(&config, POLICY, |_| Some(&regs)).unwrap();

        assert!(uart.has_transmitter() && uart.has_receiver());
        assert_eq!(regs.writes_to(hw::BRR), vec![556]);
        assert_eq!(regs.writes_to(hw::CR2), vec![0b10 << 12]);
    }

    #[test]
    fn transmit_only_never_resolves_receiver() {
        let config = SerialConfig::new(CLOCK).with_tx(side(4));
        let tx_regs = idle_line();
        let mut requested = Vec::new();

        let mut uart = Usart::init_with(&config, POLICY, |channel| {
            requested.push(channel);
            Some(&tx_regs)
        })
        .unwrap();

        assert_eq!(requested, vec![4]);
        assert!(!uart.has_receiver());
        let mut buffer = [0u8; 4];
        assert_eq!(uart.receive_polling(&mut buffer), Err(SerialError::NoReceiver));
        assert_eq!(uart.try_read_byte(), Err(SerialError::NoReceiver));
    }

    #[test]
    fn receive_only_refuses_to_transmit() {
        let config = SerialConfig::new(CLOCK).with_rx(side(2));
        let rx_regs = idle_line();
        let mut uart = Usart::init_with(&config, POLICY, |_| Some(&rx_regs)).unwrap();
        let writes = rx_regs.writes().len();

        assert_eq!(uart.transmit_polling(b"x"), Err(SerialError::NoTransmitter));
        assert_eq!(rx_regs.writes().len(), writes);
    }

    #[test]
    fn empty_transmit_touches_nothing() {
        let config = SerialConfig::new(CLOCK).with_tx(side(4));
        let regs = SimRegisters::new();
        let mut uart = Usart::init_with(&config, POLICY, |_| Some(&regs)).unwrap();
        let accesses = regs.accesses();

        assert_eq!(uart.transmit_polling(&[]), Ok(()));
        assert_eq!(regs.accesses(), accesses);
    }

    #[test]
    fn transmit_writes_each_byte_between_te_toggles() {
        let config = SerialConfig::new(CLOCK).with_tx(side(4));
        let regs = idle_line();
        let mut uart = Usart::init_with(&config, POLICY, |_| Some(&regs)).unwrap();
        let start = regs.writes().len();

        uart.transmit_polling(b"hi!").unwrap();

        let all = regs.writes();
        let writes = &all[start..];
        let configured = (Cr1::UE | Cr1::PCE | Cr1::M0 | Cr1::PS).bits();
        assert_eq!(
            writes,
            &[
                (hw::CR1, configured | Cr1::TE.bits()),
                (hw::TDR, b'h' as u32),
                (hw::TDR, b'i' as u32),
                (hw::TDR, b'!' as u32),
                (hw::CR1, configured),
            ]
        );
    }

    #[test]
    fn transmit_times_out_before_first_byte() {
        let config = SerialConfig::new(CLOCK).with_tx(side(4));
        let regs = SimRegisters::new();
        let mut uart = Usart::init_with(&config, POLICY, |_| Some(&regs)).unwrap();

        assert_eq!(
            uart.transmit_polling(b"x"),
            Err(SerialError::Timeout(SerialFlag::TransmitEmpty))
        );
        assert!(regs.writes_to(hw::TDR).is_empty());
        assert_eq!(regs.peek(hw::CR1) & Cr1::TE.bits(), 0);
    }

    #[test]
    fn transmit_timeout_mid_buffer_disables_transmitter() {
        let config = SerialConfig::new(CLOCK).with_tx(side(4));
        let regs = SimRegisters::new();
        // Empty before the transfer and after the first byte, then stuck.
        regs.queue_reads(hw::ISR, [Isr::TXE.bits(), Isr::TXE.bits()]);
        let mut uart = Usart::init_with(&config, POLICY, |_| Some(&regs)).unwrap();

        assert_eq!(
            uart.transmit_polling(b"abc"),
            Err(SerialError::Timeout(SerialFlag::TransmitEmpty))
        );
        assert_eq!(regs.writes_to(hw::TDR), vec![b'a' as u32, b'b' as u32]);
        assert_eq!(regs.peek(hw::CR1) & Cr1::TE.bits(), 0);
    }

    #[test]
    fn receive_copies_bytes_in_order() {
        let link = side(4);
        let config = SerialConfig::new(CLOCK).with_tx(link).with_rx(link);
        let regs = idle_line();
        regs.queue_reads(hw::RDR, [b'o' as u32, b'k' as u32, 0x1FF]);
        let mut uart = Usart::init_with(&config, POLICY, |_| Some(&regs)).unwrap();

        let mut buffer = [0u8; 3];
        uart.receive_polling(&mut buffer).unwrap();

        assert_eq!(&buffer, b"ok\xFF");
        assert_eq!(regs.peek(hw::CR1) & Cr1::RE.bits(), 0);
        let re_writes = regs
            .writes_to(hw::CR1)
            .iter()
            .filter(|v| *v & Cr1::RE.bits() != 0)
            .count();
        assert_eq!(re_writes, 1);
    }

    #[test]
    fn receive_timeout_reports_flag() {
        let config = SerialConfig::new(CLOCK).with_rx(side(3));
        let regs = SimRegisters::new();
        let mut uart = Usart::init_with(&config, POLICY, |_| Some(&regs)).unwrap();

        let mut buffer = [0u8; 2];
        assert_eq!(
            uart.receive_polling(&mut buffer),
            Err(SerialError::Timeout(SerialFlag::ReceiveReady))
        );
        assert_eq!(regs.peek(hw::CR1) & Cr1::RE.bits(), 0);
    }

    #[test]
    fn nonblocking_io_reports_would_block() {
        let link = side(4);
        let config = SerialConfig::new(CLOCK).with_tx(link).with_rx(link);
        let regs = SimRegisters::new();
        let mut uart = Usart::init_with(&config, POLICY, |_| Some(&regs)).unwrap();

        assert_eq!(uart.try_write_byte(b'a'), Err(SerialError::WouldBlock));
        assert_eq!(uart.try_read_byte(), Err(SerialError::WouldBlock));

        regs.preset(hw::ISR, (Isr::TXE | Isr::RXNE).bits())
            .queue_reads(hw::RDR, [b'z' as u32]);
        assert_eq!(uart.try_write_byte(b'a'), Ok(()));
        assert_eq!(uart.try_read_byte(), Ok(b'z'));
        assert_eq!(regs.writes_to(hw::TDR), vec![b'a' as u32]);
    }

    #[test]
    fn serial_writer_goes_through_transmit() {
        let config = SerialConfig::new(CLOCK).with_tx(side(4));
        let regs = idle_line();
        let uart = Usart::init_with(&config, POLICY, |_| Some(&regs)).unwrap();

        let mut writer = SerialWriter(uart);
        writeln!(writer, "v={}", 3).unwrap();

        let sent: Vec<u8> = regs.writes_to(hw::TDR).iter().map(|&b| b as u8).collect();
        assert_eq!(sent, b"v=3\r\n");
    }
}
