//! The printer driver.
//!
//! All operations go through two pacing primitives: multi-byte commands wait
//! for the gate once, burst their bytes and arm the transmission cost;
//! streamed payloads (bitmap rows, barcode data) wait before every byte so a
//! busy line can throttle mid-stream. Mechanical costs (feeding, printing,
//! sleeping) are armed on top of the transmission cost by the operation that
//! knows them.

use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::barcode::Barcode;
use crate::bitmap::ChunkPlan;
use crate::command::{self, Firmware, Justify, Size, CR, FF, HT, LF};
use crate::error::Error;
use crate::port::{BusyLine, Clock, SerialPort, SystemClock};
use crate::state::{PrintMode, PrintState};
use crate::timing::{Handshake, TimingGate};

/// Cold-boot allowance before the printer can take data.
const STARTUP_TIME_US: u64 = 500_000;

/// Driver configuration.
///
/// Firmware generation and serial rate are fixed per session; the heat time
/// trades darkness against speed and is worth tuning per paper stock.
#[derive(Debug, Clone)]
pub struct Config {
    firmware: Firmware,
    heat_time: u8,
    baud_rate: u32,
}

impl Config {
    pub fn new(firmware: Firmware) -> Config {
        Config {
            firmware,
            heat_time: 120,
            baud_rate: 19200,
        }
    }

    /// Heating duration in 10 us units. Default 120 (1.2 ms).
    pub fn heat_time(self, heat_time: u8) -> Self {
        Config { heat_time, ..self }
    }

    /// Serial rate the printer is strapped for. Default 19200; a few rare
    /// units run at 9600. This does not make printing faster or slower, the
    /// mechanics are the bottleneck.
    pub fn baud_rate(self, baud_rate: u32) -> Self {
        Config { baud_rate, ..self }
    }

    /// Microseconds per transmitted byte: 11 bit times (start, stop and idle
    /// margin included), rounded to the nearest microsecond.
    fn byte_time_us(&self) -> u64 {
        let baud = u64::from(self.baud_rate.max(1));
        (11 * 1_000_000 + baud / 2) / baud
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(Firmware::default())
    }
}

/// Driver for a TTL-serial mini thermal receipt printer.
///
/// One instance owns the whole session state and expects a single logical
/// caller; wrap it in external mutual exclusion if several tasks must share
/// it.
pub struct Printer<P: SerialPort, C: Clock = SystemClock> {
    port: P,
    gate: TimingGate<C>,
    state: PrintState,
    config: Config,
    byte_time: u64,
    dot_print_time: u64,
    dot_feed_time: u64,
}

impl<P: SerialPort> Printer<P, SystemClock> {
    /// Timed-mode driver: readiness is estimated from per-operation costs.
    pub fn new(port: P, config: Config) -> Self {
        Self::with_clock(port, None, config, SystemClock::new())
    }

    /// Driver with a busy line. Hardware handshaking takes over once
    /// [`begin`](Printer::begin) has told the printer to drive the line.
    pub fn with_busy_line(port: P, busy: Box<dyn BusyLine>, config: Config) -> Self {
        Self::with_clock(port, Some(busy), config, SystemClock::new())
    }
}

impl<P: SerialPort, C: Clock> Printer<P, C> {
    /// Construct against an explicit clock, for embedders with their own
    /// timebase (and for tests).
    pub fn with_clock(port: P, busy: Option<Box<dyn BusyLine>>, config: Config, clock: C) -> Self {
        let byte_time = config.byte_time_us();
        Printer {
            port,
            gate: TimingGate::new(clock, busy),
            state: PrintState::new(),
            config,
            byte_time,
            dot_print_time: 30_000,
            dot_feed_time: 2_100,
        }
    }

    /// Active flow-control strategy.
    pub fn handshake(&self) -> Handshake {
        self.gate.handshake()
    }

    /// Release the underlying port.
    pub fn into_port(self) -> P {
        self.port
    }

    /// Initialize the printer.
    ///
    /// Wakes and resets it, programs heating and density, and enables
    /// hardware handshaking when a busy line was supplied at construction.
    /// That switch is permanent for the session.
    pub fn begin(&mut self) -> Result<(), Error> {
        info!("initializing printer, {:?} firmware", self.config.firmware);

        // Allow for the cold boot; the printer can't take data immediately
        // after power-up.
        self.gate.arm(STARTUP_TIME_US);

        self.wake()?;
        self.reset()?;

        let heat = command::heat_config(self.config.heat_time);
        self.write_command(&heat)?;
        self.write_command(&command::density())?;

        if self.gate.has_busy_line() {
            debug!("busy line present, enabling hardware handshake");
            self.write_command(&command::handshake_enable())?;
            self.gate.enable_handshake();
        }

        self.dot_print_time = 30_000;
        self.dot_feed_time = 2_100;
        self.state.max_chunk_height = 255;
        Ok(())
    }

    /// Reset the printer and the host-side state to power-on defaults.
    pub fn reset(&mut self) -> Result<(), Error> {
        self.write_command(&command::reset())?;
        self.state.reset();
        if self.config.firmware == Firmware::Modern {
            self.write_command(&command::tab_stops())?;
        }
        Ok(())
    }

    /// Restore default text formatting without a full reset.
    pub fn set_defaults(&mut self) -> Result<(), Error> {
        self.online()?;
        self.justify(Justify::Left)?;
        self.inverse_off()?;
        self.double_height_off()?;
        self.set_line_height(30)?;
        self.bold_off()?;
        self.underline_off()?;
        self.set_barcode_height(50)?;
        self.set_size(Size::Small)?;
        self.set_charset(0)?;
        self.set_code_page(0)?;
        Ok(())
    }

    /// Tune the per-dot advance times (microseconds) for printing and
    /// feeding. Supply voltage and paper stock shift these; the defaults of
    /// 30000/2100 come from a random test unit.
    pub fn set_times(&mut self, dot_print_us: u64, dot_feed_us: u64) {
        self.dot_print_time = dot_print_us;
        self.dot_feed_time = dot_feed_us;
    }

    // === Text streaming ===

    /// Issue one text byte.
    ///
    /// Carriage returns are dropped outright. A newline, or the wrap that
    /// fires once a line is full, resets the column and arms the cost of
    /// physically advancing the paper; a blank line is cheaper than one with
    /// text on it, so the previous byte decides which formula applies.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        if byte == CR {
            return Ok(());
        }

        self.gate.wait();
        self.port.send(byte)?;

        let mut cost = self.byte_time;
        let mut logical = byte;
        // `>=`, not `==`: a tab or a width change can leave the column past
        // the limit, and such a line is still full.
        if byte == LF || self.state.column >= self.state.max_column {
            cost += if self.state.prev_byte == LF {
                // Blank line: pure feed.
                (u64::from(self.state.char_height) + u64::from(self.state.line_spacing))
                    * self.dot_feed_time
            } else {
                // Text line: print the glyph rows, then feed the spacing.
                u64::from(self.state.char_height) * self.dot_print_time
                    + u64::from(self.state.line_spacing) * self.dot_feed_time
            };
            self.state.column = 0;
            // A wrap is a newline as far as the next pass is concerned.
            logical = LF;
        } else {
            self.state.column += 1;
        }
        self.gate.arm(cost);
        self.state.prev_byte = logical;
        Ok(())
    }

    pub fn print(&mut self, text: &str) -> Result<(), Error> {
        for byte in text.bytes() {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    pub fn println(&mut self, text: &str) -> Result<(), Error> {
        self.print(text)?;
        self.write_byte(LF)
    }

    /// Horizontal tab; the column advances to the next multiple of four.
    pub fn tab(&mut self) -> Result<(), Error> {
        self.write_paced(HT)?;
        self.state.column = self.state.column.wrapping_add(4) & 0b1111_1100;
        Ok(())
    }

    // === Formatting ===

    pub fn bold_on(&mut self) -> Result<(), Error> {
        self.set_print_mode(PrintMode::BOLD)
    }

    pub fn bold_off(&mut self) -> Result<(), Error> {
        self.unset_print_mode(PrintMode::BOLD)
    }

    pub fn upside_down_on(&mut self) -> Result<(), Error> {
        self.set_print_mode(PrintMode::UPSIDE_DOWN)
    }

    pub fn upside_down_off(&mut self) -> Result<(), Error> {
        self.unset_print_mode(PrintMode::UPSIDE_DOWN)
    }

    pub fn strike_on(&mut self) -> Result<(), Error> {
        self.set_print_mode(PrintMode::STRIKE)
    }

    pub fn strike_off(&mut self) -> Result<(), Error> {
        self.unset_print_mode(PrintMode::STRIKE)
    }

    pub fn double_height_on(&mut self) -> Result<(), Error> {
        self.set_print_mode(PrintMode::DOUBLE_HEIGHT)
    }

    pub fn double_height_off(&mut self) -> Result<(), Error> {
        self.unset_print_mode(PrintMode::DOUBLE_HEIGHT)
    }

    pub fn double_width_on(&mut self) -> Result<(), Error> {
        self.set_print_mode(PrintMode::DOUBLE_WIDTH)
    }

    pub fn double_width_off(&mut self) -> Result<(), Error> {
        self.unset_print_mode(PrintMode::DOUBLE_WIDTH)
    }

    /// White-on-black printing. Newer firmware has a dedicated command;
    /// older firmware only has the mode-register bit.
    pub fn inverse_on(&mut self) -> Result<(), Error> {
        match self.config.firmware {
            Firmware::Modern => self.write_command(&command::inverse(true)),
            Firmware::Legacy => self.set_print_mode(PrintMode::INVERSE),
        }
    }

    pub fn inverse_off(&mut self) -> Result<(), Error> {
        match self.config.firmware {
            Firmware::Modern => self.write_command(&command::inverse(false)),
            Firmware::Legacy => self.unset_print_mode(PrintMode::INVERSE),
        }
    }

    /// Clear every mode bit at once.
    pub fn normal(&mut self) -> Result<(), Error> {
        self.state.mode = PrintMode::empty();
        self.write_print_mode()
    }

    /// Underline weight: 0 off, 1 normal, 2 thick. Clamped to 2.
    pub fn underline(&mut self, weight: u8) -> Result<(), Error> {
        self.write_command(&command::underline(weight))
    }

    pub fn underline_off(&mut self) -> Result<(), Error> {
        self.underline(0)
    }

    pub fn justify(&mut self, justify: Justify) -> Result<(), Error> {
        self.write_command(&command::justify(justify))
    }

    /// Character size preset. Overrides the geometry derived from the mode
    /// bits; the printer also breaks the line, so the previous byte becomes a
    /// newline.
    pub fn set_size(&mut self, size: Size) -> Result<(), Error> {
        let (code, char_height, max_column) = size.geometry();
        self.write_command(&command::size(code))?;
        self.state.char_height = char_height;
        self.state.max_column = max_column;
        self.state.prev_byte = LF;
        Ok(())
    }

    /// Line height in dots, floored at the 24-dot character height. The
    /// printer ignores the current text height here, so this is really
    /// inter-line spacing: the stored spacing is the excess over 24.
    pub fn set_line_height(&mut self, value: u8) -> Result<(), Error> {
        let value = value.max(24);
        self.state.line_spacing = value - 24;
        self.write_command(&command::line_height(value))
    }

    /// International character set, 0-15 (clamped).
    pub fn set_charset(&mut self, value: u8) -> Result<(), Error> {
        self.write_command(&command::charset(value))
    }

    /// Code page for the upper ASCII range, 0-47 (clamped).
    pub fn set_code_page(&mut self, value: u8) -> Result<(), Error> {
        self.write_command(&command::code_page(value))
    }

    /// Extra inter-character spacing. Recent firmware only.
    pub fn set_char_spacing(&mut self, spacing: u8) -> Result<(), Error> {
        self.write_command(&command::char_spacing(spacing))
    }

    // === Feeding ===

    /// Feed whole lines.
    pub fn feed(&mut self, lines: u8) -> Result<(), Error> {
        match self.config.firmware {
            Firmware::Modern => {
                self.write_command(&command::feed_lines(lines))?;
                self.gate.arm(u64::from(self.state.char_height) * self.dot_feed_time);
                self.state.prev_byte = LF;
                self.state.column = 0;
                Ok(())
            }
            Firmware::Legacy => {
                // Old firmware feeds excess lines on ESC d; feed manually.
                for _ in 0..lines {
                    self.write_byte(LF)?;
                }
                Ok(())
            }
        }
    }

    /// Feed individual pixel rows.
    pub fn feed_rows(&mut self, rows: u8) -> Result<(), Error> {
        self.write_command(&command::feed_rows(rows))?;
        self.gate.arm(u64::from(rows) * self.dot_feed_time);
        self.state.prev_byte = LF;
        self.state.column = 0;
        Ok(())
    }

    /// Print the line buffer and eject to the top of the next page.
    pub fn flush(&mut self) -> Result<(), Error> {
        self.write_paced(FF)
    }

    // === Raster printing ===

    /// Stream a 1-bit row-major raster image, most significant bit leftmost.
    ///
    /// `data` holds `ceil(width / 8)` bytes per row. Rows wider than the
    /// 384-dot head are clipped on the right. The image goes out in chunks
    /// bounded by the printer's assumed 256-byte receive buffer (or by 255
    /// rows when the busy line does the throttling), each chunk gated
    /// per byte and armed with its print cost once complete.
    pub fn print_bitmap(&mut self, width: usize, height: usize, data: &[u8]) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }

        let plan = ChunkPlan::new(width, self.gate.handshake(), self.state.max_chunk_height);
        let expected = plan.row_bytes * height;
        if data.len() < expected {
            return Err(Error::BitmapTooShort {
                expected,
                actual: data.len(),
            });
        }

        debug!(
            "printing {}x{} bitmap in chunks of up to {} rows",
            width, height, plan.chunk_height_limit
        );

        let mut index = 0;
        let mut row_start = 0;
        while row_start < height {
            let chunk_height = (height - row_start).min(plan.chunk_height_limit as usize);

            let header = command::bitmap_chunk(chunk_height as u8, plan.clipped_row_bytes as u8);
            self.write_command(&header)?;

            for _ in 0..chunk_height {
                for _ in 0..plan.clipped_row_bytes {
                    self.gate.wait();
                    self.port.send(data[index])?;
                    index += 1;
                }
                index += plan.row_bytes - plan.clipped_row_bytes;
            }
            self.gate.arm(chunk_height as u64 * self.dot_print_time);

            row_start += chunk_height;
        }

        self.state.prev_byte = LF;
        Ok(())
    }

    // === Barcodes ===

    /// Print a barcode. Newer firmware takes length-prefixed data truncated
    /// to 255 bytes; older firmware takes a NUL-terminated string.
    pub fn print_barcode(&mut self, text: &str, barcode: Barcode) -> Result<(), Error> {
        debug!("printing {:?} barcode, {} data bytes", barcode, text.len());

        // Recent firmware refuses a barcode without a preceding feed.
        self.feed(1)?;
        self.write_command(&command::barcode_label_below())?;
        self.write_command(&command::barcode_width())?;
        let select = command::barcode_type(barcode.code(self.config.firmware));
        self.write_command(&select)?;

        match self.config.firmware {
            Firmware::Modern => {
                let data = &text.as_bytes()[..text.len().min(255)];
                self.write_paced(data.len() as u8)?;
                for &byte in data {
                    self.write_paced(byte)?;
                }
            }
            Firmware::Legacy => {
                for &byte in text.as_bytes() {
                    self.write_paced(byte)?;
                }
                self.write_paced(0)?;
            }
        }

        self.gate
            .arm((u64::from(self.state.barcode_height) + 40) * self.dot_print_time);
        self.state.prev_byte = LF;
        Ok(())
    }

    /// Barcode height in dots, label excluded. Floored at 1; default 50.
    pub fn set_barcode_height(&mut self, value: u8) -> Result<(), Error> {
        let value = value.max(1);
        self.state.barcode_height = value;
        self.write_command(&command::barcode_height(value))
    }

    /// Ceiling on bitmap chunk height under timed pacing. Stored verbatim.
    pub fn set_max_chunk_height(&mut self, value: u8) {
        self.state.max_chunk_height = value;
    }

    // === Power and status ===

    /// Take the printer offline; subsequent print commands are ignored until
    /// [`online`](Printer::online).
    pub fn offline(&mut self) -> Result<(), Error> {
        self.write_command(&command::online(false))
    }

    pub fn online(&mut self) -> Result<(), Error> {
        self.write_command(&command::online(true))
    }

    /// Enter the low-power state immediately.
    pub fn sleep(&mut self) -> Result<(), Error> {
        // Zero means "don't sleep".
        self.sleep_after(1)
    }

    /// Enter the low-power state after the given number of seconds.
    pub fn sleep_after(&mut self, seconds: u16) -> Result<(), Error> {
        let cmd = self.config.firmware.sleep_after(seconds);
        self.write_command(&cmd)
    }

    /// Wake the printer from the low-power state and clear any pending
    /// timing estimate.
    pub fn wake(&mut self) -> Result<(), Error> {
        self.gate.arm(0);
        self.write_paced(0xFF)?;
        match self.config.firmware {
            Firmware::Modern => {
                thread::sleep(Duration::from_millis(50));
                let sleep_off = self.config.firmware.sleep_after(0);
                self.write_command(&sleep_off)?;
            }
            Firmware::Legacy => {
                // The datasheet's 50 ms alone isn't enough on old firmware;
                // a stretch of spaced NUL no-ops lets it settle.
                for _ in 0..10 {
                    self.write_paced(0x00)?;
                    self.gate.arm(10_000);
                }
            }
        }
        Ok(())
    }

    /// Query the paper sensor.
    ///
    /// Polls for a reply up to ten times at 100 ms intervals. A printer that
    /// never answers (not all of them do) is assumed to have paper.
    pub fn has_paper(&mut self) -> Result<bool, Error> {
        let query = self.config.firmware.status_query();
        self.write_command(&query)?;

        for _ in 0..10 {
            if let Some(status) = self.port.poll()? {
                debug!("paper status byte: {:#04x}", status);
                return Ok(status & 0b0000_0100 == 0);
            }
            thread::sleep(Duration::from_millis(100));
        }
        debug!("no status reply, assuming paper present");
        Ok(true)
    }

    // === Pacing primitives ===

    /// Wait once, burst the command bytes, arm their transmission cost.
    fn write_command(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.gate.wait();
        for &byte in bytes {
            self.port.send(byte)?;
        }
        self.gate.arm(bytes.len() as u64 * self.byte_time);
        Ok(())
    }

    /// Wait, send one byte, arm one byte time.
    fn write_paced(&mut self, byte: u8) -> Result<(), Error> {
        self.gate.wait();
        self.port.send(byte)?;
        self.gate.arm(self.byte_time);
        Ok(())
    }

    fn set_print_mode(&mut self, mask: PrintMode) -> Result<(), Error> {
        self.state.mode.insert(mask);
        self.write_print_mode()
    }

    fn unset_print_mode(&mut self, mask: PrintMode) -> Result<(), Error> {
        self.state.mode.remove(mask);
        self.write_print_mode()
    }

    fn write_print_mode(&mut self) -> Result<(), Error> {
        let cmd = command::print_mode(self.state.mode.bits());
        self.write_command(&cmd)?;
        self.state.refresh_geometry();
        Ok(())
    }
}
