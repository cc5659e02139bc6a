use std::env;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::process;

use mini_thermal::{Barcode, Config, Error, Firmware, Justify, Printer, SerialPort, Size};

//
// cargo run /dev/ttyUSB0 [--legacy]
//

struct FilePort {
    file: File,
}

impl SerialPort for FilePort {
    fn send(&mut self, byte: u8) -> io::Result<()> {
        self.file.write_all(&[byte])
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("usage: {} <serial-device> [--legacy]", args[0]);
        process::exit(1);
    }

    let firmware = if args.iter().any(|a| a == "--legacy") {
        Firmware::Legacy
    } else {
        Firmware::Modern
    };

    let file = match OpenOptions::new().write(true).open(&args[1]) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("can't open {}: {}", args[1], err);
            process::exit(1);
        }
    };

    let mut printer = Printer::new(FilePort { file }, Config::new(firmware));
    if let Err(err) = test_page(&mut printer) {
        eprintln!("print failed: {}", err);
        process::exit(1);
    }
}

fn test_page<P: SerialPort>(printer: &mut Printer<P>) -> Result<(), Error> {
    printer.begin()?;
    printer.set_defaults()?;

    printer.justify(Justify::Center)?;
    printer.set_size(Size::Medium)?;
    printer.println("mini-thermal")?;
    printer.set_size(Size::Small)?;
    printer.println("driver test page")?;
    printer.feed(1)?;

    printer.justify(Justify::Left)?;
    printer.bold_on()?;
    printer.println("bold")?;
    printer.bold_off()?;
    printer.underline(1)?;
    printer.println("underlined")?;
    printer.underline_off()?;
    printer.inverse_on()?;
    printer.println("inverse")?;
    printer.inverse_off()?;
    printer.double_width_on()?;
    printer.println("wide")?;
    printer.double_width_off()?;

    printer.print_bitmap(384, 48, &checkerboard(384, 48))?;

    printer.print_barcode("MINI-THERMAL", Barcode::Code39)?;

    printer.feed(3)?;
    printer.sleep_after(30)?;
    Ok(())
}

/// 1-bit checkerboard with 8x8 dot squares.
fn checkerboard(width: usize, height: usize) -> Vec<u8> {
    let row_bytes = (width + 7) / 8;
    let mut data = Vec::with_capacity(row_bytes * height);
    for y in 0..height {
        for x in 0..row_bytes {
            data.push(if (y / 8 + x) % 2 == 0 { 0xFF } else { 0x00 });
        }
    }
    data
}
