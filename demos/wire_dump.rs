use mini_thermal::{Barcode, Config, Error, Firmware, Justify, Printer, Size};

//
// Prints a small receipt into an in-memory port and hex-dumps the wire
// traffic. Set RUST_LOG=trace to watch the gate arm itself between commands.
//
// cargo run --example wire_dump
//

fn main() -> Result<(), Error> {
    env_logger::init();

    let mut printer = Printer::new(Vec::new(), Config::new(Firmware::Modern));
    printer.begin()?;

    printer.justify(Justify::Center)?;
    printer.set_size(Size::Medium)?;
    printer.println("mini-thermal")?;
    printer.set_size(Size::Small)?;
    printer.justify(Justify::Left)?;
    printer.println("wire dump")?;
    printer.print_barcode("12345678", Barcode::Code39)?;
    printer.feed(2)?;

    let bytes = printer.into_port();
    for (offset, chunk) in bytes.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
        println!("{:04X}  {}", offset * 16, hex.join(" "));
    }
    Ok(())
}
