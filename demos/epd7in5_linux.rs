// Shows an image, clears or calibrates a 7.5" panel on a Raspberry Pi.
//
//   epd7in5_linux show <image> [--keep-colors]
//   epd7in5_linux clear [white|black|red]
//   epd7in5_linux calibrate [cycles]
//
// EPD_DISPLAY_TYPE selects the panel: `black_and_white` (default) or `colour`.
// Set RUST_LOG=debug to follow the protocol.
use std::{env, error::Error};

use embedded_hal_bus::spi::ExclusiveDevice;
use epd7in5_panel::{epd7in5::Epd7in5, prelude::*};
use linux_embedded_hal::{
    spidev::{self, SpidevOptions},
    sysfs_gpio::Direction,
    Delay, SpidevBus, SysfsPin,
};

fn output_pin(number: u64) -> SysfsPin {
    let pin = SysfsPin::new(number);
    pin.export().expect("pin export");
    while !pin.is_exported() {}
    pin.set_direction(Direction::Out).expect("pin direction");
    pin.set_value(1).expect("pin value set to 1");
    pin
}

// activate spi, gpio in raspi-config
// needs to be run with sudo because of some sysfs_gpio permission problems and follow-up timing problems
// see https://github.com/rust-embedded/rust-sysfs-gpio/issues/5 and follow-up issues
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let display_type = env::var("EPD_DISPLAY_TYPE").unwrap_or_else(|_| "black_and_white".into());
    let config = Config::new(display_type.parse()?);

    let mut bus = SpidevBus::open("/dev/spidev0.0").expect("spidev directory");
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(4_000_000)
        .mode(spidev::SpiModeFlags::SPI_MODE_0)
        .build();
    bus.configure(&options).expect("spi configuration");

    let cs = output_pin(8);
    let dc = output_pin(25);
    let rst = output_pin(17);

    let busy = SysfsPin::new(24);
    busy.export().expect("busy export");
    while !busy.is_exported() {}
    busy.set_direction(Direction::In).expect("busy Direction");

    let mut spi = ExclusiveDevice::new(bus, cs, Delay).expect("spi device");
    let mut delay = Delay;
    let mut epd = Epd7in5::new(busy, dc, rst, config);

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("show") => {
            let path = args.get(1).ok_or("missing image path")?;
            let reduce_colors = !args.iter().any(|arg| arg == "--keep-colors");
            let image = image::open(path)?.to_rgb8();
            epd.show_image(&mut spi, &mut delay, &image, reduce_colors)?;
        }
        Some("clear") => {
            let color = match args.get(1) {
                Some(color) => color.parse()?,
                None => Color::White,
            };
            epd.clear(&mut spi, &mut delay, color)?;
        }
        Some("calibrate") => {
            let cycles = match args.get(1) {
                Some(cycles) => cycles.parse()?,
                None => 3,
            };
            epd.calibrate(&mut spi, &mut delay, cycles)?;
        }
        _ => return Err("usage: epd7in5_linux show <image> | clear [color] | calibrate [cycles]".into()),
    }

    println!("Done");
    Ok(())
}
