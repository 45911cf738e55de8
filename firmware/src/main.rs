#![no_std]
#![no_main]
#![feature(type_alias_impl_trait)]

mod globals;
mod serial;
mod ws2812;

extern crate defmt_rtt;
extern crate panic_probe;

use defmt::*;
use embassy_executor::Executor;
use embassy_rp::{
	bind_interrupts,
	gpio::{Level, Output},
	multicore::{spawn_core1, Stack},
	peripherals::{PIO0, USB},
	pio::InterruptHandler as PioInterruptHandler,
	usb::{Driver, InterruptHandler as UsbInterruptHandler},
};
use static_cell::StaticCell;

use crate::{
	serial::{usb_serial_task, BoardLed},
	ws2812::led_task,
};

/// GPIO the strip data line is wired to, reported by the `D` command.
pub const DATA_PIN: u8 = 3;

bind_interrupts!(struct Irqs {
	USBCTRL_IRQ => UsbInterruptHandler<USB>;
	PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});

#[cortex_m_rt::entry]
fn main() -> ! {
	static mut CORE1_STACK: Stack<4096> = Stack::new();
	static EXECUTOR0: StaticCell<Executor> = StaticCell::new();
	static EXECUTOR1: StaticCell<Executor> = StaticCell::new();

	let p = embassy_rp::init(Default::default());

	let pio = p.PIO0;
	let data_pin = p.PIN_3;

	spawn_core1(p.CORE1, CORE1_STACK, move || {
		let executor1 = EXECUTOR1.init(Executor::new());
		executor1.run(|spawner| unwrap!(spawner.spawn(led_task(pio, data_pin))));
	});

	// Create the driver, from the HAL.
	let driver = Driver::new(p.USB, Irqs);
	let status = BoardLed(Output::new(p.PIN_25, Level::Low));

	let executor0 = EXECUTOR0.init(Executor::new());
	executor0.run(|spawner| {
		unwrap!(spawner.spawn(usb_serial_task(driver, status)));
	});
}
