use defmt::{info, warn};
use embassy_futures::select::{select, Either};
use embassy_rp::{
	gpio::Output,
	peripherals::{PIN_25, USB},
	usb::{Driver, Instance},
};
use embassy_time::{Duration, Instant, Ticker};
use embassy_usb::{class::cdc_acm, driver::EndpointError, Builder};
use futures::future;
use heapless::Deque;
use led_controller_shared::{
	reply::Outbox,
	Engine,
	Settings,
	StatusLed,
	DEVICE_MANUFACTURER,
	DEVICE_PRODUCT_ID,
	DEVICE_PRODUCT_NAME,
	DEVICE_VENDOR_ID,
};

use crate::{ws2812::SignalStrip, DATA_PIN};

const PACKET_LEN: u8 = 64;
/// Room for a few packets, the link handler drains it in bounded steps.
const RX_QUEUE_LEN: usize = 256;
const TICK_PERIOD: Duration = Duration::from_millis(1);

pub struct BoardLed(pub Output<'static, PIN_25>);

impl StatusLed for BoardLed {
	fn set(&mut self, on: bool) {
		if on {
			self.0.set_high();
		} else {
			self.0.set_low();
		}
	}
}

type LedEngine = Engine<SignalStrip, BoardLed>;

#[embassy_executor::task]
pub async fn usb_serial_task(driver: Driver<'static, USB>, status: BoardLed) {
	info!("Hello from USB task on core 0");

	// Create embassy-usb Config
	let mut config = embassy_usb::Config::new(DEVICE_VENDOR_ID, DEVICE_PRODUCT_ID);
	config.manufacturer = Some(DEVICE_MANUFACTURER);
	config.product = Some(DEVICE_PRODUCT_NAME);
	config.max_power = 100;
	config.max_packet_size_0 = PACKET_LEN;

	// Required for windows compatiblity.
	// https://developer.nordicsemi.com/nRF_Connect_SDK/doc/1.9.1/kconfig/CONFIG_CDC_ACM_IAD.html#help
	config.device_class = 0xEF;
	config.device_sub_class = 0x02;
	config.device_protocol = 0x01;
	config.composite_with_iads = true;

	// Create embassy-usb DeviceBuilder using the driver and config.
	// It needs some buffers for building the descriptors.
	let mut device_descriptor = [0; 256];
	let mut config_descriptor = [0; 256];
	let mut bos_descriptor = [0; 256];
	let mut control_buf = [0; 128];

	let mut state = cdc_acm::State::new();

	let mut builder = Builder::new(
		driver,
		config,
		&mut device_descriptor,
		&mut config_descriptor,
		&mut bos_descriptor,
		&mut control_buf,
	);

	let mut class = cdc_acm::CdcAcmClass::new(&mut builder, &mut state, PACKET_LEN as u16);

	let mut usb = builder.build();

	let settings = Settings {
		data_pin: DATA_PIN,
		..Settings::default()
	};
	let mut engine = Engine::new(settings, SignalStrip::new(), status);

	future::join(
		async {
			loop {
				usb.run().await;
			}
		},
		async {
			loop {
				class.wait_connection().await;
				info!("Connected");
				let _ = run_link(&mut class, &mut engine).await;
				info!("Disconnected");
			}
		},
	)
	.await;
}

struct Disconnected {}

impl From<EndpointError> for Disconnected {
	fn from(val: EndpointError) -> Self {
		match val {
			EndpointError::BufferOverflow => panic!("Buffer overflow"),
			EndpointError::Disabled => Disconnected {},
		}
	}
}

/// Main loop for one connection.
///
/// Each pass either takes a packet off the link or runs a scheduling tick,
/// then lets the engine consume queued bytes and flushes its replies. Both
/// happen in this one task, so the engine is never entered concurrently.
async fn run_link<'d, T: Instance + 'd>(
	class: &mut cdc_acm::CdcAcmClass<'d, Driver<'d, T>>,
	engine: &mut LedEngine,
) -> Result<(), Disconnected> {
	let mut rx: Deque<u8, RX_QUEUE_LEN> = Deque::new();
	let mut packet = [0u8; PACKET_LEN as usize];
	let mut ticker = Ticker::every(TICK_PERIOD);

	engine.start();
	flush(class, engine.outbox()).await?;

	loop {
		// stop reading while the queue can't take a full packet, the ticks drain it
		let has_room = rx.capacity() - rx.len() >= packet.len();

		if has_room {
			let event = select(class.read_packet(&mut packet), ticker.next()).await;
			match event {
				Either::First(read) => {
					for &byte in &packet[..read?] {
						let _ = rx.push_back(byte);
					}
				}
				Either::Second(()) => engine.tick(Instant::now().as_millis()),
			}
		} else {
			ticker.next().await;
			engine.tick(Instant::now().as_millis());
		}

		engine.service_link(&mut rx);
		flush(class, engine.outbox()).await?;
	}
}

async fn flush<'d, T: Instance + 'd>(
	class: &mut cdc_acm::CdcAcmClass<'d, Driver<'d, T>>,
	outbox: &mut Outbox,
) -> Result<(), Disconnected> {
	// one byte short of a full packet, so every write ends the transfer
	let mut packet = [0u8; PACKET_LEN as usize - 1];
	let dropped = outbox.take_dropped();
	if dropped > 0 {
		warn!("link: outbox full, {} reply bytes lost", dropped);
	}
	loop {
		let n = outbox.drain(&mut packet);
		if n == 0 {
			return Ok(());
		}
		class.write_packet(&packet[..n]).await?;
	}
}
