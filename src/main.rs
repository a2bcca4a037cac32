//! ADF435x USB Bridge Main Application
//!
//! Entry point for the STM32G474 bridge firmware.
//! Brings up clocks, USB and the serial bus, then polls the register
//! writer from the main task.

#![no_std]
#![no_main]

use defmt::{debug, info, trace, warn};
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_stm32::gpio::{Level as PinLevel, Output, Speed};
use embassy_stm32::peripherals;
use embassy_stm32::rcc::{mux, Hsi48Config, Pll, PllMul, PllPreDiv, PllRDiv, PllSource, Sysclk};
use embassy_stm32::usb::{self, Driver};
use embassy_stm32::{bind_interrupts, Config};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Ticker;
use embassy_usb::{Builder, UsbDevice};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use adf435x_firmware::hal::gpio::StatusLed;
use adf435x_firmware::hal::timer::Stopwatch;
use adf435x_firmware::prelude::*;
use adf435x_firmware::usb::descriptor::{add_vendor_interface, UsbIdentity};
use adf435x_firmware::usb::vendor::VendorHandler;

#[cfg(feature = "transport-dma")]
use adf435x_firmware::hal::gpio::latch_output;
#[cfg(feature = "transport-dma")]
use adf435x_firmware::hal::spi_dma::{spi_config, SpiDmaPort, DMA_DONE, FRAMES};
#[cfg(feature = "transport-dma")]
use adf435x_firmware::transport::dma::DmaTransport;
#[cfg(feature = "transport-dma")]
use embassy_stm32::mode::Async;
#[cfg(feature = "transport-dma")]
use embassy_stm32::spi::Spi;

#[cfg(feature = "transport-bitbang")]
use adf435x_firmware::hal::gpio::SerialBusPins;
#[cfg(feature = "transport-bitbang")]
use adf435x_firmware::hal::timer::CycleDelay;
#[cfg(feature = "transport-bitbang")]
use adf435x_firmware::transport::bitbang::BitBangTransport;

#[cfg(not(any(feature = "transport-dma", feature = "transport-bitbang")))]
compile_error!("enable one transport: `transport-dma` or `transport-bitbang`");

bind_interrupts!(struct Irqs {
    USB_LP => usb::InterruptHandler<peripherals::USB>;
});

type UsbDriver = Driver<'static, peripherals::USB>;

/// Bridge state shared with the USB handler
static BRIDGE: Bridge = Bridge::new(BridgeConfig::DEFAULT);

/// Raised after every committed register write
static ACTIVITY: Signal<CriticalSectionRawMutex, ()> = Signal::new();

static HANDLER: StaticCell<VendorHandler> = StaticCell::new();
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 128]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; USB_CONTROL_BUFFER_SIZE]> = StaticCell::new();

/// 170 MHz from HSI through the PLL, HSI48 for USB
fn clock_config() -> Config {
    let mut config = Config::default();
    config.rcc.hsi48 = Some(Hsi48Config {
        sync_from_usb: true,
    });
    config.rcc.pll = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV4,
        mul: PllMul::MUL85,
        divp: None,
        divq: None,
        divr: Some(PllRDiv::DIV2),
    });
    config.rcc.sys = Sysclk::PLL1_R;
    config.rcc.boost = true;
    config.rcc.mux.clk48sel = mux::Clk48sel::HSI48;
    config
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("ADF435x USB Bridge Firmware v{}", env!("CARGO_PKG_VERSION"));

    let p = embassy_stm32::init(clock_config());

    info!("Peripherals initialized at {}MHz", SYSTEM_CLOCK_HZ / 1_000_000);

    let led = StatusLed::new(Output::new(p.PC13, PinLevel::Low, Speed::Low));
    debug!("Status LED on {}", pins::LED_STATUS);

    // USB: vendor interface only, requests go to the bridge
    let identity = UsbIdentity::DEFAULT;
    let driver = Driver::new(p.USB, Irqs, p.PA12, p.PA11);
    let mut builder = Builder::new(
        driver,
        identity.to_config(),
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        MSOS_DESCRIPTOR.init([0; 128]),
        CONTROL_BUF.init([0; USB_CONTROL_BUFFER_SIZE]),
    );
    builder.handler(HANDLER.init(VendorHandler::new(&BRIDGE)));
    add_vendor_interface(&mut builder);
    let usb = builder.build();

    info!("USB device {} on {}/{}", identity, pins::USB_DP, pins::USB_DM);

    #[cfg(feature = "transport-dma")]
    let mut frame = {
        let spi = Spi::new_txonly(p.SPI1, p.PA5, p.PA7, p.DMA1_CH3, spi_config());
        spawner.spawn(dma_task(spi)).unwrap();
        info!(
            "Transport: SPI1 + DMA1 channel {} at {}Hz",
            dma::SPI1_TX,
            SPI_FREQUENCY_HZ
        );
        LatchFrame::new(
            latch_output(p.PA4),
            DmaTransport::new(SpiDmaPort::spi1(&FRAMES), &DMA_DONE),
        )
    };

    #[cfg(feature = "transport-bitbang")]
    let mut frame = {
        let (latch, clock, data) = SerialBusPins::new(p.PA4, p.PA5, p.PA7).split();
        let timing = BRIDGE.config().timing;
        info!("Transport: bit-bang GPIO, {}", timing);
        LatchFrame::new(
            latch,
            BitBangTransport::new(clock, data, CycleDelay::new(SYSTEM_CLOCK_HZ), timing),
        )
    };

    info!(
        "Bus lines: LE={} CLK={} DATA={}",
        pins::LATCH,
        pins::CLOCK,
        pins::DATA
    );

    if let Err(err) = frame.init() {
        warn!("Latch init failed: {}", err);
    }

    spawner.spawn(usb_task(usb)).unwrap();
    spawner.spawn(heartbeat_task(led)).unwrap();

    info!("Bridge ready: {}", BRIDGE.config());

    let writer = RegisterWriter::new(BRIDGE.mailbox(), BRIDGE.guard(), frame);
    run_writer(writer).await
}

/// Poll the writer forever, logging what each cycle did
async fn run_writer<L, T>(mut writer: RegisterWriter<'static, L, T>) -> !
where
    L: OutputPin,
    T: SerialTransport,
{
    let mut ticker = Ticker::every(Duration::from_micros(POLL_INTERVAL_US));
    let mut frame_timer = Stopwatch::new();

    loop {
        let report = writer.poll();

        if let Some(value) = report.committed {
            if frame_timer.is_running() {
                info!("Wrote {} ({}us)", value, frame_timer.stop().as_micros());
            } else {
                info!("Wrote {}", value);
            }
            ACTIVITY.signal(());

            // Control bits 0b000: R0 closes a programming sequence
            if value.as_u32() & 0b111 == 0 {
                debug!("{}", writer.stats());
                for (slot, reg) in writer.history().enumerate() {
                    debug!("  [{}] {}", slot, reg);
                }
            }
        }

        match report.command {
            CommandOutcome::Idle => {}
            CommandOutcome::Deferred(reason) => trace!("Deferred: {}", reason),
            CommandOutcome::Discarded(err) => warn!("Discarded payload: {}", err),
            CommandOutcome::Started(value) => {
                if !writer.is_idle() {
                    frame_timer.start();
                }
                trace!("Frame opened for {}", value);
            }
            CommandOutcome::Failed(err) => warn!("Frame failed: {}", err),
        }

        ticker.next().await;
    }
}

/// USB device task
#[embassy_executor::task]
async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    usb.run().await
}

/// SPI1 DMA task - runs each frame handed over by the transport
#[cfg(feature = "transport-dma")]
#[embassy_executor::task]
async fn dma_task(mut spi: Spi<'static, Async>) {
    loop {
        let frame = FRAMES.wait().await;
        if let Err(err) = spi.write(frame.as_slice()).await {
            warn!("SPI DMA error: {}", defmt::Debug2Format(&err));
        }
        DMA_DONE.on_transfer_complete();
    }
}

/// Heartbeat task - blinks LED to show system is running, flickers on writes
#[embassy_executor::task]
async fn heartbeat_task(mut led: StatusLed<'static>) {
    loop {
        let hold = led.beat();
        let until = Instant::now() + Duration::from_millis(hold);

        while let Either::Second(()) = select(Timer::at(until), ACTIVITY.wait()).await {
            let resting = led.state();
            let (flicker, blink_ms) = resting.activity_flicker();
            led.set(flicker);
            Timer::after(Duration::from_millis(blink_ms)).await;
            led.set(resting);
        }
    }
}
