//! SPI1 + DMA Port
//!
//! Binds the DMA transport to the STM32G474. The frame is handed to the
//! DMA task, which runs the SPI1 TX transfer on its DMA channel. The DMA
//! transfer-complete interrupt wakes that task, and the task reports the
//! completion through [`DmaCompletion`]. The busy flag is read straight
//! from the SPI status register.

use embassy_stm32::pac;
use embassy_stm32::spi::{self, BitOrder, MODE_0};
use embassy_stm32::time::Hertz;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::config::SPI_FREQUENCY_HZ;
use crate::transport::dma::{DmaCompletion, DmaPort};
use crate::types::REGISTER_BYTES;

/// Frame waiting for the DMA task
pub type FrameSignal = Signal<CriticalSectionRawMutex, [u8; REGISTER_BYTES]>;

/// Frame hand-off to the DMA task
pub static FRAMES: FrameSignal = Signal::new();

/// In-flight flag cleared on DMA transfer complete
pub static DMA_DONE: DmaCompletion = DmaCompletion::new();

/// SPI settings for the synthesizer bus: mode 0, MSB first
#[must_use]
pub fn spi_config() -> spi::Config {
    let mut config = spi::Config::default();
    config.frequency = Hertz(SPI_FREQUENCY_HZ);
    config.mode = MODE_0;
    config.bit_order = BitOrder::MsbFirst;
    config
}

/// SPI1 register view plus the frame hand-off
pub struct SpiDmaPort {
    regs: pac::spi::Spi,
    frames: &'static FrameSignal,
}

impl SpiDmaPort {
    /// Port over SPI1
    #[must_use]
    pub fn spi1(frames: &'static FrameSignal) -> Self {
        Self {
            regs: pac::SPI1,
            frames,
        }
    }
}

impl DmaPort for SpiDmaPort {
    fn start(&mut self, frame: [u8; REGISTER_BYTES]) {
        self.frames.signal(frame);
    }

    fn stop(&mut self) {
        self.regs.cr2().modify(|w| w.set_txdmaen(false));
    }

    fn is_busy(&self) -> bool {
        self.regs.sr().read().bsy()
    }
}
