//! Hardware Abstraction Layer
//!
//! Board bindings for the STM32G474: bus lines and status LED, cycle
//! delays for bit-banging, and the SPI1/DMA port.

pub mod gpio;
pub mod spi_dma;
pub mod timer;
