pub mod acia;
pub mod dma;
pub mod fdc;
pub mod ide;
pub mod mdrive;
pub mod rtc;
pub mod timer;
pub mod video;
