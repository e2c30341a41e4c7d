pub mod bar;
pub mod dmx;
pub mod opc;
pub mod texture;

pub use bar::ColorFormat;
