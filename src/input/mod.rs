pub mod launchpad;

mod buttons; pub use buttons::*;
mod dmx; pub use dmx::*;
mod mirror; pub use mirror::*;
