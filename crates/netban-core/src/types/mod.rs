mod channel;
mod geo;
mod resolution;
mod whois;

pub use channel::*;
pub use geo::*;
pub use resolution::*;
pub use whois::*;
