//! Outbound network checks used during link admission.
//!
//! # Components
//!
//! - [`resolver`] - Hostname resolution and the private-range (SSRF) filter
//! - [`prober`] - Bounded HTTP reachability probe

pub mod prober;
pub mod resolver;

pub use prober::{AttemptFailure, HttpProber, ProbeError, ProbeMethod, ProbeRequest, Reachable, ReachabilityProbe};
pub use resolver::{AddressResolver, ResolveError, ResolvedAddressSet, SystemResolver, resolve};

#[cfg(test)]
pub use prober::MockReachabilityProbe;
#[cfg(test)]
pub use resolver::MockAddressResolver;
