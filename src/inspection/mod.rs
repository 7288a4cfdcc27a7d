// ABOUTME: Inspection of host-exported usage sites against the allow-list policy.
// ABOUTME: Site model, the symbol resolver seam, and the violation-collecting inspector.

pub mod inspector;
pub mod resolver;
pub mod site;

pub use inspector::*;
pub use resolver::*;
pub use site::*;
