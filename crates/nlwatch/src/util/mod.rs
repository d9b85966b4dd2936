//! Shared utilities for nlwatch.

pub mod ifname;

pub use ifname::get_ifname_or_index;
