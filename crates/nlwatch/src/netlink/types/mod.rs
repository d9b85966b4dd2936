//! Fixed-size rtnetlink message headers and their constants.

pub mod addr;
pub mod link;
