//! Sample and namespace types shared by the analyzer engine and the
//! processor host.

pub mod types;
