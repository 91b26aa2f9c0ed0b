pub(crate) mod platform;
pub(crate) mod simulated;
