pub(crate) mod overrides;
pub(crate) mod runtime;
