pub(crate) mod assignment;
pub(crate) mod builtin;
pub(crate) mod definition;
pub(crate) mod options;
pub(crate) mod registry;
