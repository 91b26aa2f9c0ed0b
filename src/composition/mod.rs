pub(crate) mod builtin;
pub(crate) mod dsl;
pub(crate) mod model;
pub(crate) mod navigation;
pub(crate) mod registry;
pub(crate) mod resolver;
