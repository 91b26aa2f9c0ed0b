pub(crate) mod engine;
pub(crate) mod factory;
pub(crate) mod momentum;
pub(crate) mod motion;
pub(crate) mod physics;
pub(crate) mod scroll;
