pub(crate) mod lazy;
