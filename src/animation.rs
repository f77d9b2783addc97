pub(crate) mod builtin;
pub(crate) mod executor;
pub(crate) mod module;
pub(crate) mod props;
pub(crate) mod registry;
