pub(crate) mod context;
pub(crate) mod layout;
pub(crate) mod paint;
pub(crate) mod surface;
pub(crate) mod vector;
