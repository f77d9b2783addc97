pub(crate) mod collector;
pub(crate) mod complexity;
