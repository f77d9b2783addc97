pub(crate) mod clock;
pub(crate) mod opts;
pub(crate) mod orchestrator;
