pub(crate) mod backend;
pub(crate) mod geometry;
pub(crate) mod overlay;
pub(crate) mod raster;
pub(crate) mod scene;
pub(crate) mod sink;
pub(crate) mod text;
