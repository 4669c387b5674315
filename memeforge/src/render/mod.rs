pub(crate) mod export;
pub(crate) mod raster;
pub(crate) mod surface;
