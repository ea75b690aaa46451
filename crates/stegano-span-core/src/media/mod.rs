pub mod directory;
mod raster;
pub mod types;

pub use directory::png_images;
pub use raster::RasterImage;
pub use types::{ImageFile, RgbImage};
