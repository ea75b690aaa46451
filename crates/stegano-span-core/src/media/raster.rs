use image::RgbImage;

/// A raster image that exposes its pixels as a flat buffer of RGB color channels.
///
/// The buffer holds `width * height * 3` samples in row major order, red, green and blue
/// for every pixel. Implementations must hand out the very same buffer on every call,
/// the codec reads and writes the hidden data through it.
pub trait RasterImage {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn channels(&self) -> &[u8];

    fn channels_mut(&mut self) -> &mut [u8];
}

impl RasterImage for RgbImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn channels(&self) -> &[u8] {
        self.as_raw()
    }

    fn channels_mut(&mut self) -> &mut [u8] {
        self
    }
}

impl<T: RasterImage + ?Sized> RasterImage for &mut T {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn channels(&self) -> &[u8] {
        (**self).channels()
    }

    fn channels_mut(&mut self) -> &mut [u8] {
        (**self).channels_mut()
    }
}
