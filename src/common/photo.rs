use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::RgbImage;
use uuid::Uuid;

use crate::error::PipelineError;

/// An uploaded photo, decoded to RGB. Clones share the pixel buffer.
#[derive(Debug, Clone)]
pub struct Photo {
    id: Uuid,
    image: Arc<RgbImage>,
    received_at: DateTime<Utc>,
}

impl Photo {
    pub fn new(image: RgbImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            image: Arc::new(image),
            received_at: Utc::now(),
        }
    }

    /// Decodes any format the `image` crate understands.
    pub fn decode(bytes: &[u8]) -> Result<Self, PipelineError> {
        let decoded = image::load_from_memory(bytes)?;
        Ok(Self::new(decoded.to_rgb8()))
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgb};
    use std::io::Cursor;

    #[test]
    fn cloning_photo_shares_image_buffer() {
        let p1 = Photo::new(ImageBuffer::from_pixel(16, 16, Rgb([1, 2, 3])));
        let p2 = p1.clone();
        assert!(Arc::ptr_eq(&p1.image, &p2.image));
        assert_eq!(p1.id(), p2.id());
    }

    #[test]
    fn decodes_png_bytes() {
        let image: RgbImage = ImageBuffer::from_pixel(8, 4, Rgb([9, 8, 7]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        let photo = Photo::decode(&bytes).unwrap();
        assert_eq!(photo.dimensions(), (8, 4));
        assert_eq!(photo.image().get_pixel(3, 2), &Rgb([9, 8, 7]));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(Photo::decode(b"nope"), Err(PipelineError::Decode(_))));
    }
}
