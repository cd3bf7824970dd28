//! Image décodée d'un snap

use image::DynamicImage;

/// Image d'un snap, décodée et prête à afficher.
///
/// L'hôte récupère les pixels via [`SnapImage::image`] et les pousse dans sa
/// propre vue; le moteur de lecture ne garde que des `Arc<SnapImage>`.
#[derive(Debug, Clone)]
pub struct SnapImage {
    url: String,
    image: DynamicImage,
}

impl SnapImage {
    /// Crée une image de snap à partir d'une image décodée
    pub fn new(url: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            url: url.into(),
            image,
        }
    }

    /// URL d'origine de l'image
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Image décodée
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Taille approximative en mémoire (octets du buffer de pixels)
    pub fn byte_size(&self) -> usize {
        self.image.as_bytes().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_image_dimensions() {
        let img = DynamicImage::new_rgba8(4, 3);
        let snap = SnapImage::new("https://example.com/a.jpg", img);
        assert_eq!(snap.width(), 4);
        assert_eq!(snap.height(), 3);
        assert_eq!(snap.byte_size(), 4 * 3 * 4);
        assert_eq!(snap.url(), "https://example.com/a.jpg");
    }
}
