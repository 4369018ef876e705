//! Named, cached access to textures and fonts.
//!
//! `ContentManager` does not know where files live. It asks its `Locator` to resolve a
//! resource name into a path, loads the file once and hands out shared references
//! afterwards.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::errors::*;
use crate::font::prelude::Font;
use crate::video::prelude::{Texture, TextureRef, VideoSystem};

/// Resolves resource names into files.
pub trait Locator {
    fn find_resource_file(&self, name: &str) -> Option<PathBuf>;
}

impl<F> Locator for F
where
    F: Fn(&str) -> Option<PathBuf>,
{
    fn find_resource_file(&self, name: &str) -> Option<PathBuf> {
        (self)(name)
    }
}

/// Looks resources up inside one directory.
#[derive(Debug, Clone)]
pub struct DirectoryLocator {
    root: PathBuf,
}

impl DirectoryLocator {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        DirectoryLocator {
            root: root.as_ref().to_owned(),
        }
    }
}

impl Locator for DirectoryLocator {
    fn find_resource_file(&self, name: &str) -> Option<PathBuf> {
        let path = self.root.join(name);
        if path.is_file() {
            Some(path)
        } else {
            None
        }
    }
}

pub struct ContentManager<L: Locator> {
    locator: L,
    textures: HashMap<String, TextureRef>,
    fonts: HashMap<String, Rc<Font>>,
}

impl<L: Locator> ContentManager<L> {
    pub fn new(locator: L) -> Self {
        ContentManager {
            locator,
            textures: HashMap::new(),
            fonts: HashMap::new(),
        }
    }

    #[inline]
    pub fn locator(&self) -> &L {
        &self.locator
    }

    /// Returns the texture `name`, loading it on first use.
    pub fn texture(&mut self, video: &mut VideoSystem, name: &str) -> Result<TextureRef> {
        if let Some(texture) = self.textures.get(name) {
            return Ok(texture.clone());
        }

        let path = self.locate(name)?;
        let generate_mipmaps = video.params().generate_mipmaps;
        let texture = Texture::create_from_file(video, &path, generate_mipmaps)
            .with_context(|_| format!("Failed to load texture {}.", path.display()))?;

        let texture = Rc::new(texture.with_name(name));
        self.textures.insert(name.to_owned(), texture.clone());
        Ok(texture)
    }

    /// Returns the font `name`, loading it and its pages on first use.
    pub fn font(&mut self, video: &mut VideoSystem, name: &str) -> Result<Rc<Font>> {
        if let Some(font) = self.fonts.get(name) {
            return Ok(font.clone());
        }

        let path = self.locate(name)?;
        let font = Font::create_from_file(video, &path)
            .with_context(|_| format!("Failed to load font {}.", path.display()))?;

        let font = Rc::new(font);
        self.fonts.insert(name.to_owned(), font.clone());
        Ok(font)
    }

    /// Registers a texture created elsewhere under `name`, replacing any cached one.
    pub fn add_texture<T: Into<String>>(&mut self, name: T, texture: TextureRef) {
        self.textures.insert(name.into(), texture);
    }

    pub fn add_font<T: Into<String>>(&mut self, name: T, font: Rc<Font>) {
        self.fonts.insert(name.into(), font);
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.textures.contains_key(name) || self.fonts.contains_key(name)
    }

    /// Drops the cached entries of `name`. Outstanding references stay valid.
    pub fn remove(&mut self, name: &str) {
        self.textures.remove(name);
        self.fonts.remove(name);
    }

    pub fn clear(&mut self) {
        self.textures.clear();
        self.fonts.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.textures.len() + self.fonts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn locate(&self, name: &str) -> Result<PathBuf> {
        match self.locator.find_resource_file(name) {
            Some(path) => Ok(path),
            None => bail!("Could not find resource `{}`.", name),
        }
    }
}

pub mod prelude {
    pub use super::{ContentManager, DirectoryLocator, Locator};
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::io::BufWriter;

    use super::*;
    use crate::math::prelude::*;
    use crate::video::prelude::VideoParams;

    fn write_png(path: &Path) {
        let file = fs::File::create(path).unwrap();
        let mut encoder = png::Encoder::new(BufWriter::new(file), 2, 2);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[255u8; 16]).unwrap();
    }

    #[test]
    fn cache() {
        let dir = ::std::env::temp_dir().join("pastel-content-cache");
        fs::create_dir_all(&dir).unwrap();
        write_png(&dir.join("white.png"));
        fs::write(
            dir.join("small.fnt"),
            concat!(
                "common lineHeight=8 base=6 pages=1\n",
                "page id=0 file=\"white.png\"\n",
                "char id=65 x=0 y=0 width=2 height=2 xadvance=3\n",
            ),
        )
        .unwrap();

        let mut video =
            VideoSystem::headless(VideoParams::default(), Vector2::new(64, 64)).unwrap();
        let mut content = ContentManager::new(DirectoryLocator::new(&dir));

        let t1 = content.texture(&mut video, "white.png").unwrap();
        let t2 = content.texture(&mut video, "white.png").unwrap();
        assert!(Rc::ptr_eq(&t1, &t2));
        assert_eq!(t1.name(), "white.png");
        assert_eq!(t1.dimensions(), Vector2::new(2, 2));

        let font = content.font(&mut video, "small.fnt").unwrap();
        assert!(font.pages()[0].texture.is_some());
        assert_eq!(font.measure("AA"), Vector2::new(6.0, 8.0));
        assert_eq!(content.len(), 2);

        assert!(content.texture(&mut video, "missing.png").is_err());

        content.remove("white.png");
        assert!(!content.contains("white.png"));
        assert_eq!(t1.dimensions(), Vector2::new(2, 2));
    }

    #[test]
    fn closure_locator() {
        let content = ContentManager::new(|name: &str| {
            if name == "a" {
                Some(PathBuf::from("a.png"))
            } else {
                None
            }
        });

        assert_eq!(
            content.locator().find_resource_file("a"),
            Some(PathBuf::from("a.png"))
        );
        assert!(content.locate("b").is_err());
        assert!(content.is_empty());
    }
}
