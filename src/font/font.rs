use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use crate::math::prelude::*;
use crate::video::prelude::{SpriteBatch, Texture, TextureRef, VideoSystem};

use super::errors::{Error, Result};

/// Metrics shared by every glyph, the `common` record.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FontCommon {
    pub line_height: i32,
    pub base: i32,
    pub scale_w: i32,
    pub scale_h: i32,
    pub pages: usize,
    pub packed: bool,
}

/// A texture atlas page, the `page` record.
#[derive(Debug, Clone)]
pub struct FontPage {
    pub id: usize,
    pub file: String,
    pub texture: Option<TextureRef>,
}

/// The placement of a character in its page, the `char` record.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Glyph {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub xoffset: i32,
    pub yoffset: i32,
    pub xadvance: i32,
    pub page: usize,
    pub channel: i32,
}

/// A bitmap font in the text format of AngelCode BMFont.
#[derive(Debug, Clone)]
pub struct Font {
    common: FontCommon,
    pages: Vec<FontPage>,
    glyphs: HashMap<u32, Glyph>,
}

impl Font {
    /// Parses the descriptor. Pages are left without textures.
    pub fn parse(source: &str) -> Result<Font> {
        let mut common = None;
        let mut pages = Vec::new();
        let mut glyphs = HashMap::new();

        for (index, line) in source.lines().enumerate() {
            let line_no = index + 1;
            let mut tokens = tokenize(line, line_no)?.into_iter();

            let tag = match tokens.next() {
                Some((tag, None)) => tag,
                Some(_) | None => continue,
            };

            let record = Record {
                line: line_no,
                pairs: tokens.collect(),
            };

            match tag.as_str() {
                "common" => {
                    common = Some(FontCommon {
                        line_height: record.int("lineHeight")?,
                        base: record.int("base")?,
                        scale_w: record.int_or("scaleW", 0)?,
                        scale_h: record.int_or("scaleH", 0)?,
                        pages: record.int_or("pages", 1)? as usize,
                        packed: record.int_or("packed", 0)? != 0,
                    });
                }
                "page" => pages.push(FontPage {
                    id: record.int("id")? as usize,
                    file: record.string("file")?,
                    texture: None,
                }),
                "char" => {
                    let glyph = Glyph {
                        id: record.int("id")? as u32,
                        x: record.int("x")?,
                        y: record.int("y")?,
                        width: record.int("width")?,
                        height: record.int("height")?,
                        xoffset: record.int_or("xoffset", 0)?,
                        yoffset: record.int_or("yoffset", 0)?,
                        xadvance: record.int("xadvance")?,
                        page: record.int_or("page", 0)? as usize,
                        channel: record.int_or("chnl", 15)?,
                    };

                    glyphs.insert(glyph.id, glyph);
                }
                "info" | "chars" | "kernings" | "kerning" => {}
                other => warn!("Unknown font record `{}` at line {}.", other, line_no),
            }
        }

        let common = common.ok_or(Error::MissingCommon)?;
        pages.sort_by_key(|v| v.id);

        for glyph in glyphs.values() {
            if glyph.page >= pages.len().max(common.pages) {
                return Err(Error::PageOutOfRange(glyph.id, glyph.page, pages.len()));
            }
        }

        Ok(Font {
            common,
            pages,
            glyphs,
        })
    }

    /// Loads a font descriptor and its pages, which are looked up next to the
    /// descriptor.
    pub fn create_from_file<P: AsRef<Path>>(video: &mut VideoSystem, path: P) -> Result<Font> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .map_err(|err| Error::Page(path.display().to_string(), err.to_string()))?;

        let mut font = Font::parse(&source)?;
        let dir = path.parent().map(|v| v.to_path_buf()).unwrap_or_default();
        let generate_mipmaps = video.params().generate_mipmaps;

        font.load_pages(|file| {
            Texture::create_from_file(video, dir.join(file), generate_mipmaps)
                .map(Rc::new)
                .map_err(|err| err.to_string())
        })?;

        Ok(font)
    }

    /// Assigns the texture of every page with `func`, which receives the file name
    /// of page.
    pub fn load_pages<F>(&mut self, mut func: F) -> Result<()>
    where
        F: FnMut(&str) -> ::std::result::Result<TextureRef, String>,
    {
        for page in &mut self.pages {
            let texture = func(&page.file).map_err(|err| Error::Page(page.file.clone(), err))?;
            page.texture = Some(texture);
        }

        Ok(())
    }

    #[inline]
    pub fn common(&self) -> &FontCommon {
        &self.common
    }

    #[inline]
    pub fn pages(&self) -> &[FontPage] {
        &self.pages
    }

    #[inline]
    pub fn glyph(&self, id: char) -> Option<&Glyph> {
        self.glyphs.get(&(id as u32))
    }

    #[inline]
    pub fn line_height(&self) -> f32 {
        self.common.line_height as f32
    }

    /// The size of `text` in pixels. Lines are separated with `\n`, characters without
    /// glyph are skipped.
    pub fn measure(&self, text: &str) -> Vector2<f32> {
        let mut size = Vector2::new(0.0f32, 0.0);
        for line in text.split('\n') {
            size.x = size.x.max(self.line_width(line));
            size.y += self.line_height();
        }

        size
    }

    fn line_width(&self, line: &str) -> f32 {
        line.chars()
            .filter_map(|v| self.glyph(v))
            .map(|v| v.xadvance as f32)
            .sum()
    }

    /// Draws `text` anchored at `position` with `align`, and returns the rectangle it
    /// covers. Lines are aligned horizontally with each other as well.
    pub fn draw(
        &self,
        text: &str,
        position: Vector2<f32>,
        color: Color,
        align: Align,
        batch: &mut SpriteBatch,
    ) -> Rect {
        let size = self.measure(text);
        let (ax, ay) = align.anchor();
        let left = (position.x - size.x * ax).round();
        let top = (position.y - size.y * ay).round();

        let mut y = top;
        for line in text.split('\n') {
            let mut x = left + ((size.x - self.line_width(line)) * ax).round();

            for glyph in line.chars().filter_map(|v| self.glyph(v)) {
                let texture = self
                    .pages
                    .get(glyph.page)
                    .and_then(|v| v.texture.as_ref());

                if let (Some(texture), true) = (texture, glyph.width > 0 && glyph.height > 0) {
                    let dimensions = texture.dimensions();
                    let (tw, th) = (dimensions.x as f32, dimensions.y as f32);

                    let rect = Vector4::new(
                        x + glyph.xoffset as f32,
                        y + glyph.yoffset as f32,
                        glyph.width as f32,
                        glyph.height as f32,
                    );

                    let uvs = Vector4::new(
                        glyph.x as f32 / tw,
                        glyph.y as f32 / th,
                        (glyph.x + glyph.width) as f32 / tw,
                        (glyph.y + glyph.height) as f32 / th,
                    );

                    batch.draw_rect_with_uvs(Some(texture), rect, uvs, color);
                }

                x += glyph.xadvance as f32;
            }

            y += self.line_height();
        }

        Rect::with_size(
            left as i32,
            top as i32,
            size.x.ceil() as i32,
            size.y.ceil() as i32,
        )
    }
}

struct Record {
    line: usize,
    pairs: Vec<(String, Option<String>)>,
}

impl Record {
    fn value(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|v| v.0 == key)
            .and_then(|v| v.1.as_ref().map(|v| v.as_str()))
    }

    fn string(&self, key: &str) -> Result<String> {
        self.value(key)
            .map(|v| v.to_owned())
            .ok_or_else(|| Error::MissingValue(self.line, key.to_owned()))
    }

    fn int(&self, key: &str) -> Result<i32> {
        let v = self
            .value(key)
            .ok_or_else(|| Error::MissingValue(self.line, key.to_owned()))?;

        v.parse()
            .map_err(|_| Error::InvalidNumber(self.line, v.to_owned()))
    }

    fn int_or(&self, key: &str, default: i32) -> Result<i32> {
        match self.value(key) {
            Some(_) => self.int(key),
            None => Ok(default),
        }
    }
}

/// Splits a line into `key` or `key=value` tokens. Values could be double quoted to
/// contain spaces.
fn tokenize(line: &str, line_no: usize) -> Result<Vec<(String, Option<String>)>> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.peek().map(|v| v.is_whitespace()).unwrap_or(false) {
            chars.next();
        }

        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() || c == '=' {
                break;
            }

            key.push(c);
            chars.next();
        }

        if chars.peek() != Some(&'=') {
            tokens.push((key, None));
            continue;
        }

        chars.next();
        let mut value = String::new();

        if chars.peek() == Some(&'"') {
            chars.next();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some(c) => value.push(c),
                    None => return Err(Error::UnterminatedString(line_no)),
                }
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }

                value.push(c);
                chars.next();
            }
        }

        tokens.push((key, Some(value)));
    }

    Ok(tokens)
}

#[cfg(test)]
mod test {
    use super::*;

    const ARIAL: &str = r#"info face="Arial Black" size=32 bold=0 italic=0 charset="" unicode=1
common lineHeight=32 base=26 scaleW=256 scaleH=256 pages=1 packed=0
page id=0 file="arial 0.png"
chars count=3
char id=32 x=0 y=0 width=0 height=0 xoffset=0 yoffset=26 xadvance=8 page=0 chnl=15
char id=65 x=10 y=0 width=20 height=24 xoffset=-1 yoffset=2 xadvance=18 page=0 chnl=15
char id=66 x=30 y=0 width=16 height=24 xoffset=1 yoffset=2 xadvance=17 page=0 chnl=15
"#;

    #[test]
    fn tokens() {
        let tokens = tokenize(r#"page id=0 file="a b.png""#, 1).unwrap();
        assert_eq!(tokens[0], ("page".to_owned(), None));
        assert_eq!(tokens[1], ("id".to_owned(), Some("0".to_owned())));
        assert_eq!(tokens[2], ("file".to_owned(), Some("a b.png".to_owned())));

        assert_eq!(
            tokenize(r#"page file="a"#, 4),
            Err(Error::UnterminatedString(4))
        );
    }

    #[test]
    fn parse() {
        let font = Font::parse(ARIAL).unwrap();
        assert_eq!(font.common().line_height, 32);
        assert_eq!(font.common().base, 26);
        assert_eq!(font.common().pages, 1);
        assert_eq!(font.pages()[0].file, "arial 0.png");

        let a = font.glyph('A').unwrap();
        assert_eq!((a.x, a.width, a.xoffset, a.xadvance), (10, 20, -1, 18));
        assert!(font.glyph('C').is_none());
    }

    #[test]
    fn measure() {
        let font = Font::parse(ARIAL).unwrap();
        assert_eq!(font.measure("AB"), Vector2::new(35.0, 32.0));
        assert_eq!(font.measure("A B\nA"), Vector2::new(43.0, 64.0));
        assert_eq!(font.measure(""), Vector2::new(0.0, 32.0));
    }

    #[test]
    fn errors() {
        assert_eq!(Font::parse("char id=1").err(), Some(Error::MissingValue(1, "x".into())));
        assert_eq!(
            Font::parse("common lineHeight=a base=1").err(),
            Some(Error::InvalidNumber(1, "a".into()))
        );
        assert_eq!(Font::parse("").err(), Some(Error::MissingCommon));
    }
}
