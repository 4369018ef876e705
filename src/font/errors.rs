#[derive(Debug, Clone, PartialEq, Fail)]
pub enum Error {
    #[fail(display = "Line {}: missing value of `{}`.", _0, _1)]
    MissingValue(usize, String),
    #[fail(display = "Line {}: `{}` is not a valid number.", _0, _1)]
    InvalidNumber(usize, String),
    #[fail(display = "Line {}: unterminated quoted string.", _0)]
    UnterminatedString(usize),
    #[fail(display = "The font does not have a `common` record.")]
    MissingCommon,
    #[fail(display = "Glyph {} refers to page {}, but the font has {} pages.", _0, _1, _2)]
    PageOutOfRange(u32, usize, usize),
    #[fail(display = "Page `{}` could not be loaded: {}", _0, _1)]
    Page(String, String),
}

pub type Result<T> = ::std::result::Result<T, Error>;
