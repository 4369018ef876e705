use crate::video::assets::prelude::{BufferHandle, ShaderHandle, TextureHandle};

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Window: {}", _0)]
    Window(String),
    #[fail(display = "Backend: {}", _0)]
    Backend(String),
    #[fail(display = "OpenGL implementation doesn\'t support {}.", _0)]
    Requirement(String),
    #[fail(display = "{} is invalid.", _0)]
    TextureHandleInvalid(TextureHandle),
    #[fail(display = "{} is invalid.", _0)]
    BufferHandleInvalid(BufferHandle),
    #[fail(display = "{} is invalid.", _0)]
    ShaderHandleInvalid(ShaderHandle),
    #[fail(display = "Failed to create shader, errors: \n{}.", _0)]
    ShaderCreationFailure(String),
    #[fail(display = "Failed to create resource: {}.", _0)]
    ResourceCreationFailure(String),
    #[fail(display = "Trying to update immutable resource.")]
    UpdateImmutableBuffer,
    #[fail(display = "Out of bounds.")]
    OutOfBounds,
    #[fail(display = "Failed to decode image: {}.", _0)]
    Decode(String),
}

pub type Result<T> = ::std::result::Result<T, Error>;

impl From<failure::Error> for Error {
    fn from(err: failure::Error) -> Error {
        match err.downcast::<Error>() {
            Ok(err) => err,
            Err(err) => Error::Backend(format!("{}", err)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keeps_typed_errors() {
        let err: failure::Error = Error::Requirement("OpenGL 3.3".into()).into();
        match Error::from(err) {
            Error::Requirement(v) => assert_eq!(v, "OpenGL 3.3"),
            other => panic!("{:?}", other),
        }

        match Error::from(format_err!("lost context")) {
            Error::Backend(v) => assert_eq!(v, "lost context"),
            other => panic!("{:?}", other),
        }
    }
}
