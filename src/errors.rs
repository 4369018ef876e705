pub use failure::{Error, Fail, ResultExt};

pub type Result<T> = ::std::result::Result<T, Error>;
