pub use crate::application::prelude::*;
pub use crate::content::prelude::*;
pub use crate::errors::*;
pub use crate::font::prelude::*;
pub use crate::math::prelude::*;
pub use crate::particles::prelude::*;
pub use crate::scene::prelude::*;
pub use crate::video::prelude::*;
pub use crate::window::prelude::*;
