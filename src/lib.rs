//! A small, portable 2D real-time game framework.
//!
//! `pastel` is built around a dirty-tracked render state store which sits in front of
//! the graphics backend, a set of textures with post-processing effects, a sprite batch,
//! particle emitters and a hierarchical entity/component scene.

#[macro_use]
extern crate log;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate serde;
pub extern crate cgmath;

#[macro_use]
pub mod utils;
pub mod errors;
pub mod math;

pub mod application;
pub mod content;
pub mod font;
pub mod particles;
pub mod scene;
pub mod video;
pub mod window;

pub mod prelude;
