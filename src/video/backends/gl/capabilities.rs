use gl;
use gl::types::*;
use std::cmp;
use std::ffi;

use crate::errors::*;
use crate::video::errors::{Error as VideoError, Result as VideoResult};

/// Describes the OpenGL context profile.
#[derive(Debug, Copy, Clone)]
pub enum Profile {
    /// The context uses only future-compatible functions and definitions.
    Core,
    /// The context includes all immediate mode functions and definitions.
    Compatibility,
}

/// Describes a version.
///
/// A version can only be compared to another version if they belong to the same API.
/// For example, both `Version::GL(3, 0) >= Version::ES(3, 0)` and `Version::ES(3, 0) >=
/// Version::GL(3, 0)` return `false`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    /// Regular OpenGL.
    GL(u8, u8),
    /// OpenGL embedded system.
    ES(u8, u8),
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Version) -> Option<cmp::Ordering> {
        let (es1, major1, minor1) = match *self {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        let (es2, major2, minor2) = match *other {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        if es1 != es2 {
            None
        } else {
            match major1.cmp(&major2) {
                cmp::Ordering::Equal => Some(minor1.cmp(&minor2)),
                v => Some(v),
            }
        }
    }
}

impl Version {
    /// Obtains the OpenGL version of the current context using the loaded functions.
    ///
    /// # Unsafe
    ///
    /// You must ensure that the functions belong to the current context, otherwise you will get
    /// an undefined behavior.
    pub unsafe fn parse() -> Result<Version> {
        let desc = parse_str(gl::VERSION)?;
        Version::parse_str(&desc)
    }

    /// Parses a `GL_VERSION` string, e.g. "4.1 Metal - 76.3" or "OpenGL ES 3.0 Mesa".
    pub fn parse_str(desc: &str) -> Result<Version> {
        let (es, desc) = if desc.starts_with("OpenGL ES ") {
            (true, &desc[10..])
        } else if desc.starts_with("OpenGL ES-") {
            (true, &desc[13..])
        } else {
            (false, desc)
        };

        let desc = desc
            .split(' ')
            .next()
            .ok_or_else(|| format_err!("[GL] Version string {:?} is malformed.", desc))?;

        let mut iter = desc.split('.');
        let mut number = || -> Result<u8> {
            iter.next()
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| format_err!("[GL] Version string {:?} is malformed.", desc))
        };

        let major = number()?;
        let minor = number()?;

        if es {
            Ok(Version::ES(major, minor))
        } else {
            Ok(Version::GL(major, minor))
        }
    }
}

/// Represents the capabilities of the context.
///
/// Contrary to the state, these values never change.
#[derive(Debug)]
pub struct Capabilities {
    /// Returns a version or release number. Vendor-specific information may follow the version
    /// number.
    pub version: Version,

    /// The company responsible for this GL implementation.
    pub vendor: String,

    /// The name of the renderer.
    pub renderer: String,

    /// The OpenGL context profile if available. `None` before OpenGL 3.2.
    pub profile: Option<Profile>,

    /// The context is in debug mode.
    pub debug: bool,

    /// Maximum width and height of `glViewport`.
    pub max_viewport_dims: (u32, u32),

    /// Maximum number of textures that can be bound to a program.
    pub max_combined_texture_image_units: u8,
}

impl Capabilities {
    pub unsafe fn parse() -> Result<Capabilities> {
        let version = Version::parse()?;

        let debug = if version >= Version::GL(3, 0) {
            let mut val = 0;
            gl::GetIntegerv(gl::CONTEXT_FLAGS, &mut val);
            (val as GLenum & gl::CONTEXT_FLAG_DEBUG_BIT) != 0
        } else {
            false
        };

        Ok(Capabilities {
            version,
            vendor: parse_str(gl::VENDOR)?,
            renderer: parse_str(gl::RENDERER)?,
            profile: Capabilities::parse_profile(version),
            debug,
            max_viewport_dims: Capabilities::parse_viewport_dims(),
            max_combined_texture_image_units: Capabilities::parse_texture_image_units(),
        })
    }

    /// Checks the context against the requirements of the built-in shaders, which are
    /// written for `#version 330` and `#version 300 es`.
    pub fn check(&self) -> VideoResult<()> {
        check_requirements(self.version, self.max_combined_texture_image_units)
    }

    #[inline]
    unsafe fn parse_viewport_dims() -> (u32, u32) {
        let mut val: [GLint; 2] = [0, 0];
        gl::GetIntegerv(gl::MAX_VIEWPORT_DIMS, val.as_mut_ptr());
        (val[0] as u32, val[1] as u32)
    }

    #[inline]
    unsafe fn parse_profile(version: Version) -> Option<Profile> {
        if version >= Version::GL(3, 2) {
            let mut val = 0;
            gl::GetIntegerv(gl::CONTEXT_PROFILE_MASK, &mut val);
            let val = val as GLenum;
            if (val & gl::CONTEXT_COMPATIBILITY_PROFILE_BIT) != 0 {
                Some(Profile::Compatibility)
            } else if (val & gl::CONTEXT_CORE_PROFILE_BIT) != 0 {
                Some(Profile::Core)
            } else {
                None
            }
        } else {
            None
        }
    }

    #[inline]
    unsafe fn parse_texture_image_units() -> u8 {
        let mut val = 2;
        gl::GetIntegerv(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS, &mut val);
        val.min(255) as u8
    }
}

/// Fails with `Requirement` on contexts older than OpenGL 3.3 or OpenGL ES 3.0, or
/// with less than two texture units.
pub fn check_requirements(version: Version, texture_units: u8) -> VideoResult<()> {
    let supported = match version {
        Version::GL(..) => version >= Version::GL(3, 3),
        Version::ES(..) => version >= Version::ES(3, 0),
    };

    if !supported {
        return Err(VideoError::Requirement(format!(
            "OpenGL 3.3 or OpenGL ES 3.0 ({:?} is available)",
            version
        )));
    }

    if texture_units < 2 {
        return Err(VideoError::Requirement("multiple texture units".into()));
    }

    Ok(())
}

unsafe fn parse_str(id: GLenum) -> Result<String> {
    let s = gl::GetString(id);
    if s.is_null() {
        bail!("[GL] String of {} is null.", id);
    }

    String::from_utf8(ffi::CStr::from_ptr(s as *const _).to_bytes().to_vec())
        .map_err(|_| format_err!("[GL] String of {} is malformed.", id))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn version() {
        assert_eq!(Version::parse_str("4.1 Metal - 76.3").unwrap(), Version::GL(4, 1));
        assert_eq!(
            Version::parse_str("OpenGL ES 3.0 Mesa 20.0").unwrap(),
            Version::ES(3, 0)
        );
        assert!(Version::parse_str("garbage").is_err());

        assert!(Version::GL(3, 3) > Version::GL(3, 0));
        assert!(!(Version::GL(3, 0) >= Version::ES(3, 0)));
    }

    #[test]
    fn requirements() {
        assert!(check_requirements(Version::GL(3, 3), 16).is_ok());
        assert!(check_requirements(Version::GL(4, 1), 16).is_ok());
        assert!(check_requirements(Version::ES(3, 0), 8).is_ok());

        for &version in &[Version::GL(2, 1), Version::GL(3, 2), Version::ES(2, 0)] {
            match check_requirements(version, 16) {
                Err(VideoError::Requirement(_)) => {}
                other => panic!("{:?} passes with {:?}.", version, other),
            }
        }

        match check_requirements(Version::GL(3, 3), 1) {
            Err(VideoError::Requirement(_)) => {}
            other => panic!("single texture unit passes with {:?}.", other),
        }
    }
}
