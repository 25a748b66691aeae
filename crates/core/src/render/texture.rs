//! Texture wrapper: RGBA8 image upload and unit binding.
//!
//! The sampling setup is decided once at load time from the image
//! dimensions, following the WebGL1-era rule: power-of-two images get a
//! full mip chain, everything else gets clamp-to-edge wrapping and
//! linear minification with no mips. The decision itself is pure
//! ([`sampling_for`]) and unit-tested; only the upload needs a live
//! context.

use crate::error::RenderError;
use crate::mesh::ImageData;

/// Number of texture units addressable through `TEXTURE0 + unit`.
pub(crate) const TEXTURE_UNITS: u32 = 32;

/// Whether a texture can be mip-mapped and repeat-wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sampling {
    /// Both dimensions are powers of two: generate the full mip chain
    /// and leave wrap/filter modes at their defaults.
    Mipmapped,
    /// Non-power-of-two: clamp both axes to edge and force linear
    /// minification, no mips.
    ClampedLinear,
}

/// True for 1, 2, 4, 8, ... Zero is not a power of two.
pub(crate) fn is_power_of_two(value: u32) -> bool {
    value != 0 && value & (value - 1) == 0
}

/// The sampling setup for an image of the given dimensions.
pub(crate) fn sampling_for(width: u32, height: u32) -> Sampling {
    if is_power_of_two(width) && is_power_of_two(height) {
        Sampling::Mipmapped
    } else {
        Sampling::ClampedLinear
    }
}

/// One GPU texture and the dimensions it was loaded with.
pub struct Texture {
    texture: glow::Texture,
    width: u32,
    height: u32,
}

impl Texture {
    /// Uploads a decoded RGBA8 image into a new texture and applies the
    /// sampling policy for its dimensions.
    ///
    /// # Errors
    ///
    /// `RenderError::Gl` if the driver refuses to allocate.
    #[allow(unsafe_code)]
    pub fn load(gl: &glow::Context, image: &ImageData) -> Result<Self, RenderError> {
        use glow::HasContext;

        // SAFETY: glow wraps raw GL calls as unsafe. ImageData
        // guarantees pixels are exactly width * height * 4 bytes.
        let texture = unsafe { gl.create_texture() }.map_err(RenderError::Gl)?;

        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                image.width() as i32,
                image.height() as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(image.pixels())),
            );

            match sampling_for(image.width(), image.height()) {
                Sampling::Mipmapped => gl.generate_mipmap(glow::TEXTURE_2D),
                Sampling::ClampedLinear => {
                    gl.tex_parameter_i32(
                        glow::TEXTURE_2D,
                        glow::TEXTURE_WRAP_S,
                        glow::CLAMP_TO_EDGE as i32,
                    );
                    gl.tex_parameter_i32(
                        glow::TEXTURE_2D,
                        glow::TEXTURE_WRAP_T,
                        glow::CLAMP_TO_EDGE as i32,
                    );
                    gl.tex_parameter_i32(
                        glow::TEXTURE_2D,
                        glow::TEXTURE_MIN_FILTER,
                        glow::LINEAR as i32,
                    );
                }
            }

            gl.bind_texture(glow::TEXTURE_2D, None);
        }

        Ok(Self {
            texture,
            width: image.width(),
            height: image.height(),
        })
    }

    /// Binds this texture to the given texture unit for the next draw.
    ///
    /// Units 0..=31 map through `TEXTURE0 + unit`; anything beyond
    /// fails the call rather than drawing without the binding.
    ///
    /// # Errors
    ///
    /// `RenderError::UnsupportedTextureUnit` for `unit >= 32`.
    #[allow(unsafe_code)]
    pub fn activate(&self, gl: &glow::Context, unit: u32) -> Result<(), RenderError> {
        use glow::HasContext;

        let slot = texture_unit_slot(unit)?;

        // SAFETY: slot is a valid TEXTUREi constant and self.texture a
        // valid handle from load().
        unsafe {
            gl.active_texture(slot);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Maps a unit number to its `TEXTUREi` constant, rejecting units the
/// constant range cannot express.
pub(crate) fn texture_unit_slot(unit: u32) -> Result<u32, RenderError> {
    if unit >= TEXTURE_UNITS {
        return Err(RenderError::UnsupportedTextureUnit { unit });
    }
    Ok(glow::TEXTURE0 + unit)
}
