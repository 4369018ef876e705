//! Built-in shader programs: the sprite program used by `SpriteBatch` and the full-screen
//! post-processing passes used by render target textures.
//!
//! Every program reads the same vertex layout: `a_Position` (vec2, location 0),
//! `a_Texcoord` (vec2, location 1) and `a_Color` (vec4, location 2). The sampler of
//! texture slot 0 is `u_Texture0`.

/// A full-screen post-processing pass.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Effect {
    BlurHorizontal,
    BlurVertical,
    Sepia,
    Crt,
    Cartoon,
    Vignette,
}

/// GLSL sources of the built-in programs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectKernels {
    pub sprite_vs: String,
    pub sprite_ps: String,
    /// Vertex stage shared by every full-screen pass.
    pub fullscreen_vs: String,
    pub blur_horizontal: String,
    pub blur_vertical: String,
    pub sepia: String,
    pub crt: String,
    pub cartoon: String,
    pub vignette: String,
}

impl Default for EffectKernels {
    fn default() -> Self {
        EffectKernels {
            sprite_vs: SPRITE_VS.to_owned(),
            sprite_ps: SPRITE_PS.to_owned(),
            fullscreen_vs: FULLSCREEN_VS.to_owned(),
            blur_horizontal: BLUR_H_PS.to_owned(),
            blur_vertical: BLUR_V_PS.to_owned(),
            sepia: SEPIA_PS.to_owned(),
            crt: CRT_PS.to_owned(),
            cartoon: CARTOON_PS.to_owned(),
            vignette: VIGNETTE_PS.to_owned(),
        }
    }
}

impl EffectKernels {
    pub fn source(&self, effect: Effect) -> &str {
        match effect {
            Effect::BlurHorizontal => &self.blur_horizontal,
            Effect::BlurVertical => &self.blur_vertical,
            Effect::Sepia => &self.sepia,
            Effect::Crt => &self.crt,
            Effect::Cartoon => &self.cartoon,
            Effect::Vignette => &self.vignette,
        }
    }
}

pub const SPRITE_VS: &str = r#"
#version 330 core
layout(location = 0) in vec2 a_Position;
layout(location = 1) in vec2 a_Texcoord;
layout(location = 2) in vec4 a_Color;

uniform mat4 u_Projection;
uniform mat4 u_ModelView;

out vec2 v_Texcoord;
out vec4 v_Color;

void main() {
    gl_Position = u_Projection * u_ModelView * vec4(a_Position, 0.0, 1.0);
    v_Texcoord = a_Texcoord;
    v_Color = a_Color;
}
"#;

pub const SPRITE_PS: &str = r#"
#version 330 core
in vec2 v_Texcoord;
in vec4 v_Color;

uniform sampler2D u_Texture0;

out vec4 o_Color;

void main() {
    o_Color = texture(u_Texture0, v_Texcoord) * v_Color;
}
"#;

pub const FULLSCREEN_VS: &str = r#"
#version 330 core
layout(location = 0) in vec2 a_Position;
layout(location = 1) in vec2 a_Texcoord;
layout(location = 2) in vec4 a_Color;

out vec2 v_Texcoord;

void main() {
    gl_Position = vec4(a_Position, 0.0, 1.0);
    v_Texcoord = a_Texcoord;
}
"#;

pub const BLUR_H_PS: &str = r#"
#version 330 core
in vec2 v_Texcoord;
uniform sampler2D u_Texture0;
uniform vec2 u_KernelSize;
out vec4 o_Color;

void main() {
    vec4 sum = vec4(0.0);
    sum += texture(u_Texture0, v_Texcoord - vec2(u_KernelSize.x * 3.0, 0.0)) * 0.006;
    sum += texture(u_Texture0, v_Texcoord - vec2(u_KernelSize.x * 2.0, 0.0)) * 0.061;
    sum += texture(u_Texture0, v_Texcoord - vec2(u_KernelSize.x, 0.0)) * 0.242;
    sum += texture(u_Texture0, v_Texcoord) * 0.382;
    sum += texture(u_Texture0, v_Texcoord + vec2(u_KernelSize.x, 0.0)) * 0.242;
    sum += texture(u_Texture0, v_Texcoord + vec2(u_KernelSize.x * 2.0, 0.0)) * 0.061;
    sum += texture(u_Texture0, v_Texcoord + vec2(u_KernelSize.x * 3.0, 0.0)) * 0.006;
    o_Color = sum;
}
"#;

pub const BLUR_V_PS: &str = r#"
#version 330 core
in vec2 v_Texcoord;
uniform sampler2D u_Texture0;
uniform vec2 u_KernelSize;
out vec4 o_Color;

void main() {
    vec4 sum = vec4(0.0);
    sum += texture(u_Texture0, v_Texcoord - vec2(0.0, u_KernelSize.y * 3.0)) * 0.006;
    sum += texture(u_Texture0, v_Texcoord - vec2(0.0, u_KernelSize.y * 2.0)) * 0.061;
    sum += texture(u_Texture0, v_Texcoord - vec2(0.0, u_KernelSize.y)) * 0.242;
    sum += texture(u_Texture0, v_Texcoord) * 0.382;
    sum += texture(u_Texture0, v_Texcoord + vec2(0.0, u_KernelSize.y)) * 0.242;
    sum += texture(u_Texture0, v_Texcoord + vec2(0.0, u_KernelSize.y * 2.0)) * 0.061;
    sum += texture(u_Texture0, v_Texcoord + vec2(0.0, u_KernelSize.y * 3.0)) * 0.006;
    o_Color = sum;
}
"#;

pub const SEPIA_PS: &str = r#"
#version 330 core
in vec2 v_Texcoord;
uniform sampler2D u_Texture0;
uniform vec3 u_Tone;
uniform float u_Saturation;
uniform float u_Amount;
out vec4 o_Color;

void main() {
    vec4 color = texture(u_Texture0, v_Texcoord);
    float gray = dot(color.rgb, vec3(0.299, 0.587, 0.114));
    vec3 muted = mix(vec3(gray), color.rgb, u_Saturation);
    vec3 sepia = vec3(gray) * u_Tone;
    o_Color = vec4(mix(muted, sepia, u_Amount), color.a);
}
"#;

pub const CRT_PS: &str = r#"
#version 330 core
in vec2 v_Texcoord;
uniform sampler2D u_Texture0;
uniform vec2 u_Resolution;
out vec4 o_Color;

void main() {
    vec4 color = texture(u_Texture0, v_Texcoord);
    float line = mod(floor(v_Texcoord.y * u_Resolution.y), 2.0);
    float column = mod(floor(v_Texcoord.x * u_Resolution.x), 3.0);
    vec3 mask = vec3(
        column == 0.0 ? 1.0 : 0.7,
        column == 1.0 ? 1.0 : 0.7,
        column == 2.0 ? 1.0 : 0.7);
    o_Color = vec4(color.rgb * mask * (line == 0.0 ? 1.0 : 0.6), color.a);
}
"#;

pub const CARTOON_PS: &str = r#"
#version 330 core
in vec2 v_Texcoord;
uniform sampler2D u_Texture0;
uniform vec3 u_Tone;
out vec4 o_Color;

void main() {
    vec4 color = texture(u_Texture0, v_Texcoord);
    vec3 steps = max(u_Tone, vec3(1.0));
    o_Color = vec4(floor(color.rgb * steps + 0.5) / steps, color.a);
}
"#;

pub const VIGNETTE_PS: &str = r#"
#version 330 core
in vec2 v_Texcoord;
uniform sampler2D u_Texture0;
uniform float u_Amount;
out vec4 o_Color;

void main() {
    vec4 color = texture(u_Texture0, v_Texcoord);
    vec2 d = v_Texcoord - vec2(0.5);
    float falloff = clamp(1.0 - dot(d, d) * u_Amount * 4.0, 0.0, 1.0);
    o_Color = vec4(color.rgb * falloff, color.a);
}
"#;
