//! Shader stages and GLSL uniform reflection.
//!
//! # Overview
//!
//! - [`ShaderStage`] names the two programmable stages a program links
//! - [`reflect_uniforms`] scans GLSL source for `uniform` declarations so a
//!   backend without a driver-side reflection API can still hand out
//!   locations by name

use std::sync::OnceLock;

use regex::Regex;

/// Shader stage type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader stage - processes each vertex
    Vertex,
    /// Fragment (pixel) shader stage - processes each fragment
    Fragment,
}

impl ShaderStage {
    /// Returns a human-readable name for the shader stage.
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }

    /// Conventional file extension for sources of this stage.
    pub fn extension(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vert",
            ShaderStage::Fragment => "frag",
        }
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A `uniform` declaration found in GLSL source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReflectedUniform {
    pub name: String,
    /// GLSL type name, e.g. `mat4` or `sampler2D`.
    pub glsl_type: String,
    /// Declared array length, 1 for non-arrays.
    pub array_len: u32,
}

fn uniform_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)^\s*(?:layout\s*\([^)]*\)\s*)?uniform\s+(?:(?:highp|mediump|lowp)\s+)?(?<ty>\w+)\s+(?<name>\w+)\s*(?:\[\s*(?<len>\d+)\s*\])?\s*;",
        )
        .expect("uniform declaration pattern is valid")
    })
}

/// Collect the uniforms declared in a GLSL source, in declaration order.
///
/// Line comments are stripped first. Block comments, uniform blocks and
/// preprocessor-sized arrays are not understood.
pub fn reflect_uniforms(source: &str) -> Vec<ReflectedUniform> {
    let stripped: String = source
        .lines()
        .map(|line| line.split("//").next().unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n");

    uniform_regex()
        .captures_iter(&stripped)
        .map(|caps| ReflectedUniform {
            name: caps["name"].to_string(),
            glsl_type: caps["ty"].to_string(),
            array_len: caps
                .name("len")
                .and_then(|len| len.as_str().parse().ok())
                .unwrap_or(1),
        })
        .collect()
}
