//! Linked shader programs and their uniform bindings.

use std::path::Path;

use lumen_core::{DiagnosticKind, Diagnostics, Error, Result};
use lumen_rhi::{GraphicsContext, ProgramHandle, RhiError, ShaderHandle, ShaderStage};
use tracing::info;

use crate::uniform::{BindingTable, UniformLayout};

/// A vertex/fragment program plus the bindings that feed it.
///
/// Compile and link failures leave a null program: passes using it still
/// clear their targets but draw nothing. Not `Clone`: the owner of a
/// program is the one that deletes it.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ShaderProgram {
    name: String,
    program: ProgramHandle,
    vertex: ShaderHandle,
    fragment: ShaderHandle,
    bindings: BindingTable,
}

impl ShaderProgram {
    /// A program that draws nothing.
    pub fn null(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Compile and link a program from GLSL sources.
    pub fn from_sources<G: GraphicsContext + ?Sized>(
        gfx: &mut G,
        name: impl Into<String>,
        vertex_source: &str,
        fragment_source: &str,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let name = name.into();

        let vertex = match gfx.compile_shader(ShaderStage::Vertex, vertex_source) {
            Ok(shader) => shader,
            Err(e) => {
                report(&name, &e, diagnostics);
                return Self::null(name);
            }
        };
        let fragment = match gfx.compile_shader(ShaderStage::Fragment, fragment_source) {
            Ok(shader) => shader,
            Err(e) => {
                gfx.delete_shader(vertex);
                report(&name, &e, diagnostics);
                return Self::null(name);
            }
        };
        let program = match gfx.link_program(vertex, fragment) {
            Ok(program) => program,
            Err(e) => {
                gfx.delete_shader(vertex);
                gfx.delete_shader(fragment);
                report(&name, &e, diagnostics);
                return Self::null(name);
            }
        };

        info!("Program {} created ({})", name, program);
        Self {
            name,
            program,
            vertex,
            fragment,
            bindings: BindingTable::default(),
        }
    }

    /// Load `<dir>/<vertex_file>` and `<dir>/<fragment_file>` and build a
    /// program named after the vertex file stem.
    ///
    /// # Errors
    /// [`Error::Shader`] if either file cannot be read. Compile errors are
    /// reported through `diagnostics`.
    pub fn from_files<G: GraphicsContext + ?Sized>(
        gfx: &mut G,
        dir: &Path,
        vertex_file: &str,
        fragment_file: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let (vertex_source, fragment_source) = load_sources(dir, vertex_file, fragment_file)?;
        let name = Path::new(vertex_file)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| vertex_file.to_owned());

        Ok(Self::from_sources(
            gfx,
            name,
            &vertex_source,
            &fragment_source,
            diagnostics,
        ))
    }

    /// Resolve `layout` against this program, replacing earlier bindings.
    pub fn bind_uniforms<G: GraphicsContext + ?Sized>(
        &mut self,
        gfx: &G,
        layout: &UniformLayout,
        diagnostics: &mut Diagnostics,
    ) {
        if self.program.is_null() {
            self.bindings = BindingTable::default();
            return;
        }
        self.bindings = BindingTable::build(gfx, self.program, layout, &self.name, diagnostics);
    }

    /// Free the program and both stages.
    pub fn delete<G: GraphicsContext + ?Sized>(&mut self, gfx: &mut G) {
        gfx.delete_program(self.program);
        gfx.delete_shader(self.vertex);
        gfx.delete_shader(self.fragment);
        let name = std::mem::take(&mut self.name);
        *self = Self::null(name);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> ProgramHandle {
        self.program
    }

    pub fn vertex_shader(&self) -> ShaderHandle {
        self.vertex
    }

    pub fn fragment_shader(&self) -> ShaderHandle {
        self.fragment
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn is_linked(&self) -> bool {
        !self.program.is_null()
    }
}

/// Read a vertex/fragment source pair from `dir`.
///
/// # Errors
/// [`Error::Shader`] naming the file that could not be read.
pub fn load_sources(dir: &Path, vertex_file: &str, fragment_file: &str) -> Result<(String, String)> {
    Ok((
        read_source(&dir.join(vertex_file))?,
        read_source(&dir.join(fragment_file))?,
    ))
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::Shader(format!("cannot read {}: {}", path.display(), e)))
}

fn report(name: &str, err: &RhiError, diagnostics: &mut Diagnostics) {
    let kind = match err {
        RhiError::ProgramLink { .. } => DiagnosticKind::ProgramLink,
        _ => DiagnosticKind::ShaderCompile,
    };
    diagnostics.push(kind, name, err.to_string());
}
