//! Artifact writer - routes rendered templates to their destination
//!
//! Stream mode prints only the stack template. Directory mode writes the
//! stack template, its parameters and (when present) the addons template as
//! separate files. Files are written one after another with no cleanup on
//! failure, so re-running the same command overwrites whatever was left.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::deployment::{
    addons_template_file_name, stack_params_file_name, stack_template_file_name,
};
use crate::domain::{AddonsArtifact, RenderedArtifact};
use crate::error::WriteError;

/// Where packaged artifacts go
pub enum Destination {
    /// Print the stack template; parameters and addons are discarded
    Stream(Box<dyn Write + Send>),
    /// Write every artifact as a file in this directory
    Directory(PathBuf),
}

impl Destination {
    /// Directory mode when an output directory is given, stdout otherwise
    pub fn from_output_dir(output_dir: Option<PathBuf>) -> Self {
        match output_dir {
            Some(dir) => Self::Directory(dir),
            None => Self::Stream(Box::new(std::io::stdout())),
        }
    }
}

/// Writes one application's artifacts for one environment
pub struct ArtifactWriter {
    destination: Destination,
    app: String,
    env: String,
    written: Vec<PathBuf>,
}

impl ArtifactWriter {
    pub fn new(destination: Destination, app: impl Into<String>, env: impl Into<String>) -> Self {
        Self {
            destination,
            app: app.into(),
            env: env.into(),
            written: Vec::new(),
        }
    }

    /// Files created so far (directory mode only)
    pub fn written_files(&self) -> &[PathBuf] {
        &self.written
    }

    /// Write the stack template and its parameters
    pub fn write_stack(&mut self, stack: &RenderedArtifact) -> Result<(), WriteError> {
        match &mut self.destination {
            Destination::Stream(out) => write_stream(out, &stack.template),
            Destination::Directory(dir) => {
                std::fs::create_dir_all(&*dir).map_err(|source| WriteError::CreateDir {
                    path: dir.clone(),
                    source,
                })?;

                let template_path = dir.join(stack_template_file_name(&self.app));
                write_file(&template_path, &stack.template)?;
                self.written.push(template_path);

                let params_path = dir.join(stack_params_file_name(&self.app, &self.env));
                write_file(&params_path, &stack.parameters)?;
                self.written.push(params_path);
                Ok(())
            }
        }
    }

    /// Write the addons template; a no-op in stream mode
    pub fn write_addons(&mut self, addons: &AddonsArtifact) -> Result<(), WriteError> {
        match &self.destination {
            Destination::Stream(_) => Ok(()),
            Destination::Directory(dir) => {
                let addons_path = dir.join(addons_template_file_name(&self.app));
                write_file(&addons_path, &addons.template)?;
                self.written.push(addons_path);
                Ok(())
            }
        }
    }
}

fn write_stream(out: &mut Box<dyn Write + Send>, body: &str) -> Result<(), WriteError> {
    out.write_all(body.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|source| WriteError::Write {
            target: "output stream".to_string(),
            source,
        })
}

/// Create-or-truncate `path` and write `body` in full
fn write_file(path: &Path, body: &str) -> Result<(), WriteError> {
    let mut file = File::create(path).map_err(|source| WriteError::CreateFile {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(body.as_bytes())
        .map_err(|source| WriteError::Write {
            target: path.display().to_string(),
            source,
        })?;
    info!("Wrote {}", path.display());
    Ok(())
}
