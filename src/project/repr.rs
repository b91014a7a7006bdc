//! Project configuration file representation

use crate::project::{Error, Program, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// In-memory representation of the current project configuration.
///
/// This file is typically read from a file named `retroscan.json`, and it
/// lists every program in the project, keyed by name. Paths inside it are
/// relative to the directory the file is in.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Project {
    #[serde(default)]
    programs: BTreeMap<String, Program>,

    #[serde(skip)]
    root: PathBuf,
}

impl Project {
    pub fn read(filename: &Path) -> Result<Self> {
        let project_file = fs::File::open(filename)?;
        let mut project: Self = serde_json::from_reader(project_file)?;

        for (name, prog) in project.programs.iter_mut() {
            prog.set_name(name);
        }

        project.root = filename
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(project)
    }

    /// A project with no programs, rooted at `root`.
    pub fn empty(root: &Path) -> Self {
        Project {
            programs: BTreeMap::new(),
            root: root.to_path_buf(),
        }
    }

    /// The directory project paths are relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the program with the given name within the project.
    pub fn program(&self, name: &str) -> Result<&Program> {
        self.programs
            .get(name)
            .ok_or_else(|| Error::UnknownProgram(name.to_string()))
    }

    /// Get the project's default program, which is the first by name.
    pub fn default_program(&self) -> Option<&Program> {
        self.programs.values().next()
    }

    pub fn iter_programs(&self) -> impl Iterator<Item = (&str, &Program)> {
        self.programs.iter().map(|(k, v)| (k.as_str(), v))
    }
}
