//! Program identifier

use crate::arch::{ArchName, Architecture};
use crate::memory::{Memory, Pointer};
use crate::project::{Error, Result};
use crate::types::{Signature, TypeDescriptor};
use clap::{App, Arg, ArgMatches, ArgSettings};
use relative_path::{RelativePath, RelativePathBuf};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::{self, FromStr};

/// What sits in a region of the address space that is not the image.
#[derive(Copy, Clone, Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Ram,
    Io,
    OpenBus,
}

impl RegionKind {
    /// Map a region of this kind into `bus`.
    pub fn install(self, bus: &mut Memory, start: Pointer, length: usize) {
        match self {
            RegionKind::Ram => bus.install_ram(start, length),
            RegionKind::Io => bus.install_io(start, length),
            RegionKind::OpenBus => bus.install_openbus(start, length),
        }
    }
}

impl str::FromStr for RegionKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_ref() {
            "ram" => Ok(RegionKind::Ram),
            "io" => Ok(RegionKind::Io),
            "mmio" => Ok(RegionKind::Io),
            "openbus" => Ok(RegionKind::OpenBus),
            _ => Err(()),
        }
    }
}

derive_deserialize_from_str!(RegionKind, "valid memory region kind");

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub start: Pointer,
    pub length: usize,
    pub kind: RegionKind,
}

/// A procedure the user already knows about.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserProcedure {
    pub at: Pointer,

    #[serde(default)]
    pub signature: Option<Signature>,
}

/// A global the user already knows the type of.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserGlobal {
    pub at: Pointer,

    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    arch: Option<ArchName>,
    image: Option<RelativePathBuf>,

    /// Where the image is loaded; zero if unset.
    #[serde(default)]
    base: Option<Pointer>,

    #[serde(skip)]
    name: Option<String>,

    #[serde(default)]
    regions: Vec<Region>,

    #[serde(default)]
    entry_points: Vec<Pointer>,

    #[serde(default)]
    procedures: Vec<UserProcedure>,

    #[serde(default)]
    globals: Vec<UserGlobal>,
}

impl Program {
    pub fn configure_app<'a, 'b>(app: App<'a, 'b>) -> App<'a, 'b> {
        app.arg(
            Arg::with_name("image")
                .long("image")
                .value_name("image.bin")
                .help("The program image file to analyze.")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("arch")
                .long("arch")
                .value_name("ARCH")
                .help("What architecture to expect.")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("base")
                .long("base")
                .value_name("0x0000")
                .help("The address the image is loaded at.")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
    }

    /// Construct a Program from clap ArgMatches
    pub fn from_arg_matches(args: &ArgMatches) -> Program {
        Program {
            arch: args
                .value_of("arch")
                .and_then(|s| ArchName::from_str(s).ok()),
            image: args.value_of("image").map(RelativePathBuf::from),
            base: args
                .value_of("base")
                .and_then(|s| Pointer::from_str(s).ok()),
            ..Program::default()
        }
    }

    pub fn arch(&self) -> Option<ArchName> {
        self.arch
    }

    pub fn set_arch(&mut self, arch: ArchName) {
        self.arch = Some(arch);
    }

    pub fn image(&self) -> Option<&RelativePath> {
        self.image.as_deref()
    }

    pub fn set_image(&mut self, path: &str) {
        self.image = Some(RelativePathBuf::from(path));
    }

    pub fn base(&self) -> Pointer {
        self.base.unwrap_or_else(|| Pointer::new(0))
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn entry_points(&self) -> &[Pointer] {
        &self.entry_points
    }

    pub fn add_entry_point(&mut self, at: Pointer) {
        self.entry_points.push(at);
    }

    pub fn procedures(&self) -> &[UserProcedure] {
        &self.procedures
    }

    pub fn globals(&self) -> &[UserGlobal] {
        &self.globals
    }

    pub fn as_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    /// Build the program's memory map, reading its image from disk.
    ///
    /// The image is installed first, so it takes precedence over any region
    /// that overlaps it.
    pub fn load_memory(&self, root: &Path) -> Result<Memory> {
        let arch = self.arch.ok_or(Error::Unspecified("architecture"))?;
        let image = self.image.as_ref().ok_or(Error::Unspecified("image"))?;
        let mut bus = with_architecture!(arch, |a| { Memory::new(a.endianness()) });

        let mut file = fs::File::open(image.to_path(root))?;
        bus.install_rom(self.base(), &mut file)?;

        for region in self.regions.iter() {
            region.kind.install(&mut bus, region.start, region.length);
        }

        Ok(bus)
    }

    /// Fill in anything `other` leaves unset from this program.
    ///
    /// Lists given in `other` are added to this program's lists.
    pub fn apply_override(&self, other: &Program) -> Program {
        Program {
            arch: other.arch.or(self.arch),
            image: other.image.clone().or_else(|| self.image.clone()),
            base: other.base.or(self.base),
            name: other.name.clone().or_else(|| self.name.clone()),
            regions: self
                .regions
                .iter()
                .chain(other.regions.iter())
                .cloned()
                .collect(),
            entry_points: self
                .entry_points
                .iter()
                .chain(other.entry_points.iter())
                .copied()
                .collect(),
            procedures: self
                .procedures
                .iter()
                .chain(other.procedures.iter())
                .cloned()
                .collect(),
            globals: self
                .globals
                .iter()
                .chain(other.globals.iter())
                .cloned()
                .collect(),
        }
    }
}
