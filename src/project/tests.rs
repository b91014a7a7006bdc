use crate::arch::ArchName;
use crate::memory::{AddressOracle, Behavior, Pointer};
use crate::project::{Error, Program, Project, RegionKind};
use crate::types::TypeDescriptor;
use std::fs;
use tempfile::tempdir;

const PROJECT: &str = r#"{
    "programs": {
        "game": {
            "arch": "tlcs90",
            "image": "game.bin",
            "base": "0x0100",
            "regions": [
                {"start": "0xC000", "length": 8192, "kind": "ram"},
                {"start": "0xFFC0", "length": 64, "kind": "io"}
            ],
            "entry_points": ["0x0100"],
            "procedures": [
                {"at": "0x0120", "signature": {"params": [{"primitive": {"domain": "unsigned", "size": 1}}]}}
            ],
            "globals": [
                {"at": "0x0140", "type": {"pointer": {"function": {"params": []}}}}
            ]
        },
        "demo": {
            "image": "demo.bin"
        }
    }
}"#;

#[test]
fn project_read() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("retroscan.json");
    fs::write(&path, PROJECT).unwrap();

    let project = Project::read(&path).unwrap();
    let game = project.program("game").unwrap();

    assert_eq!(project.root(), dir.path());
    assert_eq!(game.as_name(), Some("game"));
    assert_eq!(game.arch(), Some(ArchName::Tlcs90));
    assert_eq!(game.base(), Pointer::new(0x100));
    assert_eq!(game.entry_points(), &[Pointer::new(0x100)]);
    assert_eq!(game.regions()[0].kind, RegionKind::Ram);
    assert_eq!(game.procedures()[0].at, Pointer::new(0x120));
    assert_eq!(
        game.procedures()[0]
            .signature
            .as_ref()
            .map(|s| s.params.clone()),
        Some(vec![TypeDescriptor::byte()])
    );
    assert_eq!(game.globals()[0].at, Pointer::new(0x140));

    assert_eq!(
        project.default_program().and_then(Program::as_name),
        Some("demo")
    );
    assert!(matches!(
        project.program("nope"),
        Err(Error::UnknownProgram(_))
    ));
}

#[test]
fn project_load_memory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("retroscan.json");
    fs::write(&path, PROJECT).unwrap();
    fs::write(dir.path().join("game.bin"), [0x00u8, 0x1E]).unwrap();

    let project = Project::read(&path).unwrap();
    let bus = project
        .program("game")
        .unwrap()
        .load_memory(project.root())
        .unwrap();

    assert_eq!(bus.read_unit(Pointer::new(0x100)), Some(0x00));
    assert_eq!(bus.read_unit(Pointer::new(0x101)), Some(0x1E));
    assert_eq!(bus.read_unit(Pointer::new(0x102)), None);
    assert_eq!(bus.behavior(Pointer::new(0xC010)), Behavior::Uninitialized);
    assert_eq!(bus.behavior(Pointer::new(0xFFC1)), Behavior::MappedIO);
    assert!(!bus.is_mapped(Pointer::new(0x8000)));
}

#[test]
fn project_needs_architecture() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("retroscan.json");
    fs::write(&path, PROJECT).unwrap();

    let project = Project::read(&path).unwrap();
    let demo = project.program("demo").unwrap();

    assert!(matches!(
        demo.load_memory(project.root()),
        Err(Error::Unspecified("architecture"))
    ));

    let mut fixed = Program::default();
    fixed.set_arch(ArchName::Tlcs90);

    assert!(matches!(
        demo.apply_override(&fixed).load_memory(project.root()),
        Err(Error::Io(_))
    ));
}

#[test]
fn program_override() {
    let mut base = Program::default();
    base.set_arch(ArchName::Tlcs90);
    base.set_image("a.bin");
    base.add_entry_point(Pointer::new(0x100));

    let mut cli = Program::default();
    cli.set_image("b.bin");
    cli.add_entry_point(Pointer::new(0x200));

    let merged = base.apply_override(&cli);

    assert_eq!(merged.arch(), Some(ArchName::Tlcs90));
    assert_eq!(merged.image().map(|p| p.as_str()), Some("b.bin"));
    assert_eq!(
        merged.entry_points(),
        &[Pointer::new(0x100), Pointer::new(0x200)]
    );
}
