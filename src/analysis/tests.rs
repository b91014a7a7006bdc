//! Analysis test suite

use crate::analysis::data::Error as DataError;
use crate::analysis::{
    data, DiagnosticLog, Diagnostics, Error, GlobalDataInterpreter, ReferenceKind, Severity,
};
use crate::memory::{self, Endianness, Memory, Pointer, Width};
use crate::queue::WorkItem;
use crate::types::{Field, Signature, TypeDescriptor};

fn bus(data: Vec<u8>) -> Memory {
    let mut bus = Memory::new(Endianness::LittleEndian);

    bus.install_rom_image(Pointer::new(0x100), data);
    bus.install_ram(Pointer::new(0xC000), 0x2000);

    bus
}

struct Outcome {
    result: data::Result<()>,
    offset: usize,
    discovered: Vec<WorkItem>,
    host: DiagnosticLog,
}

fn interpret(bus: &Memory, ty: &TypeDescriptor) -> Outcome {
    let host = DiagnosticLog::new();
    let (result, offset, discovered) = {
        let rdr = bus.reader_at(Pointer::new(0x100)).unwrap();
        let mut interp =
            GlobalDataInterpreter::new(rdr, bus, &host, Width::Word16, Endianness::LittleEndian);
        let result = interp.interpret(ty);
        let offset = interp.reader().offset();

        (result, offset, interp.into_discovered())
    };

    Outcome {
        result,
        offset,
        discovered,
        host,
    }
}

fn field(name: &str, offset: usize, ty: TypeDescriptor) -> Field {
    Field {
        name: name.to_string(),
        offset,
        ty,
    }
}

#[test]
fn data_struct_skips_padding() {
    let ty = TypeDescriptor::Struct {
        name: "s".to_string(),
        size: Some(6),
        fields: vec![
            field("a", 0, TypeDescriptor::byte()),
            field("b", 4, TypeDescriptor::word()),
        ],
    };
    let out = interpret(&bus(vec![1, 0xAA, 0xAA, 0xAA, 2, 3]), &ty);

    assert_eq!(out.result, Ok(()));
    assert_eq!(out.offset, 6);
    assert!(out.discovered.is_empty());
}

#[test]
fn data_struct_field_order_does_not_matter() {
    let ty = TypeDescriptor::Struct {
        name: "s".to_string(),
        size: None,
        fields: vec![
            field("b", 4, TypeDescriptor::word()),
            field("a", 0, TypeDescriptor::byte()),
        ],
    };
    let out = interpret(&bus(vec![1, 0xAA, 0xAA, 0xAA, 2, 3, 4, 5]), &ty);

    assert_eq!(out.result, Ok(()));
    assert_eq!(out.offset, 6);

    let padded = TypeDescriptor::Struct {
        name: "padded".to_string(),
        size: Some(8),
        fields: vec![field("a", 0, TypeDescriptor::byte())],
    };
    let out = interpret(&bus(vec![0; 8]), &padded);

    assert_eq!(out.result, Ok(()));
    assert_eq!(out.offset, 8);
}

#[test]
fn data_array_of_nothing() {
    let out = interpret(
        &bus(vec![0; 4]),
        &TypeDescriptor::array_of(TypeDescriptor::word(), 0),
    );

    assert_eq!(out.result, Ok(()));
    assert_eq!(out.offset, 0);

    let warnings = out.host.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].at, Pointer::new(0x100));
    assert_eq!(warnings[0].message, "arrays must have a non-zero length");
}

#[test]
fn data_array_elements() {
    let out = interpret(
        &bus(vec![0; 8]),
        &TypeDescriptor::array_of(TypeDescriptor::word(), 3),
    );

    assert_eq!(out.result, Ok(()));
    assert_eq!(out.offset, 6);
}

#[test]
fn data_array_of_empty_elements_visits_once() {
    let sig = Signature::default();
    let out = interpret(
        &bus(vec![0; 4]),
        &TypeDescriptor::array_of(TypeDescriptor::Function(sig), usize::MAX),
    );

    assert_eq!(out.result, Ok(()));
    assert_eq!(out.offset, 0);
    assert_eq!(out.discovered.len(), 1);

    let out = interpret(
        &bus(vec![0; 4]),
        &TypeDescriptor::array_of(TypeDescriptor::Unknown, usize::MAX),
    );

    assert_eq!(out.result, Ok(()));
    assert_eq!(out.offset, 0);
}

#[test]
fn data_dangling_pointer() {
    let out = interpret(
        &bus(vec![0x00, 0x80]),
        &TypeDescriptor::pointer_to(TypeDescriptor::byte()),
    );

    assert_eq!(out.result, Ok(()));
    assert_eq!(out.offset, 2);
    assert!(out.discovered.is_empty());
    assert_eq!(out.host.warnings().len(), 1);
}

#[test]
fn data_mapped_pointer() {
    let out = interpret(
        &bus(vec![0x10, 0xC0]),
        &TypeDescriptor::pointer_to(TypeDescriptor::word()),
    );

    assert_eq!(out.result, Ok(()));
    assert_eq!(
        out.discovered,
        vec![WorkItem::GlobalData {
            at: Pointer::new(0xC010),
            ty: TypeDescriptor::word(),
            from: Some(Pointer::new(0x100)),
        }]
    );
    assert!(out.host.entries().is_empty());
}

#[test]
fn data_function_is_code() {
    let sig = Signature::default();
    let out = interpret(&bus(vec![0x00]), &TypeDescriptor::Function(sig.clone()));

    assert_eq!(out.result, Ok(()));
    assert_eq!(out.offset, 0);
    assert_eq!(
        out.discovered,
        vec![WorkItem::Procedure {
            at: Pointer::new(0x100),
            kind: ReferenceKind::Subroutine,
            signature: Some(sig),
            from: None,
        }]
    );
}

#[test]
fn data_reference_is_transparent() {
    let ty = TypeDescriptor::Reference {
        name: "vector".to_string(),
        referent: Box::new(TypeDescriptor::pointer_to(TypeDescriptor::Unknown)),
    };
    let out = interpret(&bus(vec![0x00, 0x01]), &ty);

    assert_eq!(out.result, Ok(()));
    assert_eq!(out.offset, 2);
    assert_eq!(out.discovered.len(), 1);
}

#[test]
fn data_unknown_and_void_consume_nothing() {
    for ty in [TypeDescriptor::Unknown, TypeDescriptor::Void].iter() {
        let out = interpret(&bus(vec![0; 2]), ty);

        assert_eq!(out.result, Ok(()));
        assert_eq!(out.offset, 0);
    }
}

#[test]
fn data_unsupported() {
    let out = interpret(&bus(vec![0; 2]), &TypeDescriptor::Union("u".to_string()));

    assert_eq!(
        out.result,
        Err(DataError::Unsupported {
            at: Pointer::new(0x100),
            kind: "union"
        })
    );
    assert!(out.result.unwrap_err().is_configuration());
}

#[test]
fn data_short_read() {
    let ty = TypeDescriptor::array_of(TypeDescriptor::word(), 3);
    let out = interpret(&bus(vec![0; 5]), &ty);
    let err = out.result.unwrap_err();

    assert!(matches!(
        err,
        DataError::ShortRead(memory::Error::ShortRead { .. })
    ));
    assert!(!err.is_configuration());
    assert_eq!(err.address(), Pointer::new(0x104));
}

#[test]
fn diagnostic_log_collects() {
    let host = DiagnosticLog::new();

    host.warn(Pointer::new(0x10), "first");
    host.error(Pointer::new(0x20), "second");

    let entries = host.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].severity, Severity::Warning);
    assert_eq!(entries[1].severity, Severity::Error);
    assert_eq!(host.errors()[0].message, "second");
    assert_eq!(format!("{}", entries[1]), "error at 0020: second");
}

#[test]
fn analysis_error_addresses() {
    let err: Error = DataError::Unsupported {
        at: Pointer::new(0x300),
        kind: "enum",
    }
    .into();

    assert_eq!(err.address(), Pointer::new(0x300));
    assert_eq!(
        Error::Overlap {
            at: Pointer::new(0x10),
            existing: Pointer::new(0x8)
        }
        .address(),
        Pointer::new(0x10)
    );
}
