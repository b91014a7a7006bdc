//! Scanner test suite

use crate::analysis::{DiagnosticLog, Diagnostics, Reference, ReferenceKind};
use crate::arch::tlcs90::Tlcs90;
use crate::database::{Database, Item};
use crate::memory::{Endianness, Memory, Pointer};
use crate::queue::{Cancellation, ScanReport, Scanner, Status, WorkKey};
use crate::types::{Field, Signature, TypeDescriptor};
use std::sync::Mutex;

/// A ROM at 0x100 built from pieces of code, with RAM at 0xC000.
fn program(pieces: &[(u64, &[u8])]) -> Memory {
    let mut image = vec![0x00; 0x40];

    for (at, bytes) in pieces.iter() {
        let offset = (*at - 0x100) as usize;
        image[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    let mut bus = Memory::new(Endianness::LittleEndian);
    bus.install_rom_image(Pointer::new(0x100), image);
    bus.install_ram(Pointer::new(0xC000), 0x2000);

    bus
}

fn scan(bus: &Memory, entries: &[u64]) -> (ScanReport, Database, DiagnosticLog) {
    let host = DiagnosticLog::new();
    let (report, db) = {
        let mut scanner = Scanner::new(Tlcs90(), bus, &host);

        for entry in entries.iter() {
            scanner.add_entry_point(Pointer::new(*entry));
        }

        let report = scanner.run();
        (report, scanner.into_database())
    };

    (report, db, host)
}

/// Every block in the map, as (start, length).
fn blocks(db: &Database) -> Vec<(u64, usize)> {
    db.map()
        .blocks()
        .map(|b| (b.start().as_pointer(), b.length()))
        .collect()
}

#[test]
fn scan_follows_control_flow() {
    let bus = program(&[
        (0x100, &[0x00]),             // nop
        (0x101, &[0xC6, 0x03]),       // jr z, 0106h
        (0x103, &[0x1C, 0x10, 0x01]), // call 0110h
        (0x106, &[0x1E]),             // ret
        (0x110, &[0x00, 0x1E]),       // nop; ret
    ]);
    let (report, db, host) = scan(&bus, &[0x100]);

    assert_eq!(
        report,
        ScanReport {
            processed: 4,
            failed: 0,
            remaining: 0,
            cancelled: false,
        }
    );
    assert!(report.is_complete());
    assert!(host.entries().is_empty());
    assert_eq!(
        blocks(&db),
        vec![(0x100, 3), (0x103, 3), (0x106, 1), (0x110, 2)]
    );

    let procs: Vec<(u64, ReferenceKind)> = db
        .procedures()
        .map(|p| (p.at().as_pointer(), p.kind()))
        .collect();
    assert_eq!(
        procs,
        vec![
            (0x100, ReferenceKind::Entrypoint),
            (0x110, ReferenceKind::Subroutine)
        ]
    );

    let to_callee: Vec<&Reference> = db
        .find_xrefs_to(Pointer::new(0x110), 1)
        .filter_map(|id| db.xref(id))
        .collect();
    assert_eq!(
        to_callee,
        vec![&Reference::new_static_ref(
            Pointer::new(0x103),
            Pointer::new(0x110),
            ReferenceKind::Subroutine
        )]
    );
    assert_eq!(db.find_xrefs_to(Pointer::new(0x106), 1).count(), 2);
}

#[test]
fn scan_processes_each_item_once() {
    let bus = program(&[(0x100, &[0xC8, 0xFE])]); // jr 0100h
    let host = DiagnosticLog::new();
    let mut scanner = Scanner::new(Tlcs90(), &bus, &host);

    scanner.add_entry_point(Pointer::new(0x100));
    scanner.add_entry_point(Pointer::new(0x100));
    assert_eq!(scanner.queued(), 1);
    assert_eq!(
        scanner.status(&WorkKey::Code(Pointer::new(0x100))),
        Status::Queued
    );

    let report = scanner.run();

    assert_eq!(report.processed, 1);
    assert_eq!(
        scanner.status(&WorkKey::Code(Pointer::new(0x100))),
        Status::Processed
    );
    assert_eq!(
        scanner.status(&WorkKey::Code(Pointer::new(0x101))),
        Status::Unvisited
    );
    assert_eq!(blocks(scanner.database()), vec![(0x100, 2)]);
}

#[test]
fn scan_splits_blocks_at_inner_targets() {
    let bus = program(&[
        (0x100, &[0x00, 0x00]), // nop; nop
        (0x102, &[0xC6, 0xFD]), // jr z, 0101h
        (0x104, &[0x1E]),       // ret
    ]);
    let (report, db, host) = scan(&bus, &[0x100]);

    assert_eq!(report.processed, 3);
    assert_eq!(report.failed, 0);
    assert!(host.entries().is_empty());
    assert_eq!(blocks(&db), vec![(0x100, 1), (0x101, 3), (0x104, 1)]);
}

#[test]
fn scan_reports_targets_inside_instructions() {
    let bus = program(&[
        (0x100, &[0x30, 0x1E]), // ld b, 1Eh
        (0x102, &[0xC6, 0xFD]), // jr z, 0101h
        (0x104, &[0x1E]),       // ret
    ]);
    let (report, db, host) = scan(&bus, &[0x100]);

    assert_eq!(report.processed, 3);
    assert_eq!(report.failed, 1);
    assert_eq!(blocks(&db), vec![(0x100, 4), (0x104, 1)]);

    let errors = host.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].at, Pointer::new(0x101));
}

#[test]
fn scan_merges_overlapping_entry_points() {
    let bus = program(&[(0x100, &[0x00, 0x00, 0x00, 0x1E])]);

    for entries in [[0x100, 0x102], [0x102, 0x100]].iter() {
        let (report, db, host) = scan(&bus, entries);

        assert_eq!(report.processed, 2);
        assert_eq!(report.failed, 0);
        assert!(host.entries().is_empty());
        assert_eq!(blocks(&db), vec![(0x100, 2), (0x102, 2)]);
    }
}

#[test]
fn scan_reports_code_running_into_data() {
    let bus = program(&[
        (0x100, &[0x1A, 0x04, 0x01]), // jp 0104h
        (0x104, &[0x00, 0x00]),       // nop; nop
        (0x106, &[0x00, 0x1E]),       // byte global; ret
    ]);
    let host = DiagnosticLog::new();
    let mut scanner = Scanner::new(Tlcs90(), &bus, &host);

    scanner.add_entry_point(Pointer::new(0x100));
    scanner.enqueue_user_global(Pointer::new(0x106), TypeDescriptor::byte());

    let report = scanner.run();

    assert_eq!(report.processed, 3);
    assert_eq!(report.failed, 1);
    assert_eq!(blocks(scanner.database()), vec![(0x100, 3), (0x104, 2)]);

    let errors = host.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].at, Pointer::new(0x105));
    assert!(errors[0].message.contains("data at 0106"));
}

#[test]
fn scan_reports_code_running_into_data_found_alongside() {
    let bus = program(&[
        (0x104, &[0x00, 0x00]), // nop; nop
        (0x106, &[0x00, 0x1E]), // byte global; ret
    ]);
    let host = DiagnosticLog::new();
    let mut scanner = Scanner::new(Tlcs90(), &bus, &host);

    scanner.enqueue_user_global(Pointer::new(0x106), TypeDescriptor::byte());
    scanner.add_entry_point(Pointer::new(0x104));

    let report = scanner.run();

    assert_eq!(report.processed, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(blocks(scanner.database()), vec![(0x104, 2)]);
    assert_eq!(host.errors().len(), 1);
    assert_eq!(host.errors()[0].at, Pointer::new(0x105));
}

#[test]
fn scan_links_code_running_into_code() {
    let bus = program(&[
        (0x100, &[0x1A, 0x04, 0x01]), // jp 0104h
        (0x104, &[0x00]),             // nop
        (0x105, &[0x1E]),             // ret
    ]);
    let host = DiagnosticLog::new();
    let mut scanner = Scanner::new(Tlcs90(), &bus, &host);

    scanner.add_entry_point(Pointer::new(0x100));
    scanner.enqueue_user_procedure(Pointer::new(0x105), None);

    let report = scanner.run();
    let db = scanner.database();

    assert_eq!(report.processed, 3);
    assert_eq!(report.failed, 0);
    assert!(host.entries().is_empty());
    assert_eq!(blocks(db), vec![(0x100, 3), (0x104, 1), (0x105, 1)]);

    let links: Vec<&Reference> = db
        .find_xrefs_from(Pointer::new(0x104), 1)
        .filter_map(|id| db.xref(id))
        .collect();
    assert_eq!(
        links,
        vec![&Reference::new_static_ref(
            Pointer::new(0x104),
            Pointer::new(0x105),
            ReferenceKind::Code
        )]
    );
}

#[test]
fn scan_stops_at_invalid_code() {
    let bus = program(&[(0x100, &[0x00, 0x04])]);
    let (report, db, host) = scan(&bus, &[0x100]);

    assert_eq!(report.processed, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(blocks(&db), vec![(0x100, 1)]);

    let errors = host.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].at, Pointer::new(0x101));
}

#[test]
fn scan_reports_unimplemented_code() {
    let bus = program(&[(0x100, &[0x0A])]); // exx
    let (report, db, host) = scan(&bus, &[0x100]);

    assert_eq!(report.failed, 1);
    assert!(db.map().is_empty());
    assert!(host.errors()[0].message.contains("not implemented"));
}

#[test]
fn scan_stops_at_the_end_of_the_image() {
    let mut bus = Memory::new(Endianness::LittleEndian);
    bus.install_rom_image(Pointer::new(0x100), vec![0x00, 0x1A, 0x00]);

    let (report, db, host) = scan(&bus, &[0x100]);

    assert_eq!(report.failed, 1);
    assert_eq!(blocks(&db), vec![(0x100, 1)]);
    assert_eq!(host.errors()[0].at, Pointer::new(0x101));
}

#[test]
fn scan_drops_unmapped_targets() {
    let bus = program(&[(0x100, &[0x1A, 0x00, 0x80])]); // jp 8000h
    let host = DiagnosticLog::new();
    let mut scanner = Scanner::new(Tlcs90(), &bus, &host);

    scanner.add_entry_point(Pointer::new(0x100));
    let report = scanner.run();

    assert_eq!(report.processed, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(
        scanner.status(&WorkKey::Code(Pointer::new(0x8000))),
        Status::Unvisited
    );
    assert_eq!(host.warnings().len(), 1);
    assert_eq!(host.warnings()[0].at, Pointer::new(0x100));
    assert_eq!(
        scanner
            .database()
            .find_xrefs_to(Pointer::new(0x8000), 1)
            .count(),
        1
    );
}

#[test]
fn scan_follows_typed_globals() {
    let bus = program(&[
        (0x100, &[0x10, 0x01]), // -> handler
        (0x102, &[0x00, 0xC0]), // -> RAM
        (0x104, &[0x00, 0x90]), // -> nowhere
        (0x110, &[0x00, 0x1E]), // nop; ret
    ]);
    let handler = TypeDescriptor::Function(Signature::default());
    let vectors = TypeDescriptor::Struct {
        name: "vectors".to_string(),
        size: Some(6),
        fields: vec![
            Field {
                name: "handler".to_string(),
                offset: 0,
                ty: TypeDescriptor::pointer_to(handler),
            },
            Field {
                name: "counter".to_string(),
                offset: 2,
                ty: TypeDescriptor::pointer_to(TypeDescriptor::word()),
            },
            Field {
                name: "unused".to_string(),
                offset: 4,
                ty: TypeDescriptor::pointer_to(TypeDescriptor::byte()),
            },
        ],
    };

    let host = DiagnosticLog::new();
    let mut scanner = Scanner::new(Tlcs90(), &bus, &host);
    scanner.enqueue_user_global(Pointer::new(0x100), vectors.clone());

    let report = scanner.run();
    let db = scanner.database();

    assert!(report.is_complete());
    assert_eq!(report.failed, 0);
    assert_eq!(host.warnings().len(), 1);
    assert_eq!(host.warnings()[0].at, Pointer::new(0x104));

    let items: Vec<(u64, usize, bool)> = db
        .map()
        .iter()
        .map(|i| (i.start().as_pointer(), i.length(), i.as_block().is_some()))
        .collect();
    assert_eq!(
        items,
        vec![(0x100, 6, false), (0x110, 2, true), (0xC000, 2, false)]
    );

    let proc = db.procedure(Pointer::new(0x110)).unwrap();
    assert_eq!(proc.kind(), ReferenceKind::Subroutine);
    assert_eq!(proc.signature(), Some(&Signature::default()));

    assert_eq!(db.global(Pointer::new(0x100)).map(|g| g.ty()), Some(&vectors));
    assert_eq!(
        db.global(Pointer::new(0xC000)).map(|g| g.ty()),
        Some(&TypeDescriptor::word())
    );
    assert_eq!(
        scanner.status(&WorkKey::Data(Pointer::new(0xC000), TypeDescriptor::word())),
        Status::Processed
    );
}

#[test]
fn scan_reports_unsupported_globals() {
    let bus = program(&[]);
    let (report, db, host) = {
        let host = DiagnosticLog::new();
        let mut scanner = Scanner::new(Tlcs90(), &bus, &host);

        scanner.enqueue_user_global(Pointer::new(0x100), TypeDescriptor::String);
        let report = scanner.run();
        let db = scanner.into_database();

        (report, db, host)
    };

    assert_eq!(report.processed, 1);
    assert_eq!(report.failed, 1);
    assert!(db.map().is_empty());
    assert_eq!(host.errors().len(), 1);
}

#[test]
fn scan_user_procedure_signature() {
    let bus = program(&[(0x120, &[0x1E])]);
    let sig = Signature {
        ret: Some(Box::new(TypeDescriptor::byte())),
        params: vec![TypeDescriptor::word()],
    };
    let host = DiagnosticLog::new();
    let mut scanner = Scanner::new(Tlcs90(), &bus, &host);

    scanner.enqueue_user_procedure(Pointer::new(0x120), Some(sig.clone()));
    scanner.run();

    let proc = scanner.database().procedure(Pointer::new(0x120)).unwrap();
    assert_eq!(proc.kind(), ReferenceKind::Subroutine);
    assert_eq!(proc.signature(), Some(&sig));
    assert!(matches!(
        scanner.database().map().item_at(Pointer::new(0x120)),
        Some(Item::Code(_))
    ));
}

#[test]
fn scan_cancelled_before_start() {
    let bus = program(&[(0x100, &[0x1E])]);
    let host = DiagnosticLog::new();
    let mut scanner = Scanner::new(Tlcs90(), &bus, &host);

    scanner.add_entry_point(Pointer::new(0x100));
    scanner.cancellation().cancel();

    let report = scanner.run();

    assert_eq!(report.processed, 0);
    assert_eq!(report.remaining, 1);
    assert!(report.cancelled);
    assert!(!report.is_complete());
    assert_eq!(
        scanner.status(&WorkKey::Code(Pointer::new(0x100))),
        Status::Queued
    );
    assert!(scanner.database().map().is_empty());
}

/// Cancels the scan the first time anything is reported.
struct CancelOnReport {
    cancel: Mutex<Option<Cancellation>>,
    log: DiagnosticLog,
}

impl CancelOnReport {
    fn trip(&self) {
        if let Some(cancel) = self.cancel.lock().unwrap().as_ref() {
            cancel.cancel();
        }
    }
}

impl Diagnostics for CancelOnReport {
    fn warn(&self, at: Pointer, message: &str) {
        self.log.warn(at, message);
        self.trip();
    }

    fn error(&self, at: Pointer, message: &str) {
        self.log.error(at, message);
        self.trip();
    }
}

#[test]
fn scan_cancelled_between_waves() {
    let bus = program(&[
        (0x100, &[0x1C, 0x00, 0x80]), // call 8000h
        (0x103, &[0x1E]),             // ret
    ]);
    let host = CancelOnReport {
        cancel: Mutex::new(None),
        log: DiagnosticLog::new(),
    };
    let mut scanner = Scanner::new(Tlcs90(), &bus, &host);

    *host.cancel.lock().unwrap() = Some(scanner.cancellation());
    scanner.add_entry_point(Pointer::new(0x100));

    let report = scanner.run();

    assert_eq!(report.processed, 1);
    assert_eq!(report.remaining, 1);
    assert!(report.cancelled);
    assert_eq!(host.log.warnings().len(), 1);
    assert_eq!(
        scanner.status(&WorkKey::Code(Pointer::new(0x100))),
        Status::Processed
    );
    assert_eq!(
        scanner.status(&WorkKey::Code(Pointer::new(0x103))),
        Status::Queued
    );
    assert_eq!(blocks(scanner.database()), vec![(0x100, 3)]);
}
