use crate::analysis::{Block, Error, Reference, ReferenceKind};
use crate::database::{DataItem, Database, ImageMap, Item, Landing};
use crate::memory::Pointer;
use crate::types::{Signature, TypeDescriptor};

fn block(start: u64, lengths: &[usize]) -> Block {
    let mut block = Block::from_parts(Pointer::from(start), 0);

    for length in lengths.iter() {
        block.push_instruction(*length);
    }

    block
}

#[test]
fn block_splitting() {
    let mut map = ImageMap::new();

    map.insert_block(block(0x150, &[3, 2, 3, 3, 3, 2])).unwrap();

    let middle_ptr = Pointer::from(0x155u64);
    assert_eq!(
        map.item_at(middle_ptr).map(Item::start),
        Some(Pointer::from(0x150u64))
    );

    assert_eq!(map.split_block(middle_ptr), Ok(true));

    let old_block = map.item_at(Pointer::from(0x150u64)).unwrap();
    let new_block = map.item_at(middle_ptr).unwrap();

    assert_eq!(old_block.start(), Pointer::from(0x150u64));
    assert_eq!(old_block.length(), 0x5);
    assert_eq!(new_block.start(), Pointer::from(0x155u64));
    assert_eq!(new_block.length(), 0xB);
    assert_eq!(map.len(), 2);
}

#[test]
fn split_rejects_inner_bytes() {
    let mut map = ImageMap::new();

    map.insert_block(block(0x150, &[3, 2])).unwrap();
    map.insert_data(DataItem::new(
        Pointer::from(0x200u64),
        4,
        TypeDescriptor::array_of(TypeDescriptor::byte(), 4),
    ))
    .unwrap();

    assert!(matches!(
        map.split_block(Pointer::from(0x151u64)),
        Err(Error::Inconsistent { .. })
    ));
    assert!(matches!(
        map.land_code(Pointer::from(0x202u64)),
        Err(Error::Inconsistent { .. })
    ));
    assert!(matches!(
        map.land_code(Pointer::from(0x200u64)),
        Err(Error::Inconsistent { .. })
    ));
    assert_eq!(map.split_block(Pointer::from(0x150u64)), Ok(false));
    assert_eq!(map.split_block(Pointer::from(0x300u64)), Ok(false));
    assert_eq!(map.len(), 2);
}

#[test]
fn landing() {
    let mut map = ImageMap::new();

    map.insert_block(block(0x100, &[1, 2, 1])).unwrap();

    assert_eq!(map.land_code(Pointer::from(0x100u64)), Ok(Landing::BlockStart));
    assert_eq!(map.land_code(Pointer::from(0x104u64)), Ok(Landing::Free));
    assert_eq!(map.land_code(Pointer::from(0x103u64)), Ok(Landing::Split));
    assert_eq!(map.land_code(Pointer::from(0x103u64)), Ok(Landing::BlockStart));
}

#[test]
fn items_never_overlap() {
    let mut map = ImageMap::new();

    map.insert_block(block(0x100, &[2, 2])).unwrap();

    assert_eq!(
        map.insert_block(block(0x102, &[1])),
        Err(Error::Overlap {
            at: Pointer::from(0x102u64),
            existing: Pointer::from(0x100u64)
        })
    );
    assert_eq!(
        map.insert_data(DataItem::new(
            Pointer::from(0xFEu64),
            4,
            TypeDescriptor::word()
        )),
        Err(Error::Overlap {
            at: Pointer::from(0xFEu64),
            existing: Pointer::from(0x100u64)
        })
    );

    assert!(map.is_free(Pointer::from(0xFEu64), 2));
    assert!(!map.is_free(Pointer::from(0xFEu64), 3));
    assert!(map.is_free(Pointer::from(0x104u64), 0x100));

    map.insert_block(block(0x104, &[1])).unwrap();
    map.insert_block(Block::from_parts(Pointer::from(0x100u64), 0))
        .unwrap();

    assert_eq!(map.blocks().count(), 2);
    assert_eq!(map.next_item_start(Pointer::from(0x100u64)), Some(Pointer::from(0x104u64)));
    assert_eq!(map.next_item_start(Pointer::from(0x104u64)), None);
}

#[test]
fn procedures_keep_what_is_known() {
    let mut db = Database::new();
    let at = Pointer::from(0x100u64);
    let sig = Signature {
        ret: Some(Box::new(TypeDescriptor::byte())),
        params: vec![],
    };

    db.insert_procedure(at, ReferenceKind::Entrypoint, None);
    db.insert_procedure(at, ReferenceKind::Subroutine, Some(sig.clone()));
    db.insert_procedure(at, ReferenceKind::Subroutine, None);

    let proc = db.procedure(at).unwrap();
    assert_eq!(proc.kind(), ReferenceKind::Entrypoint);
    assert_eq!(proc.signature(), Some(&sig));
    assert_eq!(db.procedures().count(), 1);
}

#[test]
fn xrefs_are_unique_and_indexed() {
    let mut db = Database::new();
    let call = Reference::new_static_ref(
        Pointer::from(0x105u64),
        Pointer::from(0x200u64),
        ReferenceKind::Subroutine,
    );

    db.insert_crossreference(call.clone());
    db.insert_crossreference(call.clone());
    db.insert_crossreference(Reference::new_static_ref(
        Pointer::from(0x108u64),
        Pointer::from(0x200u64),
        ReferenceKind::Code,
    ));

    assert_eq!(db.xrefs().count(), 2);
    assert_eq!(db.find_xrefs_to(Pointer::from(0x200u64), 1).count(), 2);
    assert_eq!(db.find_xrefs_from(Pointer::from(0x100u64), 8).count(), 1);

    let id = db
        .find_xrefs_from(Pointer::from(0x105u64), 1)
        .next()
        .unwrap();
    assert_eq!(db.xref(id), Some(&call));
}
