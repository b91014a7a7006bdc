use crate::memory::{AddressOracle, Endianness, Error, Memory, Pointer, Width};

#[test]
fn pointer_arithmetic() {
    let ptr1 = Pointer::new(0x150);
    let ptr2 = Pointer::new(0x250);

    assert!(ptr1 < ptr2);
    assert_eq!(ptr2 - ptr1, 0x100);
    assert_eq!(ptr1 - ptr2, -0x100);
    assert_eq!(ptr1 + 0x100, ptr2);
    assert_eq!(ptr2.checked_offset(-0x100), Some(ptr1));
    assert_eq!(Pointer::new(0).checked_offset(-1), None);
}

#[test]
fn pointer_display() {
    assert_eq!(format!("{}", Pointer::new(0x1F)), "001F");
    assert_eq!(format!("{}", Pointer::new(0x12345)), "12345");
    assert_eq!(format!("{:X}", Pointer::new(0xBEEF)), "BEEF");
}

#[test]
fn width_sign_extension() {
    assert_eq!(Width::Byte.sign_extend(0xFF), -1);
    assert_eq!(Width::Byte.sign_extend(0x7F), 0x7F);
    assert_eq!(Width::Word16.sign_extend(0xFFFE), -2);
    assert_eq!(Width::Word16.mask(), 0xFFFF);
}

#[test]
fn reader_endianness() {
    let bus = Memory::test_rom(0x100, vec![0x34, 0x12, 0x78, 0x56, 0x34, 0x12]);
    let mut rdr = bus.reader_at(Pointer::new(0x100)).unwrap();

    assert_eq!(rdr.read_uint(Width::Word16).unwrap(), 0x1234);
    assert_eq!(
        rdr.read_uint_with(Width::Word32, Endianness::BigEndian).unwrap(),
        0x3412_7856
    );
    assert_eq!(rdr.address(), Pointer::new(0x106));
    assert_eq!(rdr.offset(), 6);
}

#[test]
fn reader_signed_primitive() {
    let bus = Memory::test_rom(0, vec![0xFE, 0xFF]);
    let mut rdr = bus.reader_at(Pointer::new(0)).unwrap();

    assert_eq!(rdr.read_le::<i16>().unwrap(), -2);
}

#[test]
fn reader_short_read_does_not_advance() {
    let bus = Memory::test_rom(0x10, vec![0x01, 0x02, 0x03]);
    let mut rdr = bus.reader_at(Pointer::new(0x11)).unwrap();

    assert_eq!(
        rdr.read_uint(Width::Word32),
        Err(Error::ShortRead {
            at: Pointer::new(0x11),
            wanted: 4,
            available: 2
        })
    );
    assert_eq!(rdr.address(), Pointer::new(0x11));
    assert_eq!(rdr.read_le::<u16>().unwrap(), 0x0302);
    assert!(rdr.read_u8().is_err());
}

#[test]
fn reader_past_end_of_region() {
    let bus = Memory::test_rom(0, vec![0x01]);
    let mut rdr = bus.reader_at(Pointer::new(0)).unwrap();

    rdr.set_offset(10);
    assert_eq!(rdr.remaining(), 0);
    assert!(rdr.read_bytes(0).is_err());
    assert!(rdr.read_u8().is_err());
}

#[test]
fn memory_map_validity() {
    let mut bus = Memory::new(Endianness::LittleEndian);
    bus.install_rom_image(Pointer::new(0x0000), vec![0; 0x100]);
    bus.install_ram(Pointer::new(0xFF00), 0x100);
    bus.install_openbus(Pointer::new(0x8000), 0x100);

    assert!(bus.is_mapped(Pointer::new(0x00FF)));
    assert!(!bus.is_mapped(Pointer::new(0x0100)));
    assert!(bus.is_mapped(Pointer::new(0xFF80)));
    assert!(!bus.is_mapped(Pointer::new(0x8000)));

    assert!(bus.reader_at(Pointer::new(0x0010)).is_ok());
    assert_eq!(
        bus.reader_at(Pointer::new(0xFF80)).unwrap_err(),
        Error::Unmapped(Pointer::new(0xFF80))
    );
}

#[test]
fn pointer_parsing() {
    assert_eq!("0x0100".parse::<Pointer>(), Ok(Pointer::new(0x100)));
    assert_eq!("$FF80".parse::<Pointer>(), Ok(Pointer::new(0xFF80)));
    assert_eq!("1c".parse::<Pointer>(), Ok(Pointer::new(0x1C)));
    assert!("0xZZ".parse::<Pointer>().is_err());

    let ptr: Pointer = serde_json::from_str("\"0x2000\"").unwrap();
    assert_eq!(ptr, Pointer::new(0x2000));
    assert_eq!(serde_json::to_string(&ptr).unwrap(), "\"0x2000\"");
}
