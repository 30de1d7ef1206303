//! PPU register behavior tests

use super::*;

#[test]
fn test_status_read_clears_vblank_and_latch() {
    let mut ppu = Ppu::new();
    ppu.ppustatus = 0x80;
    ppu.write_latch = true;

    let status = ppu.read_register(PPUSTATUS);
    assert_eq!(status & 0x80, 0x80, "first read sees the flag");
    assert_eq!(ppu.ppustatus & 0x80, 0, "read clears VBlank");
    assert!(!ppu.write_latch, "read resets the w toggle");

    let status = ppu.read_register(PPUSTATUS);
    assert_eq!(status & 0x80, 0, "second read sees it cleared");
}

#[test]
fn test_status_low_bits_come_from_io_latch() {
    let mut ppu = Ppu::new();
    ppu.write_register(PPUCTRL, 0x1F); // refresh the latch
    ppu.ppustatus = 0x80;

    let status = ppu.read_register(PPUSTATUS);
    assert_eq!(status & 0x1F, 0x1F, "low 5 bits are stale bus data");
}

#[test]
fn test_write_only_register_reads_return_latch() {
    let mut ppu = Ppu::new();
    ppu.write_register(PPUMASK, 0x5A);
    assert_eq!(ppu.read_register(PPUCTRL), 0x5A);
    assert_eq!(ppu.read_register(PPUSCROLL), 0x5A);
}

#[test]
fn test_ctrl_write_updates_t_nametable_bits() {
    let mut ppu = Ppu::new();
    ppu.write_register(PPUCTRL, 0x03);
    assert_eq!(ppu.t & 0x0C00, 0x0C00, "base nametable lands in t bits 10-11");
}

#[test]
fn test_oam_data_read_write() {
    let mut ppu = Ppu::new();
    ppu.write_register(OAMADDR, 0x10);
    ppu.write_register(OAMDATA, 0x42);
    assert_eq!(ppu.oam[0x10], 0x42);
    assert_eq!(ppu.oam_addr, 0x11, "write increments OAMADDR");

    ppu.write_register(OAMADDR, 0x10);
    assert_eq!(ppu.read_register(OAMDATA), 0x42);
    assert_eq!(ppu.oam_addr, 0x10, "read does not increment");
}

#[test]
fn test_scroll_write_pair() {
    let mut ppu = Ppu::new();
    ppu.write_register(PPUSCROLL, 0x7D); // X: coarse 15, fine 5
    assert_eq!(ppu.t & 0x001F, 15);
    assert_eq!(ppu.fine_x, 5);

    ppu.write_register(PPUSCROLL, 0x5E); // Y: coarse 11, fine 6
    assert_eq!((ppu.t >> 5) & 0x1F, 11);
    assert_eq!((ppu.t >> 12) & 0x07, 6);
    assert!(!ppu.write_latch, "two writes complete the pair");
}

#[test]
fn test_addr_write_pair_copies_t_to_v() {
    let mut ppu = Ppu::new();
    ppu.write_register(PPUADDR, 0x21);
    assert_ne!(ppu.v, 0x2108, "first write alone must not update v");
    ppu.write_register(PPUADDR, 0x08);
    assert_eq!(ppu.v, 0x2108);
    assert_eq!(ppu.t, 0x2108);
}

#[test]
fn test_status_read_resets_addr_sequence() {
    let mut ppu = Ppu::new();
    ppu.write_register(PPUADDR, 0x21);
    ppu.read_register(PPUSTATUS);
    ppu.write_register(PPUADDR, 0x23);
    ppu.write_register(PPUADDR, 0x45);
    assert_eq!(ppu.v, 0x2345, "sequence restarted after $2002 read");
}

#[test]
fn test_data_read_is_buffered() {
    let mut ppu = Ppu::new();
    ppu.write_register(PPUADDR, 0x20);
    ppu.write_register(PPUADDR, 0x00);
    ppu.write_register(PPUDATA, 0xAA);
    ppu.write_register(PPUDATA, 0xBB);

    ppu.write_register(PPUADDR, 0x20);
    ppu.write_register(PPUADDR, 0x00);
    let first = ppu.read_register(PPUDATA);
    let second = ppu.read_register(PPUDATA);
    let third = ppu.read_register(PPUDATA);

    assert_ne!(first, 0xAA, "first read returns the stale buffer");
    assert_eq!(second, 0xAA, "buffer catches up one read late");
    assert_eq!(third, 0xBB);
}

#[test]
fn test_palette_read_bypasses_buffer() {
    let mut ppu = Ppu::new();
    ppu.write_register(PPUADDR, 0x3F);
    ppu.write_register(PPUADDR, 0x00);
    ppu.write_register(PPUDATA, 0x2C);

    ppu.write_register(PPUADDR, 0x3F);
    ppu.write_register(PPUADDR, 0x00);
    assert_eq!(
        ppu.read_register(PPUDATA),
        0x2C,
        "palette reads are immediate"
    );
}

#[test]
fn test_data_increment_by_32() {
    let mut ppu = Ppu::new();
    ppu.write_register(PPUCTRL, 0x04);
    ppu.write_register(PPUADDR, 0x20);
    ppu.write_register(PPUADDR, 0x00);
    ppu.write_register(PPUDATA, 0x01);
    assert_eq!(ppu.v, 0x2020, "CTRL bit 2 selects +32 stride");
}

#[test]
fn test_nmi_raised_when_enabled_during_vblank() {
    let mut ppu = Ppu::new();
    ppu.ppustatus = 0x80;

    ppu.write_register(PPUCTRL, 0x80);
    assert!(ppu.take_nmi(), "0 to 1 transition with flag set raises NMI");

    // Enabling again without a disable in between does nothing
    ppu.write_register(PPUCTRL, 0x80);
    assert!(!ppu.take_nmi(), "second enable must not re-raise");

    // Toggling off and on raises again
    ppu.write_register(PPUCTRL, 0x00);
    ppu.write_register(PPUCTRL, 0x80);
    assert!(ppu.take_nmi());
}

#[test]
fn test_no_nmi_outside_vblank() {
    let mut ppu = Ppu::new();
    ppu.write_register(PPUCTRL, 0x80);
    assert!(!ppu.take_nmi(), "flag clear, no NMI on enable");
}
