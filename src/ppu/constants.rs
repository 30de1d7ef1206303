// PPU constants

/// Size of one nametable in bytes (1KB)
pub(super) const NAMETABLE_SIZE: usize = 1024;

/// Size of palette RAM in bytes
pub(super) const PALETTE_SIZE: usize = 32;

/// Screen width in pixels
pub const SCREEN_WIDTH: usize = 256;

/// Screen height in pixels
pub const SCREEN_HEIGHT: usize = 240;

// ========================================
// PPU Timing Constants
// ========================================

/// Number of PPU dots per scanline
pub(super) const DOTS_PER_SCANLINE: u16 = 341;

/// Number of scanlines per frame (NTSC)
pub(super) const SCANLINES_PER_FRAME_NTSC: u16 = 262;

/// Number of scanlines per frame (PAL)
pub(super) const SCANLINES_PER_FRAME_PAL: u16 = 312;

/// First visible scanline
pub(super) const FIRST_VISIBLE_SCANLINE: u16 = 0;

/// Last visible scanline
pub(super) const LAST_VISIBLE_SCANLINE: u16 = 239;

/// Post-render scanline
pub(super) const POSTRENDER_SCANLINE: u16 = 240;

/// First VBlank scanline (both regions)
pub(super) const FIRST_VBLANK_SCANLINE: u16 = 241;

/// Frames a stale I/O latch survives before decaying to zero
pub(super) const IO_LATCH_DECAY_FRAMES: u32 = 36;
