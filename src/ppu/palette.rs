// NES master palette and ARGB conversion
//
// The NES has a master palette of 64 colors (indexed $00-$3F).
// Color indices $0D, $1D, $2D, $3D are problematic blacks on real
// hardware and the $xE-$xF entries are unused, all rendered as black.

/// NES master palette in RGB format (64 colors, 0xRRGGBB)
///
/// A standard conversion approximating NTSC NES output.
pub const NES_PALETTE: [u32; 64] = [
    // $00-$0F
    0x666666, 0x002A88, 0x1412A7, 0x3B00A4, 0x5C007E, 0x6E0040, 0x6C0600, 0x561D00,
    0x333500, 0x0B4800, 0x005200, 0x004F08, 0x00404D, 0x000000, 0x000000, 0x000000,
    // $10-$1F
    0xADADAD, 0x155FD9, 0x4240FF, 0x7527FE, 0xA01ACC, 0xB71E7B, 0xB53120, 0x994E00,
    0x6B6D00, 0x388700, 0x0C9300, 0x008F32, 0x007C8D, 0x000000, 0x000000, 0x000000,
    // $20-$2F
    0xFFFEFF, 0x64B0FF, 0x9290FF, 0xC676FF, 0xF36AFF, 0xFE6ECC, 0xFE8170, 0xEA9E22,
    0xBCBE00, 0x88D800, 0x5CE430, 0x45E082, 0x48CDDE, 0x4F4F4F, 0x000000, 0x000000,
    // $30-$3F
    0xFFFEFF, 0xC0DFFF, 0xD3D2FF, 0xE8C8FF, 0xFBC2FF, 0xFEC4EA, 0xFECCC5, 0xF7D8A5,
    0xE4E594, 0xCFEF96, 0xBDF4AB, 0xB3F3CC, 0xB5EBF2, 0xB8B8B8, 0x000000, 0x000000,
];

/// Scale a color channel to 3/4 (the analog attenuation of emphasis)
#[inline]
fn attenuate(channel: u32) -> u32 {
    channel * 3 / 4
}

/// Convert a palette index to an 0xAARRGGBB pixel, applying the
/// greyscale and color-emphasis bits of PPUMASK
///
/// Greyscale (bit 0) masks the palette index to the grey column.
/// Each emphasis bit (5=R, 6=G, 7=B) dims the two other components.
pub fn palette_to_argb(index: u8, mask: u8) -> u32 {
    let index = if mask & 0x01 != 0 {
        index & 0x30
    } else {
        index & 0x3F
    };

    let rgb = NES_PALETTE[index as usize];
    let mut r = (rgb >> 16) & 0xFF;
    let mut g = (rgb >> 8) & 0xFF;
    let mut b = rgb & 0xFF;

    if mask & 0x20 != 0 {
        // Emphasize red: dim green and blue
        g = attenuate(g);
        b = attenuate(b);
    }
    if mask & 0x40 != 0 {
        // Emphasize green: dim red and blue
        r = attenuate(r);
        b = attenuate(b);
    }
    if mask & 0x80 != 0 {
        // Emphasize blue: dim red and green
        r = attenuate(r);
        g = attenuate(g);
    }

    0xFF00_0000 | (r << 16) | (g << 8) | b
}
