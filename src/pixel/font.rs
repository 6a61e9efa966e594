pub const GLYPH_WIDTH:usize = 5;
pub const GLYPH_HEIGHT:usize = 7;

/// 5x7 bitmap for `c`, one row per entry, bit 4 is the leftmost column.
///
/// Lower case letters use the upper case glyphs, anything without a glyph is drawn as '?'.
pub fn glyph(c:char) -> [u8;GLYPH_HEIGHT]
{
	match c.to_ascii_uppercase() {
		' ' => [0x00,0x00,0x00,0x00,0x00,0x00,0x00],
		'0' => [0x0E,0x11,0x13,0x15,0x19,0x11,0x0E],
		'1' => [0x04,0x0C,0x04,0x04,0x04,0x04,0x0E],
		'2' => [0x0E,0x11,0x01,0x02,0x04,0x08,0x1F],
		'3' => [0x1F,0x02,0x04,0x02,0x01,0x11,0x0E],
		'4' => [0x02,0x06,0x0A,0x12,0x1F,0x02,0x02],
		'5' => [0x1F,0x10,0x1E,0x01,0x01,0x11,0x0E],
		'6' => [0x06,0x08,0x10,0x1E,0x11,0x11,0x0E],
		'7' => [0x1F,0x01,0x02,0x04,0x08,0x08,0x08],
		'8' => [0x0E,0x11,0x11,0x0E,0x11,0x11,0x0E],
		'9' => [0x0E,0x11,0x11,0x0F,0x01,0x02,0x0C],
		'A' => [0x0E,0x11,0x11,0x11,0x1F,0x11,0x11],
		'B' => [0x1E,0x11,0x11,0x1E,0x11,0x11,0x1E],
		'C' => [0x0E,0x11,0x10,0x10,0x10,0x11,0x0E],
		'D' => [0x1C,0x12,0x11,0x11,0x11,0x12,0x1C],
		'E' => [0x1F,0x10,0x10,0x1E,0x10,0x10,0x1F],
		'F' => [0x1F,0x10,0x10,0x1E,0x10,0x10,0x10],
		'G' => [0x0E,0x11,0x10,0x17,0x11,0x11,0x0F],
		'H' => [0x11,0x11,0x11,0x1F,0x11,0x11,0x11],
		'I' => [0x0E,0x04,0x04,0x04,0x04,0x04,0x0E],
		'J' => [0x07,0x02,0x02,0x02,0x02,0x12,0x0C],
		'K' => [0x11,0x12,0x14,0x18,0x14,0x12,0x11],
		'L' => [0x10,0x10,0x10,0x10,0x10,0x10,0x1F],
		'M' => [0x11,0x1B,0x15,0x15,0x11,0x11,0x11],
		'N' => [0x11,0x11,0x19,0x15,0x13,0x11,0x11],
		'O' => [0x0E,0x11,0x11,0x11,0x11,0x11,0x0E],
		'P' => [0x1E,0x11,0x11,0x1E,0x10,0x10,0x10],
		'Q' => [0x0E,0x11,0x11,0x11,0x15,0x12,0x0D],
		'R' => [0x1E,0x11,0x11,0x1E,0x14,0x12,0x11],
		'S' => [0x0F,0x10,0x10,0x0E,0x01,0x01,0x1E],
		'T' => [0x1F,0x04,0x04,0x04,0x04,0x04,0x04],
		'U' => [0x11,0x11,0x11,0x11,0x11,0x11,0x0E],
		'V' => [0x11,0x11,0x11,0x11,0x11,0x0A,0x04],
		'W' => [0x11,0x11,0x11,0x15,0x15,0x15,0x0A],
		'X' => [0x11,0x11,0x0A,0x04,0x0A,0x11,0x11],
		'Y' => [0x11,0x11,0x11,0x0A,0x04,0x04,0x04],
		'Z' => [0x1F,0x01,0x02,0x04,0x08,0x10,0x1F],
		':' => [0x00,0x0C,0x0C,0x00,0x0C,0x0C,0x00],
		'.' => [0x00,0x00,0x00,0x00,0x00,0x0C,0x0C],
		',' => [0x00,0x00,0x00,0x00,0x0C,0x04,0x08],
		'-' => [0x00,0x00,0x00,0x1F,0x00,0x00,0x00],
		'_' => [0x00,0x00,0x00,0x00,0x00,0x00,0x1F],
		'^' => [0x04,0x0A,0x11,0x00,0x00,0x00,0x00],
		'/' => [0x00,0x01,0x02,0x04,0x08,0x10,0x00],
		'(' => [0x02,0x04,0x08,0x08,0x08,0x04,0x02],
		')' => [0x08,0x04,0x02,0x02,0x02,0x04,0x08],
		'\'' => [0x0C,0x04,0x08,0x00,0x00,0x00,0x00],
		'#' => [0x0A,0x0A,0x1F,0x0A,0x1F,0x0A,0x0A],
		'+' => [0x00,0x04,0x04,0x1F,0x04,0x04,0x00],
		'=' => [0x00,0x00,0x1F,0x00,0x1F,0x00,0x00],
		'!' => [0x04,0x04,0x04,0x04,0x04,0x00,0x04],
		'*' => [0x00,0x04,0x15,0x0E,0x15,0x04,0x00],
		'&' => [0x0C,0x12,0x14,0x08,0x15,0x12,0x0D],
		'@' => [0x0E,0x11,0x01,0x0D,0x15,0x15,0x0E],
		_ => [0x0E,0x11,0x01,0x02,0x04,0x00,0x04],// '?'
	}
}

/// true if column `col` of row `row` is set
pub(super) fn is_set(glyph:&[u8;GLYPH_HEIGHT],col:usize,row:usize) -> bool
{
	glyph[row] & (0x10 >> col) != 0
}
