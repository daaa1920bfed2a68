use huemark_image::Image;

/// Width of a glyph of the built-in font, in font pixels.
pub const GLYPH_WIDTH: i64 = 3;

/// Height of a glyph of the built-in font, in font pixels.
pub const GLYPH_HEIGHT: i64 = 5;

// horizontal distance between glyph origins, in font pixels
const GLYPH_ADVANCE: i64 = GLYPH_WIDTH + 1;

#[inline]
fn put_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x < 0 || y < 0 || x >= img.cols() as i64 || y >= img.rows() as i64 {
        return;
    }
    let start = (y as usize * img.cols() + x as usize) * C;
    img.as_slice_mut()[start..start + C].copy_from_slice(&color);
}

/// Draws a one pixel wide line inplace with Bresenham's algorithm.
///
/// Points outside the image are clipped.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line as `(x, y)`.
/// * `p1` - The end point of the line as `(x, y)`.
/// * `color` - The color of the line.
pub fn draw_line<const C: usize>(
    img: &mut Image<u8, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color: [u8; C],
) {
    let (mut x, mut y) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_pixel(img, x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Draws the outline of an axis-aligned rectangle inplace.
///
/// Both corners are inclusive and may be given in any order.
pub fn draw_rect<const C: usize>(
    img: &mut Image<u8, C>,
    corner0: (i64, i64),
    corner1: (i64, i64),
    color: [u8; C],
) {
    let (left, right) = (corner0.0.min(corner1.0), corner0.0.max(corner1.0));
    let (top, bottom) = (corner0.1.min(corner1.1), corner0.1.max(corner1.1));

    draw_line(img, (left, top), (right, top), color);
    draw_line(img, (left, bottom), (right, bottom), color);
    draw_line(img, (left, top), (left, bottom), color);
    draw_line(img, (right, top), (right, bottom), color);
}

// rows top to bottom, bit 2 is the leftmost column
fn glyph(ch: char) -> Option<[u8; 5]> {
    Some(match ch {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        ' ' => [0b000; 5],
        _ => return None,
    })
}

/// Width in pixels of `text` rendered by [`draw_text`] at the given scale.
pub fn text_width(text: &str, scale: usize) -> i64 {
    let n = text.chars().filter(|&c| glyph(c).is_some()).count() as i64;
    if n == 0 {
        0
    } else {
        (n * GLYPH_ADVANCE - 1) * scale.max(1) as i64
    }
}

/// Renders `text` inplace with a small built-in bitmap font.
///
/// The font covers the digits, parentheses, comma, minus and space. Other
/// characters are skipped without advancing. `origin` is the top-left corner
/// of the first glyph; every font pixel becomes a `scale` x `scale` block.
///
/// # Example
///
/// ```
/// use huemark_image::{Image, ImageSize};
/// use huemark_imgproc::draw::draw_text;
///
/// let mut img = Image::<u8, 1>::from_size_val(ImageSize { width: 8, height: 5 }, 0).unwrap();
/// draw_text(&mut img, (0, 0), "-1", [255], 1);
/// assert_eq!(img.get_pixel(1, 2, 0).unwrap(), &255);
/// ```
pub fn draw_text<const C: usize>(
    img: &mut Image<u8, C>,
    origin: (i64, i64),
    text: &str,
    color: [u8; C],
    scale: usize,
) {
    let scale = scale.max(1) as i64;
    let mut pen_x = origin.0;

    for rows in text.chars().filter_map(glyph) {
        for (r, bits) in rows.iter().enumerate() {
            for c in 0..GLYPH_WIDTH {
                if bits & (0b100 >> c) == 0 {
                    continue;
                }
                let x = pen_x + c * scale;
                let y = origin.1 + r as i64 * scale;
                for oy in 0..scale {
                    for ox in 0..scale {
                        put_pixel(img, x + ox, y + oy, color);
                    }
                }
            }
        }
        pen_x += GLYPH_ADVANCE * scale;
    }
}
