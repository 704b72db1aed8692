//! 3x5 bitmap font rasterised straight into canvas rects.

use lumen_engine::render::CanvasList;

const COLUMNS: u32 = 3;
const ROWS: u32 = 5;

/// Glyph cell advance in font pixels (3 columns + 1 spacing).
const ADVANCE: f32 = 4.0;

/// Rows top to bottom, three bits each, leftmost column in the high bit.
const fn rows(r: [u16; 5]) -> u16 {
    (r[0] << 12) | (r[1] << 9) | (r[2] << 6) | (r[3] << 3) | r[4]
}

pub fn glyph(c: char) -> u16 {
    match c.to_ascii_uppercase() {
        'A' => rows([0b010, 0b101, 0b111, 0b101, 0b101]),
        'B' => rows([0b110, 0b101, 0b110, 0b101, 0b110]),
        'C' => rows([0b011, 0b100, 0b100, 0b100, 0b011]),
        'D' => rows([0b110, 0b101, 0b101, 0b101, 0b110]),
        'E' => rows([0b111, 0b100, 0b110, 0b100, 0b111]),
        'F' => rows([0b111, 0b100, 0b110, 0b100, 0b100]),
        'G' => rows([0b011, 0b100, 0b101, 0b101, 0b011]),
        'H' => rows([0b101, 0b101, 0b111, 0b101, 0b101]),
        'I' => rows([0b111, 0b010, 0b010, 0b010, 0b111]),
        'J' => rows([0b001, 0b001, 0b001, 0b101, 0b010]),
        'K' => rows([0b101, 0b101, 0b110, 0b101, 0b101]),
        'L' => rows([0b100, 0b100, 0b100, 0b100, 0b111]),
        'M' => rows([0b101, 0b111, 0b111, 0b101, 0b101]),
        'N' => rows([0b110, 0b101, 0b101, 0b101, 0b101]),
        'O' => rows([0b010, 0b101, 0b101, 0b101, 0b010]),
        'P' => rows([0b110, 0b101, 0b110, 0b100, 0b100]),
        'Q' => rows([0b010, 0b101, 0b101, 0b110, 0b011]),
        'R' => rows([0b110, 0b101, 0b110, 0b101, 0b101]),
        'S' => rows([0b011, 0b100, 0b010, 0b001, 0b110]),
        'T' => rows([0b111, 0b010, 0b010, 0b010, 0b010]),
        'U' => rows([0b101, 0b101, 0b101, 0b101, 0b111]),
        'V' => rows([0b101, 0b101, 0b101, 0b101, 0b010]),
        'W' => rows([0b101, 0b101, 0b111, 0b111, 0b101]),
        'X' => rows([0b101, 0b101, 0b010, 0b101, 0b101]),
        'Y' => rows([0b101, 0b101, 0b010, 0b010, 0b010]),
        'Z' => rows([0b111, 0b001, 0b010, 0b100, 0b111]),
        '0' => rows([0b111, 0b101, 0b101, 0b101, 0b111]),
        '1' => rows([0b010, 0b110, 0b010, 0b010, 0b111]),
        '2' => rows([0b110, 0b001, 0b010, 0b100, 0b111]),
        '3' => rows([0b110, 0b001, 0b010, 0b001, 0b110]),
        '4' => rows([0b101, 0b101, 0b111, 0b001, 0b001]),
        '5' => rows([0b111, 0b100, 0b110, 0b001, 0b110]),
        '6' => rows([0b011, 0b100, 0b111, 0b101, 0b111]),
        '7' => rows([0b111, 0b001, 0b010, 0b010, 0b010]),
        '8' => rows([0b111, 0b101, 0b111, 0b101, 0b111]),
        '9' => rows([0b111, 0b101, 0b111, 0b001, 0b110]),
        '.' => rows([0b000, 0b000, 0b000, 0b000, 0b010]),
        ':' => rows([0b000, 0b010, 0b000, 0b010, 0b000]),
        '-' => rows([0b000, 0b000, 0b111, 0b000, 0b000]),
        ' ' => 0,
        _ => rows([0b110, 0b001, 0b010, 0b000, 0b010]),
    }
}

/// Width of `text` at `scale` canvas units per font pixel.
pub fn text_width(text: &str, scale: f32) -> f32 {
    let n = text.chars().count();
    if n == 0 {
        return 0.0;
    }
    (n as f32 * ADVANCE - 1.0) * scale
}

pub fn text_height(scale: f32) -> f32 {
    ROWS as f32 * scale
}

/// Appends `text` with its top-left corner at `origin`. Horizontal runs of
/// set pixels become one rect each.
pub fn push_text(list: &mut CanvasList, origin: [f32; 2], scale: f32, color: [f32; 4], text: &str) {
    for (i, c) in text.chars().enumerate() {
        let bits = glyph(c);
        let x0 = origin[0] + i as f32 * ADVANCE * scale;
        for row in 0..ROWS {
            let line = (bits >> ((ROWS - 1 - row) * COLUMNS)) & 0b111;
            let y = origin[1] + row as f32 * scale;
            let mut col = 0;
            while col < COLUMNS {
                if line & (1 << (COLUMNS - 1 - col)) == 0 {
                    col += 1;
                    continue;
                }
                let start = col;
                while col < COLUMNS && line & (1 << (COLUMNS - 1 - col)) != 0 {
                    col += 1;
                }
                list.push_rect(
                    [x0 + start as f32 * scale, y],
                    [(col - start) as f32 * scale, scale],
                    color,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_maps_to_uppercase() {
        assert_eq!(glyph('a'), glyph('A'));
        assert_eq!(glyph(' '), 0);
    }

    #[test]
    fn width_excludes_trailing_spacing() {
        assert_eq!(text_width("", 2.0), 0.0);
        assert_eq!(text_width("A", 2.0), 6.0);
        assert_eq!(text_width("AB", 2.0), 14.0);
    }

    #[test]
    fn runs_are_merged_per_row() {
        let mut list = CanvasList::default();
        push_text(&mut list, [10.0, 20.0], 2.0, [1.0; 4], "I");
        // 111 / 010 / 010 / 010 / 111
        assert_eq!(list.rects.len(), 5);
        assert_eq!(list.rects[0].origin, [10.0, 20.0]);
        assert_eq!(list.rects[0].size, [6.0, 2.0]);
        assert_eq!(list.rects[1].origin, [12.0, 22.0]);
        assert_eq!(list.rects[1].size, [2.0, 2.0]);
    }

    #[test]
    fn second_glyph_is_advanced() {
        let mut list = CanvasList::default();
        push_text(&mut list, [0.0, 0.0], 1.0, [1.0; 4], " .");
        assert_eq!(list.rects.len(), 1);
        assert_eq!(list.rects[0].origin, [5.0, 4.0]);
    }
}
