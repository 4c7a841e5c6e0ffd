//! Level catalog
//!
//! Each level is a grid of template characters. Row 0 is the top of the
//! brick field; the first row's length sets the column count.

use crate::surface::Rgb;

/// How a template character becomes a brick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrickTemplate {
    pub color: Rgb,
    pub hit_points: u8,
    pub indestructible: bool,
}

impl BrickTemplate {
    const fn normal(hex: u32, hit_points: u8) -> Self {
        Self {
            color: Rgb::from_hex(hex),
            hit_points,
            indestructible: false,
        }
    }
}

/// Template for a layout character (`None` means no brick)
pub fn template(ch: char) -> Option<BrickTemplate> {
    let t = match ch {
        'R' => BrickTemplate::normal(0xFF4C4C, 1),
        'G' => BrickTemplate::normal(0x4CFF79, 1),
        'B' => BrickTemplate::normal(0x4CB0FF, 1),
        'Y' => BrickTemplate::normal(0xFFF24C, 1),
        'O' => BrickTemplate::normal(0xFF964C, 1),
        'P' => BrickTemplate::normal(0xFF4CFF, 1),
        'C' => BrickTemplate::normal(0x4CFFF2, 1),
        'W' => BrickTemplate::normal(0xFFFFFF, 1),
        '2' => BrickTemplate::normal(0xFF964C, 2),
        'H' => BrickTemplate::normal(0x4C4CFF, 3),
        'I' => BrickTemplate {
            color: Rgb::from_hex(0xB0B0B0),
            hit_points: 1,
            indestructible: true,
        },
        _ => return None,
    };
    Some(t)
}

/// Grid dimensions (rows, columns) of a layout
pub fn dimensions(rows: &[&str]) -> (usize, usize) {
    let cols = rows.first().map_or(0, |r| r.chars().count());
    (rows.len(), cols)
}

pub const LEVELS: [&[&str]; 15] = [
    // Rainbow bands
    &[
        "RRRRRRRRRRRRRRR",
        "YYYYYYYYYYYYYYY",
        "GGGGGGGGGGGGGGG",
        "BBBBBBBBBBBBBBB",
        "PPPPPPPPPPPPPPP",
    ],
    // Doorways with two-hit cores
    &[
        "..RRRR...RRRR..",
        "..RRRR...RRRR..",
        "G..22GGGGG22..G",
        "G..22GGGGG22..G",
        "BBBBBBBBBBBBBBB",
    ],
    // Invader
    &[
        "..PP......PP...",
        "..PPPP...PPPP..",
        "..PPPPHHHPPPP..",
        "PPPPPHHHHHPPPPP",
        "PP..PP...PP..PP",
        "...PP.....PP...",
    ],
    // Walled maze
    &[
        "IPIIIIRRIIIIIPI",
        "I.............I",
        "I.RRGGPPCCYYO.I",
        "I.RRGGPPCCYYO.I",
        "I.............I",
        "IPIIIIRRIIIIIPI",
    ],
    // Diagonal dashes
    &[
        ".R..R..R..R..R.",
        "Y..Y..Y..Y..Y..",
        "..G..G..G..G..G",
        ".B..B..B..B..B.",
        "P..P..P..P..P..",
    ],
    // Checker with edge pillars
    &[
        "I.W2W2W2W2W2W.I",
        "W.W.W.W.W.W.W.W",
        "I.W2W2W2W2W2W.I",
        "W.W.W.W.W.W.W.W",
        "I.W2W2W2W2W2W.I",
    ],
    // Lanes with two-hit guards
    &[
        "..RRRRR2RRRRR..",
        "..YYYYY2YYYYY..",
        "..GGGGG2GGGGG..",
        "..BBBBB2BBBBB..",
        "..PPPPP2PPPPP..",
    ],
    // Tunnel doors
    &[
        "...222...222...",
        "...222...222...",
        "...222...222...",
        "...............",
    ],
    // Staggered columns
    &[
        "R..2..H..2..R..",
        ".R..2..H..2..R.",
        "..Y..2..H..2..Y",
        "G..H..2..H..G..",
        ".B..2..H..2..B.",
        "..P..H..2..H..P",
    ],
    // Zipper
    &[
        "RR..RR..RR..RR.",
        ".YY..YY..YY..YY",
        "..GG..GG..GG..G",
        ".BB..BB..BB..BB",
        "PP..PP..PP..PP.",
    ],
    // Center shield
    &[
        "......HHH......",
        ".....H222H.....",
        "....H21112H....",
        ".....H222H.....",
        "......HHH......",
    ],
    // Canyon
    &[
        "....CCCCCCC....",
        "...C2222222C...",
        "..C222HHH222C..",
        ".C222HHHHH222C.",
        "C.............C",
    ],
    // Chevrons
    &[
        "RRRRR..........",
        ".YYYYY.........",
        "..GGGGG........",
        "...BBBBB.......",
        "....PPPPP......",
        "...BBBBB.......",
        "..GGGGG........",
        ".YYYYY.........",
        "RRRRR..........",
    ],
    // Window panes
    &[
        "IIIIIIIIIIIIIII",
        "I..RRR.I.GGG..I",
        "I..R2R.I.G2G..I",
        "I..RRR.I.GGG..I",
        "I.----III----.I",
        "I.............I",
    ],
    // Diamond
    &[
        ".......W.......",
        "......WWW......",
        ".....W2W2W.....",
        "....WWW2WWW....",
        "...W2W222W2W...",
        "....WWW2WWW....",
        ".....W2W2W.....",
        "......WWW......",
        ".......W.......",
    ],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates() {
        assert_eq!(template('.'), None);
        assert_eq!(template('-'), None);
        assert_eq!(template('2').unwrap().hit_points, 2);
        assert_eq!(template('H').unwrap().hit_points, 3);
        assert!(template('I').unwrap().indestructible);
        assert_eq!(template('R').unwrap().color, Rgb::new(0xFF, 0x4C, 0x4C));
    }

    #[test]
    fn test_every_level_has_destructible_bricks() {
        for (i, rows) in LEVELS.iter().enumerate() {
            let (r, c) = dimensions(rows);
            assert!(r > 0 && c > 0, "level {i} is empty");
            let destructible = rows
                .iter()
                .flat_map(|row| row.chars())
                .filter_map(template)
                .filter(|t| !t.indestructible)
                .count();
            assert!(destructible > 0, "level {i} cannot be cleared");
        }
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(dimensions(&[]), (0, 0));
        assert_eq!(dimensions(&["R..", "R"]), (2, 3));
    }
}
