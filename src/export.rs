//! ASCII and PNG export for generated levels.

use image::{ImageBuffer, Rgb, RgbImage};

use crate::geometry::Point;
use crate::surface::{Cell, LevelMap, Surface, TerrainKind};

pub fn cell_char(cell: Cell) -> char {
    match cell {
        Cell::Wall => '#',
        Cell::Ground => '.',
        Cell::Terrain(TerrainKind::Water) => '~',
        Cell::Terrain(TerrainKind::Sand) => ':',
        Cell::Terrain(TerrainKind::Grass) => '"',
        Cell::Terrain(TerrainKind::Rock) => '^',
    }
}

pub fn cell_color(cell: Cell) -> [u8; 3] {
    match cell {
        Cell::Wall => [40, 36, 48],
        Cell::Ground => [196, 180, 150],
        Cell::Terrain(TerrainKind::Water) => [30, 80, 170],
        Cell::Terrain(TerrainKind::Sand) => [220, 200, 130],
        Cell::Terrain(TerrainKind::Grass) => [70, 150, 60],
        Cell::Terrain(TerrainKind::Rock) => [120, 115, 110],
    }
}

/// Render the level as text, one line per row.
pub fn render_ascii(map: &LevelMap) -> String {
    let bounds = map.bounds();
    let mut output = String::with_capacity((map.width() + 1) * map.height());
    for y in bounds.y..bounds.max_y() {
        for x in bounds.x..bounds.max_x() {
            output.push(map.cell(Point::new(x, y)).map(cell_char).unwrap_or(' '));
        }
        output.push('\n');
    }
    output
}

/// Render the level as an image with `scale` pixels per cell.
pub fn render_level(map: &LevelMap, scale: u32) -> RgbImage {
    let scale = scale.max(1);
    let bounds = map.bounds();
    let mut img: RgbImage = ImageBuffer::new(map.width() as u32 * scale, map.height() as u32 * scale);

    for (px, py, pixel) in img.enumerate_pixels_mut() {
        let p = Point::new(bounds.x + (px / scale) as i32, bounds.y + (py / scale) as i32);
        let color = map.cell(p).map(cell_color).unwrap_or([0, 0, 0]);
        *pixel = Rgb(color);
    }

    img
}

pub fn export_png(map: &LevelMap, path: &str, scale: u32) -> Result<(), image::ImageError> {
    render_level(map, scale).save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    #[test]
    fn test_ascii_rows() {
        let mut map = LevelMap::new(4, 2);
        map.set_ground(Point::new(1, 0));
        map.set_tile(Point::new(3, 1), TerrainKind::Water);
        assert_eq!(render_ascii(&map), "#.##\n###~\n");
    }

    #[test]
    fn test_ascii_offset_bounds() {
        let mut map = LevelMap::with_bounds(Rect::new(10, 10, 2, 1));
        map.set_ground(Point::new(11, 10));
        assert_eq!(render_ascii(&map), "#.\n");
    }

    #[test]
    fn test_render_scales_cells() {
        let mut map = LevelMap::new(2, 2);
        map.set_ground(Point::new(1, 1));
        let img = render_level(&map, 3);
        assert_eq!(img.dimensions(), (6, 6));
        assert_eq!(img.get_pixel(0, 0).0, cell_color(Cell::Wall));
        assert_eq!(img.get_pixel(5, 5).0, cell_color(Cell::Ground));
        assert_eq!(img.get_pixel(3, 3).0, cell_color(Cell::Ground));
        assert_eq!(img.get_pixel(2, 5).0, cell_color(Cell::Wall));
    }

    #[test]
    fn test_every_cell_has_distinct_glyph() {
        let mut cells = vec![Cell::Wall, Cell::Ground];
        cells.extend(TerrainKind::ALL.iter().map(|kind| Cell::Terrain(*kind)));
        let mut glyphs: Vec<char> = cells.iter().map(|c| cell_char(*c)).collect();
        glyphs.sort();
        glyphs.dedup();
        assert_eq!(glyphs.len(), cells.len());
    }
}
