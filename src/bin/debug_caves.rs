//! Debug tool for comparing cave automaton settings visually
//! Generates a grid of cave levels with different thresholds and cull sizes

use image::{GenericImage, RgbImage};
use level_generator::export::render_level;
use level_generator::generation::{AutomatonConfig, CellularAutomaton, Strategy};
use level_generator::pacing::CancelToken;
use level_generator::rng::seeded_rng;
use level_generator::surface::LevelMap;
use level_generator::tilemap::Tilemap;

const WIDTH: usize = 96;
const HEIGHT: usize = 64;
const SEED: u64 = 42;
const SCALE: u32 = 3;
const COLUMNS: u32 = 3;

fn main() {
    println!("Generating cave comparison grid...");

    let variants: Vec<(&str, AutomatonConfig)> = vec![
        ("1. Default", AutomatonConfig::default()),
        ("2. Sparse fill", AutomatonConfig { fill_chance: 0.45, ..AutomatonConfig::default() }),
        ("3. Dense fill", AutomatonConfig { fill_chance: 0.65, ..AutomatonConfig::default() }),
        ("4. No steps", AutomatonConfig { steps: 0, ..AutomatonConfig::default() }),
        ("5. Long smoothing", AutomatonConfig { steps: 12, ..AutomatonConfig::default() }),
        ("6. Open border", AutomatonConfig { border_walls: false, ..AutomatonConfig::default() }),
        ("7. Birth 6", AutomatonConfig { birth_threshold: 6, ..AutomatonConfig::default() }),
        ("8. Death 3", AutomatonConfig { death_threshold: 3, ..AutomatonConfig::default() }),
        ("9. Cull < 30", AutomatonConfig { min_region_size: Some(30), ..AutomatonConfig::default() }),
    ];

    let tile_w = WIDTH as u32 * SCALE;
    let tile_h = HEIGHT as u32 * SCALE;
    let rows = (variants.len() as u32).div_ceil(COLUMNS);
    let mut grid = RgbImage::new(tile_w * COLUMNS, tile_h * rows);

    let mut map = LevelMap::new(WIDTH, HEIGHT);
    for (i, (name, config)) in variants.into_iter().enumerate() {
        map.reset();
        let strategy = Strategy::Caves(config.clone());
        if let Err(err) = strategy.generate(&mut map, &mut seeded_rng(SEED), &CancelToken::new()) {
            eprintln!("{}: {}", name, err);
            continue;
        }

        // Rebuild the automaton from the map to inspect its regions
        let mut alive = Tilemap::new_with(WIDTH, HEIGHT, false);
        for p in map.ground_cells() {
            alive.set(p.x as usize, p.y as usize, true);
        }
        let automaton = CellularAutomaton::from_cells(alive, config.border_walls);
        let regions = automaton.find_regions(true);
        let largest = regions.iter().map(|r| r.len()).max().unwrap_or(0);
        println!(
            "{:<20} open {:>5} cells, {:>3} regions, largest {:>5}",
            name,
            automaton.alive_count(),
            regions.len(),
            largest
        );

        let tile = render_level(&map, SCALE);
        let col = i as u32 % COLUMNS;
        let row = i as u32 / COLUMNS;
        if let Err(err) = grid.copy_from(&tile, col * tile_w, row * tile_h) {
            eprintln!("{}: {}", name, err);
        }
    }

    match grid.save("cave_comparison.png") {
        Ok(()) => println!("Saved cave_comparison.png"),
        Err(err) => eprintln!("Failed to save cave_comparison.png: {}", err),
    }
}
