use rand::SeedableRng;
use rand::rngs::SmallRng;
use squishy_core::*;

fn load(json: &str) -> Map {
    Map::from_layout(&Layout::from_json(json).expect("layout json")).expect("valid layout")
}

fn snapshot(map: &Map) -> Vec<(Coord2, Cell)> {
    map.cells().collect()
}

#[test]
fn center_start_on_open_grid() {
    let mut map = load(r#"[[0, 0, 0], [0, "x", 0], [0, 0, 0]]"#);

    for direction in Direction::ALL {
        assert!(map.can_move(direction), "{direction:?}");
    }

    assert!(map.move_right().is_accepted());
    assert_eq!(map.player(), (2, 1));
    assert_eq!(map.cell_at((2, 1)).and_then(Cell::value), Some(2));

    assert_eq!(map.move_left(), MoveOutcome::Backward);
    assert_eq!(map.player(), (1, 1));
    assert_eq!(map.cell_at((2, 1)).and_then(Cell::value), Some(UNVISITED));
}

#[test]
fn exhaustive_walk_and_rewind_on_generated_layouts() {
    let config = GeneratorConfig::default();
    let mut generator = RandomLevelGenerator::new(1234);
    let mut rng = SmallRng::seed_from_u64(99);

    for _ in 0..50 {
        let mut map = Map::from_layout(&generator.generate(&config)).unwrap();
        let start = map.player();
        let fresh = snapshot(&map);

        let mut walked = 0;
        while map.move_randomly(&mut rng).is_accepted() {
            walked += 1;
        }
        assert_eq!(map.player_value(), walked + 1);

        let mut rewound = 0;
        while map.move_backwards().is_accepted() {
            rewound += 1;
        }

        assert_eq!(rewound, walked);
        assert_eq!(map.player(), start);
        assert!(map.stars().is_empty());
        assert_eq!(snapshot(&map), fresh);
    }
}

#[test]
fn rejected_moves_leave_map_untouched() {
    let mut map = load(r#"[[-1, 0, 0], ["x", 0, 2], [0, -1, 1]]"#);
    map.move_right();
    map.move_right();
    let before = map.clone();

    // distant, diagonal, own cell, off the grid
    assert_eq!(map.move_to((0, 1)), MoveOutcome::Rejected);
    assert_eq!(map.move_to((1, 0)), MoveOutcome::Rejected);
    assert_eq!(map.move_to((2, 1)), MoveOutcome::Rejected);
    assert_eq!(map.move_to((3, 1)), MoveOutcome::Rejected);
    assert_eq!(map.move_right(), MoveOutcome::Rejected);
    assert_eq!(map, before);
}

#[test]
fn out_of_order_star_is_not_earned_later_either() {
    let mut map = load(r#"[["x", 2, 1]]"#);

    map.move_right();
    map.move_right();

    assert!(map.earned_star(2));
    assert!(!map.earned_star(1));
    assert!(!map.earn_star(1));
    assert!(!map.unearn_star(1));
    assert_eq!(map.last_star_rank(), 2);
}

#[test]
fn hand_authored_level_plays_to_completion() {
    let layout = Layout::from_json(r#"[["x", 1, 0], [-1, -1, 2], [0, 3, 0]]"#).unwrap();
    let mut game = Game::with_generator(Settings::default(), layout, 5).unwrap();
    game.run_until_ready().unwrap();

    let map = game.map();
    let max_value = map.max_value();
    assert_eq!(max_value, 7);
    assert_eq!(map.player(), (0, 0));

    // hand-placed stars are kept as they are, generation adds none
    let ranks: Vec<StarRank> = map.cells().filter_map(|(_, cell)| cell.star_order()).collect();
    assert_eq!(ranks.len(), 3);
    assert_eq!(map[(1, 0)].star_order(), Some(1));
    assert_eq!(map[(2, 1)].star_order(), Some(2));
    assert_eq!(map[(1, 2)].star_order(), Some(3));

    let mut moves = 0;
    while game.phase() == Phase::Ready {
        let forward = Direction::ALL.into_iter().find(|&direction| {
            game.map()
                .neighbor(direction)
                .and_then(|coords| game.map().cell_at(coords))
                .is_some_and(Cell::is_unvisited)
                && game.map().can_move(direction)
        });
        let Some(direction) = forward else {
            break;
        };
        assert!(game.move_in(direction).is_accepted());
        moves += 1;
    }

    assert_eq!(game.phase(), Phase::Finished);
    assert!(game.map().is_finished());
    assert_eq!(game.map().player_value(), max_value);
    assert_eq!(moves, max_value - 1);
    assert_eq!(game.map().last_star_rank(), 3);
}

#[test]
fn stepping_back_onto_a_star_keeps_its_rank() {
    let layout = Layout::from_json(r#"[["x", 1, 0], [-1, -1, 2], [0, 3, 0]]"#).unwrap();
    let mut game = Game::with_generator(Settings::default(), layout, 5).unwrap();
    game.run_until_ready().unwrap();

    assert_eq!(game.move_in(Direction::Right), MoveOutcome::Forward);
    assert_eq!(game.map().stars().as_slice(), &[1]);

    assert_eq!(game.move_in(Direction::Right), MoveOutcome::Forward);
    assert_eq!(game.move_in(Direction::Left), MoveOutcome::Backward);

    assert_eq!(game.map().player(), (1, 0));
    assert!(game.map().earned_star(1));
    assert_eq!(game.map().stars().as_slice(), &[1]);

    assert_eq!(game.move_in(Direction::Left), MoveOutcome::Backward);
    assert!(game.map().stars().is_empty());
}

#[test]
fn exported_layout_loads_back() {
    let mut game = Game::new(Settings::default(), 77).unwrap();
    game.run_until_ready().unwrap();

    let json = game.map().to_layout().to_json().unwrap();
    let reloaded = Map::from_layout(&Layout::from_json(&json).unwrap()).unwrap();

    assert_eq!(reloaded.size(), game.map().size());
    assert_eq!(reloaded.player(), game.map().player());
    for ((coords, exported), (_, copy)) in game.map().cells().zip(reloaded.cells()) {
        assert_eq!(exported.is_wall(), copy.is_wall(), "{coords:?}");
        assert_eq!(exported.star_order(), copy.star_order(), "{coords:?}");
    }
}
