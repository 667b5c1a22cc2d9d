//! Win evaluation against hand-built grids

use rf_slot_core::{
    GridSpec, PaylineCatalog, PaylineDefinition, SlotConfig, SymbolCatalog, SymbolConfig,
    SymbolGenerator, SymbolGrid, SymbolKind, WinEvaluator, highest_win, total_win,
};

use SymbolKind::*;

fn catalog() -> SymbolCatalog {
    SymbolCatalog::new(vec![
        SymbolConfig::new(Cherry, 10.0, &[(3, 1.0), (4, 2.0), (5, 4.0)]),
        SymbolConfig::new(Lemon, 10.0, &[(3, 1.5), (4, 3.0), (5, 6.0)]),
        SymbolConfig::new(Bell, 5.0, &[(3, 8.0)]),
        SymbolConfig::new(Seven, 1.0, &[]),
    ])
    .unwrap()
}

fn straight_lines() -> WinEvaluator {
    WinEvaluator::new(
        catalog(),
        PaylineCatalog::new(
            vec![
                PaylineDefinition::straight(1, "Top", 0, 5),
                PaylineDefinition::straight(2, "Middle", 1, 5),
                PaylineDefinition::straight(3, "Bottom", 2, 5),
            ],
            GridSpec::standard_5x3(),
        )
        .unwrap(),
    )
}

fn grid(middle: [SymbolKind; 5]) -> SymbolGrid {
    SymbolGrid::from_rows(&[
        vec![Lemon, Bell, Lemon, Bell, Lemon],
        middle.to_vec(),
        vec![Bell, Lemon, Bell, Lemon, Bell],
    ])
    .unwrap()
}

#[test]
fn test_match_must_be_left_anchored() {
    let wins = straight_lines().evaluate(&grid([Cherry, Cherry, Lemon, Cherry, Cherry]), 10.0);
    assert!(wins.is_empty());
}

#[test]
fn test_multiplier_for_match_count() {
    let wins = straight_lines().evaluate(&grid([Cherry, Cherry, Cherry, Cherry, Lemon]), 10.0);
    assert_eq!(wins.len(), 1);
    assert_eq!(wins[0].payline_id, 2);
    assert_eq!(wins[0].multiplier, 2.0);
    assert_eq!(wins[0].win_amount, 20.0);
    assert_eq!(wins[0].positions.len(), 4);
    assert_eq!(wins[0].symbols, vec![Cherry; 4]);
}

#[test]
fn test_missing_or_zero_multiplier_is_no_win() {
    // Bell pays only for 3; Seven pays nothing
    let evaluator = straight_lines();
    let bells = evaluator.evaluate(&grid([Bell, Bell, Bell, Bell, Bell]), 1.0);
    assert!(bells.iter().all(|w| w.payline_id != 2));

    let sevens = evaluator.evaluate(&grid([Seven; 5]), 1.0);
    assert!(sevens.is_empty());
}

#[test]
fn test_subset_win_is_removed() {
    let evaluator = WinEvaluator::new(
        catalog(),
        PaylineCatalog::new(
            vec![
                PaylineDefinition::straight(1, "Middle", 1, 5),
                PaylineDefinition::from_rows(2, "Rise", &[1, 1, 1, 0, 0]),
            ],
            GridSpec::standard_5x3(),
        )
        .unwrap(),
    );
    let grid = SymbolGrid::from_rows(&[
        vec![Lemon, Bell, Lemon, Cherry, Cherry],
        vec![Cherry, Cherry, Cherry, Bell, Lemon],
        vec![Bell, Lemon, Bell, Lemon, Bell],
    ])
    .unwrap();

    assert_eq!(evaluator.evaluate_single(1, &grid, 10.0).map(|w| w.win_amount), Some(10.0));
    let wins = evaluator.evaluate(&grid, 10.0);
    assert_eq!(wins.len(), 1);
    assert_eq!(wins[0].payline_id, 2);
    assert_eq!(wins[0].win_amount, 40.0);
}

#[test]
fn test_disjoint_wins_both_kept() {
    let grid = SymbolGrid::from_rows(&[
        vec![Lemon, Lemon, Lemon, Bell, Cherry],
        vec![Seven, Bell, Seven, Bell, Seven],
        vec![Cherry, Cherry, Cherry, Cherry, Cherry],
    ])
    .unwrap();
    let wins = straight_lines().evaluate(&grid, 2.0);

    let mut ids: Vec<u32> = wins.iter().map(|w| w.payline_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(total_win(&wins), 3.0 + 8.0);
    assert_eq!(highest_win(&wins).map(|w| w.payline_id), Some(3));
}

#[test]
fn test_generated_wins_validate_against_grid() {
    let config = SlotConfig::default();
    let evaluator = config.evaluator().unwrap();
    let mut generator = SymbolGenerator::with_seed(config.symbol_catalog().unwrap(), 2024);

    for _ in 0..500 {
        let grid = SymbolGrid::generate(&mut generator, config.grid);
        let result = evaluator.evaluate_spin(grid, 1.0);
        for win in &result.wins {
            assert!(evaluator.validate(win, &result.grid));
            assert!(win.match_count() >= 3);
        }
        for (i, a) in result.wins.iter().enumerate() {
            for (j, b) in result.wins.iter().enumerate() {
                assert!(i == j || !a.is_subset_of(b), "win {} inside win {}", a.payline_id, b.payline_id);
            }
        }
        assert_eq!(result.total_win, total_win(&result.wins));
    }
}
