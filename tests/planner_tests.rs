// Planner behavior tests
//
// Exercises the whole-snake-state search (food and tail modes, growth
// semantics, node cap) and the single-step safety fallback. A small
// simulator applies returned plans move by move to check that no step ever
// collides with the non-vacating body.

use snakesight::config::Config;
use snakesight::planner::{Planner, SearchMode};
use snakesight::types::{Cell, Direction};

fn planner() -> Planner {
    Planner::new(&Config::default_hardcoded())
}

/// Applies a plan to a body, asserting legality of every step. Returns the
/// final body.
fn apply_plan(body: &[Cell], plan: &[Direction], food: Option<Cell>) -> Vec<Cell> {
    let mut body = body.to_vec();
    for dir in plan {
        let head = dir.apply(&body[0]);
        assert!(head.in_bounds(28), "move {} leaves the grid", dir.as_str());

        let grows = food == Some(head);
        let check_len = if grows { body.len() } else { body.len() - 1 };
        assert!(
            !body[..check_len].contains(&head),
            "move {} collides with the non-vacating body",
            dir.as_str()
        );

        let keep = if grows { body.len() } else { body.len() - 1 };
        let mut next = Vec::with_capacity(keep + 1);
        next.push(head);
        next.extend_from_slice(&body[..keep]);
        body = next;
    }
    body
}

/// Straight shot: head at (14,14), food four cells up, nothing in between.
#[test]
fn test_food_search_returns_straight_path() {
    let body = vec![Cell::new(14, 14), Cell::new(13, 14), Cell::new(12, 14)];
    let food = Cell::new(14, 10);

    let plan = planner().plan(&body, Some(food));

    assert_eq!(
        plan,
        vec![Direction::Up, Direction::Up, Direction::Up, Direction::Up]
    );
    let final_body = apply_plan(&body, &plan, Some(food));
    assert_eq!(final_body[0], food);
    assert_eq!(final_body.len(), 4, "eating grows the snake by one");
}

/// Already standing on the food counts as success at depth 0.
#[test]
fn test_food_search_accepts_depth_zero() {
    let body = vec![Cell::new(5, 5), Cell::new(4, 5)];
    let plan = planner().search(&body, Cell::new(5, 5), SearchMode::Food);
    assert_eq!(plan, Some(Vec::new()));
}

/// Tail mode must not accept the zero-move "path" to the current tail.
#[test]
fn test_tail_search_rejects_depth_zero() {
    let body = vec![Cell::new(5, 5), Cell::new(4, 5), Cell::new(3, 5)];
    let path = planner()
        .search(&body, Cell::new(3, 5), SearchMode::Tail)
        .expect("tail should be reachable in the open");
    assert!(!path.is_empty(), "tail chase must take at least one move");

    let final_body = apply_plan(&body, &path, None);
    assert_eq!(final_body[0], Cell::new(3, 5));
}

/// Food occupying the cell the tail currently sits on: the eating move must
/// treat the body as non-vacating, so the planner routes around until the
/// tail has actually moved away.
#[test]
fn test_food_on_tail_cell_requires_detour() {
    let body = vec![
        Cell::new(5, 5),
        Cell::new(5, 6),
        Cell::new(6, 6),
        Cell::new(6, 5),
    ];
    let food = Cell::new(6, 5);

    let plan = planner()
        .search(&body, food, SearchMode::Food)
        .expect("food should be reachable after the tail vacates");

    assert!(plan.len() >= 2, "eating the tail cell in one move is illegal");
    let final_body = apply_plan(&body, &plan, Some(food));
    assert_eq!(final_body[0], food);
}

/// With no food visible the fallback chain still produces a safe,
/// non-empty plan whenever a legal non-reversing move exists.
#[test]
fn test_plan_without_food_falls_back_to_tail_chase() {
    let body = vec![
        Cell::new(10, 10),
        Cell::new(10, 11),
        Cell::new(11, 11),
        Cell::new(11, 12),
        Cell::new(10, 12),
    ];

    let plan = planner().plan(&body, None);
    assert!(!plan.is_empty(), "tail chase must find a path in the open");
    apply_plan(&body, &plan, None);
}

/// An exhausted node cap fails the search instead of stalling the tick.
#[test]
fn test_node_cap_bounds_the_search() {
    let mut config = Config::default_hardcoded();
    config.planner.node_cap = 1;
    let planner = Planner::new(&config);

    let body = vec![Cell::new(5, 5), Cell::new(4, 5), Cell::new(3, 5)];
    let result = planner.search(&body, Cell::new(20, 20), SearchMode::Food);
    assert_eq!(result, None, "cap of one node cannot reach a distant target");
}

/// Heading right with more than one segment, the safety fallback never
/// reverses into the neck.
#[test]
fn test_safety_fallback_never_reverses() {
    let planner = planner();

    // A spread of bodies all heading right.
    let bodies = [
        vec![Cell::new(5, 5), Cell::new(4, 5)],
        vec![Cell::new(27, 14), Cell::new(26, 14), Cell::new(25, 14)],
        vec![Cell::new(27, 0), Cell::new(26, 0), Cell::new(25, 0)],
        vec![Cell::new(27, 27), Cell::new(26, 27)],
    ];

    for body in &bodies {
        let choice = planner.safe_turn(body);
        assert_ne!(
            choice,
            Some(Direction::Left),
            "reversal chosen for body {:?}",
            body
        );
        if let Some(dir) = choice {
            let next = dir.apply(&body[0]);
            assert!(next.in_bounds(28));
            assert!(!body[..body.len() - 1].contains(&next));
        }
    }
}

/// Perpendicular directions are tried before parallel ones, which matters
/// when an imminent wall forces a turn.
#[test]
fn test_safety_fallback_prefers_perpendicular() {
    let planner = planner();

    // Open field, heading right: Up is the first perpendicular candidate.
    let body = vec![Cell::new(5, 5), Cell::new(4, 5)];
    assert_eq!(planner.safe_turn(&body), Some(Direction::Up));

    // At the top wall, Up is off-grid; Down is next.
    let body = vec![Cell::new(27, 0), Cell::new(26, 0)];
    assert_eq!(planner.safe_turn(&body), Some(Direction::Down));
}

/// A head completely walled in has no safe move at all.
#[test]
fn test_safety_fallback_reports_trapped() {
    let planner = planner();

    // Head in the corner, body blocking both exits.
    let body = vec![
        Cell::new(0, 0),
        Cell::new(0, 1),
        Cell::new(1, 1),
        Cell::new(1, 0),
        Cell::new(2, 0),
    ];
    // Right (1,0) is body, Down (0,1) is the neck, Up/Left are off-grid.
    assert_eq!(planner.safe_turn(&body), None);
}

/// The first move of any returned plan is legal from the starting body.
#[test]
fn test_plans_start_with_legal_moves() {
    let planner = planner();

    let scenarios: Vec<(Vec<Cell>, Option<Cell>)> = vec![
        // Coiled body with a single exit.
        (
            vec![
                Cell::new(5, 5),
                Cell::new(5, 4),
                Cell::new(4, 4),
                Cell::new(4, 5),
                Cell::new(4, 6),
                Cell::new(5, 6),
                Cell::new(6, 6),
            ],
            Some(Cell::new(20, 5)),
        ),
        // Head against the right wall.
        (
            vec![Cell::new(27, 10), Cell::new(26, 10), Cell::new(25, 10)],
            Some(Cell::new(0, 10)),
        ),
        // Single-cell snake.
        (vec![Cell::new(14, 14)], Some(Cell::new(14, 20))),
    ];

    for (body, food) in &scenarios {
        let plan = planner.plan(body, *food);
        assert!(!plan.is_empty(), "no plan for body {:?}", body);
        apply_plan(body, &plan, *food);
    }
}
