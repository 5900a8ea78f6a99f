use super::*;
use crate::solve::PushOrder;

const GRAPH_BFS: &str = r#"class: "GraphSearchTest"
algorithm: "bfs"
diagram: """
    B -> D
   /     \
  A ----> G
"""
graph: """
start_state: A
goal_states: G
A 0:A->B B 1.0
A 1:A->G G 2.0
A 2:A->D D 4.0
B 0:B->D D 8.0
D 0:D->G G 16.0
"""
"#;

const CORRIDOR: &str = r#"class: "PacmanSearchTest"
algorithm: "bfs"
layoutName: "corridor"
layout: """
%%%%%
%. P%
%%%%%
"""
"#;

const CORNERS_LAYOUT: &str = r#"layoutName: "tinyCorners"
layout: """
%%%%
%. %
%P.%
%%%%
"""
"#;

const FOOD_GRADE: &str = r#"class: "HeuristicGrade"
heuristic: "foodHeuristic"
searchProblemClass: "FoodSearchProblem"
basePoints: "1"
layoutName: "foodLine"
layout: """
%%%%%
%P..%
%%%%%
"""
"#;

/// Delegates to the reference suite but expands the start state a few extra
/// times during breadth-first search.
struct Twice;

impl SearchSuite for Twice {
    fn depth_first_search<P: SearchProblem>(&self, problem: &P) -> Option<Vec<P::Action>> {
        Reference::default().depth_first_search(problem)
    }

    fn breadth_first_search<P: SearchProblem>(&self, problem: &P) -> Option<Vec<P::Action>> {
        let path = Reference::default().breadth_first_search(problem);
        for _ in 0..3 {
            problem.successors(&problem.start_state());
        }
        path
    }

    fn uniform_cost_search<P: SearchProblem>(&self, problem: &P) -> Option<Vec<P::Action>> {
        Reference::default().uniform_cost_search(problem)
    }

    fn a_star_search<P: SearchProblem>(
        &self,
        problem: &P,
        heuristic: &Heuristic<'_, P>,
    ) -> Option<Vec<P::Action>> {
        Reference::default().a_star_search(problem, heuristic)
    }

    fn corners_heuristic(&self, state: &CornersState, problem: &CornersProblem<'_>) -> f64 {
        Reference::default().corners_heuristic(state, problem)
    }

    fn food_heuristic(&self, state: &FoodState, problem: &FoodSearchProblem<'_>) -> f64 {
        Reference::default().food_heuristic(state, problem)
    }
}

/// Gets most things wrong.
struct Lost;

/// Actions reachable within two steps of the start, picked by name.
fn actions_named<P: SearchProblem>(problem: &P, names: &[&str]) -> Vec<P::Action> {
    let mut seen = Vec::new();
    for succ in problem.successors(&problem.start_state()) {
        seen.extend(problem.successors(&succ.state).into_iter().map(|s| s.action));
        seen.push(succ.action);
    }
    names
        .iter()
        .filter_map(|name| seen.iter().find(|a| a.to_string() == *name).cloned())
        .collect()
}

impl SearchSuite for Lost {
    fn depth_first_search<P: SearchProblem>(&self, _: &P) -> Option<Vec<P::Action>> {
        None
    }

    fn breadth_first_search<P: SearchProblem>(&self, problem: &P) -> Option<Vec<P::Action>> {
        Some(actions_named(problem, &["North", "East", "North"]))
    }

    fn uniform_cost_search<P: SearchProblem>(&self, problem: &P) -> Option<Vec<P::Action>> {
        Reference::default().uniform_cost_search(problem)
    }

    fn a_star_search<P: SearchProblem>(
        &self,
        problem: &P,
        heuristic: &Heuristic<'_, P>,
    ) -> Option<Vec<P::Action>> {
        Reference::default().a_star_search(problem, heuristic)
    }

    fn corners_heuristic(&self, state: &CornersState, problem: &CornersProblem<'_>) -> f64 {
        10.0 * Reference::default().corners_heuristic(state, problem)
    }

    fn food_heuristic(&self, _: &FoodState, _: &FoodSearchProblem<'_>) -> f64 {
        0.0
    }
}

fn load_case(path: &str, text: &str) -> TestCase {
    TestCase::new(path, &text.parse::<TestFile>().unwrap()).unwrap()
}

fn author_gold(case: &TestCase, order: PushOrder) -> TestFile {
    case.write_solution(Reference::new(order), Budget::UNLIMITED)
        .unwrap()
        .finish()
        .parse()
        .unwrap()
}

fn grade<S: SearchSuite>(case: &TestCase, suite: &S, gold: &TestFile) -> (bool, Grades) {
    grade_within(case, suite, gold, Budget::UNLIMITED)
}

fn grade_within<S: SearchSuite>(
    case: &TestCase,
    suite: &S,
    gold: &TestFile,
    budget: Budget,
) -> (bool, Grades) {
    let mut grades = Grades::new();
    let passed = case.execute(suite, &mut grades, gold, budget).unwrap();
    (passed, grades)
}

#[test]
fn graph_gold_accepts_either_push_order() {
    let case = load_case("cases/graph_bfs.test", GRAPH_BFS);
    let gold = author_gold(&case, PushOrder::Forward);
    assert_eq!(gold.get("solution"), Some("1:A->G"));
    assert_eq!(gold.get("expanded_states"), Some("A B"));
    assert_eq!(gold.get("rev_expanded_states"), Some("A D"));

    for order in [PushOrder::Forward, PushOrder::Reverse] {
        let (passed, grades) = grade(&case, &Reference::new(order), &gold);
        assert!(passed, "{grades}");
        assert_eq!(grades.messages()[0], "PASS: cases/graph_bfs.test");
    }
}

#[test]
fn graph_reexpansion_fails_exact_order() {
    let case = load_case("cases/graph_bfs.test", GRAPH_BFS);
    let gold = author_gold(&case, PushOrder::Forward);
    let (passed, grades) = grade(&case, &Twice, &gold);
    assert!(!passed);
    assert_eq!(grades.messages()[0], "FAIL: cases/graph_bfs.test");
    assert!(grades
        .messages()
        .contains(&"\tstudent expanded_states:\t[\"A\", \"B\", \"A\", \"A\", \"A\"]".to_owned()));

    let relaxed = format!("{GRAPH_BFS}exactExpansionOrder: \"False\"\n");
    let case = load_case("cases/graph_bfs.test", &relaxed);
    assert!(grade(&case, &Twice, &gold).0);
}

#[test]
fn missing_result_is_a_failure() {
    let text = GRAPH_BFS.replace("\"bfs\"", "\"dfs\"");
    let case = load_case("cases/graph_dfs.test", &text);
    let gold = author_gold(&case, PushOrder::Forward);
    let (passed, grades) = grade(&case, &Lost, &gold);
    assert!(!passed);
    assert_eq!(
        grades.messages()[1],
        "\tThe result of depthFirstSearch must be a list. (Instead, it is None)"
    );
}

#[test]
fn graph_heuristic_miss_is_fatal() {
    let text = format!(
        "{}heuristic: \"\"\"\nA 1\nG 0\n\"\"\"\n",
        GRAPH_BFS.replace("\"bfs\"", "\"astar\"")
    );
    let case = load_case("cases/graph_astar.test", &text);
    let mut gold = TestFile::default();
    for key in ["solution", "rev_solution"] {
        gold.insert(key, "1:A->G");
    }
    for key in ["expanded_states", "rev_expanded_states"] {
        gold.insert(key, "A");
    }
    let mut grades = Grades::new();
    let err = case
        .execute(&Reference::default(), &mut grades, &gold, Budget::UNLIMITED)
        .unwrap_err();
    assert_eq!(err.to_string(), "Fatal error in cases/graph_astar.test");
    assert!(matches!(
        err.downcast_ref::<SpecError>(),
        Some(SpecError::HeuristicLookup { state, .. }) if state == "B"
    ));
    assert!(grades.messages().is_empty());

    let err = case
        .write_solution(Reference::default(), Budget::UNLIMITED)
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SpecError>(),
        Some(SpecError::HeuristicLookup { .. })
    ));
}

#[test]
fn pacman_gold_file_layout() {
    let case = load_case("cases/corridor.test", CORRIDOR);
    let out = case
        .write_solution(Reference::default(), Budget::UNLIMITED)
        .unwrap();
    assert_eq!(
        out.finish(),
        "# This is the solution file for cases/corridor.test.
# This solution is designed to support both right-to-left
# and left-to-right implementations.
# Number of nodes expanded must be with a factor of 1 of the numbers below.
solution: \"\"\"
West West
\"\"\"
expanded_nodes: \"2\"
rev_solution: \"\"\"
West West
\"\"\"
rev_expanded_nodes: \"2\"
"
    );
}

#[test]
fn pacman_leeway() {
    let case = load_case("cases/corridor.test", CORRIDOR);
    let gold = author_gold(&case, PushOrder::Forward);

    let (passed, grades) = grade(&case, &Reference::default(), &gold);
    assert!(passed);
    assert_eq!(grades.messages()[3], "\tnodes expanded:\t\t2");

    let (passed, grades) = grade(&case, &Twice, &gold);
    assert!(!passed);
    assert_eq!(
        grades.messages()[1],
        "Too many node expanded; are you expanding nodes twice?"
    );
    assert_eq!(grades.messages()[2], "\tstudent nodes expanded: 5");

    let lenient = case_with_leeway("3");
    assert!(grade(&lenient, &Twice, &gold).0);
}

fn case_with_leeway(leeway: &str) -> TestCase {
    load_case(
        "cases/corridor.test",
        &format!("{CORRIDOR}leewayFactor: \"{leeway}\"\n"),
    )
}

#[test]
fn pacman_budget_exhaustion() {
    let case = load_case("cases/corridor.test", CORRIDOR);
    let gold = author_gold(&case, PushOrder::Forward);
    let budget = Budget {
        max_expansions: Some(1),
        time_limit: None,
    };
    let mut grades = Grades::new();
    let passed = case
        .execute(&Reference::default(), &mut grades, &gold, budget)
        .unwrap();
    assert!(!passed);
    assert_eq!(
        grades.messages(),
        [
            "FAIL: cases/corridor.test",
            "\tsearch exceeded its budget of 1 expansions"
        ]
    );
    assert!(case.write_solution(Reference::default(), budget).is_err());
}

#[test]
fn construction_rejects_bad_names() {
    let err = TestCase::new(
        "x.test",
        &"class: \"GhostTest\"".parse::<TestFile>().unwrap(),
    )
    .unwrap_err();
    assert!(matches!(err, SpecError::UnknownName { kind: "test class", .. }));

    let text = format!("{CORRIDOR}heuristic: \"manhattanHeuristic\"\n");
    let err = TestCase::new("x.test", &text.parse::<TestFile>().unwrap()).unwrap_err();
    assert!(matches!(err, SpecError::UnexpectedHeuristic { .. }));

    let text = format!("{CORRIDOR}heuristic: \"foodHeuristic\"\n")
        .replace("\"bfs\"", "\"astar\"");
    let err = TestCase::new("x.test", &text.parse::<TestFile>().unwrap()).unwrap_err();
    assert!(matches!(err, SpecError::HeuristicMismatch { .. }));

    let text = format!("{CORRIDOR}costFn: \"stayNorth\"\n");
    let err = TestCase::new("x.test", &text.parse::<TestFile>().unwrap()).unwrap_err();
    assert!(matches!(err, SpecError::UnknownName { kind: "cost function", .. }));
}

#[test]
fn corner_problem_reports_missed_corner() {
    let case = load_case(
        "cases/corners.test",
        &format!("class: \"CornerProblemTest\"\n{CORNERS_LAYOUT}"),
    );
    let gold = author_gold(&case, PushOrder::Forward);
    assert_eq!(gold.get("solution_length"), Some("3"));

    assert!(grade(&case, &Reference::default(), &gold).0);

    let (passed, grades) = grade(&case, &Lost, &gold);
    assert!(!passed);
    assert_eq!(
        grades.messages(),
        ["FAIL: cases/corners.test", "Corners missed: [(2, 1)]"]
    );
}

#[test]
fn heuristic_test_checks_admissibility() {
    let case = load_case(
        "cases/corners_heuristic.test",
        &format!(
            "class: \"HeuristicTest\"\nheuristic: \"cornersHeuristic\"\nsearchProblemClass: \"CornersProblem\"\n{CORNERS_LAYOUT}"
        ),
    );
    let gold = author_gold(&case, PushOrder::Forward);
    assert_eq!(gold.get("solution_cost"), Some("3"));

    assert!(grade(&case, &Reference::default(), &gold).0);
    let (passed, grades) = grade(&case, &Lost, &gold);
    assert!(!passed);
    assert_eq!(grades.messages()[1], "\tHeuristic failed admissibility test");
}

#[test]
fn heuristic_grade_awards_points_per_threshold() {
    let case_for = |thresholds: &str| {
        load_case(
            "cases/food_grade.test",
            &format!("{FOOD_GRADE}gradingThresholds: \"{thresholds}\"\n"),
        )
    };
    let full = case_for("2 3 10");
    let gold = author_gold(&full, PushOrder::Forward);
    assert_eq!(gold.get("solution"), None);

    let (passed, grades) = grade(&full, &Reference::default(), &gold);
    assert!(passed);
    assert_eq!(grades.points(), 4);
    assert_eq!(
        grades.messages(),
        [
            "PASS: cases/food_grade.test",
            "\texpanded nodes: 2",
            "\tthresholds: [2, 3, 10]"
        ]
    );

    let (passed, grades) = grade(&case_for("1 2 10"), &Reference::default(), &gold);
    assert!(!passed);
    assert_eq!(grades.points(), 3);
    assert_eq!(grades.messages()[0], "FAIL: cases/food_grade.test");
}

#[test]
fn corner_heuristic_sanity() {
    let case = load_case(
        "cases/corner_sanity.test",
        &format!("class: \"CornerHeuristicSanity\"\n{CORNERS_LAYOUT}"),
    );
    let gold = author_gold(&case, PushOrder::Forward);
    assert_eq!(gold.get("cost"), Some("3"));
    assert_eq!(gold.get("path"), Some("North East South"));

    assert!(grade(&case, &Reference::default(), &gold).0);
    let (passed, grades) = grade(&case, &Lost, &gold);
    assert!(!passed);
    assert_eq!(grades.messages()[1], "\tHeuristic failed consistency test");

    let bad_path = "cost: \"3\"\npath: \"West\"".parse::<TestFile>().unwrap();
    let mut grades = Grades::new();
    assert!(case
        .execute(&Reference::default(), &mut grades, &bad_path, Budget::UNLIMITED)
        .is_err());
}

#[test]
fn corner_heuristic_pacman_thresholds() {
    let case = load_case(
        "cases/corner_pacman.test",
        &format!("class: \"CornerHeuristicPacman\"\n{CORNERS_LAYOUT}"),
    );
    let gold = author_gold(&case, PushOrder::Forward);
    assert_eq!(gold.get("thresholds"), Some("2000 1600 1200"));

    let (passed, grades) = grade(&case, &Reference::new(PushOrder::Reverse), &gold);
    assert!(passed);
    assert_eq!(grades.points(), 3);
    assert_eq!(
        grades.messages(),
        ["PASS: Heuristic resulted in expansion of 5 nodes"]
    );

    let (passed, grades) = grade(&case, &Lost, &gold);
    assert!(!passed);
    assert_eq!(grades.messages()[1], "\tHeuristic failed admissibility test");
}

#[test]
fn closest_dot_length() {
    let case = load_case(
        "cases/closest_dot.test",
        r#"class: "ClosestDotTest"
layoutName: "twoDots"
layout: """
%%%%%%
%P . %
%.   %
%%%%%%
"""
"#,
    );
    let gold = author_gold(&case, PushOrder::Forward);
    assert_eq!(gold.get("solution_length"), Some("1"));
    assert!(grade(&case, &Reference::default(), &gold).0);

    let wrong = "solution_length: \"4\"".parse::<TestFile>().unwrap();
    let (passed, grades) = grade(&case, &Reference::default(), &wrong);
    assert!(!passed);
    assert_eq!(grades.messages()[1], "Closest dot not found.");
}

#[test]
fn closest_dot_budget_exhaustion() {
    let case = load_case(
        "cases/closest_dot.test",
        r#"class: "ClosestDotTest"
layoutName: "farDot"
layout: """
%%%%%%
%P  .%
%%%%%%
"""
"#,
    );
    let gold = author_gold(&case, PushOrder::Forward);
    assert_eq!(gold.get("solution_length"), Some("3"));

    let budget = Budget {
        max_expansions: Some(1),
        time_limit: None,
    };
    let (passed, grades) = grade_within(&case, &Reference::default(), &gold, budget);
    assert!(!passed);
    assert_eq!(
        grades.messages(),
        [
            "FAIL: cases/closest_dot.test",
            "\tsearch exceeded its budget of 1 expansions"
        ]
    );
    assert!(case.write_solution(Reference::default(), budget).is_err());
}

/// The reference suite, except that the corners heuristic drops from its
/// start value straight to zero.
struct Cliff;

impl SearchSuite for Cliff {
    fn depth_first_search<P: SearchProblem>(&self, problem: &P) -> Option<Vec<P::Action>> {
        Reference::default().depth_first_search(problem)
    }

    fn breadth_first_search<P: SearchProblem>(&self, problem: &P) -> Option<Vec<P::Action>> {
        Reference::default().breadth_first_search(problem)
    }

    fn uniform_cost_search<P: SearchProblem>(&self, problem: &P) -> Option<Vec<P::Action>> {
        Reference::default().uniform_cost_search(problem)
    }

    fn a_star_search<P: SearchProblem>(
        &self,
        problem: &P,
        heuristic: &Heuristic<'_, P>,
    ) -> Option<Vec<P::Action>> {
        Reference::default().a_star_search(problem, heuristic)
    }

    fn corners_heuristic(&self, state: &CornersState, problem: &CornersProblem<'_>) -> f64 {
        if *state == problem.start_state() {
            3.0
        } else {
            0.0
        }
    }

    fn food_heuristic(&self, state: &FoodState, problem: &FoodSearchProblem<'_>) -> f64 {
        Reference::default().food_heuristic(state, problem)
    }
}

#[test]
fn heuristic_checks_ignore_search_budget() {
    let tiny = Budget {
        max_expansions: Some(0),
        time_limit: None,
    };

    let sanity = load_case(
        "cases/corner_sanity.test",
        &format!("class: \"CornerHeuristicSanity\"\n{CORNERS_LAYOUT}"),
    );
    let gold = author_gold(&sanity, PushOrder::Forward);
    let (passed, grades) = grade_within(&sanity, &Reference::default(), &gold, tiny);
    assert!(passed, "{grades}");

    let single = load_case(
        "cases/corners_heuristic.test",
        &format!(
            "class: \"HeuristicTest\"\nheuristic: \"cornersHeuristic\"\nsearchProblemClass: \"CornersProblem\"\n{CORNERS_LAYOUT}"
        ),
    );
    let gold = author_gold(&single, PushOrder::Forward);
    let (passed, grades) = grade_within(&single, &Reference::default(), &gold, tiny);
    assert!(passed, "{grades}");

    // Successors are still inspected when the search budget is spent.
    let (passed, grades) = grade_within(&single, &Cliff, &gold, tiny);
    assert!(!passed);
    assert_eq!(grades.messages()[1], "\tHeuristic failed consistency test");
}
