use thiserror::Error;

/// Fatal errors: malformed specification text, unknown names, or a harness
/// call that replays an impossible action sequence.
///
/// Anything a search suite can get wrong on its own is reported as a FAIL
/// message instead and never shows up here.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("graph specification start_state not found or incorrect on line 0\nBroken graph:\n\"\"\"{text}\"\"\"")]
    MissingStartState { text: String },
    #[error("graph specification goal_states not found or incorrect on line 1\nBroken graph:\n\"\"\"{text}\"\"\"")]
    MissingGoalStates { text: String },
    #[error("invalid line in graph specification: {line:?}\nBroken graph:\n\"\"\"{text}\"\"\"")]
    InvalidEdge { line: String, text: String },
    #[error("heuristic specification broken at tokens {tokens:?}\nBroken heuristic:\n\"\"\"{text}\"\"\"")]
    InvalidHeuristicLine { tokens: Vec<String>, text: String },
    #[error("graph heuristic called with invalid state: {state}\nHeuristic:\n{table}")]
    HeuristicLookup { state: String, table: String },
    #[error("invalid action sequence: no action {action:?} from state {state}")]
    InvalidAction { action: String, state: String },
    #[error("invalid layout: {0}")]
    Layout(String),
    #[error("unknown {kind} name: {name:?}")]
    UnknownName { kind: &'static str, name: String },
    #[error("heuristic {heuristic:?} cannot be used with {problem:?}")]
    HeuristicMismatch { heuristic: String, problem: String },
    #[error("heuristic {heuristic:?} given for {algorithm:?}, which takes none")]
    UnexpectedHeuristic { heuristic: String, algorithm: String },
    #[error("missing key {0:?}")]
    MissingKey(String),
    #[error("invalid value for {key:?}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("line {line}: {msg}")]
    Syntax { line: usize, msg: String },
}
