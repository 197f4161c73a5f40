/// Outcome of a single move.
///
/// The board itself only ever produces `Invalid`, `Valid` or `Win` - a player
/// cannot lose by their own move. `Loss` is synthesised by the game loop for
/// the side that did not win once the game is already decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStatus {
    Invalid,
    Valid,
    Win,
    Loss,
}
