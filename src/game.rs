//! Delegation.
//!
//! A [`DiceGame`] reports its progress to a [`DiceGameDelegate`]. The game
//! only holds a weak handle to its delegate, so a delegate that is dropped
//! elsewhere is simply no longer told anything. Delegates are reference types.

use std::any::Any;
use std::sync::{Arc, Weak};

use tracing::{trace, warn};

use crate::catalog::{Dice, PrettyTextRepresentable, TextRepresentable};
use crate::contract::{Access, Contract, ContractDescriptor, Member};
use crate::object::{Handle, Object, Shared};
use crate::{conforms, contract};

pub trait DiceGame {
    fn dice(&self) -> &Dice;
    fn play(&mut self);
    fn as_any(&self) -> &dyn Any;
}
contract!(DiceGame => ContractDescriptor::new("DiceGame")
    .require(Member::property("dice", "Dice", Access::Get))
    .require(Member::mutating_method("play", &[], "()")));

pub trait DiceGameDelegate: Object {
    fn game_did_start(&self, game: &dyn DiceGame);
    fn game_did_start_new_turn(&self, game: &dyn DiceGame, dice_roll: usize);
    fn game_did_end(&self, game: &dyn DiceGame);
}
contract!(DiceGameDelegate => ContractDescriptor::new("DiceGameDelegate")
    .inherits(<dyn Object as Contract>::descriptor())
    .require(Member::method("game_did_start", &["&dyn DiceGame"], "()"))
    .require(Member::method("game_did_start_new_turn", &["&dyn DiceGame", "usize"], "()"))
    .require(Member::method("game_did_end", &["&dyn DiceGame"], "()")));

// ------------- Snakes and Ladders -------------
pub struct SnakesAndLadders {
    final_square: usize,
    dice: Dice,
    square: usize,
    // shift applied when a turn ends on the square, ladders up and snakes down
    board: Vec<isize>,
    delegate: Option<Weak<dyn DiceGameDelegate>>,
    max_turns: usize,
}

impl SnakesAndLadders {
    pub const FINAL_SQUARE: usize = 25;
    pub const MAX_TURNS: usize = 1000;
    const LADDERS_AND_SNAKES: [(usize, isize); 8] = [
        (3, 8),
        (6, 11),
        (9, 9),
        (10, 2),
        (14, -10),
        (19, -11),
        (22, -2),
        (24, -8),
    ];

    pub fn new(dice: Dice) -> Self {
        Self::with_final_square(Self::FINAL_SQUARE, dice)
    }
    /// Ladders and snakes have to start and end strictly inside the board,
    /// so the final square is only ever reached by an exact roll.
    pub fn with_final_square(final_square: usize, dice: Dice) -> Self {
        let mut board = vec![0; final_square + 1];
        for (square, shift) in Self::LADDERS_AND_SNAKES {
            let target = square as isize + shift;
            if square < final_square && target > 0 && (target as usize) < final_square {
                board[square] = shift;
            }
        }
        Self {
            final_square,
            dice,
            square: 0,
            board,
            delegate: None,
            max_turns: Self::MAX_TURNS,
        }
    }
    /// Turns after which an unfinished game is given up. Some boards cannot
    /// be finished with some dice, a one-sided dice loops forever on the
    /// default board.
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }
    pub fn set_delegate<D: DiceGameDelegate>(&mut self, delegate: &Arc<D>) {
        let delegate: Arc<D> = Arc::clone(delegate);
        let delegate: Arc<dyn DiceGameDelegate> = delegate;
        self.delegate = Some(Arc::downgrade(&delegate));
    }
    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }
    pub fn final_square(&self) -> usize {
        self.final_square
    }
    pub fn square(&self) -> usize {
        self.square
    }
    pub fn board(&self) -> &[isize] {
        &self.board
    }
    pub fn max_turns(&self) -> usize {
        self.max_turns
    }
    pub fn is_finished(&self) -> bool {
        self.square == self.final_square
    }
    fn delegate(&self) -> Option<Arc<dyn DiceGameDelegate>> {
        self.delegate.as_ref().and_then(Weak::upgrade)
    }
}

impl DiceGame for SnakesAndLadders {
    fn dice(&self) -> &Dice {
        &self.dice
    }
    /// Plays until the final square is hit exactly or the turns run out.
    /// Rolls that overshoot the final square are skipped.
    fn play(&mut self) {
        self.square = 0;
        if let Some(delegate) = self.delegate() {
            delegate.game_did_start(&*self);
        }
        for _ in 0..self.max_turns {
            let dice_roll = self.dice.roll();
            if let Some(delegate) = self.delegate() {
                delegate.game_did_start_new_turn(&*self, dice_roll);
            }
            let next = self.square + dice_roll;
            if next == self.final_square {
                self.square = self.final_square;
                break;
            }
            if next > self.final_square {
                trace!(dice_roll, square = self.square, "overshot the final square");
                continue;
            }
            self.square = next.saturating_add_signed(self.board[next]);
            trace!(dice_roll, square = self.square, "moved");
        }
        if !self.is_finished() {
            warn!(turns = self.max_turns, square = self.square, "game given up unfinished");
        }
        if let Some(delegate) = self.delegate() {
            delegate.game_did_end(&*self);
        }
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl TextRepresentable for SnakesAndLadders {
    fn text_description(&self) -> String {
        format!("A game of Snakes and Ladders with {} squares", self.final_square)
    }
}
impl PrettyTextRepresentable for SnakesAndLadders {
    fn pretty_text_description(&self) -> String {
        let mut output = self.text_description() + ":\n";
        for shift in &self.board[1..] {
            let symbol = match shift.signum() {
                1 => "▲ ",
                -1 => "▼ ",
                _ => "○ ",
            };
            output.push_str(symbol);
        }
        output
    }
}
conforms!(SnakesAndLadders => DiceGame, TextRepresentable, PrettyTextRepresentable);

// ------------- Tracker -------------
#[derive(Debug, Default)]
struct TrackerState {
    number_of_turns: usize,
    log: Vec<String>,
}

/// Counts turns and keeps a log of the games it is told about.
#[derive(Debug, Clone)]
pub struct DiceGameTracker {
    state: Shared<TrackerState>,
}

impl DiceGameTracker {
    pub fn new() -> Self {
        Self {
            state: Shared::new(TrackerState::default()),
        }
    }
    pub fn number_of_turns(&self) -> usize {
        self.state.read().number_of_turns
    }
    pub fn log(&self) -> Vec<String> {
        self.state.read().log.clone()
    }
}
impl Default for DiceGameTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Object for DiceGameTracker {
    fn handle(&self) -> &dyn Handle {
        &self.state
    }
}

impl DiceGameDelegate for DiceGameTracker {
    fn game_did_start(&self, game: &dyn DiceGame) {
        let mut state = self.state.write();
        state.number_of_turns = 0;
        if game.as_any().is::<SnakesAndLadders>() {
            state.log.push("Started a new game of Snakes and Ladders".to_string());
        }
        state
            .log
            .push(format!("The game is using a {}-sided dice", game.dice().sides()));
    }
    fn game_did_start_new_turn(&self, _game: &dyn DiceGame, dice_roll: usize) {
        let mut state = self.state.write();
        state.number_of_turns += 1;
        state.log.push(format!("Rolled a {}", dice_roll));
    }
    fn game_did_end(&self, _game: &dyn DiceGame) {
        let mut state = self.state.write();
        let line = format!("The game lasted for {} turns", state.number_of_turns);
        state.log.push(line);
    }
}
conforms!(DiceGameTracker => Object, DiceGameDelegate);
