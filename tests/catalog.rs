use std::sync::Arc;

use conformant::catalog::{
    self, make, Account, Adjustable, Counter, Dial, Dice, FullyNamed, Hamster, Kinded, Lamp,
    LinearCongruentialGenerator, OnOffSwitch, Person, PrettyTextRepresentable,
    RandomNumberGenerator, SavingsAccount, Starship, TextRepresentable, ThreeSource, Togglable,
    TowardsZeroSource,
};
use conformant::existentials;
use conformant::game::{DiceGame, DiceGameTracker, SnakesAndLadders};
use conformant::object::Identity;

#[test]
fn full_names() {
    let mut john = Person::new("John Appleseed");
    assert_eq!(john.full_name(), "John Appleseed");
    john.set_full_name("John Q. Appleseed");
    assert_eq!(john.full_name(), "John Q. Appleseed");
    assert_eq!(Starship::new("Enterprise", Some("USS")).full_name(), "USS Enterprise");
    assert_eq!(Starship::new("Rocinante", None).full_name(), "Rocinante");
}

#[test]
fn dial_level_stays_under_its_ceiling() {
    let mut dial = Dial::new(10);
    dial.set_level(4);
    assert_eq!(dial.level(), 4);
    dial.set_level(12);
    assert_eq!(dial.level(), 10);
    dial.set_ceiling(5);
    assert_eq!((dial.level(), dial.ceiling()), (5, 5));
}

#[test]
fn type_level_members() {
    assert_eq!(<Person as Kinded>::kind(), "person");
    assert_eq!(<Dial as Kinded>::kind(), "dial");
}

#[test]
fn generator_is_deterministic() {
    let mut generator = LinearCongruentialGenerator::new();
    assert_eq!(generator.random(), 0.3746499199817101);
    assert_eq!(generator.random(), 0.729023776863283);

    let mut again = LinearCongruentialGenerator::with_seed(42.0);
    assert_eq!(again.random(), 0.3746499199817101);
    assert!(again.random_bool());
}

#[test]
fn dice_rolls_stay_within_its_sides() {
    let mut dice = Dice::new(6, LinearCongruentialGenerator::new());
    let rolls: Vec<usize> = (0..5).map(|_| dice.roll()).collect();
    assert_eq!(rolls, vec![3, 5, 4, 5, 4]);

    let mut dice = Dice::new(6, LinearCongruentialGenerator::with_seed(7.0));
    assert!((0..100).map(|_| dice.roll()).all(|roll| (1..=6).contains(&roll)));
    assert_eq!(dice.text_description(), "A 6-sided dice");
}

#[test]
fn toggles() {
    let mut switch = OnOffSwitch::Off;
    switch.toggle();
    assert_eq!(switch, OnOffSwitch::On);
    switch.toggle();
    assert_eq!(switch, OnOffSwitch::Off);

    let lamp = Lamp::new();
    let mut other_handle = lamp.clone();
    other_handle.toggle();
    assert!(lamp.is_lit());
    assert!(lamp.same_object(&other_handle));
    assert!(!lamp.same_object(&Lamp::new()));
}

#[test]
fn every_new_object_gets_a_fresh_id() {
    let ids: Vec<_> = (0..100).map(|_| Lamp::new().object_id()).collect();
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());

    let lamp = Lamp::new();
    assert_eq!(lamp.clone().object_id(), lamp.object_id());
}

#[test]
fn initializer_requirement_builds_both_types() {
    let account: Account = make(100);
    assert_eq!(account.balance(), 100);
    let savings: SavingsAccount = make(250);
    assert_eq!(savings.account().balance(), 250);
    assert_eq!(savings.interest_rate(), SavingsAccount::DEFAULT_RATE);
}

#[test]
fn hamster_descriptions() {
    let simon = Hamster::new("Simon");
    assert_eq!(simon.text_description(), "A hamster named Simon");
    assert_eq!(simon.pretty_text_description(), "A hamster named Simon");
}

#[test]
fn things_print_through_the_contract() {
    let registry = catalog::registry().unwrap();
    let things = existentials![
        Hamster::new("Simon"),
        Dice::new(12, LinearCongruentialGenerator::new()),
        Person::new("John Appleseed")
    ];
    let descriptions: Vec<String> = registry
        .matches::<dyn TextRepresentable>(&things)
        .iter()
        .map(|thing| thing.text_description())
        .collect();
    assert_eq!(descriptions, vec!["A hamster named Simon", "A 12-sided dice"]);
}

#[test]
fn counter_with_fixed_increment() {
    let mut counter = Counter::with_data_source(ThreeSource);
    let counts: Vec<i64> = (0..4)
        .map(|_| {
            counter.increment();
            counter.count()
        })
        .collect();
    assert_eq!(counts, vec![3, 6, 9, 12]);
}

#[test]
fn counter_moves_towards_zero() {
    let mut counter = Counter::with_data_source(TowardsZeroSource);
    counter.set_count(-4);
    let counts: Vec<i64> = (0..5)
        .map(|_| {
            counter.increment();
            counter.count()
        })
        .collect();
    assert_eq!(counts, vec![-3, -2, -1, 0, 0]);
}

#[test]
fn counter_without_source_stays_put() {
    let mut counter = Counter::new();
    counter.increment();
    assert_eq!(counter.count(), 0);
}

#[test]
fn snakes_and_ladders_reports_to_its_tracker() {
    let mut game = SnakesAndLadders::new(Dice::new(6, LinearCongruentialGenerator::new()));
    let tracker = Arc::new(DiceGameTracker::new());
    game.set_delegate(&tracker);
    game.play();

    assert_eq!(game.square(), SnakesAndLadders::FINAL_SQUARE);
    assert_eq!(tracker.number_of_turns(), 4);
    assert_eq!(
        tracker.log(),
        vec![
            "Started a new game of Snakes and Ladders",
            "The game is using a 6-sided dice",
            "Rolled a 3",
            "Rolled a 5",
            "Rolled a 4",
            "Rolled a 5",
            "The game lasted for 4 turns",
        ]
    );
}

#[test]
fn game_without_a_live_delegate_still_plays() {
    let mut game = SnakesAndLadders::new(Dice::new(6, LinearCongruentialGenerator::new()));
    {
        let tracker = Arc::new(DiceGameTracker::new());
        game.set_delegate(&tracker);
    }
    game.play();
    assert_eq!(game.square(), 25);

    game.clear_delegate();
    game.play();
    assert_eq!(game.square(), 25);
}

#[test]
fn board_descriptions() {
    let game = SnakesAndLadders::new(Dice::new(6, LinearCongruentialGenerator::new()));
    assert_eq!(game.text_description(), "A game of Snakes and Ladders with 25 squares");
    assert_eq!(
        game.pretty_text_description(),
        "A game of Snakes and Ladders with 25 squares:\n\
         ○ ○ ▲ ○ ○ ▲ ○ ○ ▲ ▲ ○ ○ ○ ▼ ○ ○ ○ ○ ▼ ○ ○ ▼ ○ ▼ ○ "
    );
    assert_eq!(game.dice().sides(), 6);
}

#[test]
fn smaller_board_drops_shortcuts_leaving_it() {
    let game = SnakesAndLadders::with_final_square(10, Dice::new(6, LinearCongruentialGenerator::new()));
    // 3 -> 11 and 6 -> 17 would leave the board, 9 -> 18 as well
    assert_eq!(game.board(), &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn board_ending_on_a_ladder_top_drops_that_ladder() {
    // 3 -> 11 would end the game without landing exactly
    let mut game = SnakesAndLadders::with_final_square(11, Dice::new(6, LinearCongruentialGenerator::new()));
    assert_eq!(game.board(), &[0; 12]);
    game.play();
    assert!(game.is_finished());
    assert_eq!(game.square(), 11);
}

#[test]
fn board_keeps_ladders_ending_inside_it() {
    // 3 -> 11 stays, 10 -> 12 would reach the final square
    let mut game = SnakesAndLadders::with_final_square(12, Dice::new(6, LinearCongruentialGenerator::new()));
    assert_eq!(game.board(), &[0, 0, 0, 8, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    let tracker = Arc::new(DiceGameTracker::new());
    game.set_delegate(&tracker);
    game.play();
    assert!(game.is_finished());
    assert_eq!(tracker.number_of_turns(), 6);
}

#[test]
fn unwinnable_game_is_given_up() {
    // a one-sided dice goes round 8 -> 9 -> 18 -> 19 -> 8 for ever
    let mut game = SnakesAndLadders::new(Dice::new(1, LinearCongruentialGenerator::new())).with_max_turns(50);
    let tracker = Arc::new(DiceGameTracker::new());
    game.set_delegate(&tracker);
    game.play();

    assert!(!game.is_finished());
    assert_eq!(game.square(), 8);
    assert_eq!(tracker.number_of_turns(), 50);
    assert_eq!(tracker.log().last().map(String::as_str), Some("The game lasted for 50 turns"));
}

#[test]
fn default_turn_limit() {
    let game = SnakesAndLadders::new(Dice::new(6, LinearCongruentialGenerator::new()));
    assert_eq!(game.max_turns(), SnakesAndLadders::MAX_TURNS);
    assert!(!game.is_finished());
}

#[test]
fn counter_stops_at_the_largest_count() {
    let mut counter = Counter::with_data_source(ThreeSource);
    counter.set_count(i64::MAX - 1);
    counter.increment();
    assert_eq!(counter.count(), i64::MAX);
    counter.increment();
    assert_eq!(counter.count(), i64::MAX);
}
