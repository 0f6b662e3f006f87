use beatdeck_core::game::engine::{GameState, Phase};
use beatdeck_core::game::guess::Direction;
use beatdeck_core::model::card::Card;
use beatdeck_core::model::deck::{DECK_SIZE, Deck};
use beatdeck_core::model::rank::Rank;
use beatdeck_core::model::result::GameResult;
use beatdeck_core::model::stack::Stack;
use beatdeck_core::model::suit::Suit;
use beatdeck_core::score::{PlayerId, RankingLimits, ScoreRecord, rank_records, should_replace};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Moves `wanted` so it is dealt to stack 0 and `next` is the first draw.
fn deck_with_opening(seed: u64, wanted: Card, next: Card) -> Deck {
    let mut cards = Deck::shuffled_with_seed(seed).cards().to_vec();
    for card in [wanted, next] {
        let pos = cards.iter().position(|c| *c == card).expect("card in deck");
        cards.remove(pos);
    }
    let deal_start = cards.len() - 8;
    cards.insert(deal_start, next);
    cards.push(wanted);
    Deck::from_cards(cards)
}

#[test]
fn joker_on_a_seven_extends_the_streak() {
    let seven = Card::new(Rank::Seven, Suit::Diamonds);
    let deck = deck_with_opening(31, seven, Card::joker());
    let mut game = GameState::with_deck(deck).expect("deal");
    assert_eq!(game.stack(0).and_then(Stack::top), Some(seven));

    game.select_stack(0).expect("select");
    let (next, outcome) = game.resolve_guess(Direction::Higher).expect("resolve");

    assert!(outcome.correct);
    assert_eq!(outcome.drawn, Card::joker());
    assert_eq!(next.current_streak(), 1);
    assert_eq!(next.stack(0).map(Stack::cards), Some(&[seven, Card::joker()][..]));
    assert_eq!(next.cards_drawn() + next.remaining_cards(), DECK_SIZE);
}

#[test]
fn king_drawn_on_king_burns_in_either_direction() {
    let king = Card::new(Rank::King, Suit::Hearts);
    let other_king = Card::new(Rank::King, Suit::Spades);

    for direction in Direction::BOTH {
        let deck = deck_with_opening(8, king, other_king);
        let mut game = GameState::with_deck(deck).expect("deal");
        game.select_stack(0).expect("select");
        let (next, outcome) = game.resolve_guess(direction).expect("resolve");

        assert!(!outcome.correct);
        assert_eq!(outcome.burned_stack, Some(0));
        assert_eq!(next.current_streak(), 0);
        assert!(next.stack(0).is_some_and(Stack::is_burned));
        assert_eq!(next.phase(), Phase::Selecting);
    }
}

#[test]
fn random_play_always_terminates_with_consistent_summary() {
    use rand::Rng;

    let mut rng = StdRng::seed_from_u64(404);
    for _ in 0..50 {
        let mut game = GameState::with_rng(&mut rng);
        while !game.is_over() {
            let active: Vec<usize> = game.active_stack_indices().collect();
            let index = active[rng.gen_range(0..active.len())];
            let direction = Direction::BOTH[rng.gen_range(0..2)];
            game.select_stack(index).expect("select active stack");
            game.guess(direction).expect("guess");
            game.finish_resolution().expect("finish");
        }

        let summary = game.summary().expect("finished game");
        assert_eq!(usize::from(summary.stacks_remaining), game.active_stacks());
        assert!(summary.jokers_drawn <= 2);
        match summary.result {
            GameResult::Win => assert_eq!(summary.remaining_cards, 0),
            GameResult::Lose => assert_eq!(summary.stacks_remaining, 0),
        }
    }
}

#[test]
fn earlier_nine_stack_win_survives_longer_streak_with_fewer_stacks() {
    let first = ScoreRecord {
        player_id: PlayerId::new("a"),
        player_name: "A".to_string(),
        stacks_remaining: 9,
        longest_streak: 52,
        remaining_cards: 0,
        result: GameResult::Win,
        timestamp: 1_000,
    };
    let later = ScoreRecord {
        stacks_remaining: 6,
        longest_streak: 60,
        timestamp: 2_000,
        ..first.clone()
    };

    assert!(!should_replace(&later, &first));
    let ranked = rank_records(vec![later.clone(), first.clone()], RankingLimits::default());
    assert_eq!(ranked, vec![first, later]);
}
