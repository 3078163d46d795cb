use chrono::Utc;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use guild_economy::{
    economy::rules::split_winnings,
    game::{
        Card, Deck, Suit,
        blackjack::{resolve, score},
    },
    session::GameSession,
};

/// Benchmark scoring a two-card hand
fn bench_score_2_cards(c: &mut Criterion) {
    let cards = vec![Card(1, Suit::Spade), Card(13, Suit::Spade)];

    c.bench_function("score_2_cards", |b| {
        b.iter(|| score(&cards));
    });
}

/// Benchmark scoring hands heavy with aces
fn bench_score_many_aces(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_aces");

    for n_aces in [1, 2, 4] {
        let mut cards: Vec<Card> = Suit::ALL
            .into_iter()
            .take(n_aces)
            .map(|suit| Card(1, suit))
            .collect();
        cards.push(Card(5, Suit::Heart));
        cards.push(Card(3, Suit::Club));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{n_aces}_aces")),
            &cards,
            |b, cards| b.iter(|| score(cards)),
        );
    }

    group.finish();
}

/// Benchmark resolving a finished hand
fn bench_resolve(c: &mut Criterion) {
    let player = vec![Card(10, Suit::Spade), Card(5, Suit::Heart), Card(4, Suit::Club)];
    let dealer = vec![Card(9, Suit::Diamond), Card(7, Suit::Spade), Card(2, Suit::Heart)];

    c.bench_function("resolve_hand", |b| {
        b.iter(|| resolve(&player, &dealer, false, 1_000));
    });
}

/// Benchmark the commission split applied to winnings
fn bench_split_winnings(c: &mut Criterion) {
    c.bench_function("split_winnings", |b| {
        b.iter(|| split_winnings(1, 1_500, Some(2)));
    });
}

/// Benchmark shuffling a full deck
fn bench_deck_shuffle(c: &mut Criterion) {
    c.bench_function("deck_shuffle", |b| {
        b.iter(Deck::shuffled);
    });
}

/// Benchmark dealing and playing out a full hand from a fresh deck
fn bench_full_hand(c: &mut Criterion) {
    c.bench_function("full_hand", |b| {
        b.iter(|| {
            let mut session = GameSession::deal(1, 1, 100, Deck::shuffled(), Utc::now());
            session.stand()
        });
    });
}

criterion_group!(
    scoring,
    bench_score_2_cards,
    bench_score_many_aces,
    bench_resolve,
    bench_split_winnings
);

criterion_group!(dealing, bench_deck_shuffle, bench_full_hand);

criterion_main!(scoring, dealing);
