use handoff::{bounded_channel, sync_channel, Select, SelectOutcome};
use rand::Rng;
use std::thread;
use std::time::Duration;

/// A few milliseconds of jitter so the winning candidate isn't always the
/// one scheduled first — keeps this from accidentally testing a fixed
/// interleaving instead of the fairness property itself.
fn jitter() -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(5..25))
}

#[test]
fn select_commits_to_the_one_channel_that_became_ready() {
    let (tx_a, rx_a) = sync_channel::<i32>();
    let (tx_b, rx_b) = sync_channel::<i32>();

    let sender = thread::spawn(move || {
        thread::sleep(jitter());
        tx_b.send(42).unwrap();
    });

    let outcome = Select::new()
        .recv(&rx_a, |v| ("a", v))
        .recv(&rx_b, |v| ("b", v))
        .select();

    assert_eq!(outcome.unwrap(), ("b", 42));
    assert!(rx_a.try_recv().is_none());
    sender.join().unwrap();
    drop(tx_a);
}

#[test]
fn select_is_fair_across_two_continuously_ready_channels() {
    let (tx_a, rx_a) = bounded_channel::<i32>(16).unwrap();
    let (tx_b, rx_b) = bounded_channel::<i32>(16).unwrap();

    let mut wins_a = 0usize;
    let mut wins_b = 0usize;
    const ROUNDS: usize = 10_000;

    for i in 0..ROUNDS {
        tx_a.try_send(i as i32).unwrap();
        tx_b.try_send(i as i32).unwrap();

        match Select::new()
            .recv_bounded(&rx_a, |_| "a")
            .recv_bounded(&rx_b, |_| "b")
            .select()
        {
            SelectOutcome::Done("a") => wins_a += 1,
            SelectOutcome::Done("b") => wins_b += 1,
            SelectOutcome::Done(other) => panic!("unexpected handler result {other}"),
            SelectOutcome::Closed(i) => panic!("candidate {i} reported closed unexpectedly"),
        }
    }

    let ratio = wins_a as f64 / ROUNDS as f64;
    assert!(
        (0.45..=0.55).contains(&ratio),
        "expected each channel picked 45%-55% of the time, got wins_a={wins_a} wins_b={wins_b}"
    );
}

#[test]
fn select_skips_a_closed_send_candidate_and_commits_to_the_live_one() {
    // A closed channel in the send role must be permanently non-ready and
    // effectively removed from consideration -- never a reason to end the
    // select, and never reported as `SelectOutcome::Closed` (that variant is
    // reserved for a closed-and-drained *recv* candidate). Here the closed
    // send candidate is always scanned first (index 0); if it wrongly forced
    // a commit or a `Closed` outcome, this would panic instead of observing
    // the live recv candidate win.
    let (tx_closed, _rx_closed) = bounded_channel::<i32>(1).unwrap();
    tx_closed.close();
    let (tx_live, rx_live) = bounded_channel::<i32>(1).unwrap();
    tx_live.try_send(7).unwrap();

    let outcome = Select::new()
        .send_bounded(&tx_closed, 1, || "closed")
        .recv_bounded(&rx_live, |v| format!("live:{v}"))
        .select();

    assert_eq!(outcome.unwrap(), "live:7");
}

#[test]
fn select_mixes_rendezvous_and_bounded_candidates() {
    let (tx_sync, rx_sync) = sync_channel::<i32>();
    let (tx_bounded, rx_bounded) = bounded_channel::<i32>(4).unwrap();
    tx_bounded.try_send(5).unwrap();

    let outcome = Select::new()
        .recv(&rx_sync, |v| format!("sync:{v}"))
        .recv_bounded(&rx_bounded, |v| format!("bounded:{v}"))
        .select();

    assert_eq!(outcome.unwrap(), "bounded:5");
    drop(tx_sync);
}
