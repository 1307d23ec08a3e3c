use handoff::sync_channel;
use rand::Rng;
use std::thread;
use std::time::Duration;

fn jitter() -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(5..25))
}

#[test]
fn ping_pong_delivers_every_value_in_order() {
    let (tx, rx) = sync_channel::<i32>();
    let sender = thread::spawn(move || {
        for i in 0..1000 {
            tx.send(i).unwrap();
        }
    });

    let mut got = Vec::with_capacity(1000);
    for _ in 0..1000 {
        got.push(rx.recv().unwrap());
    }

    sender.join().unwrap();
    assert_eq!(got, (0..1000).collect::<Vec<_>>());
}

#[test]
fn at_most_one_value_is_ever_in_flight() {
    let (tx, rx) = sync_channel::<i32>();
    // try_send only succeeds once a receiver is parked waiting for a value,
    // so two back-to-back try_sends without an intervening recv can never
    // both succeed.
    assert!(tx.try_send(1).is_err());

    let receiver = thread::spawn(move || rx.recv().unwrap());
    thread::sleep(jitter());
    tx.send(7).unwrap();
    assert_eq!(receiver.join().unwrap(), 7);
}

#[test]
fn close_returns_only_once_any_in_flight_value_is_drained() {
    let (tx, rx) = sync_channel::<i32>();
    let receiver = thread::spawn(move || rx.recv().unwrap());
    thread::sleep(jitter());
    tx.send(9).unwrap();
    tx.close();
    assert_eq!(receiver.join().unwrap(), 9);
    assert!(tx.is_closed());
}
