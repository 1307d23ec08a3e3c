use handoff::bounded_channel;
use std::time::{Duration, Instant};

#[test]
fn buffered_burst_respects_capacity_then_drains_fifo() {
    let (tx, rx) = bounded_channel::<i32>(4).unwrap();

    for i in 0..4 {
        tx.try_send(i).unwrap();
    }
    assert!(tx.try_send(4).unwrap_err().is_full());

    assert_eq!(rx.try_recv(), Some(0));
    assert_eq!(rx.try_recv(), Some(1));

    tx.try_send(4).unwrap();
    tx.try_send(5).unwrap();

    assert_eq!(rx.try_recv(), Some(2));
    assert_eq!(rx.try_recv(), Some(3));
    assert_eq!(rx.try_recv(), Some(4));
    assert_eq!(rx.try_recv(), Some(5));
    assert_eq!(rx.try_recv(), None);
}

#[test]
fn close_drains_remaining_values_in_order_then_recv_fails() {
    let (tx, rx) = bounded_channel::<char>(8).unwrap();
    tx.try_send('a').unwrap();
    tx.try_send('b').unwrap();
    tx.try_send('c').unwrap();
    tx.close();

    assert_eq!(rx.recv().unwrap(), 'a');
    assert_eq!(rx.recv().unwrap(), 'b');
    assert_eq!(rx.recv().unwrap(), 'c');
    assert!(rx.recv().is_err());
}

#[test]
fn timed_send_on_a_full_channel_times_out_without_a_consumer() {
    let (tx, _rx) = bounded_channel::<i32>(1).unwrap();
    tx.try_send(1).unwrap();

    let started = Instant::now();
    let err = tx
        .try_send_timeout(2, Some(Duration::from_millis(50)))
        .unwrap_err();
    assert!(err.is_full());
    assert!(started.elapsed() >= Duration::from_millis(50));
}
