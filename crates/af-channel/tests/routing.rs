//! Router delivery scenarios

use af_channel::*;
use af_core::ChannelId;

#[test]
fn test_ordered_set_reaches_only_named_channels() {
    let router = Router::new();
    let combi = router.register(ChannelId::Combi);
    let score = router.register(ChannelId::Score);
    let machine = router.register(ChannelId::Machine);

    let n = router.send(
        Some(ChannelId::Scene),
        &Receiver::from([ChannelId::Combi, ChannelId::Score]),
        Event::Show(Visibility::IMMEDIATE),
    );

    assert_eq!(n, 2);
    assert_eq!(combi.drain().len(), 1);
    assert_eq!(score.drain().len(), 1);
    assert_eq!(machine.pending(), 0);
}

#[test]
fn test_absent_channel_silently_dropped() {
    let router = Router::new();
    let sender = router.register(ChannelId::Scene);
    assert_eq!(sender.send(ChannelId::Shooter, Event::StartShooter), 0);
}

#[test]
fn test_late_registration_misses_earlier_sends() {
    let router = Router::new();
    router.send(None, &Receiver::One(ChannelId::Combi), Event::Farkle);
    let combi = router.register(ChannelId::Combi);
    assert!(combi.try_recv().is_none());
}

#[test]
fn test_single_sender_order_preserved() {
    let router = Router::new();
    let score = router.register(ChannelId::Score);
    let scene = router.register(ChannelId::Scene);

    for value in 0..50 {
        scene.send(ChannelId::Score, Event::UpdateQuota(Amount { value }));
    }

    let values: Vec<i64> = score
        .drain()
        .into_iter()
        .filter_map(|e| match e.event {
            Event::UpdateQuota(a) => Some(a.value),
            _ => None,
        })
        .collect();
    assert_eq!(values, (0..50).collect::<Vec<_>>());
}

#[test]
fn test_broadcast_includes_sender_channel() {
    let router = Router::new();
    let scene = router.register(ChannelId::Scene);
    let combi = router.register(ChannelId::Combi);
    let bulbs = router.register(ChannelId::Bulbs);

    assert_eq!(scene.broadcast(Event::LoseFinal), 3);
    assert_eq!(scene.drain().len(), 1);
    assert_eq!(combi.drain().len(), 1);
    assert_eq!(bulbs.drain().len(), 1);
}

#[test]
fn test_wire_delivery() {
    let router = Router::new();
    let combi = router.register(ChannelId::Combi);

    let n = router
        .send_wire(r#"{"event":"update-combi","data":{"symbol":"🍒","value":"x3"},"receiver":"combi"}"#)
        .unwrap();
    assert_eq!(n, 1);

    let envelope = combi.try_recv().unwrap();
    assert_eq!(envelope.from, None);
    assert_eq!(
        envelope.event,
        Event::UpdateCombi(CombiUpdate {
            symbol: "🍒".into(),
            value: "x3".into()
        })
    );
}

#[test]
fn test_wire_rejections_never_deliver() {
    let router = Router::new();
    let combi = router.register(ChannelId::Combi);

    let cases = [
        (r#"{"event":"explode","receiver":"combi"}"#, "unknown event"),
        (r#"{"event":"update-combi","data":{"symbol":1},"receiver":"combi"}"#, "payload"),
        (r#"{"event":"farkle","receiver":["combi","arcade"]}"#, "channel"),
        (r#"{"event":"farkle","receiver":"#, "malformed"),
    ];

    let errors: Vec<ChannelError> = cases
        .iter()
        .map(|(json, _)| router.send_wire(json).unwrap_err())
        .collect();

    assert!(matches!(errors[0], ChannelError::UnknownEvent(_)));
    assert!(matches!(errors[1], ChannelError::InvalidPayload { .. }));
    assert!(matches!(errors[2], ChannelError::UnknownChannel(_)));
    assert!(matches!(errors[3], ChannelError::Malformed(_)));
    assert_eq!(combi.pending(), 0);
}

#[test]
fn test_router_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Router>();
    assert_send_sync::<ChannelClient>();
}
