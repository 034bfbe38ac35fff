use duet_client::{NegotiationError, NegotiationState};
use duet_core::{PeerSignal, SessionDescription};

use crate::integration::{create_test_engine, init_tracing};
use crate::utils::TransportCall;

#[tokio::test]
async fn test_rejected_answer_reverts_without_retry() {
    init_tracing();
    let mut f = create_test_engine(true);

    f.engine.create_offer().await.unwrap();
    f.transport.fail_next_remote();

    let result = f
        .engine
        .handle_signal(
            f.remote,
            PeerSignal::CallAnswer {
                answer: SessionDescription::answer("bad"),
                seq: 1,
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(NegotiationError::DescriptionApplyFailure(_))
    ));
    assert_eq!(f.engine.state(), NegotiationState::Idle);
    assert_eq!(f.transport.count(&TransportCall::Rollback).await, 1);
    assert_eq!(f.sink.offers().await, 1, "no automatic retry");
    assert!(f.engine.offer_deadline().is_none());

    // The engine is usable again and starts over with a call offer.
    assert!(f.engine.create_offer().await.unwrap());
    assert_eq!(f.sink.signal_names().await, vec!["CallOffer", "CallOffer"]);
}

#[tokio::test]
async fn test_rejected_offer_keeps_stable_state() {
    let mut f = create_test_engine(true);

    f.engine.create_offer().await.unwrap();
    f.engine
        .handle_signal(
            f.remote,
            PeerSignal::CallAnswer {
                answer: SessionDescription::answer("a1"),
                seq: 1,
            },
        )
        .await
        .unwrap();

    f.transport.fail_next_remote();
    let result = f
        .engine
        .handle_signal(
            f.remote,
            PeerSignal::NegotiationOffer {
                offer: SessionDescription::offer("bad"),
                seq: 1,
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(NegotiationError::DescriptionApplyFailure(_))
    ));
    assert_eq!(f.engine.state(), NegotiationState::Stable);
    assert_eq!(f.transport.count(&TransportCall::CreateAnswer).await, 0);
    assert_eq!(f.sink.signal_names().await, vec!["CallOffer"]);
}
