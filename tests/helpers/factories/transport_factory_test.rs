use std::io::Write;

use crate::net::{Request, Response};
use crate::test_helpers::factory::Factory;

#[test]
fn test_scripted_transport_replays_and_captures() {
    let record = Factory::schema().create_record();
    let mut transport = Factory::scripted_transport()
        .query_result(9, record)
        .create();

    let response = Response::read_from(&mut transport).unwrap();
    assert_eq!(response.header().query_id, 9);
    assert_eq!(transport.unread(), 0);

    Request::CompleteQuery { query_id: 9 }
        .write_to(&mut transport)
        .unwrap();
    transport.flush().unwrap();
    assert_eq!(
        transport.sent_requests(),
        vec![Request::CompleteQuery { query_id: 9 }]
    );
}
